//! Parallel executor for running solvers

use crate::cli::ParallelizeBy;
use crate::config::Config;
use crate::error::{ExecutorError, PartError};
use crate::inputs::InputStore;
use aoc_solver::{DynSolver, SolverError, SolverRegistry};
use chrono::TimeDelta;
use rayon::prelude::*;
use std::ops::RangeInclusive;
use std::sync::mpsc::Sender;
use tracing::debug;

/// Result from a single solver execution
#[derive(Debug)]
pub struct SolverResult {
    pub year: u16,
    pub day: u8,
    pub part: u8,
    pub answer: Result<String, PartError>,
    /// Parse time of the instance that solved this part
    pub parse_duration: Option<TimeDelta>,
    pub solve_duration: TimeDelta,
}

impl SolverResult {
    fn failed(year: u16, day: u8, part: u8, error: PartError) -> Self {
        Self {
            year,
            day,
            part,
            answer: Err(error),
            parse_duration: None,
            solve_duration: TimeDelta::zero(),
        }
    }
}

/// Work item representing a solver to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub year: u16,
    pub day: u8,
    pub parts: RangeInclusive<u8>,
}

/// Parallel executor for running solvers
pub struct Executor {
    registry: SolverRegistry,
    inputs: InputStore,
    parallelize_by: ParallelizeBy,
    year_filter: Option<u16>,
    day_filter: Option<u8>,
    part_filter: Option<u8>,
    thread_pool: rayon::ThreadPool,
}

impl Executor {
    /// Create a new executor from config
    pub fn new(registry: SolverRegistry, config: &Config) -> Result<Self, ExecutorError> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.thread_count)
            .build()
            .map_err(|e| ExecutorError::ThreadPool(e.to_string()))?;

        let inputs = match &config.input_file {
            Some(file) => InputStore::new(config.input_dir.clone()).with_file(file.clone()),
            None => InputStore::new(config.input_dir.clone()),
        };

        Ok(Self {
            registry,
            inputs,
            parallelize_by: config.parallelize_by,
            year_filter: config.year_filter,
            day_filter: config.day_filter,
            part_filter: config.part_filter,
            thread_pool,
        })
    }

    /// Collect work items by filtering from registry metadata
    pub fn collect_work_items(&self) -> Vec<WorkItem> {
        self.registry
            .iter_info()
            .filter(|info| self.year_filter.is_none_or(|y| info.year == y))
            .filter(|info| self.day_filter.is_none_or(|d| info.day == d))
            .map(|info| WorkItem {
                year: info.year,
                day: info.day,
                parts: self.filter_parts(info.parts),
            })
            .filter(|w| !w.parts.is_empty())
            .collect()
    }

    /// Work items whose input file does not exist
    pub fn missing_inputs<'w>(&self, work_items: &'w [WorkItem]) -> Vec<&'w WorkItem> {
        work_items
            .iter()
            .filter(|w| !self.inputs.contains(w.year, w.day))
            .collect()
    }

    /// Filter parts based on the part filter and solver's max parts
    #[allow(clippy::reversed_empty_ranges)]
    fn filter_parts(&self, max_parts: u8) -> RangeInclusive<u8> {
        match self.part_filter {
            Some(p) if p <= max_parts => p..=p,
            Some(_) => 1..=0,
            None => 1..=max_parts,
        }
    }

    /// Execute all work items and send results to channel
    pub fn execute(&self, tx: Sender<SolverResult>) -> Result<(), ExecutorError> {
        let work_items = self.collect_work_items();
        debug!(
            items = work_items.len(),
            mode = ?self.parallelize_by,
            "executing work items"
        );

        let collected = match self.parallelize_by {
            ParallelizeBy::Sequential => work_items
                .iter()
                .filter_map(|work| self.run_work_item(work, &tx).err())
                .reduce(ExecutorError::combine),
            ParallelizeBy::Day | ParallelizeBy::Part => self.thread_pool.install(|| {
                work_items
                    .par_iter()
                    .filter_map(|work| self.run_work_item(work, &tx).err())
                    .reduce_with(ExecutorError::combine)
            }),
        };
        collected.map_or(Ok(()), Err)
    }

    /// Read the input once, then solve the requested parts
    fn run_work_item(&self, work: &WorkItem, tx: &Sender<SolverResult>) -> Result<(), ExecutorError> {
        let input = match self.inputs.read(work.year, work.day) {
            Ok(input) => input,
            Err(e) => {
                let error = PartError::from(e);
                for part in work.parts.clone() {
                    send(tx, SolverResult::failed(work.year, work.day, part, error.clone()))?;
                }
                return Ok(());
            }
        };

        match self.parallelize_by {
            ParallelizeBy::Part => self.run_parts_parallel(work, &input, tx),
            ParallelizeBy::Sequential | ParallelizeBy::Day => {
                self.run_parts_sequential(work, &input, tx)
            }
        }
    }

    /// Parse once and solve parts in order on the current thread
    fn run_parts_sequential(
        &self,
        work: &WorkItem,
        input: &str,
        tx: &Sender<SolverResult>,
    ) -> Result<(), ExecutorError> {
        let (year, day) = (work.year, work.day);
        let mut solver = match self.registry.create_solver(year, day, input) {
            Ok(solver) => solver,
            Err(e) => {
                let error = PartError::from(e);
                for part in work.parts.clone() {
                    send(tx, SolverResult::failed(year, day, part, error.clone()))?;
                }
                return Ok(());
            }
        };

        for part in work.parts.clone() {
            send(tx, solve_part(year, day, part, &mut *solver))?;
        }
        Ok(())
    }

    /// Solve every part on its own parsed instance, emitting results in part order
    fn run_parts_parallel(
        &self,
        work: &WorkItem,
        input: &str,
        tx: &Sender<SolverResult>,
    ) -> Result<(), ExecutorError> {
        let (year, day) = (work.year, work.day);
        let results: Vec<SolverResult> = work
            .parts
            .clone()
            .into_par_iter()
            .map(|part| match self.registry.create_solver(year, day, input) {
                Ok(mut solver) => solve_part(year, day, part, &mut *solver),
                Err(e) => SolverResult::failed(year, day, part, e.into()),
            })
            .collect();

        results.into_iter().try_for_each(|result| send(tx, result))
    }
}

fn send(tx: &Sender<SolverResult>, result: SolverResult) -> Result<(), ExecutorError> {
    tx.send(result).map_err(|_| ExecutorError::ChannelSend)
}

/// Solve a single part on an already parsed instance
fn solve_part(year: u16, day: u8, part: u8, solver: &mut dyn DynSolver) -> SolverResult {
    debug!(year, day, part, "solving");
    let parse_duration = Some(solver.parse_duration());

    match solver.solve(part) {
        Ok(result) => SolverResult {
            year,
            day,
            part,
            solve_duration: result.duration(),
            answer: Ok(result.answer),
            parse_duration,
        },
        Err(e) => SolverResult {
            parse_duration,
            ..SolverResult::failed(year, day, part, SolverError::from(e).into())
        },
    }
}
