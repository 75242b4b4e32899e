//! Parsed solver state and the type-erased handle the registry hands out

use crate::error::{ParseError, SolveError};
use crate::solver::{Solver, SolverExt};
use chrono::{DateTime, TimeDelta, Utc};

/// Wall-clock interval around one parse or solve call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timed {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Timed {
    /// Run `f`, returning its output together with the interval it took.
    ///
    /// ```
    /// use aoc_solver::Timed;
    ///
    /// let (sum, timed) = Timed::measure(|| (1..=10).sum::<u32>());
    /// assert_eq!(sum, 55);
    /// assert!(timed.end >= timed.start);
    /// ```
    pub fn measure<T>(f: impl FnOnce() -> T) -> (T, Timed) {
        let start = Utc::now();
        let value = f();
        let end = Utc::now();
        (value, Timed { start, end })
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Answer for one part plus the time spent computing it
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub answer: String,
    pub timing: Timed,
}

impl SolveResult {
    /// Time spent in the part solver, excluding parsing
    pub fn duration(&self) -> TimeDelta {
        self.timing.duration()
    }
}

/// One year-day puzzle after parsing.
///
/// Holds the shared data every part reads from (and may write intermediate
/// results into), plus the interval the parse took. Parts run against the
/// same shared data in the order they are requested, so a later part can
/// reuse whatever an earlier part stored.
pub struct SolverInstance<'a, S: Solver> {
    year: u16,
    day: u8,
    shared: S::SharedData<'a>,
    parsed: Timed,
}

impl<'a, S: Solver> SolverInstance<'a, S> {
    /// Parse `input` for `year`/`day`.
    ///
    /// # Errors
    /// Returns the solver's [`ParseError`] unchanged; no instance is built.
    pub fn new(year: u16, day: u8, input: &'a str) -> Result<Self, ParseError> {
        let (shared, parsed) = Timed::measure(|| S::parse(input));
        Ok(Self {
            year,
            day,
            shared: shared?,
            parsed,
        })
    }

    pub fn shared(&self) -> &S::SharedData<'a> {
        &self.shared
    }

    /// When parsing started and finished
    pub fn parse_timing(&self) -> Timed {
        self.parsed
    }
}

/// Object-safe view of a [`SolverInstance`], so solvers with different
/// shared data types can live behind one `Box`.
///
/// ```
/// use aoc_solver::DynSolver;
///
/// fn run_all(solver: &mut dyn DynSolver) -> Vec<String> {
///     (1..=solver.parts())
///         .filter_map(|part| solver.solve(part).ok())
///         .map(|result| result.answer)
///         .collect()
/// }
/// ```
pub trait DynSolver {
    /// Solve `part` (1-based) against the shared data.
    ///
    /// # Errors
    /// - [`SolveError::PartOutOfRange`] when `part` is 0 or above [`DynSolver::parts`]
    /// - [`SolveError::SolveFailed`] when the part solver itself fails
    fn solve(&mut self, part: u8) -> Result<SolveResult, SolveError>;

    fn parse_start(&self) -> DateTime<Utc>;

    fn parse_end(&self) -> DateTime<Utc>;

    fn year(&self) -> u16;

    fn day(&self) -> u8;

    /// Highest part number this solver answers
    fn parts(&self) -> u8;

    fn parse_duration(&self) -> TimeDelta {
        self.parse_end() - self.parse_start()
    }
}

impl<'a, S: Solver> DynSolver for SolverInstance<'a, S> {
    fn solve(&mut self, part: u8) -> Result<SolveResult, SolveError> {
        let shared = &mut self.shared;
        let (answer, timing) = Timed::measure(|| S::solve_part_checked_range(shared, part));
        Ok(SolveResult {
            answer: answer?,
            timing,
        })
    }

    fn parse_start(&self) -> DateTime<Utc> {
        self.parsed.start
    }

    fn parse_end(&self) -> DateTime<Utc> {
        self.parsed.end
    }

    fn year(&self) -> u16 {
        self.year
    }

    fn day(&self) -> u8 {
        self.day
    }

    fn parts(&self) -> u8 {
        S::PARTS
    }
}
