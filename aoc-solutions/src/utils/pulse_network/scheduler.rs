//! Breadth-first pulse propagation, one button press at a time.

use std::collections::VecDeque;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use tracing::trace;

use super::error::NetworkError;
use super::graph::{ModuleGraph, ModuleId, ModuleKind};
use super::memory::{Level, Memory};

/// A pulse waiting in, or taken from, the work queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pulse {
    /// Sending module, `None` for the button
    pub source: Option<ModuleId>,
    pub target: ModuleId,
    /// Position of `source` in the target's inputs; meaningless for the button
    pub slot: usize,
    pub level: Level,
}

/// Low and high pulses counted over one or more presses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PulseCounts {
    pub low: u64,
    pub high: u64,
}

impl PulseCounts {
    pub fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    /// `None` once the sum no longer fits in a `u64`
    pub fn total(self) -> Option<u64> {
        self.low.checked_add(self.high)
    }

    /// `low * high`, `None` on overflow
    pub fn product(self) -> Option<u64> {
        self.low.checked_mul(self.high)
    }

    fn count(&mut self, level: Level) {
        match level {
            Level::Low => self.low += 1,
            Level::High => self.high += 1,
        }
    }
}

impl Add for PulseCounts {
    type Output = PulseCounts;

    fn add(self, rhs: PulseCounts) -> PulseCounts {
        PulseCounts {
            low: self.low + rhs.low,
            high: self.high + rhs.high,
        }
    }
}

impl AddAssign for PulseCounts {
    fn add_assign(&mut self, rhs: PulseCounts) {
        *self = *self + rhs;
    }
}

impl Sum for PulseCounts {
    fn sum<I: Iterator<Item = PulseCounts>>(iter: I) -> Self {
        iter.fold(PulseCounts::default(), Add::add)
    }
}

/// Bounds applied to every press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationLimits {
    /// Pulses one press may process before it is declared divergent
    pub max_pulses_per_press: usize,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            max_pulses_per_press: 1_000_000,
        }
    }
}

/// Drives button presses through a [`ModuleGraph`], owning the [`Memory`].
///
/// ```
/// use aoc_solutions::utils::pulse_network::{ModuleGraph, PulseCounts, Scheduler};
///
/// let graph: ModuleGraph = "broadcaster -> a, b, c\n%a -> b\n%b -> c\n%c -> inv\n&inv -> a"
///     .parse()
///     .unwrap();
/// let mut scheduler = Scheduler::new(&graph);
/// let first = scheduler.press().unwrap();
/// assert_eq!(first, PulseCounts::new(8, 4));
///
/// let rest = scheduler.press_n(999).unwrap();
/// assert_eq!((first + rest).product(), Some(32_000_000));
/// assert_eq!(scheduler.presses(), 1000);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler<'g> {
    graph: &'g ModuleGraph,
    memory: Memory,
    queue: VecDeque<Pulse>,
    limits: SimulationLimits,
    presses: u64,
}

impl<'g> Scheduler<'g> {
    /// Start from the initial memory of `graph`
    pub fn new(graph: &'g ModuleGraph) -> Self {
        Self {
            graph,
            memory: Memory::new(graph),
            queue: VecDeque::new(),
            limits: SimulationLimits::default(),
            presses: 0,
        }
    }

    /// Resume from a memory snapshot taken on the same graph
    pub fn with_memory(graph: &'g ModuleGraph, memory: Memory) -> Result<Self, NetworkError> {
        memory.check(graph)?;
        Ok(Self {
            memory,
            ..Self::new(graph)
        })
    }

    pub fn with_limits(mut self, limits: SimulationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Press the button once, sending `Low` to the broadcaster
    pub fn press(&mut self) -> Result<PulseCounts, NetworkError> {
        self.press_with(Level::Low)
    }

    /// Press the button with an explicit level
    pub fn press_with(&mut self, level: Level) -> Result<PulseCounts, NetworkError> {
        self.press_observed(level, |_| {})
    }

    /// Press `n` times, carrying memory between presses
    pub fn press_n(&mut self, n: u64) -> Result<PulseCounts, NetworkError> {
        let mut total = PulseCounts::default();
        for _ in 0..n {
            total += self.press()?;
        }
        Ok(total)
    }

    /// Press once, calling `observer` for every pulse in processing order.
    ///
    /// Pulses are counted before their target reacts. Without a broadcaster the
    /// button pulse is still counted but reaches nothing, so `observer` is never
    /// called. When the pulse cap is hit the press is abandoned, leaving memory
    /// in its partially propagated state.
    pub fn press_observed<F>(&mut self, level: Level, mut observer: F) -> Result<PulseCounts, NetworkError>
    where
        F: FnMut(&Pulse),
    {
        let graph = self.graph;
        let mut counts = PulseCounts::default();
        self.queue.clear();

        match graph.entry() {
            Some(entry) => self.queue.push_back(Pulse {
                source: None,
                target: entry,
                slot: 0,
                level,
            }),
            None => counts.count(level),
        }

        let mut processed = 0usize;
        while let Some(pulse) = self.queue.pop_front() {
            if processed == self.limits.max_pulses_per_press {
                self.queue.clear();
                return Err(NetworkError::SimulationDiverged {
                    press: self.presses + 1,
                    pulses: processed,
                });
            }
            processed += 1;
            counts.count(pulse.level);
            observer(&pulse);

            let output = match graph.kind(pulse.target) {
                ModuleKind::Broadcast => Some(pulse.level),
                ModuleKind::FlipFlop => match pulse.level {
                    Level::High => None,
                    Level::Low => self.memory.toggle(pulse.target),
                },
                ModuleKind::Conjunction => self.memory.record(
                    pulse.target,
                    pulse.source.map(|_| pulse.slot),
                    pulse.level,
                ),
                ModuleKind::Sink => None,
            };

            if let Some(level) = output {
                self.queue
                    .extend(graph.destinations(pulse.target).iter().map(|edge| Pulse {
                        source: Some(pulse.target),
                        target: edge.target,
                        slot: edge.slot,
                        level,
                    }));
            }
        }

        self.presses += 1;
        trace!(
            press = self.presses,
            low = counts.low,
            high = counts.high,
            "press settled"
        );
        Ok(counts)
    }

    /// Completed presses
    pub fn presses(&self) -> u64 {
        self.presses
    }

    pub fn graph(&self) -> &'g ModuleGraph {
        self.graph
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn snapshot(&self) -> Memory {
        self.memory.clone()
    }

    pub fn into_memory(self) -> Memory {
        self.memory
    }
}
