//! Mutable per-module state, kept apart from the graph topology.

use std::fmt;
use std::ops::Not;

use super::error::NetworkError;
use super::graph::{ModuleGraph, ModuleId, ModuleKind};

/// Level of a pulse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    #[inline]
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Low => "low",
            Level::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Cell {
    Stateless,
    FlipFlop(bool),
    Conjunction {
        /// Last level per input slot
        remembered: Vec<Level>,
        /// Number of `High` entries in `remembered`
        high: usize,
        last_output: Level,
    },
}

impl Cell {
    fn initial(graph: &ModuleGraph, id: ModuleId) -> Self {
        match graph.kind(id) {
            ModuleKind::FlipFlop => Cell::FlipFlop(false),
            ModuleKind::Conjunction => Cell::Conjunction {
                remembered: vec![Level::Low; graph.inputs(id).len()],
                high: 0,
                last_output: Level::Low,
            },
            ModuleKind::Broadcast | ModuleKind::Sink => Cell::Stateless,
        }
    }

    fn is_initial(&self) -> bool {
        match self {
            Cell::Stateless => true,
            Cell::FlipFlop(on) => !on,
            Cell::Conjunction {
                high, last_output, ..
            } => *high == 0 && *last_output == Level::Low,
        }
    }

    fn reset(&mut self) {
        match self {
            Cell::Stateless => {}
            Cell::FlipFlop(on) => *on = false,
            Cell::Conjunction {
                remembered,
                high,
                last_output,
            } => {
                remembered.fill(Level::Low);
                *high = 0;
                *last_output = Level::Low;
            }
        }
    }
}

/// Flip-flop bits and conjunction input memory for one [`ModuleGraph`].
///
/// Indexed by [`ModuleId`]; conjunction inputs are indexed by the edge slot, so
/// no string is looked up while pulses are processed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Memory {
    cells: Vec<Cell>,
}

impl Memory {
    /// Initial state: flip-flops off, every conjunction input `Low`.
    pub fn new(graph: &ModuleGraph) -> Self {
        Self {
            cells: graph.iter().map(|(id, _)| Cell::initial(graph, id)).collect(),
        }
    }

    /// State of a flip-flop, `None` for other kinds
    pub fn flip_flop(&self, id: ModuleId) -> Option<bool> {
        match self.cells.get(id.index())? {
            Cell::FlipFlop(on) => Some(*on),
            _ => None,
        }
    }

    /// Last level `conjunction` received from `upstream`
    pub fn remembered(
        &self,
        graph: &ModuleGraph,
        conjunction: ModuleId,
        upstream: ModuleId,
    ) -> Option<Level> {
        let slot = graph
            .get(conjunction)?
            .inputs()
            .iter()
            .position(|&id| id == upstream)?;
        match self.cells.get(conjunction.index())? {
            Cell::Conjunction { remembered, .. } => remembered.get(slot).copied(),
            _ => None,
        }
    }

    /// Level a conjunction sent on its latest activation
    pub fn last_output(&self, id: ModuleId) -> Option<Level> {
        match self.cells.get(id.index())? {
            Cell::Conjunction { last_output, .. } => Some(*last_output),
            _ => None,
        }
    }

    /// A flip-flop that is on, or a conjunction whose last output was `High`
    pub fn is_on(&self, id: ModuleId) -> bool {
        match self.cells.get(id.index()) {
            Some(Cell::FlipFlop(on)) => *on,
            Some(Cell::Conjunction { last_output, .. }) => last_output.is_high(),
            Some(Cell::Stateless) | None => false,
        }
    }

    pub fn is_on_named(&self, graph: &ModuleGraph, name: &str) -> Result<bool, NetworkError> {
        graph
            .id(name)
            .map(|id| self.is_on(id))
            .ok_or_else(|| NetworkError::UnknownModule(name.to_string()))
    }

    /// Whether every module is back in its starting state
    pub fn is_initial(&self) -> bool {
        self.cells.iter().all(Cell::is_initial)
    }

    /// Restore the starting state in place
    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(Cell::reset);
    }

    /// Check that this memory was built for `graph`.
    pub(crate) fn check(&self, graph: &ModuleGraph) -> Result<(), NetworkError> {
        if self.cells.len() != graph.len() {
            let module = graph
                .iter()
                .nth(self.cells.len().min(graph.len()))
                .map(|(_, m)| m.name().to_string())
                .unwrap_or_default();
            return Err(NetworkError::MemoryMismatch { module });
        }
        for ((id, module), cell) in graph.iter().zip(&self.cells) {
            let fits = match (module.kind(), cell) {
                (ModuleKind::FlipFlop, Cell::FlipFlop(_)) => true,
                (ModuleKind::Conjunction, Cell::Conjunction { remembered, .. }) => {
                    remembered.len() == graph.inputs(id).len()
                }
                (ModuleKind::Broadcast | ModuleKind::Sink, Cell::Stateless) => true,
                _ => false,
            };
            if !fits {
                return Err(NetworkError::MemoryMismatch {
                    module: module.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Flip a flip-flop and return its new state as a level.
    pub(crate) fn toggle(&mut self, id: ModuleId) -> Option<Level> {
        match self.cells.get_mut(id.index())? {
            Cell::FlipFlop(on) => {
                *on = !*on;
                Some(Level::from(*on))
            }
            _ => None,
        }
    }

    /// Store `level` in a conjunction's input slot and return its NAND output.
    ///
    /// `slot` is `None` for the button, which is never one of the inputs.
    pub(crate) fn record(&mut self, id: ModuleId, slot: Option<usize>, level: Level) -> Option<Level> {
        match self.cells.get_mut(id.index())? {
            Cell::Conjunction {
                remembered,
                high,
                last_output,
            } => {
                if let Some(previous) = slot.and_then(|slot| remembered.get_mut(slot)) {
                    match (*previous, level) {
                        (Level::Low, Level::High) => *high += 1,
                        (Level::High, Level::Low) => *high -= 1,
                        _ => {}
                    }
                    *previous = level;
                }
                *last_output = Level::from(*high != remembered.len());
                Some(*last_output)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> ModuleGraph {
        "broadcaster -> a, b\n%a -> con\n%b -> con\n&con -> out"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_level_conversions() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert_eq!(!Level::Low, Level::High);
        assert!(Level::High.is_high());
        assert_eq!(Level::default(), Level::Low);
        assert_eq!(Level::High.to_string(), "high");
    }

    #[test]
    fn test_new_is_initial_and_pure() {
        let graph = graph();
        let memory = Memory::new(&graph);
        assert!(memory.is_initial());
        assert_eq!(memory, Memory::new(&graph));

        let a = graph.id("a").unwrap();
        let con = graph.id("con").unwrap();
        assert_eq!(memory.flip_flop(a), Some(false));
        assert_eq!(memory.flip_flop(con), None);
        assert_eq!(memory.remembered(&graph, con, a), Some(Level::Low));
        assert_eq!(memory.last_output(con), Some(Level::Low));
        assert_eq!(memory.remembered(&graph, con, con), None);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let graph = graph();
        let a = graph.id("a").unwrap();
        let mut memory = Memory::new(&graph);

        assert_eq!(memory.toggle(a), Some(Level::High));
        assert!(memory.is_on(a));
        assert_eq!(memory.toggle(a), Some(Level::Low));
        assert!(memory.is_initial());
        assert_eq!(memory.toggle(graph.id("out").unwrap()), None);
    }

    #[test]
    fn test_record_is_nand_over_slots() {
        let graph = graph();
        let con = graph.id("con").unwrap();
        let a = graph.id("a").unwrap();
        let mut memory = Memory::new(&graph);

        assert_eq!(memory.record(con, Some(0), Level::High), Some(Level::High));
        assert_eq!(memory.remembered(&graph, con, a), Some(Level::High));
        assert_eq!(memory.record(con, Some(1), Level::High), Some(Level::Low));
        assert!(!memory.is_on(con));
        assert_eq!(memory.record(con, Some(0), Level::Low), Some(Level::High));
        assert!(memory.is_on(con));
        // Repeating a level does not double count.
        assert_eq!(memory.record(con, Some(1), Level::High), Some(Level::High));
    }

    #[test]
    fn test_reset_restores_initial() {
        let graph = graph();
        let mut memory = Memory::new(&graph);
        memory.toggle(graph.id("b").unwrap());
        memory.record(graph.id("con").unwrap(), Some(1), Level::High);
        assert!(!memory.is_initial());

        memory.reset();
        assert!(memory.is_initial());
        assert_eq!(memory, Memory::new(&graph));
    }

    #[test]
    fn test_is_on_named() {
        let graph = graph();
        let memory = Memory::new(&graph);
        assert_eq!(memory.is_on_named(&graph, "a"), Ok(false));
        assert_eq!(
            memory.is_on_named(&graph, "zz"),
            Err(NetworkError::UnknownModule("zz".to_string()))
        );
    }

    #[test]
    fn test_check_rejects_foreign_memory() {
        let graph = graph();
        let other: ModuleGraph = "broadcaster -> a, b\n&a -> con\n%b -> con\n&con -> out"
            .parse()
            .unwrap();
        assert_eq!(Memory::new(&graph).check(&graph), Ok(()));
        assert_eq!(
            Memory::new(&other).check(&graph),
            Err(NetworkError::MemoryMismatch {
                module: "a".to_string()
            })
        );
    }

    #[test]
    fn test_remembered_ignores_ids_from_other_graphs() {
        let graph = graph();
        let memory = Memory::new(&graph);
        let large: ModuleGraph = "broadcaster -> a, b, c, d, e\n&e -> x, y".parse().unwrap();
        let far = large.id("y").unwrap();
        let con = graph.id("con").unwrap();

        assert_eq!(memory.remembered(&graph, far, con), None);
        assert_eq!(memory.remembered(&graph, con, far), None);
        assert_eq!(
            memory.remembered(&graph, con, graph.id("a").unwrap()),
            Some(Level::Low)
        );
    }
}
