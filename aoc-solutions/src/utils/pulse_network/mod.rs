//! Pulse network simulator.
//!
//! A network of broadcast, flip-flop and conjunction modules wired by named
//! edges. Pressing the button sends one pulse into the `broadcaster`, and pulses
//! are processed strictly first in, first out until the network settles.
//!
//! - [`ModuleGraph`]: parsed, immutable topology with names resolved to ids
//! - [`Memory`]: flip-flop bits and conjunction input memory
//! - [`Scheduler`]: presses the button and counts pulses
//! - [`presses_until_low`]: LCM shortcut for counter-shaped networks, with
//!   [`simulate_until_low`] as the brute-force fallback
//!
//! ```
//! use aoc_solutions::utils::pulse_network::{ModuleGraph, Scheduler};
//!
//! let graph: ModuleGraph = "broadcaster -> a\n%a -> inv, con\n&inv -> b\n%b -> con\n&con -> output"
//!     .parse()
//!     .unwrap();
//! let mut scheduler = Scheduler::new(&graph);
//! let counts = scheduler.press_n(1000).unwrap();
//! assert_eq!(counts.product(), Some(11_687_500));
//! ```

mod error;
mod extrapolator;
mod graph;
mod memory;
mod scheduler;


pub use error::{GraphParseError, NetworkError};
pub use extrapolator::{
    CounterBranch, CounterTopology, analyze, gcd, lcm, presses_until_low, simulate_until_low,
};
pub use graph::{BROADCASTER, Edge, Module, ModuleGraph, ModuleId, ModuleKind};
pub use memory::{Level, Memory};
pub use scheduler::{Pulse, PulseCounts, Scheduler, SimulationLimits};
