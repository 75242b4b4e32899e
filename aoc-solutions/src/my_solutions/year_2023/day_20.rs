use anyhow::{Context, anyhow};
use aoc_solver::{AocParser, ParseError, PartSolver, SolveError};
use aoc_solver_macros::{AocSolver, AutoRegisterSolver};
use tracing::warn;

use crate::utils::pulse_network::{
    GraphParseError, ModuleGraph, NetworkError, Scheduler, presses_until_low, simulate_until_low,
};

const BUTTON_PRESSES: u64 = 1000;
const TERMINAL: &str = "rx";
const FALLBACK_PRESS_LIMIT: u64 = 1_000_000;

#[derive(AocSolver, AutoRegisterSolver)]
#[aoc_solver(max_parts = 2)]
#[aoc(year = 2023, day = 20, tags = ["pulse", "simulation", "lcm"])]
pub struct Solver;

impl AocParser for Solver {
    type SharedData<'a> = ModuleGraph;

    fn parse<'a>(input: &'a str) -> Result<Self::SharedData<'a>, ParseError> {
        input
            .parse()
            .map_err(|e: GraphParseError| ParseError::InvalidFormat(e.to_string()))
    }
}

fn solve_failed(err: anyhow::Error) -> SolveError {
    SolveError::SolveFailed(err.into())
}

impl PartSolver<1> for Solver {
    fn solve(shared: &mut Self::SharedData<'_>) -> Result<String, SolveError> {
        let counts = Scheduler::new(shared)
            .press_n(BUTTON_PRESSES)
            .with_context(|| format!("pressing the button {BUTTON_PRESSES} times"))
            .map_err(solve_failed)?;
        counts
            .product()
            .map(|product| product.to_string())
            .ok_or_else(|| solve_failed(anyhow!("pulse product {counts:?} overflows u64")))
    }
}

impl PartSolver<2> for Solver {
    fn solve(shared: &mut Self::SharedData<'_>) -> Result<String, SolveError> {
        presses_until_terminal(shared)
            .map(|presses| presses.to_string())
            .map_err(solve_failed)
    }
}

fn presses_until_terminal(graph: &ModuleGraph) -> anyhow::Result<u64> {
    match presses_until_low(graph, TERMINAL) {
        Err(NetworkError::UnsupportedTopology { reason }) => {
            warn!(
                %reason,
                limit = FALLBACK_PRESS_LIMIT,
                "cannot extrapolate presses, falling back to simulation"
            );
            simulate_until_low(graph, TERMINAL, FALLBACK_PRESS_LIMIT)
                .with_context(|| format!("simulating until `{TERMINAL}` receives a low pulse"))
        }
        other => other.with_context(|| format!("extrapolating presses until `{TERMINAL}` receives a low pulse")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoc_solver::{SolverError, SolverRegistryBuilder};

    const FIRST_EXAMPLE: &str = "broadcaster -> a, b, c
%a -> b
%b -> c
%c -> inv
&inv -> a
";

    const SECOND_EXAMPLE: &str = "broadcaster -> a
%a -> inv, con
&inv -> b
%b -> con
&con -> output
";

    /// Counters with periods 3 and 5 in front of `rx`
    const COUNTERS: &str = "broadcaster -> f0x0, f1x0
%f0x0 -> f0x1, h0
%f0x1 -> h0
&h0 -> f0x0, v0
&v0 -> fd
%f1x0 -> f1x1, h1
%f1x1 -> f1x2
%f1x2 -> h1
&h1 -> f1x0, f1x1, v1
&v1 -> fd
&fd -> rx
";

    fn solve(input: &str, part: u8) -> Result<String, SolveError> {
        let mut shared = <Solver as AocParser>::parse(input).unwrap();
        match part {
            1 => <Solver as PartSolver<1>>::solve(&mut shared),
            _ => <Solver as PartSolver<2>>::solve(&mut shared),
        }
    }

    #[test]
    fn test_part_1_examples() {
        assert_eq!(solve(FIRST_EXAMPLE, 1).unwrap(), "32000000");
        assert_eq!(solve(SECOND_EXAMPLE, 1).unwrap(), "11687500");
    }

    #[test]
    fn test_part_2_extrapolates_counters() {
        assert_eq!(solve(COUNTERS, 2).unwrap(), "15");
    }

    #[test]
    fn test_part_2_falls_back_to_simulation() {
        // `rx` hangs off a flip-flop: Low on every second press.
        assert_eq!(solve("broadcaster -> a\n%a -> rx", 2).unwrap(), "2");
    }

    #[test]
    fn test_part_2_without_terminal_fails() {
        assert!(matches!(
            solve(FIRST_EXAMPLE, 2),
            Err(SolveError::SolveFailed(_))
        ));
    }

    #[test]
    fn test_parse_error_is_invalid_format() {
        assert!(matches!(
            <Solver as AocParser>::parse("broadcaster -> a\n% -> b"),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_registered_as_plugin() {
        let registry = SolverRegistryBuilder::new()
            .register_solver_plugins(|plugin| plugin.year == 2023 && plugin.day == 20)
            .unwrap()
            .build();

        let info = registry.get_info(2023, 20).unwrap();
        assert_eq!(info.parts, 2);
        assert_eq!(info.tags, ["pulse", "simulation", "lcm"]);

        let mut solver = registry.create_solver(2023, 20, FIRST_EXAMPLE).unwrap();
        assert_eq!(solver.solve(1).unwrap().answer, "32000000");
        assert!(matches!(
            registry.create_solver(2023, 20, "%x -> y\n&x -> z"),
            Err(SolverError::ParseError(ParseError::InvalidFormat(_)))
        ));
    }
}
