//! Integration tests for solvers collected through the plugin registry

use aoc_solutions::utils::pulse_network::{ModuleGraph, Scheduler};
use aoc_solver::SolverRegistryBuilder;

const SECOND_EXAMPLE: &str = "broadcaster -> a
%a -> inv, con
&inv -> b
%b -> con
&con -> output";

#[test]
fn test_all_plugins_include_day_20() {
    let registry = SolverRegistryBuilder::new()
        .register_all_plugins()
        .unwrap()
        .build();

    assert!(registry.contains(2023, 20));
    let tagged: Vec<_> = registry
        .iter_info()
        .filter(|info| info.tags.contains(&"pulse"))
        .map(|info| (info.year, info.day))
        .collect();
    assert_eq!(tagged, [(2023, 20)]);
}

#[test]
fn test_registry_answer_matches_direct_simulation() {
    let registry = SolverRegistryBuilder::new()
        .register_solver_plugins(|plugin| plugin.tags.contains(&"simulation"))
        .unwrap()
        .build();
    let mut solver = registry.create_solver(2023, 20, SECOND_EXAMPLE).unwrap();
    let result = solver.solve(1).unwrap();

    let graph: ModuleGraph = SECOND_EXAMPLE.parse().unwrap();
    let direct = Scheduler::new(&graph).press_n(1000).unwrap();
    assert_eq!(result.answer, direct.product().unwrap().to_string());
}
