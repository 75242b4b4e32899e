//! Property-based tests for the AocSolver derive macro and the type-erased instance

use aoc_solver::{
    AocParser, AocSolver, DynSolver, ParseError, PartSolver, SolveError, Solver, SolverError,
    SolverInstance, SolverRegistryBuilder,
};
use proptest::prelude::*;

#[derive(AocSolver)]
#[aoc_solver(max_parts = 2)]
struct TestSolver;

impl AocParser for TestSolver {
    type SharedData<'a> = Vec<i32>;

    fn parse(input: &str) -> Result<Self::SharedData<'_>, ParseError> {
        input
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| {
                l.parse()
                    .map_err(|_| ParseError::InvalidFormat("bad int".into()))
            })
            .collect()
    }
}

impl PartSolver<1> for TestSolver {
    fn solve(shared: &mut Self::SharedData<'_>) -> Result<String, SolveError> {
        Ok(shared.iter().sum::<i32>().to_string())
    }
}

impl PartSolver<2> for TestSolver {
    fn solve(shared: &mut Self::SharedData<'_>) -> Result<String, SolveError> {
        Ok(shared.iter().product::<i32>().to_string())
    }
}

fn render(numbers: &[i32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// `Solver::solve_part(N)` equals `<Self as PartSolver<N>>::solve`.
    #[test]
    fn solve_part_dispatches_to_correct_part_solver(
        numbers in prop::collection::vec(1i32..10, 1..5),
        part in 1u8..=2
    ) {
        let input = render(&numbers);
        let mut shared1 = TestSolver::parse(&input).unwrap();
        let mut shared2 = TestSolver::parse(&input).unwrap();

        let solver_result = TestSolver::solve_part(&mut shared1, part);
        let direct_result = match part {
            1 => <TestSolver as PartSolver<1>>::solve(&mut shared2),
            2 => <TestSolver as PartSolver<2>>::solve(&mut shared2),
            _ => unreachable!(),
        };

        prop_assert_eq!(solver_result.unwrap(), direct_result.unwrap());
    }

    /// The type-erased instance answers like the concrete solver.
    #[test]
    fn dyn_solver_matches_concrete_solver(
        numbers in prop::collection::vec(-5i32..10, 1..6),
        part in 1u8..=2
    ) {
        let input = render(&numbers);
        let mut instance = SolverInstance::<TestSolver>::new(2023, 20, &input).unwrap();
        let erased: &mut dyn DynSolver = &mut instance;

        let mut shared = TestSolver::parse(&input).unwrap();
        let expected = TestSolver::solve_part(&mut shared, part).unwrap();

        let result = erased.solve(part).unwrap();
        prop_assert!(result.duration() >= chrono::TimeDelta::zero());
        prop_assert_eq!(&result.answer, &expected);
    }
}

#[test]
fn test_instance_metadata() {
    let instance = SolverInstance::<TestSolver>::new(2023, 20, "1\n2").unwrap();
    assert_eq!(instance.year(), 2023);
    assert_eq!(instance.day(), 20);
    assert_eq!(instance.parts(), 2);
    assert_eq!(instance.shared(), &vec![1, 2]);
    assert!(instance.parse_end() >= instance.parse_start());

    let timing = instance.parse_timing();
    assert_eq!(timing.start, instance.parse_start());
    assert_eq!(timing.end, instance.parse_end());
    assert_eq!(timing.duration(), instance.parse_duration());
}

#[test]
fn test_solve_result_keeps_answer_and_timing() {
    let mut instance = SolverInstance::<TestSolver>::new(2023, 20, "2\n3\n4").unwrap();

    let first = instance.solve(1).unwrap();
    let second = instance.solve(2).unwrap();
    assert_eq!(first.answer, "9");
    assert_eq!(second.answer, "24");
    assert_eq!(first.duration(), first.timing.end - first.timing.start);
    assert!(second.timing.start >= first.timing.end);
}

#[test]
fn test_instance_rejects_out_of_range_part() {
    let mut instance = SolverInstance::<TestSolver>::new(2023, 20, "1").unwrap();
    assert!(matches!(instance.solve(3), Err(SolveError::PartOutOfRange(3))));
}

#[test]
fn test_registry_surfaces_parse_errors() {
    let registry = SolverRegistryBuilder::new()
        .register::<TestSolver>(2023, 20)
        .unwrap()
        .build();

    let result = registry.create_solver(2023, 20, "1\nnot a number");
    assert!(matches!(
        result.err(),
        Some(SolverError::ParseError(ParseError::InvalidFormat(_)))
    ));
}
