use aoc_solver::{AocParser, AocSolver, ParseError, PartSolver, SolveError, Solver};

#[derive(AocSolver)]
#[aoc_solver(max_parts = 2)]
struct TestSolver;

impl AocParser for TestSolver {
    type SharedData<'a> = Vec<i32>;

    fn parse(input: &str) -> Result<Self::SharedData<'_>, ParseError> {
        input
            .lines()
            .map(|line| {
                line.trim()
                    .parse::<i32>()
                    .map_err(|_| ParseError::InvalidFormat("Expected integer".into()))
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

/// Part 2 reads what part 1 left in the shared data.
#[derive(AocSolver)]
#[aoc_solver(max_parts = 2)]
struct DependentSolver;

#[derive(Debug, Default)]
struct Memo {
    numbers: Vec<u64>,
    total: Option<u64>,
}

impl AocParser for DependentSolver {
    type SharedData<'a> = Memo;

    fn parse(input: &str) -> Result<Self::SharedData<'_>, ParseError> {
        let numbers = input
            .split(',')
            .map(|n| n.trim().parse().map_err(|_| ParseError::InvalidFormat(n.to_string())))
            .collect::<Result<_, _>>()?;
        Ok(Memo { numbers, total: None })
    }
}

impl PartSolver<1> for DependentSolver {
    fn solve(shared: &mut Self::SharedData<'_>) -> Result<String, SolveError> {
        let total = shared.numbers.iter().sum::<u64>();
        shared.total = Some(total);
        Ok(total.to_string())
    }
}

impl PartSolver<2> for DependentSolver {
    fn solve(shared: &mut Self::SharedData<'_>) -> Result<String, SolveError> {
        let total = shared
            .total
            .ok_or_else(|| SolveError::SolveFailed("part 1 has not run".into()))?;
        Ok((total * 2).to_string())
    }
}

#[test]
fn test_parts_constant_matches_attribute() {
    assert_eq!(TestSolver::PARTS, 2);
    assert_eq!(DependentSolver::PARTS, 2);
}

#[test]
fn test_dispatch_reaches_each_part() {
    let mut shared = TestSolver::parse("1\n2\n3\n4").unwrap();
    assert_eq!(TestSolver::solve_part(&mut shared, 1).unwrap(), "10");
    assert_eq!(TestSolver::solve_part(&mut shared, 2).unwrap(), "24");
}

#[test]
fn test_part_outside_range_is_not_implemented() {
    let mut shared = TestSolver::parse("1").unwrap();
    assert!(matches!(
        TestSolver::solve_part(&mut shared, 0),
        Err(SolveError::PartNotImplemented(0))
    ));
    assert!(matches!(
        TestSolver::solve_part(&mut shared, 3),
        Err(SolveError::PartNotImplemented(3))
    ));
}

#[test]
fn test_dependent_parts_share_mutable_state() {
    let mut shared = DependentSolver::parse("1, 2, 3").unwrap();
    assert!(DependentSolver::solve_part(&mut shared, 2).is_err());
    assert_eq!(DependentSolver::solve_part(&mut shared, 1).unwrap(), "6");
    assert_eq!(DependentSolver::solve_part(&mut shared, 2).unwrap(), "12");
}
