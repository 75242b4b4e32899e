use aoc_solver::{
    AocParser, AocSolver, AutoRegisterSolver, ParseError, PartSolver, RegistrationError,
    SolveError, SolverRegistryBuilder,
};

#[derive(AocSolver, AutoRegisterSolver)]
#[aoc_solver(max_parts = 1)]
#[aoc(year = 2015, day = 24, tags = ["macro-test", "lines"])]
pub struct LineCounter;

impl AocParser for LineCounter {
    type SharedData<'a> = &'a str;

    fn parse(input: &str) -> Result<Self::SharedData<'_>, ParseError> {
        Ok(input)
    }
}

impl PartSolver<1> for LineCounter {
    fn solve(shared: &mut Self::SharedData<'_>) -> Result<String, SolveError> {
        Ok(shared.lines().count().to_string())
    }
}

#[derive(AocSolver, AutoRegisterSolver)]
#[aoc_solver(max_parts = 1)]
#[aoc(year = 2015, day = 25)]
pub struct Untagged;

impl AocParser for Untagged {
    type SharedData<'a> = ();

    fn parse(_input: &str) -> Result<Self::SharedData<'_>, ParseError> {
        Ok(())
    }
}

impl PartSolver<1> for Untagged {
    fn solve(_shared: &mut Self::SharedData<'_>) -> Result<String, SolveError> {
        Ok("done".to_string())
    }
}

#[test]
fn test_plugins_are_collected() {
    let registry = SolverRegistryBuilder::new()
        .register_all_plugins()
        .expect("plugins should not collide")
        .build();

    assert!(registry.contains(2015, 24));
    assert!(registry.contains(2015, 25));

    let info = registry.get_info(2015, 24).unwrap();
    assert_eq!(info.parts, 1);
    assert_eq!(info.tags, &["macro-test", "lines"]);
    assert!(registry.get_info(2015, 25).unwrap().tags.is_empty());

    let mut solver = registry.create_solver(2015, 24, "a\nb").unwrap();
    assert_eq!(solver.solve(1).unwrap().answer, "2");
}

#[test]
fn test_filtered_registration_by_tag() {
    let registry = SolverRegistryBuilder::new()
        .register_solver_plugins(|plugin| plugin.tags.contains(&"macro-test"))
        .unwrap()
        .build();

    assert_eq!(registry.len(), 1);
    assert!(registry.contains(2015, 24));
    assert!(!registry.contains(2015, 25));
}

#[test]
fn test_registering_plugins_twice_is_rejected() {
    let result = SolverRegistryBuilder::new()
        .register::<LineCounter>(2015, 24)
        .unwrap()
        .register_solver_plugins(|plugin| plugin.year == 2015 && plugin.day == 24);

    assert!(matches!(
        result.err(),
        Some(RegistrationError::DuplicateSolver(2015, 24))
    ));
}
