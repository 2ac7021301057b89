use proptest::prelude::*;
use test_case::test_case;

use crate::swarm::descriptors::{Objective, ObjectiveGoal, OptVariable};

#[test_case(ObjectiveGoal::Minimize, 5.0, 3.0, 0.0; "minimize below target")]
#[test_case(ObjectiveGoal::Minimize, 5.0, 5.0, 0.0; "minimize at target")]
#[test_case(ObjectiveGoal::Minimize, 5.0, 7.5, 2.5; "minimize above target")]
#[test_case(ObjectiveGoal::Minimize, -2.0, -5.0, 0.0; "minimize negative target")]
#[test_case(ObjectiveGoal::Maximize, 5.0, 7.0, 0.0; "maximize above target")]
#[test_case(ObjectiveGoal::Maximize, 5.0, 5.0, 0.0; "maximize at target")]
#[test_case(ObjectiveGoal::Maximize, 5.0, 2.0, 3.0; "maximize below target")]
#[test_case(ObjectiveGoal::Equalize, 5.0, 5.0, 0.0; "equalize at target")]
#[test_case(ObjectiveGoal::Equalize, 5.0, 3.5, 1.5; "equalize below target")]
#[test_case(ObjectiveGoal::Equalize, 5.0, 6.5, 1.5; "equalize above target")]
fn test_error_for(goal: ObjectiveGoal, target: f64, fitness: f64, expected: f64) {
    let objective = Objective::new("obj", goal, target, 0.1);
    assert_eq!(objective.error_for(fitness), expected);
}

#[test]
fn test_error_depends_only_on_goal_and_target() {
    let a = Objective::new("mass", ObjectiveGoal::Equalize, 2.0, 0.5);
    let b = Objective::new("drag", ObjectiveGoal::Equalize, 2.0, 1.0e-3);
    for fitness in [-3.0, 0.0, 2.0, 17.5] {
        assert_eq!(a.error_for(fitness), b.error_for(fitness));
        assert_eq!(a.error_for(fitness), a.error_for(fitness));
    }
}

#[test_case(ObjectiveGoal::Minimize, 0.0; "minimize needs exact zero")]
#[test_case(ObjectiveGoal::Maximize, 0.0; "maximize needs exact zero")]
#[test_case(ObjectiveGoal::Equalize, 0.25; "equalize tolerates max error")]
fn test_convergence_threshold(goal: ObjectiveGoal, expected: f64) {
    let objective = Objective::new("obj", goal, 1.0, 0.25);
    assert_eq!(objective.convergence_threshold(), expected);
}

#[test]
fn test_variable_activity() {
    assert!(OptVariable::new("chord", 0.0, 1.0).is_active());
    assert!(!OptVariable::new("pinned", 0.3, 0.3).is_active());
    assert!(!OptVariable::new("hairline", 0.3, 0.3 + 1.0e-7).is_active());
    assert_eq!(OptVariable::new("span", 2.0, 5.0).range(), 3.0);
}

proptest! {
    /// The error function never reports negative badness, whatever the
    /// goal, target or fitness.
    #[test]
    fn prop_error_never_negative(
        goal_index in 0_usize..3,
        target in -1.0e3_f64..1.0e3,
        fitness in -1.0e3_f64..1.0e3,
    ) {
        let goal = [
            ObjectiveGoal::Minimize,
            ObjectiveGoal::Maximize,
            ObjectiveGoal::Equalize,
        ][goal_index];
        let objective = Objective::new("obj", goal, target, 0.1);
        let error = objective.error_for(fitness);
        prop_assert!(error >= 0.0, "error_for({}) = {} under {:?}", fitness, error, goal);
    }
}
