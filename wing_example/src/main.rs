use anyhow::Result;
use pso_solver::prelude::*;
use wing_example::prelude::*;

fn main() -> Result<()> {
    let model = SparModel::default();

    let variables = vec![
        OptVariable::new("cap_width", 0.02, 0.12),
        OptVariable::new("cap_thickness", 0.002, 0.02),
    ];
    // Keep the spar light while holding the tip deflection near 80 mm,
    // the flutter-clearance figure for this planform.
    let objectives = vec![
        Objective::new("mass", ObjectiveGoal::Minimize, 25.0, 2.0),
        Objective::new("tip_deflection", ObjectiveGoal::Equalize, 0.08, 0.008),
    ];
    let config = PsoConfig {
        max_iterations: 60,
        multithreaded: true,
        seed: Some(17),
        ..PsoConfig::default()
    };

    let mut task = PsoTask::new(variables, objectives, config)?;
    task.on_message(|text| println!("{text}"));
    task.on_iteration(|iter, best| {
        println!(
            "   iteration {iter}: mass = {:.3} kg, tip deflection = {:.4} m",
            best.fitness()[0],
            best.fitness()[1]
        );
    });

    let eval_model = model.clone();
    let result = task.run(&move |position: &[f64]| eval_model.evaluate(position))?;

    println!();
    println!(
        "Outcome: {:?} after {} iterations",
        result.outcome, result.iterations
    );
    if let Some(report) = task.best_report() {
        println!("Best spar section:");
        print!("{report}");
    }

    println!("Pareto front ({} members):", task.pareto_front().len());
    for member in task.pareto_front() {
        println!(
            "   width = {:.4} m, thickness = {:.4} m  ->  mass = {:.2} kg, deflection = {:.4} m",
            member.position()[0],
            member.position()[1],
            member.fitness()[0],
            member.fitness()[1]
        );
    }

    Ok(())
}
