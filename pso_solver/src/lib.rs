pub mod error;
pub mod swarm;

pub mod prelude {
    pub use crate::{
        error::*,
        swarm::{
            archive::ParetoArchive,
            config::PsoConfig,
            descriptors::{Objective, ObjectiveGoal, OptVariable},
            particle::{Particle, PersonalBest},
            rng::SharedRng,
            task::{CancelToken, OptimizationResult, Outcome, PsoTask, TaskStatus},
        },
    };
}
