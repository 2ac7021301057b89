/// Tuning constants for one optimization task.
///
/// Defaults carry the reference tuning for engineering-sized searches: a
/// swarm of 31 particles, a Pareto archive of 10 and a 0.3/0.7/0.7 blend of
/// inertia, cognitive and social pull.
#[derive(Clone, Debug)]
pub struct PsoConfig {
    /// Number of particles in the swarm.
    pub population_size: usize,

    /// Capacity of the Pareto archive.
    pub archive_size: usize,

    /// Iteration cap. The loop always runs at least one iteration.
    pub max_iterations: u32,

    /// Weight of a particle's own momentum in the velocity update.
    pub inertia_weight: f64,
    /// Weight of the pull toward a particle's personal best.
    pub cognitive_weight: f64,
    /// Weight of the pull toward the Pareto archive.
    pub social_weight: f64,

    /// Per-particle, per-iteration probability of re-randomizing a particle
    /// that is not on the Pareto front.
    pub regen_probability: f64,

    /// Evaluate the swarm on the rayon pool instead of sequentially.
    pub multithreaded: bool,

    /// Fixed RNG seed; `None` seeds from OS entropy. Sequential runs with
    /// the same seed are reproducible.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            population_size: 31,
            archive_size: 10,
            max_iterations: 100,
            inertia_weight: 0.3,
            cognitive_weight: 0.7,
            social_weight: 0.7,
            regen_probability: 0.05,
            multithreaded: false,
            seed: None,
        }
    }
}
