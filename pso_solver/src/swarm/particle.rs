use crate::swarm::{
    LARGE_ERROR, MAX_PERSONAL_BESTS, PRECISION,
    descriptors::{Objective, OptVariable},
    rng::SharedRng,
};

/// One remembered good point in a particle's own history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonalBest {
    pub position: Vec<f64>,
    pub error: Vec<f64>,
}

/// One candidate solution: a point in the search space, its velocity, and
/// its evaluated quality.
///
/// A particle is owned by the swarm and mutated in place every iteration.
/// The Pareto archive stores independent clones, never references into the
/// swarm.
#[derive(Clone, Debug, Default)]
pub struct Particle {
    pub(crate) position: Vec<f64>,
    pub(crate) velocity: Vec<f64>,
    pub(crate) fitness: Vec<f64>,
    pub(crate) errors: Vec<f64>,
    pub(crate) bests: Vec<PersonalBest>,
}

impl Particle {
    pub fn new(n_dim: usize, n_obj: usize) -> Self {
        let mut particle = Particle::default();
        particle.reshape(n_dim, n_obj);
        particle
    }

    /// The single legal way to change a particle's dimensionality.
    ///
    /// Existing components are preserved; new error slots in the best list
    /// are filled with the sentinel so a real evaluation replaces them.
    pub(crate) fn reshape(&mut self, n_dim: usize, n_obj: usize) {
        self.position.resize(n_dim, 0.0);
        self.velocity.resize(n_dim, 0.0);
        self.fitness.resize(n_obj, 0.0);
        self.errors.resize(n_obj, 0.0);

        let n_best = n_obj.min(MAX_PERSONAL_BESTS);
        self.bests.resize_with(n_best, PersonalBest::default);
        for best in &mut self.bests {
            best.position.resize(n_dim, 0.0);
            best.error.resize(n_obj, LARGE_ERROR);
        }
    }

    /// Draw a fresh random position and a deliberately small velocity, a
    /// quarter of the range either way, so early exploration is gradual.
    pub(crate) fn randomize(&mut self, variables: &[OptVariable], n_obj: usize, rng: &SharedRng) {
        self.reshape(variables.len(), n_obj);

        for (i, var) in variables.iter().enumerate() {
            let delta = var.range();
            if delta > 0.0 {
                self.position[i] = var.min + rng.range(0.0, delta);
                self.velocity[i] = rng.range(-delta / 4.0, delta / 4.0);
            } else {
                self.position[i] = var.min;
                self.velocity[i] = 0.0;
            }
        }
        self.prime_bests();
    }

    /// Point every best slot at the current position with sentinel errors.
    pub(crate) fn prime_bests(&mut self) {
        for best in &mut self.bests {
            best.position.copy_from_slice(&self.position);
            best.error.fill(LARGE_ERROR);
        }
    }

    /// Fold the current point into the personal-best list: it replaces the
    /// first entry it dominates, and failing that overwrites the last slot,
    /// which is reserved for the most recent evaluation.
    pub(crate) fn update_best(&mut self) {
        for i in 0..self.bests.len() {
            if dominates_errors(&self.errors, &self.bests[i].error) {
                self.bests[i].position.copy_from_slice(&self.position);
                self.bests[i].error.copy_from_slice(&self.errors);
                return;
            }
        }
        if let Some(last) = self.bests.last_mut() {
            last.position.copy_from_slice(&self.position);
            last.error.copy_from_slice(&self.errors);
        }
    }

    /// Store the evaluator's output and rescore every objective.
    pub(crate) fn apply_fitness(&mut self, values: &[f64], objectives: &[Objective]) {
        debug_assert_eq!(values.len(), objectives.len(), "fitness length mismatch");
        self.fitness.copy_from_slice(values);
        for (i, objective) in objectives.iter().enumerate() {
            self.errors[i] = objective.error_for(self.fitness[i]);
        }
    }

    /// Pareto dominance on error vectors: no worse everywhere, strictly
    /// better somewhere.
    pub fn dominates(&self, other: &Particle) -> bool {
        dominates_errors(&self.errors, &other.errors)
    }

    pub(crate) fn is_same(&self, other: &Particle) -> bool {
        self.position.len() == other.position.len()
            && self
                .position
                .iter()
                .zip(&other.position)
                .all(|(a, b)| (a - b).abs() < PRECISION)
    }

    pub(crate) fn clamp_to_bounds(&mut self, variables: &[OptVariable]) {
        debug_assert_eq!(self.position.len(), variables.len(), "dimension mismatch");
        for (pos, var) in self.position.iter_mut().zip(variables) {
            *pos = pos.max(var.min).min(var.max);
        }
    }

    pub fn dimension(&self) -> usize {
        self.position.len()
    }

    pub fn objective_count(&self) -> usize {
        self.fitness.len()
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    pub fn bests(&self) -> &[PersonalBest] {
        &self.bests
    }
}

/// Componentwise `<=` with at least one strict `<`.
pub(crate) fn dominates_errors(a: &[f64], b: &[f64]) -> bool {
    debug_assert_eq!(a.len(), b.len(), "error vectors must have equal length");
    let mut strictly_better = false;
    for (ea, eb) in a.iter().zip(b) {
        if ea > eb {
            return false;
        }
        if ea < eb {
            strictly_better = true;
        }
    }
    strictly_better
}
