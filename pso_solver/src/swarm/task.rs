use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;

use crate::error::{PsoError, SetupError};
use crate::swarm::{
    ACTIVE_RANGE, PRECISION,
    archive::ParetoArchive,
    config::PsoConfig,
    descriptors::{Objective, OptVariable},
    particle::Particle,
    rng::SharedRng,
};

/// Lifecycle of one optimization task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Finished,
    Cancelled,
}

/// Why the iteration loop stopped. Cancellation is a normal termination
/// path, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Converged,
    IterationLimitReached,
    Cancelled,
}

/// Final report of a completed run.
///
/// The vectors describe the representative best of the final archive; they
/// are empty when cancellation landed before any archive was built.
#[derive(Clone, Debug)]
pub struct OptimizationResult {
    pub best_position: Vec<f64>,
    pub best_fitness: Vec<f64>,
    pub best_errors: Vec<f64>,
    pub iterations: u32,
    pub outcome: Outcome,
}

/// Cloneable handle for cancelling a running task from any thread.
///
/// Workers already inside a fitness evaluation are not interrupted; the
/// loop stops at the next checkpoint.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

type IterationHook = Box<dyn FnMut(u32, &Particle) + Send>;
type ArchiveHook = Box<dyn FnMut(&[Particle]) + Send>;
type MessageHook = Box<dyn FnMut(&str) + Send>;

/// Multi-objective particle swarm task.
///
/// The host supplies the variable bounds, the objectives and a fitness
/// evaluator; the task owns the swarm, the Pareto archive and the iteration
/// state machine. `run` drives the loop to one of three outcomes; the
/// maintenance entry points (`make_swarm`, `refresh_fitness`,
/// `set_objectives`, `build_pareto_frontier`) let a host prepare or resume
/// a task between runs.
pub struct PsoTask {
    variables: Vec<OptVariable>,
    objectives: Vec<Objective>,
    config: PsoConfig,
    swarm: Vec<Particle>,
    pareto: ParetoArchive,
    iteration: u32,
    status: TaskStatus,
    cancel: CancelToken,
    rng: SharedRng,
    on_iteration: Option<IterationHook>,
    on_archive_built: Option<ArchiveHook>,
    on_message: Option<MessageHook>,
}

impl PsoTask {
    /// Validates the whole setup before anything runs; a defective
    /// configuration is never discovered mid-run.
    pub fn new(
        variables: Vec<OptVariable>,
        objectives: Vec<Objective>,
        config: PsoConfig,
    ) -> Result<Self, SetupError> {
        validate(&variables, &objectives, &config)?;
        let rng = SharedRng::from_seed_option(config.seed);
        let pareto = ParetoArchive::new(config.archive_size);
        Ok(Self {
            variables,
            objectives,
            config,
            swarm: Vec::new(),
            pareto,
            iteration: 0,
            status: TaskStatus::Pending,
            cancel: CancelToken::new(),
            rng,
            on_iteration: None,
            on_archive_built: None,
            on_message: None,
        })
    }

    /// Progress hook, called once per completed iteration with the
    /// iteration index and the representative best particle. Always invoked
    /// on the thread driving the loop, never on a worker.
    pub fn on_iteration(&mut self, hook: impl FnMut(u32, &Particle) + Send + 'static) {
        self.on_iteration = Some(Box::new(hook));
    }

    /// Called with a read-only view of the Pareto front after every rebuild.
    pub fn on_archive_built(&mut self, hook: impl FnMut(&[Particle]) + Send + 'static) {
        self.on_archive_built = Some(Box::new(hook));
    }

    /// Textual progress sink for the startup, per-iteration and termination
    /// lines.
    pub fn on_message(&mut self, hook: impl FnMut(&str) + Send + 'static) {
        self.on_message = Some(Box::new(hook));
    }

    /// Execute the full iteration loop, blocking until a terminal outcome.
    ///
    /// Builds a random swarm first when none exists. The task can be run
    /// again afterwards: it resumes from the surviving swarm and archive
    /// (call `reset_swarm` or `clear_pareto` first for a cold start). A
    /// pre-set cancellation flag is honored at the first checkpoint, so a
    /// cancelled task stays cancelled until `reset`.
    pub fn run<F>(&mut self, fitness_fn: &F) -> Result<OptimizationResult, PsoError>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        if self.swarm.is_empty() {
            self.make_swarm(fitness_fn)?;
        }

        self.iteration = 0;
        self.status = TaskStatus::Running;
        self.message("Starting swarm iterations");

        loop {
            match self.step(fitness_fn) {
                Ok(Some(result)) => return Ok(result),
                Ok(None) => {}
                Err(err) => {
                    // A failed evaluator aborts the run; the swarm keeps its
                    // previous state and the task can be run again.
                    self.status = TaskStatus::Pending;
                    return Err(err);
                }
            }
        }
    }

    /// (Re)build the random swarm and evaluate it, in parallel or
    /// sequentially per the config.
    pub fn make_swarm<F>(&mut self, fitness_fn: &F) -> Result<(), PsoError>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        let n_obj = self.objectives.len();
        self.swarm.clear();
        self.swarm
            .resize_with(self.config.population_size, Particle::default);
        for particle in &mut self.swarm {
            particle.randomize(&self.variables, n_obj, &self.rng);
        }

        self.evaluate_swarm(fitness_fn)?;
        self.message(&format!("Made {} random particles", self.swarm.len()));
        Ok(())
    }

    /// Re-evaluate fitness and errors for the swarm in place, without
    /// moving any particle, and re-prime the personal bests. Intended after
    /// objective edits between runs.
    pub fn refresh_fitness<F>(&mut self, fitness_fn: &F) -> Result<(), PsoError>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        self.evaluate_swarm(fitness_fn)?;
        for particle in &mut self.swarm {
            particle.prime_bests();
        }
        Ok(())
    }

    /// Swap the objective set. When the count changes every swarm and
    /// archive particle is resized through the single reshape operation;
    /// fitness and errors are stale until the next evaluation.
    pub fn set_objectives(&mut self, objectives: Vec<Objective>) -> Result<(), SetupError> {
        if objectives.is_empty() {
            return Err(SetupError::NoObjectives);
        }
        let count_changed = objectives.len() != self.objectives.len();
        self.objectives = objectives;
        if count_changed {
            let n_dim = self.variables.len();
            let n_obj = self.objectives.len();
            for particle in &mut self.swarm {
                particle.reshape(n_dim, n_obj);
            }
            self.pareto.reshape_members(n_dim, n_obj);
        }
        Ok(())
    }

    /// Fold the current swarm into the archive once, outside the loop.
    /// Hosts use this to prime the archive before iterating.
    pub fn build_pareto_frontier(&mut self) {
        self.pareto.absorb(&self.swarm, &self.cancel, &self.rng);
        if let Some(hook) = self.on_archive_built.as_mut() {
            hook(self.pareto.members());
        }
    }

    pub fn clear_pareto(&mut self) {
        self.pareto.clear();
    }

    /// Drop the swarm so the next run rebuilds it from scratch.
    pub fn reset_swarm(&mut self) {
        self.swarm.clear();
    }

    /// Return a terminal task to `Pending` with a fresh cancellation flag.
    /// Previously handed-out cancel tokens no longer affect it.
    pub fn reset(&mut self) {
        self.status = TaskStatus::Pending;
        self.iteration = 0;
        self.cancel = CancelToken::new();
    }

    /// Request cancellation before a run starts. To cancel a blocking `run`
    /// from another thread, clone a token first with `cancel_token`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }

    /// Either terminal state, finished or cancelled.
    pub fn is_finished(&self) -> bool {
        matches!(self.status, TaskStatus::Finished | TaskStatus::Cancelled)
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn swarm(&self) -> &[Particle] {
        &self.swarm
    }

    pub fn pareto_front(&self) -> &[Particle] {
        self.pareto.members()
    }

    pub fn variables(&self) -> &[OptVariable] {
        &self.variables
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    pub fn active_variable_count(&self) -> usize {
        self.variables.iter().filter(|var| var.is_active()).count()
    }

    /// The archive member closest to the targets: smallest sum of squared
    /// normalized errors over the objectives with a usable `max_error`,
    /// first-seen member winning ties. A member with a NaN score is never
    /// selected.
    pub fn representative_best(&self) -> Option<&Particle> {
        let mut best: Option<&Particle> = None;
        let mut best_dist2 = f64::INFINITY;
        for member in self.pareto.members() {
            let mut dist2 = 0.0;
            for (objective, error) in self.objectives.iter().zip(member.errors()) {
                if objective.max_error.abs() > PRECISION {
                    let scaled = error / objective.max_error;
                    dist2 += scaled * scaled;
                }
            }
            if dist2 < best_dist2 {
                best = Some(member);
                best_dist2 = dist2;
            }
        }
        best
    }

    /// Multi-line summary of the representative best: one line per variable,
    /// then fitness and error per objective.
    pub fn best_report(&self) -> Option<String> {
        let best = self.representative_best()?;
        let mut report = String::new();
        for (var, value) in self.variables.iter().zip(best.position()) {
            report.push_str(&format!("   {:<13} = {:11.5}\n", var.name, value));
        }
        for (objective, (fitness, error)) in self
            .objectives
            .iter()
            .zip(best.fitness().iter().zip(best.errors()))
        {
            report.push_str(&format!(
                "   {:<13}: fitness = {:11.5}, error = {:9.3e}\n",
                objective.name, fitness, error
            ));
        }
        Some(report)
    }

    /// One full iteration: move and evaluate the swarm, rebuild the
    /// archive, pick the representative best, test for termination, then
    /// regenerate stragglers. Returns the result once terminal.
    pub(crate) fn step<F>(&mut self, fitness_fn: &F) -> Result<Option<OptimizationResult>, PsoError>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        self.move_swarm(fitness_fn)?;
        self.iteration += 1;

        if !self.cancel.is_cancelled() {
            self.build_pareto_frontier();
        }

        let best = self.representative_best().cloned();
        let converged = match &best {
            Some(best) => self.is_converged(best),
            None => false,
        };

        if !self.cancel.is_cancelled() {
            if let Some(best) = &best {
                let worst_error = best.errors().iter().cloned().fold(0.0_f64, f64::max);
                self.message(&format!(
                    "Iteration {:2}: best error = {:.3e}",
                    self.iteration, worst_error
                ));
            }
            if let Some(hook) = self.on_iteration.as_mut() {
                if let Some(best) = &best {
                    hook(self.iteration, best);
                }
            }
        }

        let outcome = if converged {
            Some(Outcome::Converged)
        } else if self.cancel.is_cancelled() {
            Some(Outcome::Cancelled)
        } else if self.iteration >= self.config.max_iterations {
            Some(Outcome::IterationLimitReached)
        } else {
            None
        };

        match outcome {
            Some(Outcome::Converged) => {
                self.message("   ---Converged---");
                self.status = TaskStatus::Finished;
                Ok(Some(self.result_from(best, Outcome::Converged)))
            }
            Some(Outcome::Cancelled) => {
                self.message("The task has been cancelled");
                self.status = TaskStatus::Cancelled;
                Ok(Some(self.result_from(best, Outcome::Cancelled)))
            }
            Some(Outcome::IterationLimitReached) => {
                self.message("The maximum number of iterations has been reached");
                self.status = TaskStatus::Finished;
                Ok(Some(self.result_from(best, Outcome::IterationLimitReached)))
            }
            None => {
                self.regenerate();
                Ok(None)
            }
        }
    }

    fn move_swarm<F>(&mut self, fitness_fn: &F) -> Result<(), PsoError>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        let ctx = MoveContext {
            variables: &self.variables,
            objectives: &self.objectives,
            pareto: self.pareto.members(),
            inertia: self.config.inertia_weight,
            cognitive: self.config.cognitive_weight,
            social: self.config.social_weight,
            rng: &self.rng,
            cancel: &self.cancel,
        };

        if self.config.multithreaded {
            let failure = Mutex::new(None);
            self.swarm.par_iter_mut().for_each(|particle| {
                if let Err(err) = move_particle(particle, &ctx, fitness_fn) {
                    let mut slot = failure.lock().expect("failure mutex poisoned");
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                }
            });
            match failure.into_inner().expect("failure mutex poisoned") {
                Some(err) => Err(err),
                None => Ok(()),
            }
        } else {
            for particle in &mut self.swarm {
                move_particle(particle, &ctx, fitness_fn)?;
            }
            Ok(())
        }
    }

    fn evaluate_swarm<F>(&mut self, fitness_fn: &F) -> Result<(), PsoError>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        let objectives = &self.objectives;
        let cancel = &self.cancel;

        if self.config.multithreaded {
            let failure = Mutex::new(None);
            self.swarm.par_iter_mut().for_each(|particle| {
                if cancel.is_cancelled() {
                    return;
                }
                if let Err(err) = evaluate_particle(particle, objectives, fitness_fn) {
                    let mut slot = failure.lock().expect("failure mutex poisoned");
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                }
            });
            match failure.into_inner().expect("failure mutex poisoned") {
                Some(err) => Err(err),
                None => Ok(()),
            }
        } else {
            for particle in &mut self.swarm {
                if cancel.is_cancelled() {
                    break;
                }
                evaluate_particle(particle, objectives, fitness_fn)?;
            }
            Ok(())
        }
    }

    fn is_converged(&self, best: &Particle) -> bool {
        self.objectives
            .iter()
            .zip(best.errors())
            .all(|(objective, &error)| error <= objective.convergence_threshold())
    }

    /// Re-randomize non-Pareto particles with the configured probability.
    /// Members of the front are never regenerated.
    fn regenerate(&mut self) {
        let n_obj = self.objectives.len();
        for i in 0..self.swarm.len() {
            if self.rng.uniform() >= self.config.regen_probability {
                continue;
            }
            if self.pareto.contains_match(&self.swarm[i]) {
                continue;
            }
            self.swarm[i].randomize(&self.variables, n_obj, &self.rng);
        }
    }

    fn result_from(&self, best: Option<Particle>, outcome: Outcome) -> OptimizationResult {
        match best {
            Some(best) => OptimizationResult {
                best_position: best.position().to_vec(),
                best_fitness: best.fitness().to_vec(),
                best_errors: best.errors().to_vec(),
                iterations: self.iteration,
                outcome,
            },
            None => OptimizationResult {
                best_position: Vec::new(),
                best_fitness: Vec::new(),
                best_errors: Vec::new(),
                iterations: self.iteration,
                outcome,
            },
        }
    }

    fn message(&mut self, text: &str) {
        if let Some(hook) = self.on_message.as_mut() {
            hook(text);
        }
    }
}

fn validate(
    variables: &[OptVariable],
    objectives: &[Objective],
    config: &PsoConfig,
) -> Result<(), SetupError> {
    if variables.is_empty() {
        return Err(SetupError::NoVariables);
    }
    for var in variables {
        if var.min > var.max {
            return Err(SetupError::InvertedBounds {
                name: var.name.clone(),
                min: var.min,
                max: var.max,
            });
        }
    }
    if !variables.iter().any(OptVariable::is_active) {
        return Err(SetupError::NoActiveVariable);
    }
    if objectives.is_empty() {
        return Err(SetupError::NoObjectives);
    }
    if config.population_size == 0 {
        return Err(SetupError::ZeroPopulation);
    }
    if config.archive_size == 0 {
        return Err(SetupError::ZeroArchive);
    }
    if !(0.0..=1.0).contains(&config.regen_probability) {
        return Err(SetupError::RegenProbabilityOutOfRange(
            config.regen_probability,
        ));
    }
    Ok(())
}

/// Read-only state shared by every particle move in one batch. The archive
/// slice is a stable snapshot; it is only rebuilt after the batch barrier.
struct MoveContext<'a> {
    variables: &'a [OptVariable],
    objectives: &'a [Objective],
    pareto: &'a [Particle],
    inertia: f64,
    cognitive: f64,
    social: f64,
    rng: &'a SharedRng,
    cancel: &'a CancelToken,
}

/// Velocity and position update for one particle, then re-evaluation.
///
/// One personal best and one archive member are drawn per move and shared
/// by all dimensions; `r1`/`r2` are fresh per dimension. An empty archive
/// or best list contributes nothing rather than faulting.
fn move_particle<F>(
    particle: &mut Particle,
    ctx: &MoveContext<'_>,
    fitness_fn: &F,
) -> Result<(), PsoError>
where
    F: Fn(&[f64]) -> Vec<f64> + Sync,
{
    if ctx.cancel.is_cancelled() {
        return Ok(());
    }

    let global_best = if ctx.pareto.is_empty() {
        None
    } else {
        Some(&ctx.pareto[ctx.rng.index(ctx.pareto.len())])
    };
    let personal_best = if particle.bests.is_empty() {
        None
    } else {
        Some(ctx.rng.index(particle.bests.len()))
    };

    for j in 0..particle.position.len() {
        let var = &ctx.variables[j];
        let delta = var.range();

        // A newly activated dimension gets a fresh small velocity.
        if var.is_active() && particle.velocity[j].abs() < ACTIVE_RANGE {
            particle.velocity[j] = ctx.rng.range(-delta / 4.0, delta / 4.0);
        }

        let r1 = ctx.rng.uniform();
        let r2 = ctx.rng.uniform();

        let pos = particle.position[j];
        let personal_pull = match personal_best {
            Some(ib) => particle.bests[ib].position[j] - pos,
            None => 0.0,
        };
        let social_pull = match global_best {
            Some(member) => member.position[j] - pos,
            None => 0.0,
        };

        let mut vel = ctx.inertia * particle.velocity[j]
            + ctx.cognitive * r1 * personal_pull
            + ctx.social * r2 * social_pull;

        // Bounce off the boundary instead of pinning against it.
        let newpos = pos + vel;
        if newpos < var.min || newpos > var.max {
            vel = -vel;
        }

        particle.velocity[j] = vel;
        particle.position[j] += vel;
    }

    particle.clamp_to_bounds(ctx.variables);

    if ctx.cancel.is_cancelled() {
        return Ok(());
    }

    evaluate_particle(particle, ctx.objectives, fitness_fn)?;
    particle.update_best();
    Ok(())
}

/// Call the host's evaluator for one particle and score the objectives.
///
/// A panic or a mismatched output length aborts without touching the
/// particle, so its previous errors stay intact.
fn evaluate_particle<F>(
    particle: &mut Particle,
    objectives: &[Objective],
    fitness_fn: &F,
) -> Result<(), PsoError>
where
    F: Fn(&[f64]) -> Vec<f64> + Sync,
{
    let values = panic::catch_unwind(AssertUnwindSafe(|| fitness_fn(particle.position())))
        .map_err(|payload| PsoError::EvaluatorPanicked {
            message: panic_message(&*payload),
        })?;

    if values.len() != objectives.len() {
        return Err(PsoError::EvaluatorObjectiveMismatch {
            expected: objectives.len(),
            got: values.len(),
        });
    }

    particle.apply_fitness(&values, objectives);
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
