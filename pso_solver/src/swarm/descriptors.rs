use crate::swarm::ACTIVE_RANGE;

/// One dimension of the search space. Immutable once the task is set up.
#[derive(Clone, Debug, PartialEq)]
pub struct OptVariable {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl OptVariable {
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// A variable with a degenerate range is pinned and takes no part in
    /// the search.
    pub fn is_active(&self) -> bool {
        self.range() > ACTIVE_RANGE
    }
}

/// What "good" means for one objective.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObjectiveGoal {
    Minimize,
    Maximize,
    #[default]
    Equalize,
}

/// One target the evaluator's output is scored against.
#[derive(Clone, Debug, PartialEq)]
pub struct Objective {
    pub name: String,
    pub goal: ObjectiveGoal,
    pub target: f64,
    /// Normalization denominator when scoring archive members, and the
    /// convergence threshold for `Equalize`.
    pub max_error: f64,
}

impl Objective {
    pub fn new(name: impl Into<String>, goal: ObjectiveGoal, target: f64, max_error: f64) -> Self {
        Self {
            name: name.into(),
            goal,
            target,
            max_error,
        }
    }

    /// Non-negative badness of a raw fitness value against this objective.
    pub fn error_for(&self, fitness: f64) -> f64 {
        match self.goal {
            ObjectiveGoal::Minimize => {
                if fitness <= self.target {
                    0.0
                } else {
                    (fitness - self.target).abs()
                }
            }
            ObjectiveGoal::Maximize => {
                if fitness >= self.target {
                    0.0
                } else {
                    (fitness - self.target).abs()
                }
            }
            ObjectiveGoal::Equalize => (fitness - self.target).abs(),
        }
    }

    /// Error at or below which this objective counts as satisfied.
    pub fn convergence_threshold(&self) -> f64 {
        match self.goal {
            ObjectiveGoal::Equalize => self.max_error,
            ObjectiveGoal::Minimize | ObjectiveGoal::Maximize => 0.0,
        }
    }
}
