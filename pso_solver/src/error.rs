use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    #[error("The variable list is empty")]
    NoVariables,

    #[error("Variable '{name}' has min {min} above max {max}")]
    InvertedBounds { name: String, min: f64, max: f64 },

    #[error("No variable has a searchable range")]
    NoActiveVariable,

    #[error("The objective list is empty")]
    NoObjectives,

    #[error("Population size must be at least 1")]
    ZeroPopulation,

    #[error("Archive size must be at least 1")]
    ZeroArchive,

    #[error("Regeneration probability {0} is outside [0, 1]")]
    RegenProbabilityOutOfRange(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PsoError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Evaluator returned {got} fitness values for {expected} objectives")]
    EvaluatorObjectiveMismatch { expected: usize, got: usize },

    #[error("Evaluator panicked: {message}")]
    EvaluatorPanicked { message: String },
}
