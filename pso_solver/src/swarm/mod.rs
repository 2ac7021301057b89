pub mod archive;
pub mod config;
pub mod descriptors;
pub mod particle;
pub mod rng;
pub mod task;

#[cfg(test)]
mod tests;

/// Variable ranges and velocities below this are treated as inert.
pub(crate) const ACTIVE_RANGE: f64 = 1.0e-6;

/// Two positions closer than this in every component count as the same point.
pub(crate) const PRECISION: f64 = 1.0e-6;

/// Sentinel error for personal-best slots that have not seen a real
/// evaluation. Any evaluated point dominates it.
pub(crate) const LARGE_ERROR: f64 = 1.0e10;

/// Cap on a particle's personal-best history.
pub(crate) const MAX_PERSONAL_BESTS: usize = 3;
