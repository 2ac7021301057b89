use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;
use rand::rngs::StdRng;
use rand_core::SeedableRng;

/// Cloneable handle to the task's random source.
///
/// A single `StdRng` behind a mutex keeps draws race-free when worker
/// threads move particles concurrently. Sequential runs with a fixed seed
/// are reproducible; parallel runs are not, since lock order follows the
/// scheduler.
#[derive(Clone, Debug)]
pub struct SharedRng {
    rng: Arc<Mutex<StdRng>>,
}

impl SharedRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&self) -> f64 {
        self.lock().random::<f64>()
    }

    /// Uniform draw in `[lo, hi)`. Requires `lo < hi`.
    pub fn range(&self, lo: f64, hi: f64) -> f64 {
        self.lock().random_range(lo..hi)
    }

    /// Uniform index in `[0, n)`. Requires `n > 0`.
    pub fn index(&self, n: usize) -> usize {
        self.lock().random_range(0..n)
    }

    fn lock(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().expect("rng mutex poisoned")
    }
}
