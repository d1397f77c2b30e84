//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::DEFAULT_MAX_WORKERS;

/// Tunable settings for a conversion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on simultaneously in-flight file tasks in concurrent mode.
    pub max_workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: detected_parallelism(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_workers: std::env::var("ENCONV_MAX_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or_else(detected_parallelism),
        }
    }

    /// Override the worker bound.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }
}

fn detected_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(DEFAULT_MAX_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_worker_bound_is_positive() {
        assert!(EngineConfig::default().max_workers >= 1);
    }

    #[test]
    fn with_max_workers_never_goes_to_zero() {
        assert_eq!(EngineConfig::default().with_max_workers(0).max_workers, 1);
        assert_eq!(EngineConfig::default().with_max_workers(8).max_workers, 8);
    }
}
