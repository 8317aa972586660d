//! Training configuration.

/// Stopping rules for Baum-Welch training.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainConfig {
    /// Maximum number of EM updates. `0` leaves the model unchanged.
    pub max_iterations: usize,
    /// Training stops once the total log-likelihood changes by less than this
    /// between consecutive iterations.
    pub tolerance: f64,
}

impl TrainConfig {
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
    pub const DEFAULT_TOLERANCE: f64 = 1e-5;

    pub fn builder() -> crate::builder::TrainConfigBuilder {
        crate::builder::TrainConfigBuilder::new()
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }
}
