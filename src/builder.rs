use crate::config::TrainConfig;
use crate::error::{HmmError, Result};

/// Builder for [`TrainConfig`]; unset knobs fall back to the defaults.
#[derive(Clone, Debug, Default)]
pub struct TrainConfigBuilder {
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
}

impl TrainConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
    /// # Errors
    /// [`HmmError::InvalidParameters`] if the tolerance is negative or NaN.
    pub fn build(self) -> Result<TrainConfig> {
        let tolerance = self.tolerance.unwrap_or(TrainConfig::DEFAULT_TOLERANCE);
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(HmmError::InvalidParameters(format!(
                "tolerance must be non-negative, got {tolerance}"
            )));
        }
        Ok(TrainConfig {
            max_iterations: self
                .max_iterations
                .unwrap_or(TrainConfig::DEFAULT_MAX_ITERATIONS),
            tolerance,
        })
    }
}
