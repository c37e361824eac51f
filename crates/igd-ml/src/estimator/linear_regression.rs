//! Linear Regression estimator.

use log::info;

use crate::accumulator::Strategy;
use crate::driver::{fit_source, TrainingOptions};
use crate::error::MlResult;
use crate::model::LinearRegressionModel;
use crate::source::MemoryRowSource;

/// Linear Regression estimator trained with incremental gradient descent
/// over an in-memory working set.
///
/// # Example
///
/// ```ignore
/// let lr = LinearRegression::new()
///     .with_learning_rate(0.01)
///     .with_max_passes(1500);
///
/// let model = lr.fit(&features, &labels)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    options: TrainingOptions,
}

impl LinearRegression {
    /// Create a new LinearRegression estimator with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TrainingOptions) -> Self {
        Self { options }
    }

    /// Set the accumulation strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    /// Set the number of passes over the data.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.options.max_passes = max_passes;
        self
    }

    /// Set the learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.options.learning_rate = learning_rate;
        self
    }

    /// Set the seed for sampling decisions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.seed = seed;
        self
    }

    /// Train the model on the given data.
    pub fn fit(&self, features: &[Vec<f64>], labels: &[f64]) -> MlResult<LinearRegressionModel> {
        info!("Using {:?} accumulation", self.options.strategy);
        let mut source = MemoryRowSource::from_columns(labels, features)?;
        let outcome = fit_source(&mut source, &self.options)?;
        LinearRegressionModel::try_from_theta(&outcome.theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MlError;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_fit_simple() {
        // y = 1*x1 + 2*x2 + 0.5
        let features = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ];
        let labels = vec![1.5, 2.5, 3.5, 0.5];

        let model = LinearRegression::new()
            .with_learning_rate(0.5)
            .with_max_passes(5000)
            .fit(&features, &labels)
            .unwrap();

        assert!((model.intercept() - 0.5).abs() < 1e-6);
        assert!((model.coefficients()[0] - 1.0).abs() < 1e-6);
        assert!((model.coefficients()[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_mismatched_input() {
        let result = LinearRegression::new().fit(&[vec![1.0]], &[1.0, 2.0]);
        assert!(matches!(result, Err(MlError::DimensionMismatch(_))));
    }
}
