//! Trained ML models.

use crate::error::{MlError, MlResult};
use crate::row::dot;

/// A trained linear regression model.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressionModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressionModel {
    /// Create a new trained model.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Create a model from a parameter vector whose first entry is the bias weight.
    pub fn try_from_theta(theta: &[f64]) -> MlResult<Self> {
        let [intercept, coefficients @ ..] = theta else {
            return Err(MlError::invalid("empty parameter vector"));
        };
        Ok(Self::new(coefficients.to_vec(), *intercept))
    }

    /// Get the model coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Get the model intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Get the number of features.
    pub fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict for a single sample.
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept + dot(&self.coefficients, features)
    }

    /// Predict for multiple samples.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Vec<f64> {
        features.iter().map(|f| self.predict(f)).collect()
    }
}
