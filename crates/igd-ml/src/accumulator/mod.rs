//! Gradient accumulators.
//!
//! An accumulator folds the rows of one pass into pass-scoped state and
//! applies a single update to the parameter vector `theta` when the pass is
//! finalized. For a row `(y, x)` the squared-error gradient contribution is
//!
//! ```text
//! (alpha / m) * x * (x · theta - y)
//! ```
//!
//! where `alpha` is the learning rate and `m` the number of rows in the
//! working set.

mod full_batch;
mod reservoir;

use std::fmt::Debug;

pub use full_batch::FullBatchAccumulator;
use igd_common::config::{StrategyKind, TrainingConfig};
pub use reservoir::ReservoirAccumulator;

use crate::error::{MlError, MlResult};
use crate::row::{dot, Row};

/// A stateful per-pass gradient aggregator.
pub trait GradientAccumulator: Debug + Send {
    /// Folds one row into the current pass. Never changes `theta`.
    fn consume(&mut self, row: &Row) -> MlResult<()>;

    /// Applies the contribution of the current pass to `theta` and starts a new pass.
    fn finalize_pass(&mut self);

    /// The number of finalized passes.
    fn passes(&self) -> usize;

    fn max_passes(&self) -> usize;

    fn theta(&self) -> &[f64];

    /// Whether the pass limit has been reached. Once true, stays true.
    fn is_done(&self) -> bool {
        self.passes() >= self.max_passes()
    }
}

/// Session constants shared by all accumulation strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientParams {
    /// The number of rows `m` in the working set.
    pub rows: usize,
    /// The feature dimension `n`, including the bias feature.
    pub cols: usize,
    pub learning_rate: f64,
    pub max_passes: usize,
}

impl GradientParams {
    pub fn validate(&self) -> MlResult<()> {
        if self.rows == 0 {
            return Err(MlError::invalid("the working set is empty"));
        }
        if self.cols == 0 {
            return Err(MlError::invalid("the feature dimension must be positive"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(MlError::invalid(format!(
                "learning rate must be a positive number: {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// The factor `alpha / m` applied to every row contribution.
    pub fn scale(&self) -> f64 {
        self.learning_rate / self.rows as f64
    }

    pub(crate) fn check_row(&self, row: &Row) -> MlResult<()> {
        if row.len() != self.cols {
            return Err(MlError::dimension(format!(
                "row has {} features, expected {}",
                row.len(),
                self.cols
            )));
        }
        row.validate()
    }
}

/// Adds the scaled gradient contribution of `row` to `s`.
pub(crate) fn add_gradient(s: &mut [f64], theta: &[f64], row: &Row, scale: f64) {
    let x = row.features();
    let error = dot(x, theta) - row.label();
    for (sj, xj) in s.iter_mut().zip(x.iter()) {
        *sj += scale * xj * error;
    }
}

/// The accumulation strategy of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Accumulate every row of the pass.
    FullBatch,
    /// Accumulate a uniform sample of at most `capacity` rows per pass.
    Reservoir { capacity: usize },
}

impl Strategy {
    pub fn from_config(config: &TrainingConfig) -> Self {
        match config.strategy {
            StrategyKind::FullBatch => Strategy::FullBatch,
            StrategyKind::Reservoir => Strategy::Reservoir {
                capacity: config.reservoir_size,
            },
        }
    }

    /// Creates an accumulator for one session.
    /// The seed drives all sampling decisions of the accumulator.
    pub fn create_accumulator(
        &self,
        params: GradientParams,
        seed: u64,
    ) -> MlResult<Box<dyn GradientAccumulator>> {
        match *self {
            Strategy::FullBatch => Ok(Box::new(FullBatchAccumulator::try_new(params)?)),
            Strategy::Reservoir { capacity } => Ok(Box::new(ReservoirAccumulator::seeded(
                params, capacity, seed,
            )?)),
        }
    }
}
