//! The training driver runs passes over a row source until the accumulator
//! reaches its pass limit.

use std::fmt;

use igd_common::config::TrainingConfig;
use log::{debug, info};

use crate::accumulator::{GradientAccumulator, GradientParams, Strategy};
use crate::error::{MlError, MlResult};
use crate::source::RowSource;

/// The lifecycle of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Building,
    /// Running the pass with the given zero-based index.
    Passing(usize),
    Done,
    TornDown,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Building => write!(f, "building"),
            SessionState::Passing(pass) => write!(f, "passing({pass})"),
            SessionState::Done => write!(f, "done"),
            SessionState::TornDown => write!(f, "torn down"),
        }
    }
}

/// Host-supplied parameters of a training session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    pub learning_rate: f64,
    pub max_passes: usize,
    pub strategy: Strategy,
    /// Seeds every random decision made in the session.
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            max_passes: 1500,
            strategy: Strategy::FullBatch,
            seed: 42,
        }
    }
}

impl TrainingOptions {
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            max_passes: config.max_passes,
            strategy: Strategy::from_config(config),
            seed: config.seed,
        }
    }

    pub fn params(&self, rows: usize, cols: usize) -> GradientParams {
        GradientParams {
            rows,
            cols,
            learning_rate: self.learning_rate,
            max_passes: self.max_passes,
        }
    }

    pub fn create_accumulator(
        &self,
        rows: usize,
        cols: usize,
    ) -> MlResult<Box<dyn GradientAccumulator>> {
        self.strategy
            .create_accumulator(self.params(rows, cols), self.seed)
    }
}

/// The parameters learned by a training session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    /// The parameter vector, with the bias weight at index 0.
    pub theta: Vec<f64>,
    pub passes: usize,
}

impl TrainingOutcome {
    pub fn from_accumulator<A: GradientAccumulator + ?Sized>(accumulator: &A) -> Self {
        Self {
            theta: accumulator.theta().to_vec(),
            passes: accumulator.passes(),
        }
    }
}

/// Feeds every row of the source to the accumulator, then finalizes the pass.
/// Returns the number of rows consumed.
///
/// On error the pass is abandoned before it is finalized.
pub fn run_pass<S, A>(source: &mut S, accumulator: &mut A) -> MlResult<usize>
where
    S: RowSource + ?Sized,
    A: GradientAccumulator + ?Sized,
{
    source.reset();
    let mut count = 0;
    while source.advance() {
        let row = source
            .current()
            .ok_or_else(|| MlError::session("row source advanced without a current row"))?;
        accumulator.consume(row)?;
        count += 1;
    }
    accumulator.finalize_pass();
    Ok(count)
}

/// Runs passes until the accumulator is done.
pub fn run_session<S, A>(source: &mut S, accumulator: &mut A) -> MlResult<()>
where
    S: RowSource + ?Sized,
    A: GradientAccumulator + ?Sized,
{
    while !accumulator.is_done() {
        let pass = accumulator.passes();
        let count = run_pass(source, accumulator)?;
        debug!(
            "{}: consumed {count} rows, theta={:?}",
            SessionState::Passing(pass),
            accumulator.theta()
        );
    }
    Ok(())
}

/// Trains on a row source with a fresh accumulator.
pub fn fit_source<S>(source: &mut S, options: &TrainingOptions) -> MlResult<TrainingOutcome>
where
    S: RowSource + ?Sized,
{
    debug!("{}: {} rows, {} columns", SessionState::Building, source.rows(), source.cols());
    let mut accumulator = options.create_accumulator(source.rows(), source.cols())?;
    run_session(source, accumulator.as_mut())?;
    let outcome = TrainingOutcome::from_accumulator(accumulator.as_ref());
    info!(
        "{}: {} passes, theta={:?}",
        SessionState::Done,
        outcome.passes,
        outcome.theta
    );
    Ok(outcome)
}
