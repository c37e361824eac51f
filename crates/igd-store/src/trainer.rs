use datafusion::prelude::SessionContext;
use igd_common::config::{AppConfig, PassModeKind};
use igd_ml::accumulator::GradientAccumulator;
use igd_ml::driver::{run_session, SessionState, TrainingOptions, TrainingOutcome};
use log::{debug, info};

use crate::error::StoreResult;
use crate::registration::AggregateRegistration;
use crate::session::SessionNames;
use crate::source::StoreRowSource;
use crate::working_set::{TrainingTarget, WorkingSet, WorkingSetOptions};

/// How a pass visits the rows of the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    /// Each pass evaluates one aggregate query over the working set.
    Aggregate,
    /// Each pass sweeps a cursor over the working set.
    Cursor,
}

impl From<PassModeKind> for PassMode {
    fn from(value: PassModeKind) -> Self {
        match value {
            PassModeKind::Aggregate => PassMode::Aggregate,
            PassModeKind::Cursor => PassMode::Cursor,
        }
    }
}

/// Runs training sessions against tables of a session context.
pub struct StoreTrainer {
    ctx: SessionContext,
    options: TrainingOptions,
    pass_mode: PassMode,
    bias_column: String,
}

impl StoreTrainer {
    pub fn new(ctx: SessionContext, options: TrainingOptions) -> Self {
        Self {
            ctx,
            options,
            pass_mode: PassMode::Aggregate,
            bias_column: "intercept".to_string(),
        }
    }

    pub fn from_config(ctx: SessionContext, config: &AppConfig) -> Self {
        Self::new(ctx, TrainingOptions::from_config(&config.training))
            .with_pass_mode(config.store.pass_mode.into())
            .with_bias_column(config.store.bias_column.clone())
    }

    pub fn with_pass_mode(mut self, pass_mode: PassMode) -> Self {
        self.pass_mode = pass_mode;
        self
    }

    pub fn with_bias_column(mut self, bias_column: impl Into<String>) -> Self {
        self.bias_column = bias_column.into();
        self
    }

    pub async fn train(&self, target: &TrainingTarget) -> StoreResult<TrainingOutcome> {
        self.train_with_names(target, SessionNames::generate())
            .await
    }

    /// Trains a model with the given names for the session objects.
    ///
    /// The working set and the aggregate function exist only while the
    /// session runs, whether it succeeds or fails.
    pub async fn train_with_names(
        &self,
        target: &TrainingTarget,
        names: SessionNames,
    ) -> StoreResult<TrainingOutcome> {
        info!(
            "{} session {} on {} with {:?} passes",
            SessionState::Building,
            names.root,
            target.table,
            self.pass_mode
        );
        let options = WorkingSetOptions {
            bias_column: self.bias_column.clone(),
            seed: self.options.seed,
        };
        let working_set = WorkingSet::create(&self.ctx, &names.working_set, target, &options).await?;
        let outcome = self.run(&working_set, &names).await;
        drop(working_set);
        info!("{} session {}", SessionState::TornDown, names.root);
        outcome
    }

    async fn run(
        &self,
        working_set: &WorkingSet,
        names: &SessionNames,
    ) -> StoreResult<TrainingOutcome> {
        let accumulator = self
            .options
            .create_accumulator(working_set.rows(), working_set.cols())?;
        let outcome = match self.pass_mode {
            PassMode::Aggregate => {
                self.run_aggregate(working_set, &names.aggregate, accumulator)
                    .await?
            }
            PassMode::Cursor => self.run_cursor(working_set, accumulator).await?,
        };
        info!(
            "{} session {}: {} passes, theta={:?}",
            SessionState::Done,
            names.root,
            outcome.passes,
            outcome.theta
        );
        Ok(outcome)
    }

    async fn run_aggregate(
        &self,
        working_set: &WorkingSet,
        name: &str,
        accumulator: Box<dyn GradientAccumulator>,
    ) -> StoreResult<TrainingOutcome> {
        let registration = AggregateRegistration::register(&self.ctx, name, accumulator);
        let sql = working_set.aggregate_sql(registration.name());
        debug!("pass query: {sql}");
        let pass = self.ctx.sql(&sql).await?;
        while !registration.is_done()? {
            let index = registration.inspect(|a| a.passes())?;
            registration.run_pass(pass.clone()).await?;
            debug!(
                "{}: theta={:?}",
                SessionState::Passing(index),
                registration.inspect(|a| a.theta().to_vec())?
            );
        }
        let accumulator = registration.release()?;
        Ok(TrainingOutcome::from_accumulator(accumulator.as_ref()))
    }

    async fn run_cursor(
        &self,
        working_set: &WorkingSet,
        mut accumulator: Box<dyn GradientAccumulator>,
    ) -> StoreResult<TrainingOutcome> {
        let mut source = StoreRowSource::open(working_set).await?;
        run_session(&mut source, accumulator.as_mut())?;
        Ok(TrainingOutcome::from_accumulator(accumulator.as_ref()))
    }
}
