use std::sync::{Arc, Mutex};

use datafusion::logical_expr::AggregateUDF;
use datafusion::prelude::{DataFrame, SessionContext};
use igd_ml::accumulator::GradientAccumulator;
use igd_ml::error::MlError;
use log::debug;

use crate::aggregate::{GradientAggregate, SharedAccumulator};
use crate::error::{StoreError, StoreResult};

/// A gradient aggregate registered in a session context for the lifetime of
/// a training session.
///
/// Dropping the registration deregisters the function and detaches the
/// accumulator, so that plans still holding the function fail instead of
/// updating a finished session.
pub struct AggregateRegistration {
    ctx: SessionContext,
    name: String,
    accumulator: SharedAccumulator,
}

impl AggregateRegistration {
    pub fn register(
        ctx: &SessionContext,
        name: impl Into<String>,
        accumulator: Box<dyn GradientAccumulator>,
    ) -> Self {
        let name = name.into();
        let accumulator: SharedAccumulator = Arc::new(Mutex::new(Some(accumulator)));
        let function = GradientAggregate::new(name.clone(), Arc::clone(&accumulator));
        ctx.register_udaf(AggregateUDF::new_from_impl(function));
        debug!("registered gradient aggregate {name}");
        Self {
            ctx: ctx.clone(),
            name,
            accumulator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the state of the session accumulator.
    pub fn inspect<T>(&self, f: impl FnOnce(&dyn GradientAccumulator) -> T) -> StoreResult<T> {
        let guard = self.accumulator.lock()?;
        match guard.as_ref() {
            Some(accumulator) => Ok(f(accumulator.as_ref())),
            None => Err(MlError::session("the gradient accumulator has been released").into()),
        }
    }

    pub fn is_done(&self) -> StoreResult<bool> {
        self.inspect(|accumulator| accumulator.is_done())
    }

    /// Executes one pass query and checks that it finalized exactly one pass.
    pub async fn run_pass(&self, pass: DataFrame) -> StoreResult<()> {
        let before = self.inspect(|accumulator| accumulator.passes())?;
        // the result is a placeholder
        pass.collect().await?;
        let after = self.inspect(|accumulator| accumulator.passes())?;
        if after != before + 1 {
            return Err(StoreError::internal(format!(
                "pass query on {} finalized {} passes instead of one",
                self.name,
                after.saturating_sub(before)
            )));
        }
        Ok(())
    }

    /// Deregisters the function and returns the session accumulator.
    pub fn release(self) -> StoreResult<Box<dyn GradientAccumulator>> {
        let accumulator = self.accumulator.lock()?.take();
        accumulator
            .ok_or_else(|| MlError::session("the gradient accumulator has been released").into())
    }
}

impl Drop for AggregateRegistration {
    fn drop(&mut self) {
        self.ctx.deregister_udaf(&self.name);
        if let Ok(mut accumulator) = self.accumulator.lock() {
            accumulator.take();
        }
        debug!("deregistered gradient aggregate {}", self.name);
    }
}
