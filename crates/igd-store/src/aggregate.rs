//! The aggregate function through which DataFusion drives one training pass.

use std::any::Any;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use datafusion::arrow::array::{Array, ArrayRef};
use datafusion::arrow::datatypes::DataType;
use datafusion::common::cast::as_float64_array;
use datafusion::common::{DataFusionError, Result, ScalarValue};
use datafusion::logical_expr::function::AccumulatorArgs;
use datafusion::logical_expr::{Accumulator, AggregateUDFImpl, Signature, Volatility};
use igd_ml::accumulator::GradientAccumulator;
use igd_ml::error::MlError;
use igd_ml::row::Row;

use crate::error::to_datafusion_error;
use crate::working_set::numeric_array;

/// The gradient accumulator of a live training session.
/// The slot is emptied when the session is torn down.
pub type SharedAccumulator = Arc<Mutex<Option<Box<dyn GradientAccumulator>>>>;

/// An aggregate function whose evaluation is one training pass.
///
/// The arguments are the label followed by the features of a row. Every
/// row is consumed by the session accumulator as a side effect of the
/// aggregation, and the final evaluation finalizes the pass. The result is a
/// null placeholder.
#[derive(Debug)]
pub struct GradientAggregate {
    name: String,
    signature: Signature,
    accumulator: SharedAccumulator,
}

impl GradientAggregate {
    pub fn new(name: impl Into<String>, accumulator: SharedAccumulator) -> Self {
        Self {
            name: name.into(),
            signature: Signature::variadic_any(Volatility::Volatile),
            accumulator,
        }
    }
}

impl AggregateUDFImpl for GradientAggregate {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn return_type(&self, _arg_types: &[DataType]) -> Result<DataType> {
        Ok(DataType::Float64)
    }

    fn accumulator(&self, _acc_args: AccumulatorArgs) -> Result<Box<dyn Accumulator>> {
        Ok(Box::new(PassAccumulator::new(Arc::clone(
            &self.accumulator,
        ))))
    }
}

/// Forwards the rows of a pass to the session accumulator.
///
/// Partial aggregation states carry no data since every row has already
/// been consumed when the states are merged.
#[derive(Debug)]
struct PassAccumulator {
    accumulator: SharedAccumulator,
    rows: usize,
}

impl PassAccumulator {
    fn new(accumulator: SharedAccumulator) -> Self {
        Self {
            accumulator,
            rows: 0,
        }
    }

    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut dyn GradientAccumulator) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .accumulator
            .lock()
            .map_err(|e| DataFusionError::Internal(e.to_string()))?;
        match guard.as_mut() {
            Some(accumulator) => f(accumulator.as_mut()),
            None => Err(to_datafusion_error(MlError::session(
                "gradient aggregate invoked without a live training session",
            ))),
        }
    }
}

impl Accumulator for PassAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        let arrays = values
            .iter()
            .enumerate()
            .map(|(i, array)| numeric_array(&format!("argument {i}"), array))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(to_datafusion_error)?;
        let arrays = arrays
            .iter()
            .map(|a| as_float64_array(a))
            .collect::<Result<Vec<_>>>()?;
        let num_rows = arrays.first().map(|a| a.len()).unwrap_or_default();

        self.with_session(|accumulator| {
            let mut record = Vec::with_capacity(arrays.len());
            for i in 0..num_rows {
                record.clear();
                record.extend(arrays.iter().map(|a| a.value(i)));
                let row = Row::try_from_record(&record).map_err(to_datafusion_error)?;
                accumulator.consume(&row).map_err(to_datafusion_error)?;
            }
            Ok(())
        })?;
        self.rows += num_rows;
        Ok(())
    }

    fn evaluate(&mut self) -> Result<ScalarValue> {
        self.with_session(|accumulator| {
            accumulator.finalize_pass();
            Ok(())
        })?;
        Ok(ScalarValue::Float64(None))
    }

    fn size(&self) -> usize {
        size_of_val(self)
    }

    fn state(&mut self) -> Result<Vec<ScalarValue>> {
        Ok(vec![ScalarValue::Float64(None)])
    }

    fn merge_batch(&mut self, _states: &[ArrayRef]) -> Result<()> {
        Ok(())
    }
}
