use datafusion::arrow::array::{Array, Float64Array};
use datafusion::common::cast::as_float64_array;
use igd_ml::row::Row;
use igd_ml::source::RowSource;

use crate::error::{StoreError, StoreResult};
use crate::working_set::WorkingSet;

/// A row source over the working-set table of a session.
///
/// The table is read once when the source is opened, and every sweep replays
/// the row order fixed when the working set was built.
#[derive(Debug)]
pub struct StoreRowSource {
    /// The label and feature columns of each record batch.
    batches: Vec<Vec<Float64Array>>,
    rows: usize,
    cols: usize,
    batch: usize,
    offset: usize,
    current: Option<Row>,
}

impl StoreRowSource {
    pub async fn open(working_set: &WorkingSet) -> StoreResult<Self> {
        let ctx = working_set.ctx();
        let batches = ctx.table(working_set.name()).await?.collect().await?;
        let batches = batches
            .iter()
            .map(|batch| {
                if batch.num_columns() != working_set.columns().len() {
                    return Err(StoreError::internal(format!(
                        "working set {} has {} columns, expected {}",
                        working_set.name(),
                        batch.num_columns(),
                        working_set.columns().len()
                    )));
                }
                batch
                    .columns()
                    .iter()
                    .map(|array| Ok(as_float64_array(array)?.clone()))
                    .collect::<StoreResult<Vec<_>>>()
            })
            .collect::<StoreResult<Vec<_>>>()?;
        let rows = batches
            .iter()
            .map(|columns| columns.first().map(Array::len).unwrap_or_default())
            .sum();
        if rows != working_set.rows() {
            return Err(StoreError::internal(format!(
                "working set {} has {rows} rows, expected {}",
                working_set.name(),
                working_set.rows()
            )));
        }
        Ok(Self {
            batches,
            rows,
            cols: working_set.cols(),
            batch: 0,
            offset: 0,
            current: None,
        })
    }
}

impl RowSource for StoreRowSource {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn reset(&mut self) {
        self.batch = 0;
        self.offset = 0;
        self.current = None;
    }

    fn advance(&mut self) -> bool {
        while let Some(columns) = self.batches.get(self.batch) {
            let len = columns.first().map(Array::len).unwrap_or_default();
            if self.offset < len {
                let mut values = columns.iter().map(|c| c.value(self.offset));
                let label = values.next().unwrap_or(f64::NAN);
                self.current = Some(Row::new(label, values.collect()));
                self.offset += 1;
                return true;
            }
            self.batch += 1;
            self.offset = 0;
        }
        self.current = None;
        false
    }

    fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }
}
