use crate::error::{MlError, MlResult};
use crate::row::Row;
use crate::source::RowSource;
use crate::working_set::build_rows;

/// A row source over rows held in memory, in their natural order.
#[derive(Debug, Clone)]
pub struct MemoryRowSource {
    rows: Vec<Row>,
    cols: usize,
    /// The number of rows handed out since the last reset.
    position: usize,
}

impl MemoryRowSource {
    /// Creates a source from rows that already carry the bias feature.
    pub fn try_new(rows: Vec<Row>) -> MlResult<Self> {
        let cols = rows.first().map(Row::len).unwrap_or_default();
        if let Some(i) = rows.iter().position(|row| row.len() != cols) {
            return Err(MlError::dimension(format!(
                "row {i} has {} features, expected {cols}",
                rows[i].len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            position: 0,
        })
    }

    /// Creates a source from a label column and raw feature rows,
    /// adding the bias feature to every row.
    pub fn from_columns(labels: &[f64], features: &[Vec<f64>]) -> MlResult<Self> {
        Self::try_new(build_rows(labels, features)?)
    }
}

impl RowSource for MemoryRowSource {
    fn rows(&self) -> usize {
        self.rows.len()
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn reset(&mut self) {
        self.position = 0;
    }

    fn advance(&mut self) -> bool {
        if self.position < self.rows.len() {
            self.position += 1;
            true
        } else {
            // past the end, so that `current()` reports no row
            self.position = self.rows.len() + 1;
            false
        }
    }

    fn current(&self) -> Option<&Row> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.rows.get(index))
    }
}
