//! Row sources feed the rows of a working set to the training driver.

mod memory;

pub use memory::MemoryRowSource;

use crate::row::Row;

/// A pull cursor over the rows of a working set.
///
/// A source has a single cursor and is not reentrant. After [`RowSource::reset`]
/// the next [`RowSource::advance`] yields the first row again, and the order
/// of rows is the same for every sweep.
pub trait RowSource {
    /// The total number of rows `m`.
    fn rows(&self) -> usize;

    /// The feature dimension `n`, including the bias feature.
    fn cols(&self) -> usize;

    /// Rewinds the cursor to the first row.
    fn reset(&mut self);

    /// Moves to the next row and returns whether one is available.
    fn advance(&mut self) -> bool;

    /// The row under the cursor, if any.
    fn current(&self) -> Option<&Row>;

    fn current_label(&self) -> Option<f64> {
        self.current().map(Row::label)
    }

    fn current_features(&self) -> Option<&[f64]> {
        self.current().map(Row::features)
    }
}
