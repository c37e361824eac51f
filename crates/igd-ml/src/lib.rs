//! Incremental gradient descent for linear regression.
//!
//! Rows are produced by a [`source::RowSource`] and folded into a
//! [`accumulator::GradientAccumulator`], which applies one parameter update
//! per pass over the data.

pub mod accumulator;
pub mod driver;
pub mod error;
pub mod estimator;
pub mod model;
pub mod row;
pub mod source;
pub mod working_set;
