//! Training sessions backed by a DataFusion session context.
//!
//! The working set of a session is registered as an in-memory table, and a
//! pass is either one evaluation of a registered aggregate function whose
//! per-row and terminal callbacks drive the gradient accumulator, or one
//! sweep of a cursor over the working-set table.

pub mod aggregate;
pub mod error;
pub mod registration;
pub mod session;
pub mod source;
pub mod trainer;
pub mod working_set;
