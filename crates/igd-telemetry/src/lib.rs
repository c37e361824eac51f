pub mod error;
mod telemetry;

pub use telemetry::*;
