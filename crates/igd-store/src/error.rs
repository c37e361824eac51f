use std::sync::PoisonError;

use datafusion::arrow::error::ArrowError;
use datafusion::common::DataFusionError;
use igd_ml::error::MlError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error in DataFusion: {0}")]
    DataFusionError(#[from] DataFusionError),
    #[error("error in Arrow: {0}")]
    ArrowError(#[from] ArrowError),
    #[error("error in training: {0}")]
    MlError(#[from] MlError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        StoreError::InvalidArgument(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        StoreError::InternalError(message.into())
    }

    /// The training error behind this error, including errors raised inside
    /// aggregate callbacks during query execution.
    pub fn ml_error(&self) -> Option<&MlError> {
        match self {
            StoreError::MlError(e) => Some(e),
            StoreError::DataFusionError(e) => {
                let mut source: Option<&(dyn std::error::Error + 'static)> = Some(e);
                while let Some(error) = source {
                    if let Some(e) = error.downcast_ref::<MlError>() {
                        return Some(e);
                    }
                    source = error.source();
                }
                None
            }
            _ => None,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self.ml_error(), Some(MlError::InvalidInput(_)))
    }
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(error: PoisonError<T>) -> Self {
        StoreError::InternalError(error.to_string())
    }
}

/// Wraps a training error so that it can cross the DataFusion boundary.
pub(crate) fn to_datafusion_error(error: MlError) -> DataFusionError {
    DataFusionError::External(Box::new(error))
}
