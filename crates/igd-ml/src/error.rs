use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("session state error: {0}")]
    SessionState(String),
}

impl MlError {
    pub fn input(message: impl Into<String>) -> Self {
        MlError::InvalidInput(message.into())
    }

    pub fn dimension(message: impl Into<String>) -> Self {
        MlError::DimensionMismatch(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        MlError::InvalidArgument(message.into())
    }

    pub fn session(message: impl Into<String>) -> Self {
        MlError::SessionState(message.into())
    }
}
