use datafusion::prelude::{SessionConfig, SessionContext};
use igd_common::config::StoreConfig;
use uuid::Uuid;

/// Creates the session context that hosts source tables and working sets.
///
/// Queries run on a single partition so that the rows of a working set reach
/// the aggregate callbacks as one ordered stream.
pub fn create_session_context(config: &StoreConfig) -> SessionContext {
    let session_config = SessionConfig::new()
        .with_target_partitions(1)
        .with_batch_size(config.batch_size);
    SessionContext::new_with_config(session_config)
}

/// Names of the objects a training session registers in the session context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNames {
    pub root: String,
    pub working_set: String,
    pub aggregate: String,
}

impl SessionNames {
    pub fn generate() -> Self {
        Self::new(format!("igd_{}", Uuid::new_v4().simple()))
    }

    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            working_set: format!("{root}_calculate"),
            aggregate: format!("{root}_aggregate"),
            root,
        }
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
