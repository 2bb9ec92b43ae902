//! Client agent errors

use thiserror::Error;

use crate::shared::{ConfigError, SharedError};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The relay could not be reached or refused the upgrade
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error(transparent)]
    Shared(#[from] SharedError),

    #[error("A user id is required to connect")]
    MissingIdentity,
}
