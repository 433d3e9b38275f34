use recordmap::RecordError;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Error type for setting up and using a Linode session
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

pub type Result<T> = std::result::Result<T, Error>;
