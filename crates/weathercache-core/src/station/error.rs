use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum StationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Invalid override: {0}")]
    InvalidOverride(String),

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}
