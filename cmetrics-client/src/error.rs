use cmetrics_core::error::{ConversionError, NegotiationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    /// The discovery collaborator failed; its error is passed through as-is.
    #[error(transparent)]
    Discovery(anyhow::Error),
    /// Discovery succeeded but the server does not serve the group.
    #[error("no {group} API registered")]
    GroupNotRegistered { group: String },
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl VersionError {
    /// Whether repeating the call unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Discovery(_))
    }
}
