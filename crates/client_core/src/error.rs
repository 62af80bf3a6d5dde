use shared::domain::BandId;
use thiserror::Error;

/// Message shown when a failed update carries no server-provided reason.
pub const GENERIC_UPDATE_FAILURE: &str = "Failed to update band";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("band {0} not found")]
    NotFound(BandId),
    #[error("failed to fetch band: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("failed to reach band api: {0}")]
    Transport(String),
    #[error("band api rejected update with status {status}: {}", reason_or_generic(.reason))]
    Rejected { status: u16, reason: Option<String> },
}

fn reason_or_generic(reason: &Option<String>) -> &str {
    reason.as_deref().unwrap_or(GENERIC_UPDATE_FAILURE)
}

impl SubmitError {
    /// Text for the form-level status banner.
    pub fn banner_message(&self) -> String {
        match self {
            SubmitError::Rejected { reason, .. } => reason_or_generic(reason).to_string(),
            SubmitError::Transport(_) => GENERIC_UPDATE_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid band api url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("band api url '{0}' cannot be used as a base url")]
    NotABase(String),
}
