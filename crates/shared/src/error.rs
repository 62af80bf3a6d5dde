use serde::{Deserialize, Serialize};

/// Body the band API attaches to non-success responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    /// Parses a failure body, tolerating empty or non-JSON payloads.
    pub fn from_slice(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// The server-provided reason, if it carried a non-empty one.
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }
}
