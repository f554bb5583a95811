use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Every failure the client can surface to the user.
///
/// `Transport` and `Rejected` come from the gateway, `MalformedPayload` from
/// normalizing a response, `InvalidState` from calling a session operation
/// that is not legal in the current view.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server rejected request ({code}): {message}")]
    Rejected { code: u16, message: String },
    #[error("malformed response: {0}")]
    MalformedPayload(String),
    #[error("not allowed right now: {0}")]
    InvalidState(String),
}

impl ClientError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ClientError::InvalidState(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ClientError::MalformedPayload(message.into())
    }

    /// True when the remote authority could not be reached or refused the call.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::Rejected { .. }
        )
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedPayload(err.to_string())
    }
}
