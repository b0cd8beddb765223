use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    EmptyInput,
    RemoteRejection,
    Transport,
}

/// Failure talking to one of the site endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("remote rejected request with status {status}")]
    Rejected { status: u16, body: String },
    #[error("transport failure: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Rejected { .. } => FailureKind::RemoteRejection,
            Self::Transport(_) => FailureKind::Transport,
        }
    }
}
