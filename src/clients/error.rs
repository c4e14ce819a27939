use crate::lending::{kind_of, ErrorKind};
use ledger_framework::Response;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The ledger answered with a non-success status.
    #[error("Rejected ({status}): {message}")]
    Rejected {
        status: u16,
        kind: Option<ErrorKind>,
        message: String,
    },
    #[error("Unexpected response payload: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Decode(_) => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Rejected { kind, .. } => *kind,
            ClientError::Decode(_) => None,
        }
    }
}

impl From<Response> for ClientError {
    fn from(response: Response) -> Self {
        ClientError::Rejected {
            status: response.status,
            kind: kind_of(&response),
            message: response.message,
        }
    }
}
