use crate::coordinator::RequestToken;
use crate::core::ResultPayload;
use crate::utils::{ClientError, ErrorKind};

/// The externally visible state of a coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationResult {
    /// No evaluation since the last image change or reset
    #[default]
    Idle,
    /// Waiting on the backend for this token
    Pending(RequestToken),
    Success(RequestToken, ResultPayload),
    Failed(RequestToken, ClientError),
}

impl OperationResult {
    /// Token of the evaluation this state belongs to, if any
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Self::Idle => None,
            Self::Pending(token) | Self::Success(token, _) | Self::Failed(token, _) => Some(*token),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn payload(&self) -> Option<&ResultPayload> {
        match self {
            Self::Success(_, payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed(_, err) => Some(err.kind()),
            _ => None,
        }
    }
}
