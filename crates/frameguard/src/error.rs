//! Error types

use frameguard_dom::DomError;
use frameguard_html::ParseError;
use frameguard_realm::{RealmId, TypeError};

use crate::messages::{ErrorKind, format_message};

/// A denied mutation. The message is exactly `format_message(kind)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GuardError {
    pub kind: ErrorKind,
    pub message: String,
}

impl GuardError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: format_message(kind),
        }
    }
}

impl From<ErrorKind> for GuardError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Failure of a guarded entry point
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error(transparent)]
    Blocked(#[from] GuardError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Unknown realm {0:?}")]
    UnknownRealm(RealmId),
}

impl MutationError {
    /// The denial, if the guard rejected the mutation
    pub fn as_blocked(&self) -> Option<&GuardError> {
        match self {
            MutationError::Blocked(err) => Some(err),
            _ => None,
        }
    }
}
