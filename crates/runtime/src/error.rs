//! Unified error type surfaced by the raid runtime.
//!
//! Wraps rejections from the domain rules, store failures, and execution-time
//! faults so callers can decide between surfacing and retrying.
use std::fmt;

use raid_core::{ConfigError, DomainError, ErrorSeverity, LifecycleError, Rejection};
use thiserror::Error;

pub use crate::repository::StoreError;

pub type Result<T> = std::result::Result<T, RaidError>;

#[derive(Debug, Error)]
pub enum RaidError {
    /// Precondition failure; never retried automatically.
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("{0} not found")]
    NotFound(NotFoundKind),

    /// Another transaction committed first. Nothing was written; the whole
    /// operation may be retried from validation.
    #[error("transaction aborted by a concurrent commit")]
    TransactionAborted,

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("invalid raid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Fault while resolving a scheduled raid. The attempt stays `scheduled`.
    #[error("raid execution failed: {0}")]
    Execution(String),
}

impl RaidError {
    /// Whether repeating the same request may succeed without changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionAborted | Self::Execution(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<StoreError> for RaidError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict => Self::TransactionAborted,
            other => Self::Store(other),
        }
    }
}

impl DomainError for RaidError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Rejected(rejection) => rejection.severity(),
            Self::NotFound(_) => ErrorSeverity::Validation,
            Self::TransactionAborted | Self::Execution(_) => ErrorSeverity::Recoverable,
            Self::Store(_) | Self::Lifecycle(_) => ErrorSeverity::Internal,
            Self::InvalidConfig(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(rejection) => rejection.error_code(),
            Self::NotFound(_) => "RAID_NOT_FOUND",
            Self::TransactionAborted => "RAID_TRANSACTION_ABORTED",
            Self::Store(_) => "RAID_STORE_ERROR",
            Self::Lifecycle(error) => error.error_code(),
            Self::InvalidConfig(_) => "RAID_INVALID_CONFIG",
            Self::Execution(_) => "RAID_EXECUTION_FAILED",
        }
    }
}

/// Entity a lookup failed to find.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NotFoundKind {
    Raid,
    Target,
    Faction,
    Character,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotFoundKind::Raid => "raid",
            NotFoundKind::Target => "target",
            NotFoundKind::Faction => "faction",
            NotFoundKind::Character => "character",
        };
        write!(f, "{}", label)
    }
}
