//! Error types raised by store implementations.

use raid_core::FactionId;
use thiserror::Error;

/// Errors surfaced by store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Optimistic commit lost against a concurrent transaction.
    #[error("transaction conflicted with a concurrent commit")]
    Conflict,

    #[error("store lock was poisoned")]
    LockPoisoned,

    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: u64 },

    #[error("{faction} cannot cover {requested} (balance {available})")]
    InsufficientBalance {
        faction: FactionId,
        requested: u64,
        available: u64,
    },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn missing(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::Missing {
            entity,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
