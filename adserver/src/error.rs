use thiserror::Error;

use primitives::{CampaignId, DomainError};

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    /// The durable store was unreachable or rejected a write.
    /// The serving path turns this into "no ad" where it can; writes
    /// after a winner was chosen propagate it instead.
    #[error("campaign store: {0}")]
    StoreUnavailable(StoreError),
    /// Unknown campaign id on click-through or an admin operation.
    #[error("campaign {0} was not found")]
    NotFound(CampaignId),
    /// Rejected before any mutation took place.
    #[error("invalid budget: {0}")]
    InvalidBudget(String),
    #[error("configuration: {0}")]
    Configuration(String),
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Error::NotFound(id),
            other => Error::StoreUnavailable(other),
        }
    }
}

impl From<DomainError> for Error {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidArgument(message) => Error::InvalidBudget(message),
            DomainError::RuleViolation(message) => Error::Configuration(message),
        }
    }
}
