#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

use thiserror::Error;

pub mod audit;
pub mod budget;
pub mod campaign;
pub mod config;
pub mod statistics;
pub mod targeting;
pub mod unified_num;
pub mod util {
    pub mod logging;
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use self::audit::{ActionType, AuditEntry};
pub use self::budget::{Budget, BudgetDraft, BudgetKind};
pub use self::campaign::{Campaign, CampaignId, CreateCampaign, ModifyCampaign, Settings};
pub use self::config::Config;
pub use self::statistics::{EventKind, EventStats, Statistics};
pub use self::targeting::{FilterCall, Input};
pub use self::unified_num::UnifiedNum;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("rule violation: {0}")]
    RuleViolation(String),
}
