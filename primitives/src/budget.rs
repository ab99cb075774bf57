use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::{statistics::EventKind, unified_num::UnifiedNum, DomainError};

/// CPM pricing: `cost` covers one thousand billed events.
pub const EVENTS_PER_COST: u64 = 1_000;

/// Which event kind debits a campaign's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, FromStr)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum BudgetKind {
    Click,
    View,
    /// The campaign is never charged.
    None,
}

impl BudgetKind {
    pub fn bills(self, event: EventKind) -> bool {
        matches!(
            (self, event),
            (BudgetKind::Click, EventKind::Click) | (BudgetKind::View, EventKind::View)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The spend ceiling.
    pub total: UnifiedNum,
    /// Cumulative spend. Monotonically non-decreasing except on an explicit
    /// reset; never clamped to `total` - an event already served is billed
    /// even when it pushes the campaign over.
    #[serde(default)]
    pub used: UnifiedNum,
    #[serde(rename = "type")]
    pub kind: BudgetKind,
    /// Price per one thousand billed events.
    pub cost: UnifiedNum,
}

impl Budget {
    /// A campaign is available while `total >= used`.
    /// `total == used` is exactly the boundary and still available.
    pub fn is_available(&self) -> bool {
        self.total >= self.used
    }

    /// The amount a single billed event debits.
    pub fn event_cost(&self) -> UnifiedNum {
        self.cost.div_floor(EVENTS_PER_COST)
    }
}

/// Operator-facing budget figures, validated before they become a [`Budget`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDraft {
    pub total: f64,
    #[serde(rename = "type")]
    pub kind: BudgetKind,
    pub cost: f64,
}

impl BudgetDraft {
    pub fn try_into_budget(self) -> Result<Budget, DomainError> {
        let total = UnifiedNum::from_float(self.total)
            .map_err(|error| DomainError::InvalidArgument(format!("budget.total: {error}")))?;
        let cost = UnifiedNum::from_float(self.cost)
            .map_err(|error| DomainError::InvalidArgument(format!("budget.cost: {error}")))?;

        Ok(Budget {
            total,
            used: UnifiedNum::ZERO,
            kind: self.kind,
            cost,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn availability_holds_on_the_boundary() {
        let mut budget = Budget {
            total: UnifiedNum::from_whole(100),
            used: UnifiedNum::ZERO,
            kind: BudgetKind::View,
            cost: UnifiedNum::from_whole(250),
        };
        assert!(budget.is_available());

        budget.used = budget.total;
        assert!(budget.is_available(), "total == used is still available");

        budget.used = budget
            .total
            .checked_add(UnifiedNum::from_u64(1))
            .expect("Should add");
        assert!(!budget.is_available());
    }

    #[test]
    fn bills_matches_kinds() {
        assert!(BudgetKind::View.bills(EventKind::View));
        assert!(BudgetKind::Click.bills(EventKind::Click));
        assert!(!BudgetKind::View.bills(EventKind::Click));
        assert!(!BudgetKind::Click.bills(EventKind::View));
        assert!(!BudgetKind::None.bills(EventKind::View));
        assert!(!BudgetKind::None.bills(EventKind::Click));
    }

    #[test]
    fn draft_rejects_negative_figures() {
        let draft = BudgetDraft {
            total: -10.0,
            kind: BudgetKind::View,
            cost: 250.0,
        };

        let error = draft
            .try_into_budget()
            .expect_err("Negative total should be rejected");
        assert!(matches!(error, DomainError::InvalidArgument(_)));

        let budget = BudgetDraft {
            total: 1_000.0,
            kind: BudgetKind::View,
            cost: 250.0,
        }
        .try_into_budget()
        .expect("Valid draft should convert");

        assert_eq!(UnifiedNum::from_whole(1_000), budget.total);
        assert_eq!(UnifiedNum::ZERO, budget.used);
        assert_eq!(UnifiedNum::from_u64(25_000_000), budget.event_cost());
    }
}
