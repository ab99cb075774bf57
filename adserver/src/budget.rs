use primitives::{Campaign, EventKind};

use crate::{error::Error, store::Store};

/// Tracks per-campaign spend and decides budget eligibility.
#[derive(Clone)]
pub struct BudgetAccountant {
    store: Store,
}

impl BudgetAccountant {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// `total >= used`; checked before serving, not after.
    pub fn is_available(campaign: &Campaign) -> bool {
        campaign.budget.is_available()
    }

    /// Debits one billed event of the given kind.
    ///
    /// A no-op when the campaign's budget is not billed by `event` - the
    /// campaign is returned unchanged. Otherwise `used` is raised by
    /// `cost / 1000` atomically against the stored value. `used` is never
    /// clamped to `total`: an event already served is already billed.
    pub async fn debit(&self, campaign: &Campaign, event: EventKind) -> Result<Campaign, Error> {
        if !campaign.budget.kind.bills(event) {
            return Ok(campaign.clone());
        }

        let amount = campaign.budget.event_cost();

        self.store
            .add_spent(campaign.id, amount)
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use primitives::{
        config::DEVELOPMENT_CONFIG, test_util::dummy_campaign, util::logging::new_logger,
        BudgetKind, UnifiedNum,
    };

    use crate::store::MemoryStore;

    use super::*;

    async fn accountant_with(campaign: Campaign) -> (BudgetAccountant, Campaign) {
        let store = Store::new(
            Arc::new(MemoryStore::default()),
            &DEVELOPMENT_CONFIG,
            new_logger("budget-test"),
        );
        let created = store.insert(campaign).await.expect("Should insert");

        (BudgetAccountant::new(store), created)
    }

    #[tokio::test]
    async fn debit_is_a_no_op_on_a_kind_mismatch() {
        let (accountant, campaign) =
            accountant_with(dummy_campaign("Clicky", 1_000, BudgetKind::Click, 250)).await;

        let after = accountant
            .debit(&campaign, EventKind::View)
            .await
            .expect("Debit should succeed");

        assert_eq!(campaign, after);
        assert_eq!(UnifiedNum::ZERO, after.budget.used);
    }

    #[tokio::test]
    async fn debit_raises_used_by_exactly_one_per_mille_of_cost() {
        let (accountant, campaign) =
            accountant_with(dummy_campaign("Viewable", 1_000, BudgetKind::View, 250)).await;

        let after = accountant
            .debit(&campaign, EventKind::View)
            .await
            .expect("Debit should succeed");

        // 250 per mille = 0.25 per view
        assert_eq!(UnifiedNum::from_u64(25_000_000), after.budget.used);

        let again = accountant
            .debit(&after, EventKind::View)
            .await
            .expect("Debit should succeed");
        assert_eq!(UnifiedNum::from_u64(50_000_000), again.budget.used);
    }

    #[tokio::test]
    async fn never_billed_campaigns_stay_available() {
        let (accountant, campaign) =
            accountant_with(dummy_campaign("Free Rider", 0, BudgetKind::None, 250)).await;

        for _ in 0..3 {
            let after = accountant
                .debit(&campaign, EventKind::View)
                .await
                .expect("Debit should succeed");
            assert!(BudgetAccountant::is_available(&after));
            assert_eq!(UnifiedNum::ZERO, after.budget.used);
        }
    }

    #[tokio::test]
    async fn overshoot_by_one_event_is_accepted() {
        let mut campaign = dummy_campaign("Boundary", 0, BudgetKind::View, 250);
        campaign.budget.total = UnifiedNum::from_u64(10_000_000);
        campaign.budget.used = UnifiedNum::from_u64(10_000_000);
        let (accountant, campaign) = accountant_with(campaign).await;

        // exactly at the boundary and still available
        assert!(BudgetAccountant::is_available(&campaign));

        let after = accountant
            .debit(&campaign, EventKind::View)
            .await
            .expect("Debit should succeed");

        assert_eq!(UnifiedNum::from_u64(35_000_000), after.budget.used);
        assert!(!BudgetAccountant::is_available(&after));
    }
}
