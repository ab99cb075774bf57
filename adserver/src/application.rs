use std::sync::Arc;

use slog::{debug, error, info, Logger};
use serde_json::json;

use primitives::{
    ActionType, Campaign, CampaignId, Config, CreateCampaign, EventKind, Input, ModifyCampaign,
    UnifiedNum,
};

use crate::{
    audit::AuditLog,
    budget::BudgetAccountant,
    error::Error,
    render::{self, DisplayableCampaign, RenderModel},
    selection,
    statistics::{MetricsSink, StatisticsTracker},
    store::{CampaignStore, Store},
};

/// The orchestrator: filters eligible campaigns, runs the weighted lottery
/// and keeps budgets, statistics and the audit trail consistent.
#[derive(Clone)]
pub struct Engine {
    store: Store,
    accountant: BudgetAccountant,
    tracker: StatisticsTracker,
    audit: AuditLog,
    config: Config,
    logger: Logger,
}

impl Engine {
    pub fn new(
        campaign_store: Arc<dyn CampaignStore>,
        config: Config,
        logger: Logger,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        let store = Store::new(campaign_store, &config, logger.clone());

        Self {
            accountant: BudgetAccountant::new(store.clone()),
            tracker: StatisticsTracker::new(store.clone(), sink, logger.clone()),
            audit: AuditLog::new(store.clone()),
            store,
            config,
            logger,
        }
    }

    /// Serves one ad to the given viewer.
    ///
    /// Picks a winner from the eligible candidates, records the view and
    /// debits a view-type budget before handing the campaign out. When the
    /// candidate list cannot be loaded the viewer simply gets no ad; write
    /// failures after a winner was chosen propagate.
    pub async fn serve(&self, input: &Input) -> Result<Option<DisplayableCampaign>, Error> {
        let campaigns = match self.store.list().await {
            Ok(campaigns) => campaigns,
            Err(store_error) => {
                error!(self.logger, "serving skipped, candidates unavailable: {}", store_error;
                    "module" => "serve");
                return Ok(None);
            }
        };

        let winner = match selection::pick(&campaigns, input) {
            Some(winner) => winner.clone(),
            None => {
                debug!(self.logger, "no eligible campaign for this draw"; "module" => "serve");
                return Ok(None);
            }
        };

        let viewed = self
            .tracker
            .increment(&winner, EventKind::View, input.country.as_deref())
            .await?;
        let updated = self.accountant.debit(&viewed, EventKind::View).await?;

        Ok(Some(DisplayableCampaign {
            render: render::preview(&updated),
            campaign: updated,
        }))
    }

    /// Records a click-through on a served campaign.
    ///
    /// An unknown id is reported as none and performs no store write.
    /// Click statistics carry no country - the redirect path only knows
    /// the campaign id.
    pub async fn register_click_through(
        &self,
        id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign = match self.store.get(id).await? {
            Some(campaign) => campaign,
            None => {
                info!(self.logger, "click-through on unknown campaign"; "campaign" => %id);
                return Ok(None);
            }
        };

        let clicked = self
            .tracker
            .increment(&campaign, EventKind::Click, None)
            .await?;
        let updated = self.accountant.debit(&clicked, EventKind::Click).await?;

        Ok(Some(updated))
    }

    /// Builds the render projection without any side effects.
    pub fn preview_render(&self, campaign: &Campaign) -> RenderModel {
        render::preview(campaign)
    }

    /// Creates a campaign from an operator draft: inactive, empty trail,
    /// zeroed statistics. The draft snapshot becomes the first audit entry.
    pub async fn create_campaign(
        &self,
        draft: CreateCampaign,
        who: &str,
    ) -> Result<Campaign, Error> {
        let snapshot = serde_json::to_value(&draft).ok();
        let campaign = draft.try_into_campaign()?;

        let created = self.store.insert(campaign).await?;

        self.audit
            .append(created.id, ActionType::UpdateValue, who, snapshot)
            .await
    }

    pub async fn set_active(
        &self,
        id: CampaignId,
        active: bool,
        who: &str,
    ) -> Result<Campaign, Error> {
        let modify = ModifyCampaign {
            active: Some(active),
            ..Default::default()
        };
        self.store.update(id, modify).await?;

        self.audit
            .append(id, ActionType::Toggle, who, Some(json!({ "active": active })))
            .await
    }

    /// Raises the campaign's budget ceiling by `amount` whole units.
    pub async fn add_budget(&self, id: CampaignId, amount: f64, who: &str) -> Result<Campaign, Error> {
        let amount = UnifiedNum::from_float(amount)
            .map_err(|float_error| Error::InvalidBudget(float_error.to_string()))?;
        if amount.is_zero() {
            return Err(Error::InvalidBudget(
                "top up amount must be positive".to_string(),
            ));
        }

        let campaign = self.store.get(id).await?.ok_or(Error::NotFound(id))?;
        let total = campaign
            .budget
            .total
            .checked_add(amount)
            .ok_or_else(|| Error::InvalidBudget("budget total overflow".to_string()))?;

        let modify = ModifyCampaign {
            budget: Some(total),
            ..Default::default()
        };
        self.store.update(id, modify).await?;

        self.audit
            .append(
                id,
                ActionType::AddBudget,
                who,
                Some(json!({ "amount": amount })),
            )
            .await
    }

    pub async fn reset_statistics(&self, id: CampaignId, who: &str) -> Result<Campaign, Error> {
        let campaign = self.store.get(id).await?.ok_or(Error::NotFound(id))?;
        self.tracker.reset(&campaign).await?;

        self.audit
            .append(id, ActionType::ClearStatistics, who, None)
            .await
    }

    /// Applies a partial operator edit; the changed fields become the
    /// audit payload.
    pub async fn update_campaign(
        &self,
        id: CampaignId,
        modify: ModifyCampaign,
        who: &str,
    ) -> Result<Campaign, Error> {
        let snapshot = serde_json::to_value(&modify).ok();
        self.store.update(id, modify).await?;

        self.audit
            .append(id, ActionType::UpdateValue, who, snapshot)
            .await
    }

    /// Removes the campaign from the cache index and the durable store.
    /// No soft delete.
    pub async fn delete_campaign(&self, id: CampaignId) -> Result<(), Error> {
        self.store.delete(id).await.map_err(Error::from)
    }

    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let mut campaigns = self.store.list().await?;
        campaigns.truncate(self.config.campaigns_find_limit as usize);

        Ok(campaigns)
    }
}
