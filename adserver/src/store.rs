use std::{
    future::Future,
    sync::{Arc, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use dashmap::DashMap;
use slog::{warn, Logger};
use thiserror::Error;
use tokio::time::timeout;

use primitives::{AuditEntry, Campaign, CampaignId, Config, EventKind, ModifyCampaign, UnifiedNum};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("campaign {0} was not found")]
    NotFound(CampaignId),
    #[error("campaign {0} already exists")]
    AlreadyExists(CampaignId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out")]
    Timeout,
}

impl StoreError {
    /// Transient failures are worth a single retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout)
    }
}

/// The durable campaign storage boundary.
///
/// Besides the CRUD surface it carries the counter operations which must be
/// applied against the last stored value: two concurrent debits may never
/// lose one, and a geo merge may never clobber another country's counter.
/// Every mutation returns the updated canonical record.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Campaign>, StoreError>;

    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, StoreError>;

    async fn insert(&self, campaign: Campaign) -> Result<Campaign, StoreError>;

    /// Merge semantics, not replace; see [`ModifyCampaign::apply`].
    async fn update(&self, id: CampaignId, modify: ModifyCampaign)
        -> Result<Campaign, StoreError>;

    async fn delete(&self, id: CampaignId) -> Result<(), StoreError>;

    /// Atomically raises `budget.used` by `amount`.
    async fn add_spent(&self, id: CampaignId, amount: UnifiedNum)
        -> Result<Campaign, StoreError>;

    /// Atomically records one event, merging the geo breakdown.
    async fn record_event(
        &self,
        id: CampaignId,
        kind: EventKind,
        country: Option<&str>,
    ) -> Result<Campaign, StoreError>;

    /// Appends one audit entry; the trail is never reordered or trimmed.
    async fn append_entry(&self, id: CampaignId, entry: AuditEntry)
        -> Result<Campaign, StoreError>;

    /// Atomically zeroes all statistics counters.
    async fn reset_statistics(&self, id: CampaignId) -> Result<Campaign, StoreError>;
}

/// In-memory [`CampaignStore`] used in tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Campaign>>,
}

impl MemoryStore {
    pub fn new(initial_records: &[Campaign]) -> Self {
        Self {
            records: RwLock::new(initial_records.to_vec()),
        }
    }

    fn mutate_campaign(
        &self,
        id: CampaignId,
        mutate: impl FnOnce(&mut Campaign),
    ) -> Result<Campaign, StoreError> {
        let mut writer = self.records.write().map_err(|_| poisoned())?;
        let campaign = writer
            .iter_mut()
            .find(|campaign| campaign.id == id)
            .ok_or(StoreError::NotFound(id))?;

        mutate(campaign);

        Ok(campaign.clone())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("campaign lock was poisoned".to_string())
}

#[async_trait]
impl CampaignStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Campaign>, StoreError> {
        self.records
            .read()
            .map(|reader| reader.clone())
            .map_err(|_| poisoned())
    }

    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, StoreError> {
        self.records
            .read()
            .map(|reader| reader.iter().find(|campaign| campaign.id == id).cloned())
            .map_err(|_| poisoned())
    }

    async fn insert(&self, campaign: Campaign) -> Result<Campaign, StoreError> {
        let mut writer = self.records.write().map_err(|_| poisoned())?;

        if writer.iter().any(|existing| existing.id == campaign.id) {
            return Err(StoreError::AlreadyExists(campaign.id));
        }

        writer.push(campaign.clone());

        Ok(campaign)
    }

    async fn update(
        &self,
        id: CampaignId,
        modify: ModifyCampaign,
    ) -> Result<Campaign, StoreError> {
        let mut writer = self.records.write().map_err(|_| poisoned())?;
        let position = writer
            .iter()
            .position(|campaign| campaign.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let updated = modify.apply(writer[position].clone());
        writer[position] = updated.clone();

        Ok(updated)
    }

    async fn delete(&self, id: CampaignId) -> Result<(), StoreError> {
        let mut writer = self.records.write().map_err(|_| poisoned())?;
        let position = writer
            .iter()
            .position(|campaign| campaign.id == id)
            .ok_or(StoreError::NotFound(id))?;

        writer.remove(position);

        Ok(())
    }

    async fn add_spent(
        &self,
        id: CampaignId,
        amount: UnifiedNum,
    ) -> Result<Campaign, StoreError> {
        self.mutate_campaign(id, |campaign| {
            campaign.budget.used = campaign.budget.used.saturating_add(amount);
        })
    }

    async fn record_event(
        &self,
        id: CampaignId,
        kind: EventKind,
        country: Option<&str>,
    ) -> Result<Campaign, StoreError> {
        self.mutate_campaign(id, |campaign| {
            campaign.stats.record(kind, country);
        })
    }

    async fn append_entry(
        &self,
        id: CampaignId,
        entry: AuditEntry,
    ) -> Result<Campaign, StoreError> {
        self.mutate_campaign(id, |campaign| {
            campaign.logs.push(entry);
        })
    }

    async fn reset_statistics(&self, id: CampaignId) -> Result<Campaign, StoreError> {
        self.mutate_campaign(id, |campaign| {
            campaign.stats.reset();
        })
    }
}

/// The single choke point every campaign mutation flows through.
///
/// Owns a read-through cache index keyed by campaign id. The underlying
/// store keeps the canonical copy; the cache is only ever refreshed from a
/// write's returned record, never written independently. Each call to the
/// underlying store is bounded by the configured timeout and retried once
/// on a transient failure.
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn CampaignStore>,
    cache: Arc<DashMap<CampaignId, Campaign>>,
    call_timeout: Duration,
    logger: Logger,
}

impl Store {
    pub fn new(inner: Arc<dyn CampaignStore>, config: &Config, logger: Logger) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
            call_timeout: Duration::from_millis(config.store_timeout as u64),
            logger,
        }
    }

    async fn bounded<T, Fut>(&self, call: impl Fn() -> Fut) -> Result<T, StoreError>
    where
        Fut: Future<Output = Result<T, StoreError>>,
    {
        match timeout(self.call_timeout, call()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) if !error.is_transient() => Err(error),
            failed => {
                let error = match failed {
                    Ok(Err(error)) => error,
                    _ => StoreError::Timeout,
                };
                warn!(self.logger, "retrying store call after transient failure: {}", error; "module" => "store");

                match timeout(self.call_timeout, call()).await {
                    Ok(result) => result,
                    Err(_elapsed) => Err(StoreError::Timeout),
                }
            }
        }
    }

    fn cache_write(&self, campaign: &Campaign) {
        self.cache.insert(campaign.id, campaign.clone());
    }

    /// Lists the canonical records, refreshing the cache index on the way.
    pub async fn list(&self) -> Result<Vec<Campaign>, StoreError> {
        let campaigns = self.bounded(|| self.inner.list()).await?;

        for campaign in &campaigns {
            self.cache_write(campaign);
        }

        Ok(campaigns)
    }

    /// Read-through get, served from the cache index when warm.
    pub async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, StoreError> {
        if let Some(cached) = self.cache.get(&id) {
            return Ok(Some(cached.value().clone()));
        }

        let fetched = self.bounded(|| self.inner.get(id)).await?;
        if let Some(campaign) = &fetched {
            self.cache_write(campaign);
        }

        Ok(fetched)
    }

    pub async fn insert(&self, campaign: Campaign) -> Result<Campaign, StoreError> {
        let created = self.bounded(|| self.inner.insert(campaign.clone())).await?;
        self.cache_write(&created);

        Ok(created)
    }

    pub async fn update(
        &self,
        id: CampaignId,
        modify: ModifyCampaign,
    ) -> Result<Campaign, StoreError> {
        let updated = self.bounded(|| self.inner.update(id, modify.clone())).await?;
        self.cache_write(&updated);

        Ok(updated)
    }

    pub async fn delete(&self, id: CampaignId) -> Result<(), StoreError> {
        self.bounded(|| self.inner.delete(id)).await?;
        self.cache.remove(&id);

        Ok(())
    }

    pub async fn add_spent(
        &self,
        id: CampaignId,
        amount: UnifiedNum,
    ) -> Result<Campaign, StoreError> {
        let updated = self.bounded(|| self.inner.add_spent(id, amount)).await?;
        self.cache_write(&updated);

        Ok(updated)
    }

    pub async fn record_event(
        &self,
        id: CampaignId,
        kind: EventKind,
        country: Option<&str>,
    ) -> Result<Campaign, StoreError> {
        let updated = self
            .bounded(|| self.inner.record_event(id, kind, country))
            .await?;
        self.cache_write(&updated);

        Ok(updated)
    }

    pub async fn append_entry(
        &self,
        id: CampaignId,
        entry: AuditEntry,
    ) -> Result<Campaign, StoreError> {
        let updated = self
            .bounded(|| self.inner.append_entry(id, entry.clone()))
            .await?;
        self.cache_write(&updated);

        Ok(updated)
    }

    pub async fn reset_statistics(&self, id: CampaignId) -> Result<Campaign, StoreError> {
        let updated = self.bounded(|| self.inner.reset_statistics(id)).await?;
        self.cache_write(&updated);

        Ok(updated)
    }
}
