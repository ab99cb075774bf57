use std::sync::Arc;

use slog::{error, info, Logger};
use thiserror::Error;

use primitives::{Campaign, EventKind};

use crate::{error::Error as EngineError, store::Store};

#[derive(Debug, Error)]
#[error("metrics sink: {0}")]
pub struct SinkError(pub String);

/// Fire-and-forget counter delivery for time-series dashboards.
///
/// Statistics delivery is best-effort: a failing sink must never fail the
/// serving path, the tracker logs and swallows the error.
pub trait MetricsSink: Send + Sync {
    fn emit(
        &self,
        kind: EventKind,
        campaign_name: &str,
        total: u64,
        delta: u64,
    ) -> Result<(), SinkError>;
}

/// A [`MetricsSink`] that writes the counter updates to the logger.
pub struct LogMetricsSink {
    pub logger: Logger,
}

impl MetricsSink for LogMetricsSink {
    fn emit(
        &self,
        kind: EventKind,
        campaign_name: &str,
        total: u64,
        delta: u64,
    ) -> Result<(), SinkError> {
        info!(self.logger, "{} +{}", kind, delta; "campaign" => campaign_name, "total" => total);

        Ok(())
    }
}

/// Accumulates view & click counters, globally and per country.
#[derive(Clone)]
pub struct StatisticsTracker {
    store: Store,
    sink: Arc<dyn MetricsSink>,
    logger: Logger,
}

impl StatisticsTracker {
    pub fn new(store: Store, sink: Arc<dyn MetricsSink>, logger: Logger) -> Self {
        Self {
            store,
            sink,
            logger,
        }
    }

    /// Raises the campaign's running total by one and, when the viewer's
    /// country is known, merges one into its geo counter. Emits the new
    /// total with a `+1` delta to the metrics sink.
    pub async fn increment(
        &self,
        campaign: &Campaign,
        kind: EventKind,
        country: Option<&str>,
    ) -> Result<Campaign, EngineError> {
        let updated = self.store.record_event(campaign.id, kind, country).await?;

        let total = updated.stats.for_kind(kind).total;
        if let Err(sink_error) = self.sink.emit(kind, &updated.name, total, 1) {
            let id = updated.id;
            error!(self.logger, "statistics delivery failed: {}", sink_error;
                "module" => "statistics", "campaign" => %id);
        }

        Ok(updated)
    }

    /// Zeroes all view & click counters in one atomic update.
    /// Appends no audit entry; the caller owns the `clearStatistics` record.
    pub async fn reset(&self, campaign: &Campaign) -> Result<Campaign, EngineError> {
        self.store
            .reset_statistics(campaign.id)
            .await
            .map_err(EngineError::from)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use primitives::{
        config::DEVELOPMENT_CONFIG, test_util::dummy_campaign, util::logging::new_logger,
        BudgetKind, Statistics,
    };

    use crate::store::MemoryStore;

    use super::*;

    #[derive(Default)]
    struct CaptureSink {
        events: Mutex<Vec<(EventKind, String, u64, u64)>>,
    }

    impl MetricsSink for CaptureSink {
        fn emit(
            &self,
            kind: EventKind,
            campaign_name: &str,
            total: u64,
            delta: u64,
        ) -> Result<(), SinkError> {
            self.events
                .lock()
                .expect("Sink lock should not be poisoned")
                .push((kind, campaign_name.to_string(), total, delta));

            Ok(())
        }
    }

    struct BrokenSink;

    impl MetricsSink for BrokenSink {
        fn emit(&self, _: EventKind, _: &str, _: u64, _: u64) -> Result<(), SinkError> {
            Err(SinkError("dashboard is on fire".to_string()))
        }
    }

    async fn tracker_with(
        sink: Arc<dyn MetricsSink>,
        campaign: Campaign,
    ) -> (StatisticsTracker, Campaign) {
        let store = Store::new(
            Arc::new(MemoryStore::default()),
            &DEVELOPMENT_CONFIG,
            new_logger("statistics-test"),
        );
        let created = store.insert(campaign).await.expect("Should insert");

        (
            StatisticsTracker::new(store, sink, new_logger("statistics-test")),
            created,
        )
    }

    #[tokio::test]
    async fn increment_updates_counters_and_emits_metrics() {
        let sink = Arc::new(CaptureSink::default());
        let (tracker, campaign) = tracker_with(
            sink.clone(),
            dummy_campaign("Metered", 100, BudgetKind::View, 250),
        )
        .await;

        let updated = tracker
            .increment(&campaign, EventKind::View, Some("BG"))
            .await
            .expect("Increment should succeed");

        assert_eq!(1, updated.stats.views.total);
        assert_eq!(Some(&1), updated.stats.views.geo.get("BG"));
        assert_eq!(0, updated.stats.clicks.total);

        let events = sink.events.lock().expect("Sink lock");
        assert_eq!(
            vec![(EventKind::View, "Metered".to_string(), 1, 1)],
            *events
        );
    }

    #[tokio::test]
    async fn a_broken_sink_never_fails_the_increment() {
        let (tracker, campaign) = tracker_with(
            Arc::new(BrokenSink),
            dummy_campaign("Unmetered", 100, BudgetKind::View, 250),
        )
        .await;

        let updated = tracker
            .increment(&campaign, EventKind::Click, None)
            .await
            .expect("Increment should succeed despite the sink");

        assert_eq!(1, updated.stats.clicks.total);
        assert!(updated.stats.clicks.geo.is_empty());
    }

    #[tokio::test]
    async fn reset_zeroes_everything_and_nothing_else() {
        let sink = Arc::new(CaptureSink::default());
        let (tracker, campaign) = tracker_with(
            sink,
            dummy_campaign("Resettable", 100, BudgetKind::View, 250),
        )
        .await;

        let incremented = tracker
            .increment(&campaign, EventKind::View, Some("BG"))
            .await
            .expect("Increment should succeed");

        let reset = tracker
            .reset(&incremented)
            .await
            .expect("Reset should succeed");

        assert_eq!(Statistics::default(), reset.stats);

        // everything else on the campaign is untouched
        assert_eq!(incremented.id, reset.id);
        assert_eq!(incremented.budget, reset.budget);
        assert_eq!(incremented.logs, reset.logs);
        assert_eq!(incremented.settings, reset.settings);
    }
}
