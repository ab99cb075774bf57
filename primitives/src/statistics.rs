use std::collections::HashMap;

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// The two billable event kinds a campaign can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum EventKind {
    View,
    Click,
}

/// View & click counters of a single campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub clicks: EventStats,
    #[serde(default)]
    pub views: EventStats,
}

/// A running total with a per-country breakdown.
/// Geo keys are inserted lazily, the ordering is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub geo: HashMap<String, u64>,
}

impl Statistics {
    pub fn for_kind(&self, kind: EventKind) -> &EventStats {
        match kind {
            EventKind::View => &self.views,
            EventKind::Click => &self.clicks,
        }
    }

    pub fn for_kind_mut(&mut self, kind: EventKind) -> &mut EventStats {
        match kind {
            EventKind::View => &mut self.views,
            EventKind::Click => &mut self.clicks,
        }
    }

    /// Records a single event, merging into the existing geo map
    /// rather than replacing it. Returns the new running total.
    pub fn record(&mut self, kind: EventKind, country: Option<&str>) -> u64 {
        let stats = self.for_kind_mut(kind);
        stats.total += 1;

        if let Some(country) = country {
            *stats.geo.entry(country.to_string()).or_insert(0) += 1;
        }

        stats.total
    }

    /// Zeroes all four counters in one go.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn record_raises_total_and_merges_geo() {
        let mut stats = Statistics::default();

        assert_eq!(1, stats.record(EventKind::View, Some("BG")));
        assert_eq!(2, stats.record(EventKind::View, Some("BG")));
        assert_eq!(3, stats.record(EventKind::View, Some("DE")));
        // no country - total still rises, geo untouched
        assert_eq!(4, stats.record(EventKind::View, None));

        assert_eq!(4, stats.views.total);
        assert_eq!(Some(&2), stats.views.geo.get("BG"));
        assert_eq!(Some(&1), stats.views.geo.get("DE"));
        assert_eq!(2, stats.views.geo.len());

        // clicks are untouched by view events
        assert_eq!(EventStats::default(), stats.clicks);

        assert_eq!(1, stats.record(EventKind::Click, Some("BG")));
        assert_eq!(1, stats.clicks.total);
        assert_eq!(Some(&1), stats.clicks.geo.get("BG"));
    }

    #[test]
    fn reset_zeroes_every_counter() {
        let mut stats = Statistics::default();
        stats.record(EventKind::View, Some("BG"));
        stats.record(EventKind::Click, Some("US"));

        stats.reset();

        assert_eq!(Statistics::default(), stats);
    }

    #[test]
    fn event_kind_round_trips_through_strings() {
        assert_eq!("view", EventKind::View.to_string());
        assert_eq!(
            EventKind::Click,
            "click".parse().expect("Should parse the event kind")
        );
    }
}
