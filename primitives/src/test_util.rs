use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;

use crate::{
    budget::{Budget, BudgetKind},
    campaign::{Campaign, CampaignId, Settings},
    statistics::Statistics,
    unified_num::UnifiedNum,
};

pub static DUMMY_CAMPAIGN: Lazy<Campaign> = Lazy::new(|| {
    let mut campaign = dummy_campaign("Dummy Campaign", 1_000, BudgetKind::View, 250);
    campaign.id = "0x936da01f9abd4d9d80c702af85c822a8"
        .parse()
        .expect("Should parse the dummy CampaignId");

    campaign
});

/// A campaign fixture with the given whole-unit budget figures,
/// active and unfiltered so that tests opt out explicitly.
pub fn dummy_campaign(name: &str, total: u64, kind: BudgetKind, cost: u64) -> Campaign {
    Campaign {
        id: CampaignId::new(),
        name: name.to_string(),
        // July 29, 2019 7:00:00 AM
        created: Utc
            .timestamp_opt(1_564_383_600, 0)
            .single()
            .expect("Valid timestamp"),
        active: true,
        budget: Budget {
            total: UnifiedNum::from_whole(total),
            used: UnifiedNum::ZERO,
            kind,
            cost: UnifiedNum::from_whole(cost),
        },
        logs: Vec::new(),
        members: vec!["dummyOperator".to_string()],
        filters: None,
        link: "https://example.com/landing".parse().expect("Valid URL"),
        settings: Settings {
            title: name.to_string(),
            description: Some("A campaign fixture".to_string()),
            color: Some(0x1b_75_bc),
            image: None,
            thumbnail: None,
            buttons: Vec::new(),
        },
        stats: Statistics::default(),
    }
}
