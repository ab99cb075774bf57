use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{audit::AuditEntry, budget::Budget, statistics::Statistics, targeting::FilterCall};

pub use campaign_id::CampaignId;
pub use mutate::{CreateCampaign, ModifyCampaign};

mod campaign_id {
    use hex::{FromHex, FromHexError};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::{fmt, str::FromStr};
    use thiserror::Error;
    use uuid::Uuid;

    /// An Id of 16 bytes, (de)serialized as a `0x` prefixed hex string.
    /// Generated from a `Uuid::new_v4()` on campaign creation.
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CampaignId([u8; 16]);

    impl CampaignId {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn as_bytes(&self) -> &[u8; 16] {
            &self.0
        }

        pub fn from_bytes(bytes: [u8; 16]) -> Self {
            Self(bytes)
        }
    }

    impl Default for CampaignId {
        fn default() -> Self {
            Self(*Uuid::new_v4().as_bytes())
        }
    }

    #[derive(Debug, Error)]
    pub enum ParseError {
        #[error("Expected a `0x` prefix")]
        ExpectedPrefix,
        #[error(transparent)]
        InvalidHex(#[from] FromHexError),
    }

    impl FromStr for CampaignId {
        type Err = ParseError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.strip_prefix("0x") {
                Some(hex) => Ok(Self(<[u8; 16]>::from_hex(hex)?)),
                None => Err(ParseError::ExpectedPrefix),
            }
        }
    }

    impl fmt::Display for CampaignId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "0x{}", hex::encode(self.0))
        }
    }

    impl fmt::Debug for CampaignId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "CampaignId({})", self)
        }
    }

    impl Serialize for CampaignId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for CampaignId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let string = String::deserialize(deserializer)?;

            string.parse().map_err(serde::de::Error::custom)
        }
    }

}

/// The unit of advertisement: one sponsored record with budget,
/// targeting, statistics and display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    /// Human readable name, also used as the metrics dimension key.
    /// Unique in practice, not enforced.
    pub name: String,
    /// A millisecond timestamp of when the campaign was created
    #[serde(with = "ts_milliseconds")]
    pub created: DateTime<Utc>,
    /// Inactive campaigns are never selected.
    pub active: bool,
    pub budget: Budget,
    /// Append-only audit trail, insertion order is audit order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<AuditEntry>,
    /// Operator ids with edit rights. Authorization data only,
    /// the engine itself does not enforce it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    /// Absent or empty means the campaign matches every viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<FilterCall>>,
    /// Destination URL, used for click redirection and domain display.
    pub link: Url,
    pub settings: Settings,
    #[serde(default)]
    pub stats: Statistics,
}

impl Campaign {
    pub fn has_member(&self, who: &str) -> bool {
        self.members.iter().any(|member| member == who)
    }
}

/// Display payload consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Accent color as a packed RGB integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Url>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Button {
    pub label: String,
    pub url: Url,
}

mod mutate {
    use chrono::Utc;
    use serde::{Deserialize, Serialize};
    use url::Url;

    use super::{Campaign, CampaignId, Settings};
    use crate::{
        budget::{BudgetDraft, BudgetKind},
        statistics::Statistics,
        targeting::FilterCall,
        unified_num::UnifiedNum,
        DomainError,
    };

    /// An operator's draft for creating a [`Campaign`].
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateCampaign {
        pub name: String,
        pub link: Url,
        pub budget: BudgetDraft,
        pub settings: Settings,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub filters: Option<Vec<FilterCall>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub members: Vec<String>,
    }

    impl CreateCampaign {
        /// Creates the actual `Campaign` with a random `CampaignId`,
        /// inactive, with empty logs and zeroed statistics.
        pub fn try_into_campaign(self) -> Result<Campaign, DomainError> {
            Ok(Campaign {
                id: CampaignId::new(),
                name: self.name,
                created: Utc::now(),
                active: false,
                budget: self.budget.try_into_budget()?,
                logs: Vec::new(),
                members: self.members,
                filters: self.filters,
                link: self.link,
                settings: self.settings,
                stats: Statistics::default(),
            })
        }
    }

    /// Partial changes to an existing campaign, merge semantics.
    ///
    /// The cumulative spend, statistics and audit trail are deliberately
    /// absent: those fields only move through their atomic store operations.
    #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ModifyCampaign {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub active: Option<bool>,
        /// New budget ceiling.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub budget: Option<UnifiedNum>,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        pub kind: Option<BudgetKind>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub cost: Option<UnifiedNum>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub filters: Option<Vec<FilterCall>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub link: Option<Url>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub settings: Option<Settings>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub members: Option<Vec<String>>,
    }

    impl ModifyCampaign {
        pub fn apply(self, mut campaign: Campaign) -> Campaign {
            if let Some(name) = self.name {
                campaign.name = name;
            }
            if let Some(active) = self.active {
                campaign.active = active;
            }
            if let Some(budget) = self.budget {
                campaign.budget.total = budget;
            }
            if let Some(kind) = self.kind {
                campaign.budget.kind = kind;
            }
            if let Some(cost) = self.cost {
                campaign.budget.cost = cost;
            }
            if let Some(filters) = self.filters {
                campaign.filters = Some(filters);
            }
            if let Some(link) = self.link {
                campaign.link = link;
            }
            if let Some(settings) = self.settings {
                campaign.settings = settings;
            }
            if let Some(members) = self.members {
                campaign.members = members;
            }

            campaign
        }
    }
}
