use primitives::{ActionType, AuditEntry, Campaign, CampaignId};

use crate::{error::Error, store::Store};

/// Appends immutable action records to a campaign's audit trail.
///
/// Append failures are never swallowed: losing an audit entry silently
/// would break budget accountability.
#[derive(Clone)]
pub struct AuditLog {
    store: Store,
}

impl AuditLog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn append(
        &self,
        id: CampaignId,
        action: ActionType,
        who: &str,
        data: Option<serde_json::Value>,
    ) -> Result<Campaign, Error> {
        let entry = AuditEntry::new(action, who, data);

        self.store
            .append_entry(id, entry)
            .await
            .map_err(Error::from)
    }
}
