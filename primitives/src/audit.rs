use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The operator actions recorded in a campaign's audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    UpdateValue,
    AddBudget,
    Toggle,
    ClearStatistics,
}

/// One immutable record of the append-only audit trail.
/// Entries are never mutated, reordered or trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub action: ActionType,
    /// A millisecond timestamp of when the action was taken.
    #[serde(with = "ts_milliseconds")]
    pub when: DateTime<Utc>,
    /// The acting principal.
    pub who: String,
    /// Action-specific payload, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl AuditEntry {
    pub fn new(action: ActionType, who: &str, data: Option<serde_json::Value>) -> Self {
        Self {
            action,
            when: Utc::now(),
            who: who.to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn de_serializes_audit_entry() {
        let entry = AuditEntry {
            action: ActionType::AddBudget,
            when: Utc
                .timestamp_millis_opt(1_564_383_600_000)
                .single()
                .expect("Valid timestamp"),
            who: "operatorA".to_string(),
            data: Some(json!({ "amount": 500 })),
        };

        let serialized = serde_json::to_value(&entry).expect("Should serialize");

        assert_eq!(
            Some(&Value::String("addBudget".into())),
            serialized.get("action")
        );
        assert_eq!(
            Some(&Value::String("operatorA".into())),
            serialized.get("who")
        );
        assert_eq!(Some(&json!(1_564_383_600_000_i64)), serialized.get("when"));

        let deserialized =
            serde_json::from_value::<AuditEntry>(serialized).expect("Should deserialize");
        assert_eq!(entry, deserialized);
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let entry = AuditEntry::new(ActionType::ClearStatistics, "operatorA", None);

        let serialized = serde_json::to_value(&entry).expect("Should serialize");
        assert!(serialized.get("data").is_none());
    }
}
