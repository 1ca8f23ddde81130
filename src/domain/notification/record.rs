//! Notification document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::domain::foundation::{NotificationId, RawDate, Timestamp, UserId};

/// Notification type strings as stored.
pub mod types {
    pub const SERVICE_SELECTED: &str = "service_selected";
    pub const SELECTION_ACCEPTED: &str = "selection_accepted";
    pub const SELECTION_DECLINED: &str = "selection_declined";
    pub const PAYMENT_SUBMITTED: &str = "payment_submitted";
    pub const PAYMENT_CONFIRMED_RATING: &str = "payment_confirmed_rating";

    /// Types that describe a payment and feed revenue reconciliation.
    pub const PAYMENT_TYPES: [&str; 3] = ["payment", "payment_received", "payment_confirmed"];
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub notification_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub payload: Map<String, JsonValue>,
    #[serde(default)]
    pub created_at: RawDate,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        notification_type: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        payload: Map<String, JsonValue>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            user_id,
            notification_type: notification_type.into(),
            title: title.into(),
            message: message.into(),
            read: false,
            payload,
            created_at: RawDate::Native(Timestamp::now()),
        }
    }

    pub fn is_type(&self, notification_type: &str) -> bool {
        self.notification_type == notification_type
    }

    /// True for notifications that record a payment.
    pub fn is_payment(&self) -> bool {
        types::PAYMENT_TYPES.contains(&self.notification_type.as_str())
    }

    /// String payload field, if present.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(JsonValue::as_str)
    }

    /// Creation time, or now when the stored date is unusable.
    pub fn created_instant(&self) -> Timestamp {
        self.created_at.instant_or_now()
    }
}

/// Builds a payload map from `(key, value)` pairs, skipping `None` values.
pub fn payload<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<String>)>) -> Map<String, JsonValue> {
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), json!(v))))
        .collect()
}
