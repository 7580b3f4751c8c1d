//! Contact form messages.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::versioning::{number_from_string, rename_if_missing};
use super::{IdStrategy, Record};

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique id.
    pub id: i64,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Body text.
    pub message: String,
    /// When the message was received, RFC 3339.
    #[serde(default)]
    pub date: String,
    /// Whether an admin has opened it.
    #[serde(default)]
    pub read: bool,
}

impl Message {
    /// Create an unread message received now.
    #[must_use]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            message: message.into(),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            read: false,
        }
    }

    /// The received time, if the stored date parses.
    #[must_use]
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// First line of the body, shortened for list views.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let first = self.message.lines().next().unwrap_or_default();
        if first.chars().count() <= max_chars {
            first.to_string()
        } else {
            let cut: String = first.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{cut}…")
        }
    }
}

impl Record for Message {
    const NAME: &'static str = "messages";
    const SCHEMA_VERSION: u32 = 1;
    const ID_STRATEGY: IdStrategy = IdStrategy::Timestamp;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn normalize(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
            ..self
        }
    }

    fn migrate(mut value: Value, from_version: u32) -> Value {
        if from_version == 0 {
            if let Value::Object(map) = &mut value {
                number_from_string(map, "id");
                rename_if_missing(map, "isRead", "read");
                // Dates were sometimes stored as epoch milliseconds.
                if let Some(ms) = map.get("date").and_then(Value::as_i64) {
                    if let Some(dt) = DateTime::<Utc>::from_timestamp_millis(ms) {
                        let date = dt.to_rfc3339_opts(SecondsFormat::Millis, true);
                        map.insert("date".to_string(), Value::String(date));
                    }
                }
                if !matches!(map.get("read"), Some(Value::Bool(_))) {
                    map.remove("read");
                }
            }
        }
        value
    }
}
