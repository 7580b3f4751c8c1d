//! Client testimonials.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::versioning::{number_from_string, optional_integer, rename_if_missing};
use super::{IdStrategy, Record};

/// A client quote shown in the testimonials carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    /// Unique id.
    pub id: i64,
    /// The quote itself.
    pub quote: String,
    /// Who said it.
    pub author: String,
    /// Their role.
    #[serde(default)]
    pub position: String,
    /// Their company.
    #[serde(default)]
    pub company: String,
    /// Portrait.
    #[serde(default)]
    pub image: String,
    /// Explicit carousel position; unset sorts last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Testimonial {
    /// Create a testimonial with the required fields.
    #[must_use]
    pub fn new(id: i64, quote: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            quote: quote.into(),
            author: author.into(),
            position: String::new(),
            company: String::new(),
            image: String::new(),
            order: None,
        }
    }

    /// "Position, Company" with empty parts left out.
    #[must_use]
    pub fn byline(&self) -> String {
        [self.position.as_str(), self.company.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Record for Testimonial {
    const NAME: &'static str = "testimonials";
    const SCHEMA_VERSION: u32 = 1;
    const ID_STRATEGY: IdStrategy = IdStrategy::Timestamp;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn set_order(&mut self, order: Option<i64>) {
        self.order = order;
    }

    fn normalize(self) -> Self {
        Self {
            quote: self.quote.trim().to_string(),
            author: self.author.trim().to_string(),
            position: self.position.trim().to_string(),
            company: self.company.trim().to_string(),
            image: self.image.trim().to_string(),
            ..self
        }
    }

    fn migrate(mut value: Value, from_version: u32) -> Value {
        if from_version == 0 {
            if let Value::Object(map) = &mut value {
                number_from_string(map, "id");
                optional_integer(map, "order");
                rename_if_missing(map, "name", "author");
                rename_if_missing(map, "role", "position");
                rename_if_missing(map, "text", "quote");
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::versioning::upgrade;

    #[test]
    fn test_byline() {
        let mut t = Testimonial::new(1, "Great", "Ada");
        assert_eq!(t.byline(), "");
        t.position = "CTO".to_string();
        assert_eq!(t.byline(), "CTO");
        t.company = "Acme".to_string();
        assert_eq!(t.byline(), "CTO, Acme");
    }

    #[test]
    fn test_migrate_old_field_names() {
        let legacy = json!({"id": 5, "text": "Superb", "name": "Grace", "role": "Lead"});
        let t: Testimonial = serde_json::from_value(upgrade::<Testimonial>(legacy)).unwrap();
        assert_eq!(t.quote, "Superb");
        assert_eq!(t.author, "Grace");
        assert_eq!(t.position, "Lead");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let t = Testimonial::new(1, "  Great work ", " Ada ");
        let once = t.normalize();
        assert_eq!(once.quote, "Great work");
        assert_eq!(once.clone().normalize(), once);
    }
}
