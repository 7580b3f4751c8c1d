//! Portfolio projects.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::versioning::{list_from_scalar, number_from_string, optional_integer, string_from_number};
use super::{IdStrategy, Record};

/// Grid width of a project tile.
///
/// Older data used `large`, `medium` and `small`; those still decode, as
/// does anything unrecognized (which becomes [`ProjectSize::Col6`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ProjectSize {
    /// Full row.
    #[serde(rename = "full")]
    Full,
    /// Eight of twelve columns.
    #[serde(rename = "col-8")]
    Col8,
    /// Six of twelve columns.
    #[default]
    #[serde(rename = "col-6")]
    Col6,
    /// Four of twelve columns.
    #[serde(rename = "col-4")]
    Col4,
}

impl ProjectSize {
    /// All sizes, widest first.
    pub const ALL: [Self; 4] = [Self::Full, Self::Col8, Self::Col6, Self::Col4];

    /// Map a stored value (current or legacy) to a size.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match raw.trim() {
            "full" => Self::Full,
            "col-8" | "large" => Self::Col8,
            "col-4" | "small" => Self::Col4,
            // "col-6", "medium", and anything unknown
            _ => Self::Col6,
        }
    }

    /// The stored tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Col8 => "col-8",
            Self::Col6 => "col-6",
            Self::Col4 => "col-4",
        }
    }
}

impl std::fmt::Display for ProjectSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProjectSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map_or_else(Self::default, Self::coerce))
    }
}

/// Horizontal placement of a project tile within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Flush left.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush right.
    Right,
}

impl Alignment {
    /// Map a stored value to an alignment; unknown values center.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match raw.trim() {
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Center,
        }
    }

    /// The stored tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Alignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map_or_else(Self::default, Self::coerce))
    }
}

/// A portfolio project shown in the work grid and on its own detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique id, also the detail page route key.
    pub id: i64,
    /// Project title.
    pub title: String,
    /// Category used by the portfolio filter.
    #[serde(default)]
    pub category: String,
    /// Cover image: a URL or an embedded `data:` URI.
    #[serde(default)]
    pub image: String,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Client name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Free-form date text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// External link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Year the project shipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Live site URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Grid width.
    #[serde(default)]
    pub size: ProjectSize,
    /// Placement within the row.
    #[serde(default)]
    pub alignment: Alignment,
    /// Gallery images shown on the detail page, in order.
    #[serde(default)]
    pub additional_images: Vec<String>,
    /// Explicit grid position; unset sorts last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Project {
    /// Create a project with the required fields and defaults elsewhere.
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category: category.into(),
            image: String::new(),
            description: None,
            client: None,
            date: None,
            link: None,
            year: None,
            url: None,
            size: ProjectSize::default(),
            alignment: Alignment::default(),
            additional_images: Vec::new(),
            order: None,
        }
    }
}

/// Trim a text field and turn blank values into `None`.
pub(super) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trim every entry of a list and drop blank ones.
pub(super) fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Record for Project {
    const NAME: &'static str = "projects";
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
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            image: self.image.trim().to_string(),
            description: clean_optional(self.description),
            client: clean_optional(self.client),
            date: clean_optional(self.date),
            link: clean_optional(self.link),
            year: clean_optional(self.year),
            url: clean_optional(self.url),
            additional_images: clean_list(self.additional_images),
            ..self
        }
    }

    fn migrate(mut value: Value, from_version: u32) -> Value {
        if from_version == 0 {
            if let Value::Object(map) = &mut value {
                number_from_string(map, "id");
                optional_integer(map, "order");
                string_from_number(map, "year");
                list_from_scalar(map, "additionalImages");
                if let Some(Value::String(size)) = map.get("size") {
                    let size = ProjectSize::coerce(size).as_str();
                    map.insert("size".to_string(), Value::from(size));
                }
                if let Some(Value::String(alignment)) = map.get("alignment") {
                    let alignment = Alignment::coerce(alignment).as_str();
                    map.insert("alignment".to_string(), Value::from(alignment));
                }
            }
        }
        value
    }
}
