//! Services offered on the site.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use super::project::clean_list;
use super::versioning::{list_from_scalar, number_from_string, optional_integer, string_from_number};
use super::{IdStrategy, Record};

/// Icon shown on a service card. Tags name a fixed icon set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceIcon {
    /// Brand and visual design.
    #[default]
    Palette,
    /// Software development.
    Code,
    /// Mobile apps.
    Smartphone,
    /// Growth and marketing.
    TrendingUp,
    /// Photography and video.
    Camera,
    /// Illustration and copy.
    PenTool,
    /// Web presence.
    Globe,
    /// Strategy and systems.
    Layers,
}

impl ServiceIcon {
    /// All icons in picker order.
    pub const ALL: [Self; 8] = [
        Self::Palette,
        Self::Code,
        Self::Smartphone,
        Self::TrendingUp,
        Self::Camera,
        Self::PenTool,
        Self::Globe,
        Self::Layers,
    ];

    /// The stored tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Palette => "palette",
            Self::Code => "code",
            Self::Smartphone => "smartphone",
            Self::TrendingUp => "trending-up",
            Self::Camera => "camera",
            Self::PenTool => "pen-tool",
            Self::Globe => "globe",
            Self::Layers => "layers",
        }
    }

    /// Map a stored tag to an icon.
    ///
    /// Matching ignores case and separators so component-style names such as
    /// `TrendingUp` or `pen_tool` resolve too. Unknown tags fall back to
    /// [`ServiceIcon::Palette`].
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        let wanted = squash(raw);
        Self::ALL
            .into_iter()
            .find(|icon| squash(icon.as_str()) == wanted)
            .unwrap_or_default()
    }
}

fn squash(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl std::fmt::Display for ServiceIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceIcon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map_or_else(Self::default, Self::coerce))
    }
}

/// One of the three fixed pricing tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierName {
    /// Entry tier.
    Starter,
    /// Middle tier.
    Professional,
    /// Top tier.
    Enterprise,
}

impl TierName {
    /// All tiers, cheapest first.
    pub const ALL: [Self; 3] = [Self::Starter, Self::Professional, Self::Enterprise];

    /// Field name of the tier inside `pricing`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }

    /// Display name used when a tier has none.
    #[must_use]
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Professional => "Professional",
            Self::Enterprise => "Enterprise",
        }
    }
}

/// A single pricing tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PricingTier {
    /// Display name.
    #[validate(length(max = 60, message = "must be at most 60 characters"))]
    pub name: String,
    /// Price text, e.g. `$1,500` or `From $900/mo`.
    #[validate(length(max = 40, message = "must be at most 40 characters"))]
    pub price: String,
    /// Included features, in order.
    pub features: Vec<String>,
}

impl PricingTier {
    fn normalize(self, tier: TierName) -> Self {
        let name = self.name.trim();
        Self {
            name: if name.is_empty() {
                tier.default_label().to_string()
            } else {
                name.to_string()
            },
            price: self.price.trim().to_string(),
            features: clean_list(self.features),
        }
    }
}

/// The three pricing tiers of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Pricing {
    /// Entry tier.
    #[validate(nested)]
    pub starter: PricingTier,
    /// Middle tier.
    #[validate(nested)]
    pub professional: PricingTier,
    /// Top tier.
    #[validate(nested)]
    pub enterprise: PricingTier,
}

impl Pricing {
    /// Borrow a tier by name.
    #[must_use]
    pub fn tier(&self, tier: TierName) -> &PricingTier {
        match tier {
            TierName::Starter => &self.starter,
            TierName::Professional => &self.professional,
            TierName::Enterprise => &self.enterprise,
        }
    }

    /// Mutably borrow a tier by name.
    pub fn tier_mut(&mut self, tier: TierName) -> &mut PricingTier {
        match tier {
            TierName::Starter => &mut self.starter,
            TierName::Professional => &mut self.professional,
            TierName::Enterprise => &mut self.enterprise,
        }
    }

    fn normalize(self) -> Self {
        Self {
            starter: self.starter.normalize(TierName::Starter),
            professional: self.professional.normalize(TierName::Professional),
            enterprise: self.enterprise.normalize(TierName::Enterprise),
        }
    }
}

/// A client case study attached to a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CaseStudy {
    /// Headline.
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    /// Client name.
    #[validate(length(min = 1, message = "is required"))]
    pub client: String,
    /// Summary of the work.
    #[validate(length(min = 1, message = "is required"))]
    pub description: String,
    /// Optional illustration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A frequently asked question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FaqEntry {
    /// The question.
    #[validate(length(min = 1, message = "is required"))]
    pub question: String,
    /// The answer.
    #[validate(length(min = 1, message = "is required"))]
    pub answer: String,
}

/// A service with its landing-page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Sequential id.
    pub id: i64,
    /// Service name.
    pub title: String,
    /// Card summary.
    #[serde(default)]
    pub description: String,
    /// Detail page body.
    #[serde(default)]
    pub full_description: String,
    /// Card icon.
    #[serde(default)]
    pub icon: ServiceIcon,
    /// Card image.
    #[serde(default)]
    pub image: String,
    /// Detail page hero image.
    #[serde(default)]
    pub cover_image: String,
    /// Benefits, in order.
    #[serde(default)]
    pub benefits: Vec<String>,
    /// Process steps; step N is at index N - 1.
    #[serde(default)]
    pub process: Vec<String>,
    /// Pricing tiers.
    #[serde(default)]
    pub pricing: Pricing,
    /// Case studies.
    #[serde(default)]
    pub case_studies: Vec<CaseStudy>,
    /// Frequently asked questions.
    #[serde(default)]
    pub faq: Vec<FaqEntry>,
    /// Explicit display position; unset sorts last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Service {
    /// Create a service with the required fields and defaults elsewhere.
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            full_description: String::new(),
            icon: ServiceIcon::default(),
            image: String::new(),
            cover_image: String::new(),
            benefits: Vec::new(),
            process: Vec::new(),
            pricing: Pricing::default(),
            case_studies: Vec::new(),
            faq: Vec::new(),
            order: None,
        }
    }

    /// Process steps numbered from 1.
    pub fn steps(&self) -> impl Iterator<Item = (usize, &str)> {
        self.process
            .iter()
            .enumerate()
            .map(|(i, step)| (i + 1, step.as_str()))
    }

    /// Image for the detail page hero: the cover image, else the card image.
    #[must_use]
    pub fn hero_image(&self) -> &str {
        if self.cover_image.is_empty() {
            &self.image
        } else {
            &self.cover_image
        }
    }
}

impl Record for Service {
    const NAME: &'static str = "services";
    const SCHEMA_VERSION: u32 = 1;
    const ID_STRATEGY: IdStrategy = IdStrategy::Sequential;

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
            description: self.description.trim().to_string(),
            full_description: self.full_description.trim().to_string(),
            image: self.image.trim().to_string(),
            cover_image: self.cover_image.trim().to_string(),
            benefits: clean_list(self.benefits),
            process: clean_list(self.process),
            pricing: self.pricing.normalize(),
            case_studies: self
                .case_studies
                .into_iter()
                .filter(|c| !c.title.trim().is_empty())
                .map(|c| CaseStudy {
                    title: c.title.trim().to_string(),
                    client: c.client.trim().to_string(),
                    description: c.description.trim().to_string(),
                    image: c
                        .image
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty()),
                })
                .collect(),
            faq: self
                .faq
                .into_iter()
                .filter(|f| !f.question.trim().is_empty())
                .map(|f| FaqEntry {
                    question: f.question.trim().to_string(),
                    answer: f.answer.trim().to_string(),
                })
                .collect(),
            ..self
        }
    }

    fn migrate(mut value: Value, from_version: u32) -> Value {
        if from_version == 0 {
            if let Value::Object(map) = &mut value {
                number_from_string(map, "id");
                optional_integer(map, "order");
                list_from_scalar(map, "benefits");
                list_from_scalar(map, "process");
                if let Some(Value::Object(pricing)) = map.get_mut("pricing") {
                    for tier in TierName::ALL {
                        if let Some(Value::Object(entry)) = pricing.get_mut(tier.key()) {
                            string_from_number(entry, "price");
                            list_from_scalar(entry, "features");
                        }
                    }
                }
            }
        }
        value
    }
}
