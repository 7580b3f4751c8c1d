//! Site-wide settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A link in the footer's social row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SocialLink {
    /// Link text, e.g. `Instagram`.
    #[validate(length(min = 1, message = "is required"))]
    pub label: String,
    /// Target URL.
    #[validate(url(message = "must be a valid URL"))]
    pub url: String,
}

/// The single settings document.
///
/// Unlike the other collections this is one JSON object, not an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Site title shown in the header and page titles.
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub site_title: String,
    /// Hero tagline.
    #[validate(length(max = 240, message = "must be at most 240 characters"))]
    pub tagline: String,
    /// Address shown on the contact page.
    #[validate(email(message = "must be a valid email address"))]
    pub contact_email: String,
    /// Phone number.
    pub phone: String,
    /// Postal address.
    pub address: String,
    /// Footer social links.
    #[validate(nested)]
    pub social_links: Vec<SocialLink>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_title: "Studio".to_string(),
            tagline: String::new(),
            contact_email: "hello@example.com".to_string(),
            phone: String::new(),
            address: String::new(),
            social_links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"tagline": "We make things"}"#).unwrap();
        assert_eq!(settings.tagline, "We make things");
        assert_eq!(settings.site_title, "Studio");
    }

    #[test]
    fn test_invalid_email_rejected() {
        let settings = Settings {
            contact_email: "nope".to_string(),
            ..Settings::default()
        };
        let errors = settings.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
    }
}
