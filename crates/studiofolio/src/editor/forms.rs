//! Forms for each editable record type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::arrays::{apply_raw, unknown_field, ArrayEdit};
use super::Form;
use crate::error::{FieldErrors, Result};
use crate::model::{
    Alignment, CaseStudy, FaqEntry, Message, Pricing, Project, ProjectSize, Service, ServiceIcon,
    Testimonial, TierName,
};

fn trim(text: &mut String) {
    *text = text.trim().to_string();
}

fn trim_optional(text: &mut Option<String>) {
    *text = text
        .take()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
}

fn trim_all(items: &mut [String]) {
    items.iter_mut().for_each(trim);
}

fn check_blank_entries(field: &str, items: &[String], errors: &mut FieldErrors) {
    for (index, item) in items.iter().enumerate() {
        if item.is_empty() {
            errors.add(format!("{field}[{index}]"), "must not be blank");
        }
    }
}

/// Editor form for a portfolio project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectForm {
    /// Id being edited; `None` creates a new project.
    pub id: Option<i64>,
    /// Project title.
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    /// Portfolio filter category.
    #[validate(length(min = 1, message = "is required"))]
    pub category: String,
    /// Cover image URL or `data:` URI.
    #[validate(length(min = 1, message = "is required"))]
    pub image: String,
    /// Long description.
    pub description: Option<String>,
    /// Client name.
    pub client: Option<String>,
    /// Free-form date text.
    pub date: Option<String>,
    /// External link.
    #[validate(url(message = "must be a valid URL"))]
    pub link: Option<String>,
    /// Four-digit year.
    pub year: Option<String>,
    /// Live site URL.
    #[validate(url(message = "must be a valid URL"))]
    pub url: Option<String>,
    /// Grid width.
    pub size: ProjectSize,
    /// Placement within the row.
    pub alignment: Alignment,
    /// Gallery images, in order.
    pub additional_images: Vec<String>,
    /// Explicit grid position.
    pub order: Option<i64>,
}

impl Form for ProjectForm {
    type Record = Project;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn tidy(&mut self) {
        trim(&mut self.title);
        trim(&mut self.category);
        trim(&mut self.image);
        for field in [
            &mut self.description,
            &mut self.client,
            &mut self.date,
            &mut self.link,
            &mut self.year,
            &mut self.url,
        ] {
            trim_optional(field);
        }
        trim_all(&mut self.additional_images);
    }

    fn check(&self, errors: &mut FieldErrors) {
        if let Some(year) = &self.year {
            if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
                errors.add("year", "must be a four-digit year");
            }
        }
        check_blank_entries("additionalImages", &self.additional_images, errors);
    }

    fn into_record(self, id: i64) -> Project {
        Project {
            id,
            title: self.title,
            category: self.category,
            image: self.image,
            description: self.description,
            client: self.client,
            date: self.date,
            link: self.link,
            year: self.year,
            url: self.url,
            size: self.size,
            alignment: self.alignment,
            additional_images: self.additional_images,
            order: self.order,
        }
    }

    fn from_record(record: &Project) -> Self {
        let record = record.clone();
        Self {
            id: Some(record.id),
            title: record.title,
            category: record.category,
            image: record.image,
            description: record.description,
            client: record.client,
            date: record.date,
            link: record.link,
            year: record.year,
            url: record.url,
            size: record.size,
            alignment: record.alignment,
            additional_images: record.additional_images,
            order: record.order,
        }
    }

    fn edit_list(&mut self, field: &str, edit: ArrayEdit<Value>) -> Result<()> {
        match field {
            "additionalImages" => apply_raw(&mut self.additional_images, field, edit),
            _ => unknown_field(field),
        }
    }
}

/// Editor form for a service and its landing-page content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceForm {
    /// Id being edited; `None` creates a new service.
    pub id: Option<i64>,
    /// Service name.
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    /// Card summary.
    #[validate(length(min = 1, message = "is required"))]
    pub description: String,
    /// Detail page body.
    pub full_description: String,
    /// Card icon.
    pub icon: ServiceIcon,
    /// Card image.
    pub image: String,
    /// Detail page hero image.
    pub cover_image: String,
    /// Benefits, in order.
    pub benefits: Vec<String>,
    /// Process steps, in order.
    pub process: Vec<String>,
    /// Pricing tiers.
    #[validate(nested)]
    pub pricing: Pricing,
    /// Case studies.
    #[validate(nested)]
    pub case_studies: Vec<CaseStudy>,
    /// Frequently asked questions.
    #[validate(nested)]
    pub faq: Vec<FaqEntry>,
    /// Explicit display position.
    pub order: Option<i64>,
}

impl Form for ServiceForm {
    type Record = Service;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn tidy(&mut self) {
        for field in [
            &mut self.title,
            &mut self.description,
            &mut self.full_description,
            &mut self.image,
            &mut self.cover_image,
        ] {
            trim(field);
        }
        trim_all(&mut self.benefits);
        trim_all(&mut self.process);
        for tier in TierName::ALL {
            let tier = self.pricing.tier_mut(tier);
            trim(&mut tier.name);
            trim(&mut tier.price);
            trim_all(&mut tier.features);
        }
        for study in &mut self.case_studies {
            trim(&mut study.title);
            trim(&mut study.client);
            trim(&mut study.description);
            trim_optional(&mut study.image);
        }
        for entry in &mut self.faq {
            trim(&mut entry.question);
            trim(&mut entry.answer);
        }
    }

    fn check(&self, errors: &mut FieldErrors) {
        check_blank_entries("benefits", &self.benefits, errors);
        check_blank_entries("process", &self.process, errors);
        for tier in TierName::ALL {
            check_blank_entries(
                &format!("pricing.{}.features", tier.key()),
                &self.pricing.tier(tier).features,
                errors,
            );
        }
    }

    fn into_record(self, id: i64) -> Service {
        Service {
            id,
            title: self.title,
            description: self.description,
            full_description: self.full_description,
            icon: self.icon,
            image: self.image,
            cover_image: self.cover_image,
            benefits: self.benefits,
            process: self.process,
            pricing: self.pricing,
            case_studies: self.case_studies,
            faq: self.faq,
            order: self.order,
        }
    }

    fn from_record(record: &Service) -> Self {
        let record = record.clone();
        Self {
            id: Some(record.id),
            title: record.title,
            description: record.description,
            full_description: record.full_description,
            icon: record.icon,
            image: record.image,
            cover_image: record.cover_image,
            benefits: record.benefits,
            process: record.process,
            pricing: record.pricing,
            case_studies: record.case_studies,
            faq: record.faq,
            order: record.order,
        }
    }

    fn edit_list(&mut self, field: &str, edit: ArrayEdit<Value>) -> Result<()> {
        match field {
            "benefits" => apply_raw(&mut self.benefits, field, edit),
            "process" => apply_raw(&mut self.process, field, edit),
            "caseStudies" => apply_raw(&mut self.case_studies, field, edit),
            "faq" => apply_raw(&mut self.faq, field, edit),
            _ => {
                let tier = TierName::ALL
                    .into_iter()
                    .find(|tier| field == format!("pricing.{}.features", tier.key()));
                match tier {
                    Some(tier) => apply_raw(&mut self.pricing.tier_mut(tier).features, field, edit),
                    None => unknown_field(field),
                }
            }
        }
    }
}

/// Editor form for a testimonial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialForm {
    /// Id being edited; `None` creates a new testimonial.
    pub id: Option<i64>,
    /// The quote.
    #[validate(length(min = 1, message = "is required"))]
    pub quote: String,
    /// Who said it.
    #[validate(length(min = 1, message = "is required"))]
    pub author: String,
    /// Their role.
    pub position: String,
    /// Their company.
    pub company: String,
    /// Portrait.
    pub image: String,
    /// Explicit carousel position.
    pub order: Option<i64>,
}

impl Form for TestimonialForm {
    type Record = Testimonial;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn tidy(&mut self) {
        for field in [
            &mut self.quote,
            &mut self.author,
            &mut self.position,
            &mut self.company,
            &mut self.image,
        ] {
            trim(field);
        }
    }

    fn into_record(self, id: i64) -> Testimonial {
        Testimonial {
            id,
            quote: self.quote,
            author: self.author,
            position: self.position,
            company: self.company,
            image: self.image,
            order: self.order,
        }
    }

    fn from_record(record: &Testimonial) -> Self {
        let record = record.clone();
        Self {
            id: Some(record.id),
            quote: record.quote,
            author: record.author,
            position: record.position,
            company: record.company,
            image: record.image,
            order: record.order,
        }
    }

    fn edit_list(&mut self, field: &str, _edit: ArrayEdit<Value>) -> Result<()> {
        unknown_field(field)
    }
}

/// The public contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    /// Sender name.
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    /// Reply address.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Body text.
    #[validate(length(min = 10, message = "must be at least 10 characters"))]
    pub message: String,
}

impl ContactForm {
    /// Trim every field.
    pub fn tidy(&mut self) {
        trim(&mut self.name);
        trim(&mut self.email);
        trim(&mut self.message);
    }

    /// The unread message this form submits. The id is assigned on insert.
    #[must_use]
    pub fn into_message(self) -> Message {
        Message::new(0, self.name, self.email, self.message)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::editor::validate_form;

    #[test]
    fn test_project_form_tidy_blanks_to_none() {
        let mut form = ProjectForm {
            title: " Logo ".to_string(),
            category: "Branding".to_string(),
            image: "a.jpg".to_string(),
            client: Some("  ".to_string()),
            ..ProjectForm::default()
        };
        validate_form(&mut form).unwrap();
        assert_eq!(form.title, "Logo");
        assert!(form.client.is_none());
    }

    #[test]
    fn test_project_year_must_be_digits() {
        let mut form = ProjectForm {
            title: "Logo".to_string(),
            category: "Branding".to_string(),
            image: "a.jpg".to_string(),
            year: Some("last year".to_string()),
            ..ProjectForm::default()
        };
        let err = validate_form(&mut form).unwrap_err();
        assert!(err.field_errors().unwrap().has("year"));

        form.year = Some("2023".to_string());
        assert!(validate_form(&mut form).is_ok());
    }

    #[test]
    fn test_project_form_deserializes_camel_case() {
        let form: ProjectForm = serde_json::from_value(json!({
            "title": "Site",
            "additionalImages": ["b.jpg"],
            "size": "large"
        }))
        .unwrap();
        assert_eq!(form.additional_images, vec!["b.jpg"]);
        assert_eq!(form.size, ProjectSize::Col8);
        assert!(form.id.is_none());
    }

    #[test]
    fn test_project_record_roundtrip() {
        let mut project = Project::new(7, "Site", "Web");
        project.additional_images = vec!["x.jpg".to_string()];
        let form = ProjectForm::from_record(&project);
        assert_eq!(form.id, Some(7));
        assert_eq!(form.into_record(7), project);
    }

    #[test]
    fn test_service_list_fields() {
        let mut form = ServiceForm::default();
        form.edit_list("benefits", ArrayEdit::Append(json!("Faster launches")))
            .unwrap();
        form.edit_list("process", ArrayEdit::Append(json!("Discover")))
            .unwrap();
        form.edit_list("process", ArrayEdit::Insert(0, json!("Kickoff")))
            .unwrap();
        form.edit_list(
            "pricing.enterprise.features",
            ArrayEdit::Append(json!("Dedicated lead")),
        )
        .unwrap();
        form.edit_list(
            "caseStudies",
            ArrayEdit::Append(json!({"title": "T", "client": "C", "description": "D"})),
        )
        .unwrap();

        assert_eq!(form.benefits, vec!["Faster launches"]);
        assert_eq!(form.process, vec!["Kickoff", "Discover"]);
        assert_eq!(form.pricing.enterprise.features, vec!["Dedicated lead"]);
        assert_eq!(form.case_studies[0].client, "C");

        assert!(form
            .edit_list("pricing.gold.features", ArrayEdit::Remove(0))
            .is_err());
        assert!(form.edit_list("faq", ArrayEdit::Remove(0)).is_err());
    }

    #[test]
    fn test_service_pricing_errors_are_nested() {
        let mut form = ServiceForm {
            title: "Web".to_string(),
            description: "Sites".to_string(),
            ..ServiceForm::default()
        };
        form.pricing.starter.price = "x".repeat(41);
        form.pricing.professional.features = vec!["ok".to_string(), " ".to_string()];

        let err = validate_form(&mut form).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.has("pricing.starter.price"), "{fields}");
        assert!(fields.has("pricing.professional.features[1]"), "{fields}");
    }

    #[test]
    fn test_testimonial_has_no_list_fields() {
        let mut form = TestimonialForm::default();
        assert!(form
            .edit_list("quote", ArrayEdit::Append(json!("x")))
            .is_err());
    }

    #[test]
    fn test_contact_form_into_message() {
        let form = ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello there, studio!".to_string(),
        };
        let message = form.into_message();
        assert!(!message.read);
        assert!(message.received_at().is_some());
    }
}
