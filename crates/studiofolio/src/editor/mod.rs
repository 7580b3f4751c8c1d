//! Admin editors.
//!
//! An editor is a validated [`Form`] bound to one record type. Submitting a
//! form validates it, reads the collection fresh from the store, inserts or
//! updates the one record and writes the whole collection back. A form that
//! fails validation saves nothing and reports every problem as a
//! `field path → message` pair.

mod arrays;
mod forms;

use std::fmt::Debug;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::collection;
use crate::error::{Error, FieldErrors, Result};
use crate::model::{Message, Record, Settings};
use crate::repo::{Repository, Stored};
use crate::store::Revision;

pub use arrays::{apply_raw, decode_item, unknown_field, ArrayEdit, FieldArray};
pub use forms::{ContactForm, ProjectForm, ServiceForm, TestimonialForm};

/// A form that edits one record type.
pub trait Form: Validate + Serialize + DeserializeOwned + Debug {
    /// The record the form produces.
    type Record: Stored;

    /// Id being edited, or `None` for a new record.
    fn id(&self) -> Option<i64>;

    /// Set the id being edited.
    fn set_id(&mut self, id: Option<i64>);

    /// Trim input and turn blank optionals into `None` before validation.
    fn tidy(&mut self) {}

    /// Rules the derive can't express. Add to `errors`; don't clear it.
    fn check(&self, _errors: &mut FieldErrors) {}

    /// Build the record. `id` is the id to save under.
    fn into_record(self, id: i64) -> Self::Record;

    /// Populate the form from a stored record.
    fn from_record(record: &Self::Record) -> Self;

    /// Apply an edit to one of the form's list fields.
    ///
    /// # Errors
    ///
    /// Returns a field-level validation error for an unknown field, a bad
    /// item or an out-of-range index.
    fn edit_list(&mut self, field: &str, edit: ArrayEdit<Value>) -> Result<()>;
}

/// Tidy and validate a form.
///
/// # Errors
///
/// Returns [`Error::Validation`] with every failing field.
pub fn validate_form<F: Form>(form: &mut F) -> Result<()> {
    form.tidy();
    let mut errors = FieldErrors::new();
    if let Err(e) = form.validate() {
        collect_errors(&e, "", &mut errors);
    }
    form.check(&mut errors);
    errors.into_result()
}

/// Flatten `validator` errors into dotted camelCase paths.
///
/// Nested structs become `pricing.starter.name`, list items
/// `caseStudies[0].title`.
pub fn collect_errors(errors: &ValidationErrors, prefix: &str, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let name = camel_case(&field.to_string());
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| format!("failed `{}` check", error.code), ToString::to_string);
                    out.add(path.clone(), message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Validate and save a form: update if it carries an id, insert otherwise.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the form is invalid (nothing is saved),
/// [`Error::NotFound`] if it names an id that doesn't exist.
pub fn submit<F: Form>(repo: &Repository, mut form: F) -> Result<F::Record> {
    validate_form(&mut form)?;
    match form.id() {
        Some(id) => repo.update(form.into_record(id)),
        None => repo.insert(form.into_record(0)),
    }
}

/// Like [`submit`], but refuse to save if the collection changed since
/// `expected` was read.
///
/// # Errors
///
/// Returns [`Error::Conflict`] on a concurrent write, plus the errors of
/// [`submit`].
pub fn submit_if_unchanged<F: Form>(
    repo: &Repository,
    mut form: F,
    expected: Option<&Revision>,
) -> Result<(F::Record, Revision)> {
    validate_form(&mut form)?;
    let mut records = repo.load::<F::Record>()?;
    let id = match form.id() {
        Some(id) => {
            let record = form.into_record(id).normalize();
            collection::update(&mut records, record, <F::Record as Record>::NAME)?;
            id
        }
        None => collection::insert(
            &mut records,
            form.into_record(0).normalize(),
            Utc::now().timestamp_millis(),
        )?,
    };
    let revision = repo.save_if_unchanged(&records, expected)?;
    let saved = collection::find(&records, id)
        .cloned()
        .ok_or_else(|| Error::internal("saved record vanished"))?;
    info!(id, revision = %revision, "Saved record with revision check");
    Ok((saved, revision))
}

/// Load a record into its form for editing.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the id doesn't exist.
pub fn edit<F: Form>(repo: &Repository, id: i64) -> Result<F> {
    let record = repo
        .find::<F::Record>(id)?
        .ok_or_else(|| Error::not_found(<F::Record as Record>::NAME, id))?;
    Ok(F::from_record(&record))
}

/// Load a record's form and overlay the fields present in `changes`.
///
/// Fields not named in `changes` keep their stored values.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the id doesn't exist, or a validation
/// error if `changes` isn't an object or a field has the wrong type.
pub fn patch<F: Form>(repo: &Repository, id: i64, changes: Value) -> Result<F> {
    let Value::Object(changes) = changes else {
        let mut errors = FieldErrors::new();
        errors.add("form", "must be a JSON object");
        return Err(errors.into());
    };

    let mut base = serde_json::to_value(edit::<F>(repo, id)?)?;
    if let Value::Object(fields) = &mut base {
        for (field, value) in changes {
            if field != "id" {
                fields.insert(field, value);
            }
        }
    }
    let mut form: F = decode_item("form", base)?;
    form.set_id(Some(id));
    debug!(id, "Patched form");
    Ok(form)
}

/// Record a message from the public contact form.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the form is invalid.
pub fn submit_contact(repo: &Repository, mut form: ContactForm) -> Result<Message> {
    form.tidy();
    let mut errors = FieldErrors::new();
    if let Err(e) = form.validate() {
        collect_errors(&e, "", &mut errors);
    }
    errors.into_result()?;
    repo.insert(form.into_message())
}

/// Set a message's read flag. Returns the updated message.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the id doesn't exist.
pub fn mark_read(repo: &Repository, id: i64, read: bool) -> Result<Message> {
    let mut message = repo
        .find::<Message>(id)?
        .ok_or_else(|| Error::not_found(Message::NAME, id))?;
    if message.read == read {
        return Ok(message);
    }
    message.read = read;
    repo.update(message)
}

/// Validate and save the settings document.
///
/// # Errors
///
/// Returns [`Error::Validation`] if a setting is invalid (nothing is saved).
pub fn save_settings(repo: &Repository, mut settings: Settings) -> Result<Settings> {
    tidy_settings(&mut settings);
    let mut errors = FieldErrors::new();
    if let Err(e) = settings.validate() {
        collect_errors(&e, "", &mut errors);
    }
    errors.into_result()?;
    repo.save_settings(&settings)?;
    Ok(settings)
}

/// Apply an edit to a list field of the settings document.
///
/// # Errors
///
/// Returns a field-level validation error for an unknown field, a bad
/// item or an out-of-range index.
pub fn edit_settings_list(settings: &mut Settings, field: &str, edit: ArrayEdit<Value>) -> Result<()> {
    match field {
        "socialLinks" => apply_raw(&mut settings.social_links, field, edit),
        _ => unknown_field(field),
    }
}

fn tidy_settings(settings: &mut Settings) {
    for text in [
        &mut settings.site_title,
        &mut settings.tagline,
        &mut settings.contact_email,
        &mut settings.phone,
        &mut settings.address,
    ] {
        *text = text.trim().to_string();
    }
    for link in &mut settings.social_links {
        link.label = link.label.trim().to_string();
        link.url = link.url.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::KeysConfig;
    use crate::model::{FaqEntry, Project, ProjectSize, Service, SocialLink};
    use crate::store::MemoryStore;

    fn create_test_repo() -> Repository {
        Repository::new(Box::new(MemoryStore::new()), KeysConfig::default())
    }

    fn project_form(title: &str) -> ProjectForm {
        ProjectForm {
            title: title.to_string(),
            category: "Branding".to_string(),
            image: "https://example.com/a.jpg".to_string(),
            ..ProjectForm::default()
        }
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("case_studies"), "caseStudies");
        assert_eq!(camel_case("title"), "title");
        assert_eq!(camel_case("fullDescription"), "fullDescription");
    }

    #[test]
    fn test_submit_inserts_then_updates() {
        let repo = create_test_repo();
        let created = submit(&repo, project_form("Rebrand")).unwrap();
        assert_eq!(created.title, "Rebrand");

        let mut form: ProjectForm = edit(&repo, created.id).unwrap();
        form.title = "Rebrand 2".to_string();
        let updated = submit(&repo, form).unwrap();
        assert_eq!(updated.id, created.id);

        let all = repo.load::<Project>().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Rebrand 2");
    }

    #[test]
    fn test_invalid_form_saves_nothing() {
        let repo = create_test_repo();
        let mut form = project_form("  ");
        form.link = Some("not a url".to_string());

        let err = submit(&repo, form).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.has("title"));
        assert!(fields.has("link"));
        assert!(repo.store().read("portfolioProjects").unwrap().is_none());
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let repo = create_test_repo();
        let mut form = project_form("Ghost");
        form.id = Some(404);
        assert!(submit(&repo, form).unwrap_err().is_not_found());
    }

    #[test]
    fn test_nested_errors_have_paths() {
        let repo = create_test_repo();
        let mut form = ServiceForm {
            title: "Web".to_string(),
            description: "Sites".to_string(),
            ..ServiceForm::default()
        };
        form.faq.push(FaqEntry {
            question: "How long?".to_string(),
            answer: String::new(),
        });
        form.benefits.push("   ".to_string());

        let err = submit(&repo, form).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.has("faq[0].answer"), "{fields}");
        assert!(fields.has("benefits[0]"), "{fields}");
    }

    #[test]
    fn test_edit_missing_is_not_found() {
        let repo = create_test_repo();
        assert!(edit::<ServiceForm>(&repo, 1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_patch_keeps_other_fields() {
        let repo = create_test_repo();
        let mut form = project_form("Poster");
        form.size = ProjectSize::Full;
        let created = submit(&repo, form).unwrap();

        let patched: ProjectForm =
            patch(&repo, created.id, json!({"title": "Poster series", "id": 1})).unwrap();
        assert_eq!(patched.id, Some(created.id));
        assert_eq!(patched.size, ProjectSize::Full);

        let saved = submit(&repo, patched).unwrap();
        assert_eq!(saved.title, "Poster series");
        assert_eq!(saved.category, "Branding");
    }

    #[test]
    fn test_patch_rejects_non_object() {
        let repo = create_test_repo();
        let created = submit(&repo, project_form("A")).unwrap();
        let err = patch::<ProjectForm>(&repo, created.id, json!([1])).unwrap_err();
        assert!(err.field_errors().unwrap().has("form"));
    }

    #[test]
    fn test_submit_if_unchanged_detects_conflict() {
        let repo = create_test_repo();
        let snapshot = repo.load_snapshot::<Service>().unwrap();
        let form = ServiceForm {
            title: "Web".to_string(),
            description: "Sites".to_string(),
            ..ServiceForm::default()
        };
        let (saved, revision) =
            submit_if_unchanged(&repo, form.clone(), snapshot.revision.as_ref()).unwrap();
        assert_eq!(saved.id, 1);

        // A stale revision is refused.
        let err = submit_if_unchanged(&repo, form.clone(), snapshot.revision.as_ref()).unwrap_err();
        assert!(err.is_conflict());

        // The current one is accepted.
        let (second, _) = submit_if_unchanged(&repo, form, Some(&revision)).unwrap();
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_contact_and_mark_read() {
        let repo = create_test_repo();
        let form = ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "I'd like a new logo please.".to_string(),
        };
        let message = submit_contact(&repo, form).unwrap();
        assert!(!message.read);

        let read = mark_read(&repo, message.id, true).unwrap();
        assert!(read.read);
        assert!(repo.find::<Message>(message.id).unwrap().unwrap().read);
        assert!(mark_read(&repo, 1, true).unwrap_err().is_not_found());
    }

    #[test]
    fn test_contact_validation() {
        let repo = create_test_repo();
        let form = ContactForm {
            name: String::new(),
            email: "nope".to_string(),
            message: "short".to_string(),
        };
        let err = submit_contact(&repo, form).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 3);
        assert!(repo.load::<Message>().unwrap().is_empty());
    }

    #[test]
    fn test_save_settings_validates() {
        let repo = create_test_repo();
        let mut settings = Settings::default();
        settings.social_links.push(SocialLink {
            label: "Instagram".to_string(),
            url: "not-a-url".to_string(),
        });
        let err = save_settings(&repo, settings.clone()).unwrap_err();
        assert!(err.field_errors().unwrap().has("socialLinks[0].url"));

        settings.social_links[0].url = " https://instagram.com/studio ".to_string();
        let saved = save_settings(&repo, settings).unwrap();
        assert_eq!(saved.social_links[0].url, "https://instagram.com/studio");
        assert_eq!(repo.load_settings().unwrap(), saved);
    }

    #[test]
    fn test_edit_settings_list() {
        let mut settings = Settings::default();
        edit_settings_list(
            &mut settings,
            "socialLinks",
            ArrayEdit::Append(json!({"label": "Dribbble", "url": "https://dribbble.com"})),
        )
        .unwrap();
        assert_eq!(settings.social_links.len(), 1);
        assert!(edit_settings_list(&mut settings, "phones", ArrayEdit::Remove(0)).is_err());
    }
}
