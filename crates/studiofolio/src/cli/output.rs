//! Text rendering of listings, detail views and reports.
//!
//! Every function returns the finished text; the binary only prints it.

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::json;

use super::OutputFormat;
use crate::error::Result;
use crate::model::{Message, Project, Service, Settings, Testimonial};
use crate::render::Detail;
use crate::repo::ContentStats;

/// Widest a table cell gets before it is cut.
const MAX_CELL_CHARS: usize = 40;

/// A record that can be shown as a table row and a field list.
pub trait Tabular: Serialize {
    /// Column headers.
    const HEADERS: &'static [&'static str];

    /// Cells in [`Tabular::HEADERS`] order.
    fn row(&self) -> Vec<String>;

    /// One-line summary for plain listings.
    fn summary(&self) -> String;

    /// Labelled fields for plain detail views.
    fn fields(&self) -> Vec<(&'static str, String)>;

    /// Short name used for navigation links.
    fn label(&self) -> String;
}

fn order_cell(order: Option<i64>) -> String {
    order.map_or_else(|| "-".to_string(), |o| o.to_string())
}

impl Tabular for Project {
    const HEADERS: &'static [&'static str] = &["ID", "ORDER", "TITLE", "CATEGORY", "SIZE"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            order_cell(self.order),
            self.title.clone(),
            self.category.clone(),
            self.size.to_string(),
        ]
    }

    fn summary(&self) -> String {
        format!("#{} {} [{}]", self.id, self.title, self.category)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Title", self.title.clone()),
            ("Category", self.category.clone()),
            ("Image", self.image.clone()),
            ("Layout", format!("{} / {}", self.size, self.alignment)),
        ];
        for (name, value) in [
            ("Client", &self.client),
            ("Year", &self.year),
            ("Date", &self.date),
            ("Link", &self.link),
            ("URL", &self.url),
            ("Description", &self.description),
        ] {
            if let Some(value) = value {
                fields.push((name, value.clone()));
            }
        }
        for (i, image) in self.additional_images.iter().enumerate() {
            fields.push(if i == 0 { ("Gallery", image.clone()) } else { ("", image.clone()) });
        }
        fields
    }

    fn label(&self) -> String {
        format!("#{} {}", self.id, self.title)
    }
}

impl Tabular for Service {
    const HEADERS: &'static [&'static str] = &["ID", "ORDER", "TITLE", "ICON", "STARTING AT"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            order_cell(self.order),
            self.title.clone(),
            self.icon.to_string(),
            self.pricing.starter.price.clone(),
        ]
    }

    fn summary(&self) -> String {
        format!("#{} {}: {}", self.id, self.title, self.description)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Title", self.title.clone()),
            ("Icon", self.icon.to_string()),
            ("Summary", self.description.clone()),
            ("Hero image", self.hero_image().to_string()),
        ];
        if !self.full_description.is_empty() {
            fields.push(("Description", self.full_description.clone()));
        }
        for benefit in &self.benefits {
            fields.push(("Benefit", benefit.clone()));
        }
        for (step, text) in self.steps() {
            fields.push(("Step", format!("{step}. {text}")));
        }
        for tier in crate::model::TierName::ALL {
            let pricing = self.pricing.tier(tier);
            if !pricing.price.is_empty() || !pricing.features.is_empty() {
                let features = pricing.features.join(", ");
                fields.push(("Tier", format!("{}: {} ({features})", pricing.name, pricing.price)));
            }
        }
        for study in &self.case_studies {
            fields.push(("Case study", format!("{} for {}", study.title, study.client)));
        }
        for entry in &self.faq {
            fields.push(("Q", entry.question.clone()));
            fields.push(("A", entry.answer.clone()));
        }
        fields
    }

    fn label(&self) -> String {
        format!("#{} {}", self.id, self.title)
    }
}

impl Tabular for Testimonial {
    const HEADERS: &'static [&'static str] = &["ID", "ORDER", "AUTHOR", "QUOTE"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            order_cell(self.order),
            self.author.clone(),
            self.quote.clone(),
        ]
    }

    fn summary(&self) -> String {
        format!("#{} \"{}\" - {}", self.id, self.quote, self.author)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Quote", self.quote.clone()),
            ("Author", self.author.clone()),
            ("Byline", self.byline()),
            ("Image", self.image.clone()),
        ]
    }

    fn label(&self) -> String {
        format!("#{} {}", self.id, self.author)
    }
}

impl Tabular for Message {
    const HEADERS: &'static [&'static str] = &["ID", "", "FROM", "RECEIVED", "MESSAGE"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            if self.read { String::new() } else { "*".to_string() },
            self.name.clone(),
            self.received_at()
                .map_or_else(|| self.date.clone(), |at| at.format("%Y-%m-%d %H:%M").to_string()),
            self.preview(MAX_CELL_CHARS),
        ]
    }

    fn summary(&self) -> String {
        let flag = if self.read { ' ' } else { '*' };
        format!("{flag} #{} {} <{}>: {}", self.id, self.name, self.email, self.preview(60))
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("From", format!("{} <{}>", self.name, self.email)),
            ("Received", self.date.clone()),
            ("Status", if self.read { "read" } else { "unread" }.to_string()),
            ("Message", self.message.clone()),
        ]
    }

    fn label(&self) -> String {
        format!("#{} {}", self.id, self.name)
    }
}

/// Render a listing.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn list<R: Tabular>(records: &[R], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Plain => records
            .iter()
            .map(Tabular::summary)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Table => table(R::HEADERS, records.iter().map(Tabular::row).collect()),
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
    })
}

/// Render one record without navigation.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn record<R: Tabular>(record: &R, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Plain => field_list(&record.fields()),
        OutputFormat::Table => field_table(&record.fields()),
        OutputFormat::Json => serde_json::to_string_pretty(record)?,
    })
}

/// Render a detail page, including the not-found state.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn detail<R: Tabular>(view: &Detail<R>, collection: &str, format: OutputFormat) -> Result<String> {
    match view {
        Detail::NotFound { id } => Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(&json!({"found": false, "id": id}))?,
            _ => format!("No {collection} record with id {id}."),
        }),
        Detail::Found { record: found, prev, next } => match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "found": true,
                "record": found,
                "prev": prev,
                "next": next,
            }))?),
            _ => Ok(format!(
                "{}\n\n< {}    {} >",
                record(found, format)?,
                prev.label(),
                next.label()
            )),
        },
    }
}

/// Render the project category list.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn categories(categories: &[String], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(categories)?,
        OutputFormat::Plain => categories.join("\n"),
        OutputFormat::Table => table(
            &["CATEGORY"],
            categories.iter().map(|c| vec![c.clone()]).collect(),
        ),
    })
}

/// Render dashboard counts.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn stats(stats: &ContentStats, format: OutputFormat) -> Result<String> {
    let rows = [
        ("Backend", stats.backend.to_string()),
        ("Location", stats.location.clone()),
        ("Projects", stats.projects.to_string()),
        ("Services", stats.services.to_string()),
        ("Testimonials", stats.testimonials.to_string()),
        (
            "Messages",
            format!("{} ({} unread)", stats.messages, stats.unread_messages),
        ),
        ("Stored keys", stats.keys.to_string()),
        (
            "Last updated",
            stats.last_updated.map_or_else(
                || "unknown".to_string(),
                |t| t.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ),
    ];
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "backend": stats.backend,
            "location": stats.location,
            "projects": stats.projects,
            "services": stats.services,
            "testimonials": stats.testimonials,
            "messages": stats.messages,
            "unreadMessages": stats.unread_messages,
            "keys": stats.keys,
            "lastUpdated": stats.last_updated,
        }))?,
        OutputFormat::Plain => field_list(&rows),
        OutputFormat::Table => field_table(&rows),
    })
}

/// Render the settings document.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn settings(settings: &Settings, format: OutputFormat) -> Result<String> {
    let mut rows = vec![
        ("Site title", settings.site_title.clone()),
        ("Tagline", settings.tagline.clone()),
        ("Contact email", settings.contact_email.clone()),
        ("Phone", settings.phone.clone()),
        ("Address", settings.address.clone()),
    ];
    for (i, link) in settings.social_links.iter().enumerate() {
        rows.push(("Link", format!("[{i}] {} {}", link.label, link.url)));
    }
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(settings)?,
        OutputFormat::Plain => field_list(&rows),
        OutputFormat::Table => field_table(&rows),
    })
}

fn field_list(fields: &[(&'static str, String)]) -> String {
    let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0) + 1;
    fields
        .iter()
        .map(|(name, value)| {
            let label = if name.is_empty() {
                String::new()
            } else {
                format!("{name}:")
            };
            format!("{label:<width$} {value}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn field_table(fields: &[(&'static str, String)]) -> String {
    table(
        &["FIELD", "VALUE"],
        fields
            .iter()
            .map(|(name, value)| vec![(*name).to_string(), value.clone()])
            .collect(),
    )
}

fn cut(cell: &str) -> String {
    let line = cell.lines().next().unwrap_or_default();
    if line.chars().count() <= MAX_CELL_CHARS && !cell.contains('\n') {
        line.to_string()
    } else {
        let kept: String = line.chars().take(MAX_CELL_CHARS - 1).collect();
        format!("{kept}…")
    }
}

/// Lay out rows under headers with space-padded columns.
#[must_use]
pub fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| row.iter().map(|cell| cut(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![line(headers.to_vec())];
    out.push(line(rule.iter().map(String::as_str).collect()));
    for row in &rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render;

    fn sample_projects() -> Vec<Project> {
        let mut a = Project::new(1, "Rebrand", "Branding");
        a.order = Some(0);
        let b = Project::new(2, "Poster", "Print");
        vec![a, b]
    }

    #[test]
    fn test_table_aligns_columns() {
        let text = table(
            &["ID", "NAME"],
            vec![
                vec!["1".to_string(), "Ada".to_string()],
                vec!["100".to_string(), "Bo".to_string()],
            ],
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID   NAME");
        assert_eq!(lines[1], "---  ----");
        assert_eq!(lines[2], "1    Ada");
        assert_eq!(lines[3], "100  Bo");
    }

    #[test]
    fn test_table_cuts_long_cells() {
        let text = table(&["X"], vec![vec!["y".repeat(100)]]);
        let last = text.lines().last().unwrap();
        assert_eq!(last.chars().count(), MAX_CELL_CHARS);
        assert!(last.ends_with('…'));
    }

    #[test]
    fn test_list_formats() {
        let projects = sample_projects();
        let plain = list(&projects, OutputFormat::Plain).unwrap();
        assert_eq!(plain.lines().next(), Some("#1 Rebrand [Branding]"));

        let table = list(&projects, OutputFormat::Table).unwrap();
        assert!(table.starts_with("ID"));
        assert!(table.contains("col-6"));

        let json = list(&projects, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["title"], "Poster");
    }

    #[test]
    fn test_detail_found_shows_navigation() {
        let projects = sample_projects();
        let view = render::detail(&projects, 1);
        let text = detail(&view, "projects", OutputFormat::Plain).unwrap();
        assert!(text.contains("Rebrand"));
        assert!(text.ends_with("< #2 Poster    #2 Poster >"));
    }

    #[test]
    fn test_detail_not_found() {
        let projects = sample_projects();
        let view = render::detail(&projects, 9);
        let text = detail(&view, "projects", OutputFormat::Plain).unwrap();
        assert_eq!(text, "No projects record with id 9.");

        let json = detail(&view, "projects", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["found"], false);
    }

    #[test]
    fn test_service_steps_numbered_from_one() {
        let mut service = Service::new(1, "Web");
        service.process = vec!["Discover".to_string(), "Build".to_string()];
        let text = record(&service, OutputFormat::Plain).unwrap();
        assert!(text.contains("1. Discover"));
        assert!(text.contains("2. Build"));
    }

    #[test]
    fn test_message_row_marks_unread() {
        let message = Message::new(5, "Ada", "ada@example.com", "Hello");
        assert_eq!(message.row()[1], "*");
        assert!(message.summary().starts_with("* #5"));
    }

    #[test]
    fn test_stats_json_keys() {
        let stats = ContentStats {
            backend: "memory",
            location: "memory".to_string(),
            projects: 2,
            services: 1,
            testimonials: 0,
            messages: 3,
            unread_messages: 1,
            keys: 4,
            last_updated: None,
        };
        let json = super::stats(&stats, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["unreadMessages"], 1);
        assert!(value["lastUpdated"].is_null());
        assert!(super::stats(&stats, OutputFormat::Plain)
            .unwrap()
            .contains("3 (1 unread)"));
    }

    #[test]
    fn test_stats_last_updated() {
        let stats = ContentStats {
            backend: "sqlite",
            location: "content.db".to_string(),
            projects: 0,
            services: 0,
            testimonials: 0,
            messages: 0,
            unread_messages: 0,
            keys: 1,
            last_updated: chrono::DateTime::parse_from_rfc3339("2026-03-01T09:30:00Z")
                .ok()
                .map(|t| t.with_timezone(&chrono::Utc)),
        };
        let plain = super::stats(&stats, OutputFormat::Plain).unwrap();
        assert!(plain.contains("2026-03-01T09:30:00Z"));
    }
}
