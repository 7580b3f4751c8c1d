//! `folio` - CLI for studiofolio
//!
//! This binary edits and inspects the content a studio portfolio site reads
//! from its local content store.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::{json, Value};

use studiofolio::cli::output::{self, Tabular};
use studiofolio::cli::{
    Cli, Command, ConfigCommand, EditCommand, FormInput, MessagesCommand, OutputFormat,
    ProjectsCommand, RecordCommand, SettingsCommand,
};
use studiofolio::editor::{
    self, ArrayEdit, ContactForm, Form, ProjectForm, ServiceForm, TestimonialForm,
};
use studiofolio::model::{Message, Project, Record};
use studiofolio::store::{self, Revision};
use studiofolio::{init_logging, render, Config, Repository};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(cli.config.as_deref(), config_cmd),
        command => command,
    };

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    let repo = Repository::open(&config)
        .with_context(|| format!("opening content store at {}", config.store_location()))?;

    match command {
        Command::Projects(cmd) => handle_projects(&repo, cmd),
        Command::Services(cmd) => handle_records::<ServiceForm>(&repo, cmd),
        Command::Testimonials(cmd) => handle_records::<TestimonialForm>(&repo, cmd),
        Command::Messages(cmd) => handle_messages(&repo, cmd),
        Command::Settings(cmd) => handle_settings(&repo, cmd),
        Command::Stats(cmd) => {
            println!("{}", output::stats(&repo.stats()?, cmd.format)?);
            Ok(())
        }
        Command::Export(cmd) => handle_export(&repo, cmd.output.as_deref()),
        Command::Import(cmd) => handle_import(&repo, &cmd.file),
        Command::Config(_) => unreachable!("handled before the store is opened"),
    }
}

fn handle_projects(repo: &Repository, cmd: ProjectsCommand) -> anyhow::Result<()> {
    match cmd {
        ProjectsCommand::List { category, format } => {
            let snapshot = repo.load_snapshot::<Project>()?;
            let mut listing = render::ordered(snapshot.records);
            if let Some(category) = category {
                listing = render::filter_by_category(listing, &category);
            }
            print_listing(&listing, snapshot.revision.as_ref(), format)
        }
        ProjectsCommand::Categories { format } => {
            let listing = render::load_listing::<Project>(repo)?;
            println!("{}", output::categories(&render::categories(&listing), format)?);
            Ok(())
        }
        ProjectsCommand::Edit(cmd) => handle_edit::<ProjectForm>(repo, cmd),
    }
}

fn handle_records<F>(repo: &Repository, cmd: RecordCommand) -> anyhow::Result<()>
where
    F: Form,
    F::Record: Tabular,
{
    match cmd {
        RecordCommand::List { format } => {
            let snapshot = repo.load_snapshot::<F::Record>()?;
            let listing = render::ordered(snapshot.records);
            print_listing(&listing, snapshot.revision.as_ref(), format)
        }
        RecordCommand::Edit(cmd) => handle_edit::<F>(repo, cmd),
    }
}

fn print_listing<R: Tabular>(
    listing: &[R],
    revision: Option<&Revision>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    println!("{}", output::list(listing, format)?);
    if format == OutputFormat::Table {
        println!();
        println!("revision {}", revision.map_or("none", Revision::as_str));
    }
    Ok(())
}

fn handle_edit<F>(repo: &Repository, cmd: EditCommand) -> anyhow::Result<()>
where
    F: Form,
    F::Record: Tabular,
{
    let name = <F::Record as Record>::NAME;
    match cmd {
        EditCommand::Show { id, format } => {
            let view = render::load_detail::<F::Record>(repo, id)?;
            println!("{}", output::detail(&view, name, format)?);
        }
        EditCommand::Add(input) => {
            let mut form: F = editor::decode_item("form", read_json(input.file.as_deref())?)?;
            form.set_id(None);
            save_form(repo, form, &input)?;
        }
        EditCommand::Update { id, input } => {
            let form = editor::patch::<F>(repo, id, read_json(input.file.as_deref())?)?;
            save_form(repo, form, &input)?;
        }
        EditCommand::Delete { id } => {
            if !repo.delete::<F::Record>(id)? {
                bail!("no {name} record with id {id}");
            }
            println!("Deleted {name} record {id}");
        }
        EditCommand::Reorder { ids } => {
            let records = repo.reorder::<F::Record>(&ids)?;
            println!("{}", output::list(&records, OutputFormat::Plain)?);
        }
    }
    Ok(())
}

fn save_form<F>(repo: &Repository, form: F, input: &FormInput) -> anyhow::Result<()>
where
    F: Form,
    F::Record: Tabular,
{
    if let Some(expected) = &input.if_revision {
        let expected = Revision::from_hex(expected.clone());
        let (saved, revision) = editor::submit_if_unchanged(repo, form, Some(&expected))?;
        println!("Saved {} (revision {})", saved.label(), revision.as_str());
    } else {
        let saved = editor::submit(repo, form)?;
        println!("Saved {}", saved.label());
    }
    Ok(())
}

fn handle_messages(repo: &Repository, cmd: MessagesCommand) -> anyhow::Result<()> {
    match cmd {
        MessagesCommand::List { unread, format } => {
            let mut messages = render::inbox(repo.load::<Message>()?);
            if unread {
                messages.retain(|m| !m.read);
            }
            println!("{}", output::list(&messages, format)?);
        }
        MessagesCommand::Show {
            id,
            keep_unread,
            format,
        } => {
            let Some(mut message) = repo.find::<Message>(id)? else {
                bail!("no message with id {id}");
            };
            if !keep_unread && !message.read {
                message = editor::mark_read(repo, id, true)?;
            }
            println!("{}", output::record(&message, format)?);
        }
        MessagesCommand::Submit {
            name,
            email,
            message,
        } => {
            let saved = editor::submit_contact(
                repo,
                ContactForm {
                    name,
                    email,
                    message,
                },
            )?;
            println!("Received message {}", saved.id);
        }
        MessagesCommand::Read { id } => {
            editor::mark_read(repo, id, true)?;
            println!("Marked message {id} read");
        }
        MessagesCommand::Unread { id } => {
            editor::mark_read(repo, id, false)?;
            println!("Marked message {id} unread");
        }
        MessagesCommand::Delete { id } => {
            if !repo.delete::<Message>(id)? {
                bail!("no message with id {id}");
            }
            println!("Deleted message {id}");
        }
    }
    Ok(())
}

fn handle_settings(repo: &Repository, cmd: SettingsCommand) -> anyhow::Result<()> {
    let mut settings = repo.load_settings()?;
    match cmd {
        SettingsCommand::Show { format } => {
            println!("{}", output::settings(&settings, format)?);
            return Ok(());
        }
        SettingsCommand::Set { name, value } => {
            let mut fields = serde_json::to_value(&settings)?;
            match fields.get_mut(&name) {
                Some(slot) if slot.is_string() => *slot = Value::String(value),
                Some(_) => bail!("setting {name} is a list; use add-link or remove-link"),
                None => bail!("unknown setting {name}"),
            }
            settings = serde_json::from_value(fields)?;
        }
        SettingsCommand::AddLink { label, url } => {
            editor::edit_settings_list(
                &mut settings,
                "socialLinks",
                ArrayEdit::Append(json!({"label": label, "url": url})),
            )?;
        }
        SettingsCommand::RemoveLink { index } => {
            editor::edit_settings_list(&mut settings, "socialLinks", ArrayEdit::Remove(index))?;
        }
    }
    editor::save_settings(repo, settings)?;
    println!("Saved site settings");
    Ok(())
}

fn handle_export(repo: &Repository, path: Option<&Path>) -> anyhow::Result<()> {
    let dump = store::export(repo.store())?;
    let text = serde_json::to_string_pretty(&Value::Object(dump))?;
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Exported content to {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn handle_import(repo: &Repository, path: &Path) -> anyhow::Result<()> {
    let Value::Object(dump) = read_json(Some(path))? else {
        bail!("{} is not an export dump (expected a JSON object)", path.display());
    };
    let count = store::import(repo.store(), &dump)?;
    println!("Imported {count} keys");
    Ok(())
}

/// Read a JSON document from a file, or stdin for `None` and `-`.
fn read_json(path: Option<&Path>) -> anyhow::Result<Value> {
    let text = match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("parsing JSON input")
}

fn handle_config(path: Option<&Path>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path.map(Path::to_path_buf))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Location:           {}", config.store_location());
                println!("  Pretty JSON:        {}", config.storage.pretty);
                println!();
                println!("[Keys]");
                for (name, key) in config.keys.all() {
                    println!("  {:<19} {key}", format!("{name}:"));
                }
                println!(
                    "  {:<19} {}",
                    "legacy_projects:",
                    config.keys.legacy_projects().unwrap_or("(disabled)")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or_else(|| path.map(Path::to_path_buf))
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
