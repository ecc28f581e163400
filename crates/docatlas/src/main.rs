//! `docatlas` - CLI for the documentation corpus index
//!
//! This binary loads a content tree and answers document and comparison
//! lookups against it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use docatlas::cli::{
    CheckCommand, Cli, Command, CompareCommand, ConfigCommand, LinksCommand, ListCommand,
    OutputFormat, ShowCommand, TaggedCommand,
};
use docatlas::{init_logging, ComparisonRow, Config, Corpus, DocumentRecord, Error};

/// Text printed for a comparison cell marked absent.
const ABSENT_CELL: &str = "-";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(root) = cli.root.clone() {
        config.content.root = Some(root);
    }

    match cli.command {
        Command::Projects(cmd) => handle_projects(&load_corpus(&config)?, cmd.json),
        Command::List(cmd) => handle_list(&load_corpus(&config)?, &cmd),
        Command::Show(cmd) => handle_show(&load_corpus(&config)?, &cmd),
        Command::Links(cmd) => handle_links(&load_corpus(&config)?, &cmd),
        Command::Tagged(cmd) => handle_tagged(&load_corpus(&config)?, &cmd),
        Command::Compare(cmd) => handle_compare(&load_corpus(&config)?, &cmd),
        Command::Check(cmd) => handle_check(&load_corpus(&config)?, &cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn load_corpus(config: &Config) -> anyhow::Result<Corpus> {
    Corpus::load(config)
        .with_context(|| format!("loading content from {}", config.content_root().display()))
}

fn handle_projects(corpus: &Corpus, json: bool) -> anyhow::Result<()> {
    let summary = corpus.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary.projects)?);
    } else {
        let rows = summary
            .projects
            .iter()
            .map(|p| vec![p.name.clone(), p.documents.to_string()])
            .collect::<Vec<_>>();
        print_table(&["PROJECT", "DOCUMENTS"], &rows);
    }
    Ok(())
}

fn handle_list(corpus: &Corpus, cmd: &ListCommand) -> anyhow::Result<()> {
    let docs = corpus.list_project(&cmd.project)?;
    print_documents(&docs, cmd.format)
}

fn handle_show(corpus: &Corpus, cmd: &ShowCommand) -> anyhow::Result<()> {
    let doc = corpus.get_document(&cmd.id)?;
    if cmd.json {
        let mut value = serde_json::to_value(doc)?;
        value["body"] = serde_json::Value::String(doc.body().to_string());
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", doc.title());
    println!("{}", "=".repeat(doc.title().chars().count()));
    println!("ID:       {}", doc.id());
    println!("Project:  {}", doc.project());
    println!("Ordinal:  {}", doc.ordinal());
    if !doc.tags().is_empty() {
        println!("Tags:     {}", doc.tags().join(", "));
    }
    if !doc.links().is_empty() {
        println!("Links:    {}", doc.links().join(", "));
    }
    println!("Hash:     {}", doc.content_hash());
    if cmd.body {
        println!();
        println!("{}", doc.body());
    }
    Ok(())
}

fn handle_links(corpus: &Corpus, cmd: &LinksCommand) -> anyhow::Result<()> {
    let docs = if cmd.back {
        corpus.index().backlinks(&cmd.id)?
    } else {
        corpus.index().linked_documents(&cmd.id)?
    };
    print_documents(&docs, cmd.format)
}

fn handle_tagged(corpus: &Corpus, cmd: &TaggedCommand) -> anyhow::Result<()> {
    let docs = corpus.index().documents_tagged(&cmd.tag);
    print_documents(&docs, cmd.format)
}

fn handle_compare(corpus: &Corpus, cmd: &CompareCommand) -> anyhow::Result<()> {
    let matrix = corpus.matrix();
    match (&cmd.attribute, &cmd.subject) {
        (Some(attribute), Some(subject)) => {
            let value = corpus.get_value(attribute, subject)?;
            if cmd.format == OutputFormat::Json {
                let json = serde_json::json!({
                    "attribute": attribute.trim(),
                    "subject": subject.trim(),
                    "value": value,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                println!("{value}");
            }
        }
        (Some(attribute), None) => {
            let row = corpus.get_row(attribute)?;
            if cmd.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(row)?);
            } else {
                let rows = row
                    .iter()
                    .map(|(subject, value)| {
                        vec![subject.to_string(), value.unwrap_or(ABSENT_CELL).to_string()]
                    })
                    .collect::<Vec<_>>();
                print_rows(&["SUBJECT", row.attribute()], &rows, cmd.format);
            }
        }
        (None, Some(subject)) => {
            if !matrix.has_subject(subject) {
                return Err(Error::SubjectNotFound {
                    subject: subject.trim().to_string(),
                }
                .into());
            }
            if cmd.format == OutputFormat::Json {
                // Absent cells serialize as null
                let json: serde_json::Map<String, serde_json::Value> = matrix
                    .rows()
                    .iter()
                    .map(|row| {
                        let value = row.cell(subject).and_then(|c| c.value());
                        (row.attribute().to_string(), serde_json::json!(value))
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                let rows = matrix
                    .rows()
                    .iter()
                    .map(|row| vec![row.attribute().to_string(), cell_text(row, subject)])
                    .collect::<Vec<_>>();
                print_rows(&["ATTRIBUTE", subject.trim()], &rows, cmd.format);
            }
        }
        (None, None) => {
            if cmd.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(matrix)?);
            } else {
                let mut headers = vec!["ATTRIBUTE"];
                headers.extend(matrix.subjects().iter().map(String::as_str));
                let rows = matrix
                    .rows()
                    .iter()
                    .map(|row| {
                        std::iter::once(row.attribute().to_string())
                            .chain(row.iter().map(|(_, v)| v.unwrap_or(ABSENT_CELL).to_string()))
                            .collect()
                    })
                    .collect::<Vec<Vec<String>>>();
                print_rows(&headers, &rows, cmd.format);
            }
        }
    }
    Ok(())
}

fn handle_check(corpus: &Corpus, cmd: &CheckCommand) -> anyhow::Result<()> {
    let summary = corpus.summary();
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("docatlas check");
    println!("--------------");
    println!("Root:         {}", summary.root.display());
    println!("Documents:    {}", summary.documents);
    for project in &summary.projects {
        println!("  {:<24} {}", project.name, project.documents);
    }
    println!("Subjects:     {}", summary.subjects.join(", "));
    println!("Attributes:   {}", summary.attributes);
    println!("Absent cells: {}", summary.absent_cells);

    if summary.dangling_links.is_empty() {
        println!("Cross-links:  ok");
    } else {
        println!("Dangling cross-links:");
        for (from, to) in &summary.dangling_links {
            println!("  {from} -> {to}");
        }
    }
    for group in &summary.duplicate_bodies {
        println!("Identical bodies: {}", group.join(", "));
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let content = &config.content;
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Content]");
                println!("  Root:             {}", config.content_root().display());
                println!("  Speeches dir:     {}", content.speeches_dir);
                println!("  Speeches project: {}", content.speeches_project);
                println!("  Projects dir:     {}", content.projects_dir);
                println!("  Overview file:    {}", content.overview_file);
                println!("  Extensions:       {}", content.extensions.join(", "));
                println!("  Ordinal pattern:  {}", content.ordinal_pattern);
                println!(
                    "  Absent markers:   {}",
                    content
                        .absent_markers
                        .iter()
                        .map(|m| format!("{m:?}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Text of `row`'s cell for `subject`, absent cells shown as [`ABSENT_CELL`].
fn cell_text(row: &ComparisonRow, subject: &str) -> String {
    row.cell(subject)
        .and_then(|c| c.value())
        .unwrap_or(ABSENT_CELL)
        .to_string()
}

fn print_documents(docs: &[&DocumentRecord], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(docs)?),
        OutputFormat::Plain => {
            for doc in docs {
                println!("{:>3}. {} ({})", doc.ordinal(), doc.title(), doc.id());
            }
        }
        OutputFormat::Table => {
            let rows = docs
                .iter()
                .map(|doc| {
                    vec![
                        doc.ordinal().to_string(),
                        doc.id().to_string(),
                        doc.title().to_string(),
                        doc.tags().join(", "),
                    ]
                })
                .collect::<Vec<_>>();
            print_table(&["#", "ID", "TITLE", "TAGS"], &rows);
        }
    }
    Ok(())
}

/// Print rows as an aligned table, or tab-separated for plain output.
fn print_rows(headers: &[&str], rows: &[Vec<String>], format: OutputFormat) {
    if format == OutputFormat::Table {
        print_table(headers, rows);
    } else {
        for row in rows {
            println!("{}", row.join("\t"));
        }
    }
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    println!("{}", line(headers.to_vec()));
    println!("{}", line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}
