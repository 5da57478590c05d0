//! `import` command: load a CSV file and run it through the import engine.
//!
//! `--dry-run` swaps the database for an in-memory store, so duplicate
//! e-mails inside the file are still reported.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Args;
use sanctum_core::CanonicalField;
use sanctum_import::{
    from_csv, ContactStore, CsvOptions, FieldMapping, ImportCoordinator, ImportOptions,
    ImportSummary, NameSplitConfig,
};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// CSV file with a header row
    pub file: PathBuf,
    /// Map a contact field to a CSV column, e.g. `--map email=E-mail`
    #[arg(long = "map", value_name = "FIELD=COLUMN", value_parser = parse_mapping, required = true)]
    pub mappings: Vec<(String, String)>,
    /// Column holding a full name to split into first/last name
    #[arg(long)]
    pub split_column: Option<String>,
    /// Literal separator between name parts
    #[arg(long, default_value = " ")]
    pub split_delimiter: String,
    /// Position of the first name after splitting
    #[arg(long, default_value_t = 0)]
    pub first_part: usize,
    /// Position of the last name after splitting
    #[arg(long, default_value_t = 1)]
    pub last_part: usize,
    /// Label stored as each contact's source
    #[arg(long, env = "SANCTUM_IMPORT_DEFAULT_SOURCE", default_value = "CSV Import")]
    pub source: String,
    /// Notes for contacts whose row carries none
    #[arg(long)]
    pub notes: Option<String>,
    /// CSV field delimiter
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,
    /// Refuse files with more data rows than this
    #[arg(long, env = "SANCTUM_IMPORT_MAX_ROWS", default_value_t = 10_000)]
    pub max_rows: usize,
    /// Validate against an in-memory store without writing to the database
    #[arg(long)]
    pub dry_run: bool,
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ImportArgs {
    fn options(&self) -> ImportOptions {
        let field_mapping: FieldMapping = self
            .mappings
            .iter()
            .map(|(field, column)| (field.as_str(), column.as_str()))
            .collect();
        let name_split = self.split_column.as_ref().map(|column| {
            NameSplitConfig::new(
                column.as_str(),
                self.split_delimiter.as_str(),
                self.first_part,
                self.last_part,
            )
        });

        ImportOptions {
            field_mapping,
            name_split,
            source: self.source.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Parses `field=Column`, checking the field against the contact schema.
pub(crate) fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    let (field, column) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=COLUMN, got '{raw}'"))?;
    let field = CanonicalField::from_str(field.trim()).map_err(|e| e.to_string())?;
    if column.is_empty() {
        return Err(format!("column for '{field}' must not be empty"));
    }
    Ok((field.as_str().to_string(), column.to_string()))
}

pub(crate) fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!(
                "delimiter must be a single ASCII character, got '{raw}'"
            )),
        },
    }
}

/// Reads the file, imports every well-formed row and prints the summary.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has no header row, or holds
/// more rows than `--max-rows`. Per-row failures are part of the summary.
pub(crate) async fn run_import<S: ContactStore>(
    store: S,
    args: &ImportArgs,
) -> anyhow::Result<ImportSummary> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let table = from_csv(
        &text,
        CsvOptions {
            delimiter: args.delimiter,
        },
    )
    .with_context(|| format!("failed to parse {}", args.file.display()))?;

    if table.rows.len() > args.max_rows {
        anyhow::bail!(
            "{} has {} rows; the import limit is {}",
            args.file.display(),
            table.rows.len(),
            args.max_rows
        );
    }
    if table.skipped > 0 {
        tracing::warn!(
            skipped = table.skipped,
            "skipped rows whose column count does not match the header"
        );
    }

    let coordinator = ImportCoordinator::new(store);
    let summary = coordinator.run(&table.rows, &args.options()).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, table.skipped, args.dry_run);
    }
    Ok(summary)
}

fn print_summary(summary: &ImportSummary, skipped: usize, dry_run: bool) {
    let prefix = if dry_run { "[dry run] " } else { "" };
    println!(
        "{prefix}processed {} row(s): {} imported, {} failed",
        summary.total_processed, summary.success_count, summary.error_count
    );
    if skipped > 0 {
        println!("{prefix}{skipped} malformed row(s) skipped");
    }
    for error in &summary.errors {
        println!("  row {}: {}", error.row, error.message);
    }
}
