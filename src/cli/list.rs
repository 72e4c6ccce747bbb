use std::path::Path;

use clap::Parser;
use pillpal::{Medication, SystemClock};
use serde::Serialize;
use tracing::instrument;

use super::{
    terminal::{swatch, Colorize},
    OutputFormat,
};

/// Command arguments for `pillpal list`.
#[derive(Debug, Parser)]
#[command(about = "List all medications")]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

/// A medication as shown by `pillpal list --output json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Row<'a> {
    id: String,
    name: &'a str,
    dosage: &'a str,
    color: &'a str,
    times: Vec<String>,
    created_at: String,
}

impl<'a> From<&'a Medication> for Row<'a> {
    fn from(medication: &'a Medication) -> Self {
        Self {
            id: medication.id().to_string(),
            name: medication.name(),
            dosage: medication.dosage(),
            color: medication.color(),
            times: medication.times().iter().map(ToString::to_string).collect(),
            created_at: medication.created().to_rfc3339(),
        }
    }
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (store, _config) = super::open_store(root, SystemClock);
        let rows: Vec<Row<'_>> = store.medications().iter().map(Row::from).collect();

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table if rows.is_empty() => {
                if !self.quiet {
                    println!("No medications yet. Add one with 'pillpal add'.");
                }
            }
            OutputFormat::Table if self.quiet => {
                for row in &rows {
                    println!("{}\t{}\t{}\t{}", row.id, row.name, row.dosage, row.times.join(","));
                }
            }
            OutputFormat::Table => {
                println!(
                    "{:<10} {:<3}{:<24} {:<12} Times",
                    "ID", "", "Name", "Dosage"
                );
                for row in &rows {
                    println!(
                        "{:<10} {}  {:<24} {:<12} {}",
                        &row.id[..8],
                        swatch(row.color),
                        row.name,
                        row.dosage,
                        row.times.join(", ")
                    );
                }
                println!();
                println!("{}", format!("{} medication(s)", rows.len()).dim());
            }
        }

        Ok(())
    }
}
