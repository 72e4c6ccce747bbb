use std::path::Path;

use clap::Parser;
use pillpal::{Clock, DailySummary, ScheduleEntry};
use tracing::instrument;

use super::{
    terminal::{is_narrow, status_label, swatch, Colorize},
    OutputFormat,
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show today's doses and how many have been taken")]
pub struct Today {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

impl Today {
    #[instrument(level = "debug", skip(self, clock))]
    pub fn run(self, root: &Path, clock: Box<dyn Clock>) -> anyhow::Result<()> {
        let (store, _config) = super::open_store(root, clock);
        let now = store.clock().now();

        let schedule = store.today_schedule();
        let summary = DailySummary::from_schedule(&schedule);

        match self.output {
            OutputFormat::Json => Self::output_json(&schedule, &summary)?,
            OutputFormat::Table => {
                if schedule.is_empty() {
                    println!("No medications yet. Add one with 'pillpal add'.");
                } else if self.quiet {
                    Self::output_quiet(&schedule, &summary);
                } else {
                    Self::output_table(&schedule, &summary, now);
                }
            }
        }

        Ok(())
    }

    fn output_json(schedule: &[ScheduleEntry<'_>], summary: &DailySummary) -> anyhow::Result<()> {
        use serde_json::json;

        let doses: Vec<_> = schedule
            .iter()
            .map(|entry| {
                json!({
                    "id": entry.medication.id(),
                    "name": entry.medication.name(),
                    "dosage": entry.medication.dosage(),
                    "color": entry.medication.color(),
                    "time": entry.time,
                    "taken": entry.taken,
                    "isPast": entry.is_past,
                    "status": entry.status().label().to_lowercase(),
                })
            })
            .collect();

        let output = json!({
            "schedule": doses,
            "summary": {
                "total": summary.total,
                "taken": summary.taken,
                "pending": summary.pending,
                "missed": summary.missed,
                "completionRate": summary.completion_rate(),
            },
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(schedule: &[ScheduleEntry<'_>], summary: &DailySummary) {
        for entry in schedule {
            println!(
                "{}\t{}\t{}\t{}",
                entry.time,
                entry.medication.id(),
                entry.medication.name(),
                entry.status().label().to_lowercase()
            );
        }
        println!(
            "total={} taken={} pending={} missed={}",
            summary.total, summary.taken, summary.pending, summary.missed
        );
    }

    fn output_table(
        schedule: &[ScheduleEntry<'_>],
        summary: &DailySummary,
        now: chrono::NaiveDateTime,
    ) {
        println!("Today's schedule ({})", now.format("%a %b %d %Y, %H:%M"));
        println!("{}", "────────────────".dim());

        if is_narrow() {
            // Stacked output for narrow terminals
            for entry in schedule {
                println!(
                    "{} {} {}",
                    entry.time,
                    swatch(entry.medication.color()),
                    entry.medication.name()
                );
                println!(
                    "      {} · {}",
                    entry.medication.dosage().dim(),
                    status_label(entry.status())
                );
            }
        } else {
            println!(
                "{:<6} {:<10} {:<3}{:<24} {:<12} Status",
                "Time", "ID", "", "Medication", "Dosage"
            );
            for entry in schedule {
                let id = entry.medication.id().to_string();
                println!(
                    "{:<6} {:<10} {}  {:<24} {:<12} {}",
                    entry.time.to_string(),
                    &id[..8],
                    swatch(entry.medication.color()),
                    entry.medication.name(),
                    entry.medication.dosage(),
                    status_label(entry.status())
                );
            }
        }

        println!();
        println!(
            "Taken: {}  Pending: {}  Missed: {}  (of {})",
            summary.taken.to_string().success(),
            summary.pending.to_string().info(),
            summary.missed.to_string().error(),
            summary.total
        );

        let rate = summary.completion_rate();
        if rate == 100 {
            println!("Progress: {} ✅", format!("{rate}% complete").success());
        } else {
            println!("Progress: {rate}% complete");
        }
    }
}
