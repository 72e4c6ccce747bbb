use std::path::{Path, PathBuf};

mod list;
mod terminal;
mod today;

use chrono::{Local, NaiveDateTime};
use clap::ArgAction;
use list::List;
use pillpal::{
    Clock, Config, FileBlobStore, FixedClock, MedicationDetails, MedicationStore, SystemClock,
    TimeOfDay,
};
use terminal::Colorize;
use today::Today;
use tracing::instrument;

/// The directory under the root that holds configuration and stored data.
const DATA_DIR: &str = ".pillpal";

/// Parse a moment to use as "now".
///
/// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM`, or a bare `HH:MM` which is
/// taken to be today.
fn parse_moment(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(moment) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(moment);
        }
    }
    let time: TimeOfDay = s.parse().map_err(|e| format!("{e}"))?;
    Ok(time.on(Local::now().date_naive()))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The directory holding the `.pillpal` data folder
    #[arg(short, long, default_value = ".", global = true, env = "PILLPAL_ROOT")]
    root: PathBuf,

    /// Pretend the current time is this moment (`YYYY-MM-DD HH:MM` or `HH:MM`)
    #[arg(long, global = true, value_parser = parse_moment)]
    at: Option<NaiveDateTime>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let clock: Box<dyn Clock> = self.at.map_or_else(
            || Box::new(SystemClock) as Box<dyn Clock>,
            |moment| Box::new(FixedClock(moment)),
        );

        self.command
            .unwrap_or_else(|| Command::Today(Today::default()))
            .run(&self.root, clock)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show today's schedule (default)
    Today(Today),

    /// Initialize a new medication store
    Init(Init),

    /// Add a medication
    Add(Add),

    /// Change a medication's name, dosage, colour or times
    Edit(Edit),

    /// Delete a medication
    Remove(Remove),

    /// Mark today's dose as taken
    Take(Dose),

    /// Undo marking today's dose as taken
    Untake(Dose),

    /// List all medications
    List(List),
}

impl Command {
    fn run(self, root: &Path, clock: Box<dyn Clock>) -> anyhow::Result<()> {
        match self {
            Self::Today(command) => command.run(root, clock)?,
            Self::Init(command) => command.run(root)?,
            Self::Add(command) => command.run(root, clock)?,
            Self::Edit(command) => command.run(root)?,
            Self::Remove(command) => command.run(root)?,
            Self::Take(command) => command.run(root, clock, true)?,
            Self::Untake(command) => command.run(root, clock, false)?,
            Self::List(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Open the medication store under `root`, along with its configuration.
///
/// Missing or invalid configuration falls back to the defaults, and a missing
/// or unreadable medication list starts empty.
fn open_store<C: Clock>(root: &Path, clock: C) -> (MedicationStore<FileBlobStore, C>, Config) {
    let data_dir = root.join(DATA_DIR);
    let config = Config::load_or_default(&data_dir.join("config.toml"));
    let store = MedicationStore::open(FileBlobStore::new(data_dir), config.storage_key(), clock);
    (store, config)
}

/// The first eight characters of an id, as shown in listings.
fn short_id(id: uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// The tag colour for medications added without one, e.g. '#10B981'.
    #[arg(long)]
    default_color: Option<String>,
}

impl Init {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let data_dir = root.join(DATA_DIR);
        if data_dir.exists() {
            anyhow::bail!("Already initialized (found existing {DATA_DIR} directory)");
        }

        std::fs::create_dir_all(&data_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create {DATA_DIR} directory: {e}"))?;

        let mut config = Config::default();
        if let Some(color) = self.default_color {
            config.set_default_color(color);
        }
        config
            .save(&data_dir.join("config.toml"))
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!("Initialized medication store in {}", root.display());
        println!("  Created: {DATA_DIR}/config.toml");
        println!();
        println!("Next steps:");
        println!("  pillpal add --name Aspirin --dosage 100mg --time 08:00,20:00");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The medication name, e.g. 'Aspirin'.
    #[arg(long, short)]
    name: String,

    /// The dosage, e.g. '100mg'.
    #[arg(long, short)]
    dosage: String,

    /// A tag colour such as '#3B82F6' (defaults to the configured colour).
    #[arg(long, short)]
    color: Option<String>,

    /// Daily reminder times in 24-hour HH:MM (repeat or comma-separate).
    #[arg(long = "time", short, value_delimiter = ',', required = true)]
    times: Vec<TimeOfDay>,
}

impl Add {
    #[instrument(skip(clock))]
    fn run(self, root: &Path, clock: Box<dyn Clock>) -> anyhow::Result<()> {
        let (mut store, config) = open_store(root, clock);

        let color = self
            .color
            .unwrap_or_else(|| config.default_color().to_string());
        let details = MedicationDetails::new(self.name, self.dosage, color, self.times).validate()?;

        let name = details.name.clone();
        let id = store.add(details)?;

        println!(
            "{}",
            format!("✅ Added {name} ({})", short_id(id)).success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The id (or a unique id prefix) of the medication to edit.
    id: String,

    /// A new name.
    #[arg(long, short)]
    name: Option<String>,

    /// A new dosage.
    #[arg(long, short)]
    dosage: Option<String>,

    /// A new tag colour.
    #[arg(long, short)]
    color: Option<String>,

    /// Replace all reminder times.
    #[arg(
        long = "time",
        short,
        value_delimiter = ',',
        conflicts_with_all = ["add_time", "remove_time"]
    )]
    times: Vec<TimeOfDay>,

    /// Add reminder times.
    #[arg(long, value_delimiter = ',')]
    add_time: Vec<TimeOfDay>,

    /// Remove reminder times.
    #[arg(long, value_delimiter = ',')]
    remove_time: Vec<TimeOfDay>,
}

impl Edit {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (mut store, _config) = open_store(root, SystemClock);
        let id = store.resolve(&self.id)?;

        let mut details = store
            .get(id)
            .map(|medication| medication.details().clone())
            .ok_or_else(|| anyhow::anyhow!("Medication {} not found", self.id))?;

        if let Some(name) = self.name {
            details.name = name;
        }
        if let Some(dosage) = self.dosage {
            details.dosage = dosage;
        }
        if let Some(color) = self.color {
            details.color = color;
        }
        if !self.times.is_empty() {
            details.times = self.times.into_iter().collect();
        }
        details.times.extend(self.add_time);
        for time in &self.remove_time {
            details.times.remove(time);
        }

        let details = details.validate()?;
        let name = details.name.clone();
        store.edit(id, details)?;

        println!("{}", format!("✅ Updated {name} ({})", short_id(id)).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Remove {
    /// The id (or a unique id prefix) of the medication to delete.
    id: String,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

impl Remove {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (mut store, _config) = open_store(root, SystemClock);
        let id = store.resolve(&self.id)?;

        let name = store
            .get(id)
            .map_or_else(String::new, |medication| medication.name().to_string());

        if !self.yes {
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(format!("Delete {name} and its dose history?"))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("{}", "Cancelled".dim());
                return Ok(());
            }
        }

        store.remove(id)?;

        println!("{}", format!("✅ Deleted {name}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Dose {
    /// The id (or a unique id prefix) of the medication.
    id: String,

    /// The scheduled time of the dose, in HH:MM.
    time: TimeOfDay,
}

impl Dose {
    #[instrument(skip(clock))]
    fn run(self, root: &Path, clock: Box<dyn Clock>, taken: bool) -> anyhow::Result<()> {
        let (mut store, _config) = open_store(root, clock);
        let id = store.resolve(&self.id)?;

        let Some(medication) = store.get(id) else {
            anyhow::bail!("Medication {} not found", self.id);
        };
        let name = medication.name().to_string();

        if !medication.times().contains(&self.time) {
            let scheduled: Vec<String> = medication.times().iter().map(ToString::to_string).collect();
            anyhow::bail!(
                "{name} has no dose at {} (scheduled: {})",
                self.time,
                scheduled.join(", ")
            );
        }

        if medication.is_taken(store.clock().today(), self.time) == taken {
            let state = if taken { "already taken" } else { "not taken" };
            println!(
                "{}",
                format!("{name} at {} is {state} today", self.time).warning()
            );
            return Ok(());
        }

        store.mark_taken(id, self.time, taken)?;

        if taken {
            println!(
                "{}",
                format!("✅ {name} marked as taken for {}", self.time).success()
            );
        } else {
            println!("{name} at {} marked as not taken", self.time);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}
