//! Domain models for medication reminders.
//!
//! This module contains the core domain types including medications, reminder
//! times, today's schedule, and configuration.

/// Medication records and their per-dose taken flags.
pub mod medication;
pub use medication::{
    DoseKey, Medication, MedicationDetails, ValidationError, DEFAULT_COLOR, PRESET_COLORS,
};

mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

mod config;
pub use config::Config;

pub mod schedule;
pub use schedule::{derive_schedule, DailySummary, DoseStatus, ScheduleEntry};

/// Validated `HH:MM` times of day.
pub mod time_of_day;
pub use time_of_day::{InvalidTimeError, TimeOfDay};
