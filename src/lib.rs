//! Medication Reminders
//!
//! Medications with daily reminder times are kept in a single persisted list,
//! and each day's doses are derived from it on demand.

pub mod domain;
pub use domain::{
    derive_schedule, Clock, Config, DailySummary, DoseStatus, FixedClock, Medication,
    MedicationDetails, ScheduleEntry, SystemClock, TimeOfDay,
};

/// Persistence and the write-through medication store.
pub mod storage;
pub use storage::{BlobStore, FileBlobStore, MedicationStore, StoreError};
