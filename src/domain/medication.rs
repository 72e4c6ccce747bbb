use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::TimeOfDay;

/// The colour given to new medications when none is chosen.
pub const DEFAULT_COLOR: &str = "#3B82F6";

/// The palette offered when picking a medication colour.
///
/// Any colour string is accepted; these are just the suggestions.
pub const PRESET_COLORS: [&str; 8] = [
    "#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6", "#EC4899", "#06B6D4", "#84CC16",
];

/// A prescribed drug and its reminder policy.
///
/// The identity (`id`) and creation time never change once a medication is
/// created. The user-editable part lives in [`MedicationDetails`], and the
/// per-dose taken flags are kept in a map keyed by [`DoseKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Medication {
    pub(crate) id: Uuid,
    pub(crate) details: MedicationDetails,
    /// Taken flags keyed by the rendered [`DoseKey`].
    ///
    /// Keys for times that have since been removed from the medication are
    /// left in place; they are never surfaced in a schedule.
    pub(crate) taken: BTreeMap<String, bool>,
    pub(crate) created: DateTime<Utc>,
}

impl Medication {
    /// Construct a new [`Medication`] with a fresh id and no taken doses.
    #[must_use]
    pub fn new(details: MedicationDetails, created: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            details,
            taken: BTreeMap::new(),
            created,
        }
    }

    /// The unique, stable identifier of this medication.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.details.name
    }

    /// Free-text dosage, e.g. `100mg`.
    #[must_use]
    pub fn dosage(&self) -> &str {
        &self.details.dosage
    }

    /// The tag colour.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.details.color
    }

    /// The daily reminder times, in ascending order.
    #[must_use]
    pub const fn times(&self) -> &BTreeSet<TimeOfDay> {
        &self.details.times
    }

    /// The user-editable fields of this medication.
    #[must_use]
    pub const fn details(&self) -> &MedicationDetails {
        &self.details
    }

    /// When the medication was first added.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// The raw taken map, including stale keys.
    #[must_use]
    pub const fn taken_doses(&self) -> &BTreeMap<String, bool> {
        &self.taken
    }

    /// Whether the dose at `time` on `day` has been marked taken.
    ///
    /// Doses that were never marked are not taken.
    #[must_use]
    pub fn is_taken(&self, day: NaiveDate, time: TimeOfDay) -> bool {
        self.taken
            .get(&DoseKey::new(day, time).to_string())
            .copied()
            .unwrap_or(false)
    }

    /// Record whether the dose at `time` on `day` was taken.
    ///
    /// `time` does not have to be one of the medication's current times.
    pub fn set_taken(&mut self, day: NaiveDate, time: TimeOfDay, taken: bool) {
        self.taken.insert(DoseKey::new(day, time).to_string(), taken);
    }

    /// Replace the user-editable fields.
    ///
    /// The id, creation time and taken map are left untouched.
    pub fn update(&mut self, details: MedicationDetails) {
        self.details = details;
    }
}

/// The caller-supplied fields of a [`Medication`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationDetails {
    /// The display name.
    pub name: String,
    /// Free-text dosage.
    pub dosage: String,
    /// A colour used for visual tagging only.
    pub color: String,
    /// Daily reminder times. Unique and ascending by construction.
    pub times: BTreeSet<TimeOfDay>,
}

impl MedicationDetails {
    /// Bundle the editable fields of a medication.
    ///
    /// Duplicate times are collapsed.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        color: impl Into<String>,
        times: impl IntoIterator<Item = TimeOfDay>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            color: color.into(),
            times: times.into_iter().collect(),
        }
    }

    /// Check that the details describe a usable medication.
    ///
    /// Name and dosage are trimmed and must be non-empty, and there must be at
    /// least one reminder time. Returns the trimmed details.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let dosage = self.dosage.trim();
        if dosage.is_empty() {
            return Err(ValidationError::EmptyDosage);
        }

        if self.times.is_empty() {
            return Err(ValidationError::NoTimes);
        }

        Ok(Self {
            name: name.to_string(),
            dosage: dosage.to_string(),
            color: self.color,
            times: self.times,
        })
    }
}

/// Reasons a set of [`MedicationDetails`] is not usable.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The name was empty or whitespace.
    #[error("medication name must not be empty")]
    EmptyName,
    /// The dosage was empty or whitespace.
    #[error("dosage must not be empty")]
    EmptyDosage,
    /// No reminder times were given.
    #[error("at least one reminder time is required")]
    NoTimes,
}

/// Composite key identifying one dose: a calendar day and a time of day.
///
/// Rendered as `{Www Mmm DD YYYY}-{HH:MM}`, e.g. `Sat Oct 17 2026-08:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseKey {
    day: NaiveDate,
    time: TimeOfDay,
}

impl DoseKey {
    /// The key for the dose at `time` on `day`.
    #[must_use]
    pub const fn new(day: NaiveDate, time: TimeOfDay) -> Self {
        Self { day, time }
    }
}

impl fmt::Display for DoseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day.format("%a %b %d %Y"), self.time)
    }
}
