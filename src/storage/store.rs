//! The medication record store.
//!
//! [`MedicationStore`] owns the canonical medication list. Every mutation
//! updates the in-memory list and then writes the whole list back to its
//! [`BlobStore`] slot before returning, so the two never diverge observably.

use std::io;

use uuid::Uuid;

use crate::{
    domain::{
        derive_schedule, Clock, Medication, MedicationDetails, ScheduleEntry, SystemClock,
        TimeOfDay,
    },
    storage::{record, BlobStore},
};

/// A write-through store of medications.
#[derive(Debug)]
pub struct MedicationStore<B, C = SystemClock> {
    blob: B,
    key: String,
    clock: C,
    medications: Vec<Medication>,
}

impl<B: BlobStore, C: Clock> MedicationStore<B, C> {
    /// Load the medication list stored under `key`.
    ///
    /// This never fails. A missing blob yields an empty list; a blob that
    /// cannot be read or parsed is logged and also yields an empty list. The
    /// unreadable blob is left in place until the next mutation overwrites
    /// it. Individual records that fail to parse are skipped with a warning.
    #[must_use]
    pub fn open(blob: B, key: impl Into<String>, clock: C) -> Self {
        let key = key.into();

        let medications = match blob.read(&key) {
            Ok(Some(json)) => record::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!("Discarding unparseable medication list '{key}': {e}");
                Vec::new()
            }),
            Ok(None) => {
                tracing::debug!("No medication list stored under '{key}'");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to read medication list '{key}': {e}");
                Vec::new()
            }
        };

        tracing::debug!("Loaded {} medications", medications.len());

        Self {
            blob,
            key,
            clock,
            medications,
        }
    }

    /// All medications, in the order they were added.
    #[must_use]
    pub fn medications(&self) -> &[Medication] {
        &self.medications
    }

    /// The medication with the given id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Medication> {
        self.medications.iter().find(|m| m.id() == id)
    }

    /// Resolve a full id or a unique id prefix to a medication id.
    ///
    /// # Errors
    ///
    /// Returns an error if no medication matches, or if a prefix matches more
    /// than one.
    pub fn resolve(&self, query: &str) -> Result<Uuid, LookupError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(LookupError::NotFound(query));
        }

        let mut matches = self
            .medications
            .iter()
            .map(Medication::id)
            .filter(|id| id.to_string().starts_with(&query));

        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (None, _) => Err(LookupError::NotFound(query)),
            (Some(_), Some(_)) => Err(LookupError::Ambiguous(query)),
        }
    }

    /// Add a new medication and return its id.
    ///
    /// The details are stored as given; callers are expected to have checked
    /// them with [`MedicationDetails::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted. The
    /// medication is still added in memory.
    pub fn add(&mut self, details: MedicationDetails) -> Result<Uuid, StoreError> {
        let medication = Medication::new(details, self.clock.now_utc());
        let id = medication.id();
        tracing::debug!("Adding medication {id} ({})", medication.name());

        self.medications.push(medication);
        self.persist()?;
        Ok(id)
    }

    /// Replace the name, dosage, colour and times of a medication.
    ///
    /// Returns `false`, without writing, if no medication has the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn edit(&mut self, id: Uuid, details: MedicationDetails) -> Result<bool, StoreError> {
        let Some(medication) = self.medications.iter_mut().find(|m| m.id() == id) else {
            tracing::debug!("Edit ignored: no medication {id}");
            return Ok(false);
        };

        medication.update(details);
        self.persist()?;
        Ok(true)
    }

    /// Delete a medication.
    ///
    /// Returns `false`, without writing, if no medication has the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn remove(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let before = self.medications.len();
        self.medications.retain(|m| m.id() != id);

        if self.medications.len() == before {
            tracing::debug!("Remove ignored: no medication {id}");
            return Ok(false);
        }

        self.persist()?;
        Ok(true)
    }

    /// Record whether today's dose at `time` was taken.
    ///
    /// Returns `false`, without writing, if no medication has the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn mark_taken(
        &mut self,
        id: Uuid,
        time: TimeOfDay,
        taken: bool,
    ) -> Result<bool, StoreError> {
        let today = self.clock.today();

        let Some(medication) = self.medications.iter_mut().find(|m| m.id() == id) else {
            tracing::debug!("Mark taken ignored: no medication {id}");
            return Ok(false);
        };

        medication.set_taken(today, time, taken);
        self.persist()?;
        Ok(true)
    }

    /// Today's schedule, derived from the current list and clock.
    #[must_use]
    pub fn today_schedule(&self) -> Vec<ScheduleEntry<'_>> {
        derive_schedule(&self.medications, self.clock.now())
    }

    /// The clock this store reads "today" from.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Consume the store, returning the blob store it writes to.
    #[must_use]
    pub fn into_blob(self) -> B {
        self.blob
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = record::to_json(&self.medications).map_err(StoreError::Serialize)?;

        self.blob.write(&self.key, &json).map_err(|source| {
            tracing::error!("Failed to save medication list '{}': {source}", self.key);
            StoreError::Persist {
                key: self.key.clone(),
                source,
            }
        })?;

        tracing::debug!("Saved {} medications", self.medications.len());
        Ok(())
    }
}

/// Failures writing the medication list back to storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The list could not be encoded.
    #[error("failed to encode medication list: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The blob store rejected the write.
    #[error("failed to save medication list '{key}': {source}")]
    Persist {
        /// The blob key being written.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Failures resolving a medication id from user input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    /// Nothing matched.
    #[error("no medication with id '{0}'")]
    NotFound(String),

    /// More than one medication id starts with the given prefix.
    #[error("id prefix '{0}' matches more than one medication")]
    Ambiguous(String),
}
