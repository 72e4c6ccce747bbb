// Serialized form of the medication list.
//
// The list is stored as a JSON array of flat records with camelCase keys:
// `id`, `name`, `dosage`, `color`, `times`, `taken`, `createdAt`.
//
// Reading is lenient: a record that does not parse is skipped, and a reminder
// time that does not parse is dropped from its record. Both are logged.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::{Medication, MedicationDetails, TimeOfDay};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MedicationRecord {
    id: Uuid,
    name: String,
    dosage: String,
    color: String,
    #[serde(default, deserialize_with = "lenient_times")]
    times: BTreeSet<TimeOfDay>,
    #[serde(default)]
    taken: BTreeMap<String, bool>,
    created_at: DateTime<Utc>,
}

fn lenient_times<'de, D>(deserializer: D) -> Result<BTreeSet<TimeOfDay>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|time| match time.parse() {
            Ok(time) => Some(time),
            Err(e) => {
                tracing::warn!("Dropping stored reminder time: {e}");
                None
            }
        })
        .collect())
}

impl From<&Medication> for MedicationRecord {
    fn from(medication: &Medication) -> Self {
        let details = medication.details();
        Self {
            id: medication.id,
            name: details.name.clone(),
            dosage: details.dosage.clone(),
            color: details.color.clone(),
            times: details.times.clone(),
            taken: medication.taken.clone(),
            created_at: medication.created,
        }
    }
}

impl From<MedicationRecord> for Medication {
    fn from(record: MedicationRecord) -> Self {
        Self {
            id: record.id,
            details: MedicationDetails {
                name: record.name,
                dosage: record.dosage,
                color: record.color,
                times: record.times,
            },
            taken: record.taken,
            created: record.created_at,
        }
    }
}

/// Serialize a medication list to its stored JSON form.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(medications: &[Medication]) -> serde_json::Result<String> {
    let records: Vec<MedicationRecord> = medications.iter().map(MedicationRecord::from).collect();
    serde_json::to_string(&records)
}

/// Parse a medication list from its stored JSON form.
///
/// Records that are not valid medications are skipped, and malformed reminder
/// times are dropped from otherwise valid records. Each is logged as a
/// warning.
///
/// # Errors
///
/// Returns an error if the input is not a JSON array.
pub fn from_json(json: &str) -> serde_json::Result<Vec<Medication>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;

    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, value)| match serde_json::from_value::<MedicationRecord>(value) {
                Ok(record) => Some(Medication::from(record)),
                Err(e) => {
                    tracing::warn!("Skipping stored medication #{index}: {e}");
                    None
                }
            },
        )
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn time(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn round_trip_preserves_everything() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        let mut aspirin = Medication::new(
            MedicationDetails::new("Aspirin", "100mg", "#3B82F6", [time("08:00"), time("20:00")]),
            Utc::now(),
        );
        aspirin.set_taken(day, time("08:00"), true);
        aspirin.set_taken(day, time("20:00"), false);

        let vitamin = Medication::new(
            MedicationDetails::new("Vitamin D", "1000IU", "#F59E0B", [time("12:00")]),
            Utc::now(),
        );

        let medications = vec![aspirin, vitamin];
        let json = to_json(&medications).unwrap();
        let parsed = from_json(&json).unwrap();

        assert_eq!(parsed, medications);
    }

    #[test]
    fn reads_browser_style_records() {
        let json = r##"[{
            "id": "0b6b1e2a-4c1f-4f4e-9d6b-2f7c3f1d9a10",
            "name": "Aspirin",
            "dosage": "100mg",
            "color": "#3B82F6",
            "times": ["08:00", "20:00"],
            "taken": {"Sat Oct 17 2026-08:00": true},
            "createdAt": "2026-10-17T07:12:45.123Z"
        }]"##;

        let parsed = from_json(json).unwrap();

        assert_eq!(parsed.len(), 1);
        let aspirin = &parsed[0];
        assert_eq!(aspirin.name(), "Aspirin");
        assert_eq!(aspirin.times().len(), 2);
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(aspirin.is_taken(day, time("08:00")));
        assert!(!aspirin.is_taken(day, time("20:00")));
    }

    #[test]
    fn uses_camel_case_keys() {
        let medication = Medication::new(
            MedicationDetails::new("Aspirin", "100mg", "#3B82F6", [time("08:00")]),
            Utc::now(),
        );

        let json = to_json(&[medication]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let record = &value[0];

        assert!(record.get("createdAt").is_some());
        assert_eq!(record["times"], serde_json::json!(["08:00"]));
        assert_eq!(record["taken"], serde_json::json!({}));
    }

    #[test]
    fn rejects_anything_but_an_array() {
        assert!(from_json("not json").is_err());
        assert!(from_json(r#"{"medications": []}"#).is_err());
    }

    #[test]
    fn skips_invalid_records() {
        let json = r##"[
            {"id": "nope"},
            42,
            {
                "id": "0b6b1e2a-4c1f-4f4e-9d6b-2f7c3f1d9a10",
                "name": "Aspirin",
                "dosage": "100mg",
                "color": "#3B82F6",
                "times": ["08:00"],
                "createdAt": "2026-10-17T07:12:45.123Z"
            }
        ]"##;

        let parsed = from_json(json).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name(), "Aspirin");
        assert!(parsed[0].taken_doses().is_empty());
    }

    #[test]
    fn drops_unparseable_times() {
        let json = r##"[{
            "id": "0b6b1e2a-4c1f-4f4e-9d6b-2f7c3f1d9a10",
            "name": "Aspirin",
            "dosage": "100mg",
            "color": "#3B82F6",
            "times": ["8:0", "20:00", "25:00"],
            "createdAt": "2026-10-17T07:12:45.123Z"
        }]"##;

        let parsed = from_json(json).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].times().iter().copied().collect::<Vec<_>>(), [time("20:00")]);
    }
}
