//! Today's dose schedule.
//!
//! The schedule is a pure projection of the medication list and the current
//! moment. It is cheap to build and is recomputed whenever it is needed, so
//! the `is_past` flags are only as fresh as the last derivation.

use chrono::NaiveDateTime;

use crate::domain::{Medication, TimeOfDay};

/// One dose due today: a medication paired with one of its reminder times.
///
/// Entries borrow their medication, so they cannot outlive a mutation of the
/// list they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry<'a> {
    /// The medication this dose belongs to.
    pub medication: &'a Medication,
    /// When the dose is due.
    pub time: TimeOfDay,
    /// Whether the dose has been marked taken today.
    pub taken: bool,
    /// Whether the due time is strictly earlier than the moment the schedule
    /// was derived.
    pub is_past: bool,
}

impl ScheduleEntry<'_> {
    /// Classify the dose.
    #[must_use]
    pub const fn status(&self) -> DoseStatus {
        match (self.taken, self.is_past) {
            (true, _) => DoseStatus::Taken,
            (false, true) => DoseStatus::Missed,
            (false, false) => DoseStatus::Pending,
        }
    }
}

/// The state of a single scheduled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoseStatus {
    /// Marked taken.
    Taken,
    /// Not taken and not yet due.
    Pending,
    /// Not taken and already due.
    Missed,
}

impl DoseStatus {
    /// A short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Taken => "Taken",
            Self::Pending => "Pending",
            Self::Missed => "Missed",
        }
    }
}

/// Build today's schedule.
///
/// Every reminder time of every medication yields exactly one entry. Taken
/// flags are looked up for the calendar day of `now`. The result is ordered
/// by time; entries sharing a time keep the order of `medications`.
#[must_use]
pub fn derive_schedule(medications: &[Medication], now: NaiveDateTime) -> Vec<ScheduleEntry<'_>> {
    let today = now.date();

    let mut schedule: Vec<ScheduleEntry<'_>> = medications
        .iter()
        .flat_map(|medication| {
            medication.times().iter().map(move |&time| ScheduleEntry {
                medication,
                time,
                taken: medication.is_taken(today, time),
                is_past: time.on(today) < now,
            })
        })
        .collect();

    // stable: ties keep medication order
    schedule.sort_by_key(|entry| entry.time);

    schedule
}

/// Dose counts for a day's schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailySummary {
    /// Number of scheduled doses.
    pub total: usize,
    /// Doses marked taken.
    pub taken: usize,
    /// Doses not taken and not yet due.
    pub pending: usize,
    /// Doses not taken and already due.
    pub missed: usize,
}

impl DailySummary {
    /// Tally a schedule.
    #[must_use]
    pub fn from_schedule(schedule: &[ScheduleEntry<'_>]) -> Self {
        schedule
            .iter()
            .fold(Self::default(), |mut summary, entry| {
                summary.total += 1;
                match entry.status() {
                    DoseStatus::Taken => summary.taken += 1,
                    DoseStatus::Pending => summary.pending += 1,
                    DoseStatus::Missed => summary.missed += 1,
                }
                summary
            })
    }

    /// Percentage of doses taken, rounded to the nearest whole number.
    ///
    /// An empty schedule is 0% complete.
    #[must_use]
    pub const fn completion_rate(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.taken * 200 + self.total) / (self.total * 2)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::domain::{MedicationDetails, DEFAULT_COLOR};

    fn time(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn medication(name: &str, times: &[&str]) -> Medication {
        Medication::new(
            MedicationDetails::new(name, "10mg", DEFAULT_COLOR, times.iter().map(|t| time(t))),
            Utc::now(),
        )
    }

    #[test]
    fn one_entry_per_time() {
        let medications = vec![
            medication("Aspirin", &["08:00", "20:00"]),
            medication("Vitamin D", &["12:00"]),
            medication("Empty", &[]),
        ];

        let schedule = derive_schedule(&medications, at(9, 0));

        let expected: usize = medications.iter().map(|m| m.times().len()).sum();
        assert_eq!(schedule.len(), expected);
        assert_eq!(schedule.len(), 3);
    }

    #[test]
    fn empty_list_gives_empty_schedule() {
        assert!(derive_schedule(&[], at(9, 0)).is_empty());
    }

    #[test]
    fn sorted_by_time_with_stable_ties() {
        let medications = vec![
            medication("First", &["20:00", "08:00"]),
            medication("Second", &["08:00", "07:30"]),
            medication("Third", &["08:00"]),
        ];

        let schedule = derive_schedule(&medications, at(9, 0));

        let order: Vec<(String, &str)> = schedule
            .iter()
            .map(|entry| (entry.time.to_string(), entry.medication.name()))
            .collect();

        assert_eq!(
            order,
            [
                ("07:30".to_string(), "Second"),
                ("08:00".to_string(), "First"),
                ("08:00".to_string(), "Second"),
                ("08:00".to_string(), "Third"),
                ("20:00".to_string(), "First"),
            ]
        );
    }

    #[test]
    fn past_is_strictly_before_now() {
        let medications = vec![medication("Aspirin", &["08:00", "09:00", "20:00"])];

        let schedule = derive_schedule(&medications, at(9, 0));
        let past: Vec<bool> = schedule.iter().map(|entry| entry.is_past).collect();
        assert_eq!(past, [true, false, false]);

        let one_second_later = at(9, 0) + chrono::Duration::seconds(1);
        let schedule = derive_schedule(&medications, one_second_later);
        let past: Vec<bool> = schedule.iter().map(|entry| entry.is_past).collect();
        assert_eq!(past, [true, true, false]);
    }

    #[test]
    fn taken_flags_are_for_today_only() {
        let mut aspirin = medication("Aspirin", &["08:00", "20:00"]);
        let yesterday = at(0, 0).date().pred_opt().unwrap();
        aspirin.set_taken(yesterday, time("20:00"), true);
        aspirin.set_taken(at(0, 0).date(), time("08:00"), true);
        let medications = vec![aspirin];

        let schedule = derive_schedule(&medications, at(9, 0));

        assert!(schedule[0].taken);
        assert!(!schedule[1].taken);
    }

    #[test]
    fn stale_taken_keys_are_not_surfaced() {
        let mut aspirin = medication("Aspirin", &["08:00"]);
        aspirin.set_taken(at(0, 0).date(), time("14:00"), true);
        let medications = vec![aspirin];

        let schedule = derive_schedule(&medications, at(15, 0));

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].time, time("08:00"));
        assert!(!schedule[0].taken);
    }

    #[test]
    fn status_classification() {
        let mut aspirin = medication("Aspirin", &["08:00", "10:00", "20:00"]);
        aspirin.set_taken(at(0, 0).date(), time("20:00"), true);
        let medications = vec![aspirin];

        let schedule = derive_schedule(&medications, at(9, 0));
        let statuses: Vec<DoseStatus> = schedule.iter().map(ScheduleEntry::status).collect();

        assert_eq!(
            statuses,
            [DoseStatus::Missed, DoseStatus::Pending, DoseStatus::Taken]
        );
    }

    #[test]
    fn summary_counts() {
        let mut aspirin = medication("Aspirin", &["08:00", "10:00", "20:00"]);
        aspirin.set_taken(at(0, 0).date(), time("08:00"), true);
        let medications = vec![aspirin, medication("Vitamin D", &["07:00"])];

        let schedule = derive_schedule(&medications, at(9, 0));
        let summary = DailySummary::from_schedule(&schedule);

        assert_eq!(
            summary,
            DailySummary {
                total: 4,
                taken: 1,
                pending: 2,
                missed: 1,
            }
        );
        assert_eq!(summary.completion_rate(), 25);
    }

    #[test]
    fn completion_rate_rounds_to_nearest() {
        let rate = |taken, total| {
            DailySummary {
                total,
                taken,
                ..DailySummary::default()
            }
            .completion_rate()
        };

        assert_eq!(rate(0, 0), 0);
        assert_eq!(rate(1, 3), 33);
        assert_eq!(rate(2, 3), 67);
        assert_eq!(rate(1, 8), 13);
        assert_eq!(rate(3, 3), 100);
    }
}
