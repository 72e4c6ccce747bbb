use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A reminder time within a day, with minute precision.
///
/// Parsed from `H:MM` or `HH:MM` (24-hour clock) and always rendered
/// zero-padded as `HH:MM`. Because the rendering is zero-padded, the
/// chronological ordering of this type agrees with the lexicographic ordering
/// of its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Creates a time of day from an hour (0-23) and minute (0-59).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTimeError`] if either component is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self, InvalidTimeError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| InvalidTimeError(format!("{hour}:{minute:02}")))
    }

    /// The hour component (0-23).
    #[must_use]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    /// The minute component (0-59).
    #[must_use]
    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    /// Combines this time with a calendar day, at zero seconds.
    #[must_use]
    pub const fn on(self, day: NaiveDate) -> NaiveDateTime {
        day.and_time(self.0)
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTimeError(s.to_string());

        let (hour_part, minute_part) = s.trim().split_once(':').ok_or_else(invalid)?;

        let digits_only = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits_only(hour_part)
            || hour_part.len() > 2
            || !digits_only(minute_part)
            || minute_part.len() != 2
        {
            return Err(invalid());
        }

        let hour: u32 = hour_part.parse().map_err(|_| invalid())?;
        let minute: u32 = minute_part.parse().map_err(|_| invalid())?;

        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = InvalidTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for TimeOfDay {
    type Error = InvalidTimeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Error returned when a string is not a valid `HH:MM` time of day.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid time '{0}': expected HH:MM on a 24-hour clock")]
pub struct InvalidTimeError(String);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("08:00", 8, 0; "padded morning")]
    #[test_case("8:00", 8, 0; "unpadded hour")]
    #[test_case("00:00", 0, 0; "midnight")]
    #[test_case("23:59", 23, 59; "last minute")]
    #[test_case(" 20:30 ", 20, 30; "surrounding whitespace")]
    fn parses_valid_times(input: &str, hour: u32, minute: u32) {
        let time: TimeOfDay = input.parse().unwrap();
        assert_eq!(time.hour(), hour);
        assert_eq!(time.minute(), minute);
    }

    #[test_case(""; "empty")]
    #[test_case("0800"; "no separator")]
    #[test_case("24:00"; "hour out of range")]
    #[test_case("12:60"; "minute out of range")]
    #[test_case("12:5"; "single digit minute")]
    #[test_case("123:00"; "three digit hour")]
    #[test_case("ab:cd"; "letters")]
    #[test_case("-1:00"; "negative hour")]
    #[test_case("08:00:00"; "seconds")]
    fn rejects_invalid_times(input: &str) {
        assert!(input.parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn display_is_zero_padded() {
        let time: TimeOfDay = "7:05".parse().unwrap();
        assert_eq!(time.to_string(), "07:05");
    }

    #[test]
    fn ordering_matches_string_ordering() {
        let mut times: Vec<TimeOfDay> = ["20:00", "9:30", "08:00", "13:15"]
            .into_iter()
            .map(|s| s.parse().unwrap())
            .collect();
        times.sort();

        let mut strings: Vec<String> = times.iter().map(ToString::to_string).collect();
        let sorted = strings.clone();
        strings.sort();

        assert_eq!(strings, sorted);
        assert_eq!(sorted, ["08:00", "09:30", "13:15", "20:00"]);
    }

    #[test]
    fn serializes_as_string() {
        let time: TimeOfDay = "8:00".parse().unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"08:00\"");

        let parsed: TimeOfDay = serde_json::from_str("\"20:00\"").unwrap();
        assert_eq!(parsed.to_string(), "20:00");

        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }
}
