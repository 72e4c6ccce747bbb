use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// A source of the current local wall-clock time.
///
/// "Today" and "now" are always local device time; there is no timezone
/// handling beyond that.
pub trait Clock {
    /// The current moment.
    #[must_use]
    fn now(&self) -> NaiveDateTime;

    /// The current calendar day.
    #[must_use]
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// The current moment as an absolute timestamp, for stamping records.
    ///
    /// A local time that falls in a daylight-saving gap has no instant of its
    /// own and is read as UTC.
    #[must_use]
    fn now_utc(&self) -> DateTime<Utc> {
        let now = self.now();
        now.and_local_timezone(Local)
            .earliest()
            .map_or_else(|| now.and_utc(), |local| local.with_timezone(&Utc))
    }
}

/// The system clock, in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}
