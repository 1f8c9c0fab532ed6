use chrono::{Local, NaiveDateTime};

/// Source of the reference time used to split shows into past and upcoming.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time, timezone-naive to match stored show times.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
