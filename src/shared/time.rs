//! Wall-clock access and deadline arithmetic.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};

/// Source of "now" for every time-dependent operation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

/// The instant a deadline date expires: midnight UTC at the start of that day.
pub fn deadline_instant(deadline: NaiveDate) -> DateTime<Utc> {
    deadline.and_time(NaiveTime::MIN).and_utc()
}

/// A submission at `at` is late when it happens after the deadline instant.
pub fn is_past_deadline(deadline: NaiveDate, at: DateTime<Utc>) -> bool {
    at > deadline_instant(deadline)
}

/// Short clock time shown next to chat messages, e.g. `03:07 PM`.
pub fn display_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%I:%M %p").to_string()
}
