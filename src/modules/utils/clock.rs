use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};

/// Clock handle shared between stores and services
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// The wall clock used outside of tests
pub fn system_clock() -> SharedClock {
    Arc::new(DefaultClock)
}

/// A clock that only moves when told to.
///
/// Lets callers simulate elapsed time without touching process-wide state.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_moves_only_on_request() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.utc(), start);

        clock.advance(TimeDelta::hours(3));
        assert_eq!(clock.utc(), start + TimeDelta::hours(3));

        clock.set(start);
        assert_eq!(clock.utc(), start);
    }

    #[test]
    fn test_system_clock_is_recent() {
        let clock = system_clock();
        let drift = Utc::now() - clock.utc();
        assert!(drift.num_seconds().abs() < 60);
    }
}
