//! System clock adapter.

use chrono::{DateTime, Local};
use rotolog_ports::Clock;

/// Clock backed by the operating system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub(crate) struct ManualClock {
        now: Mutex<DateTime<Local>>,
    }

    impl ManualClock {
        pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
            let now = Local
                .with_ymd_and_hms(year, month, day, hour, minute, 0)
                .earliest()
                .expect("valid local time");
            Self {
                now: Mutex::new(now),
            }
        }

        pub(crate) fn advance(&self, step: Duration) {
            let mut guard = self.now.lock().expect("clock lock");
            *guard += step;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            *self.now.lock().expect("clock lock")
        }
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn manual_clock_advances_on_request() {
        let clock = ManualClock::at(2024, 3, 10, 12, 0);
        let before = clock.now();
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now() - before, Duration::minutes(90));
    }
}
