//! Calendar source for the daily rollover.

use chrono::{Local, NaiveDate};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Supplies the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The host's local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable calendar for tests.
#[cfg(test)]
pub(crate) struct TestClock(Mutex<NaiveDate>);

#[cfg(test)]
impl TestClock {
    pub(crate) fn new(date: NaiveDate) -> Arc<Self> {
        Arc::new(TestClock(Mutex::new(date)))
    }

    pub(crate) fn advance_days(&self, days: u64) {
        let mut date = self.0.lock().unwrap();
        *date = *date + chrono::Days::new(days);
    }
}

#[cfg(test)]
impl Clock for TestClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}
