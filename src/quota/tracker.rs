//! Persistent daily request accounting.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use log::{debug, error, info};

use super::{
    Clock, LocalClock, PersistError, PersistErrorKind, QuotaState, QuotaStatus,
    SAFE_REQUEST_LIMIT, StateStore, adaptive_interval,
};

/// Where the tracker's initial state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOrigin {
    /// A valid record was read back from storage.
    Restored,
    /// No record existed; a zeroed one was created.
    Fresh,
    /// Storage was unreadable or corrupt; a zeroed one was created.
    Recovered(PersistErrorKind),
}

/// Counts API requests against the daily safe limit.
///
/// The tracker is the only writer of its [`QuotaState`]. Every operation
/// first rolls the record over if the calendar day has changed, and every
/// mutation is written back to the [`StateStore`]. Storage failures are
/// logged and never returned: the in-memory counters keep advancing.
///
/// All methods take `&self`; a single mutex serializes the
/// read-modify-write sequences, so the tracker can be shared between tasks.
/// Writes to the store are blocking and happen under that mutex.
///
/// # Example
///
/// ```no_run
/// use govee_lights_rs::quota::{QuotaTracker, StateStore};
///
/// let tracker = QuotaTracker::load(StateStore::new("govee_rate_limit.json"));
/// if tracker.can_make_request() {
///     // ... call the API ...
///     tracker.record_request();
/// }
/// println!("next poll in {}s", tracker.interval());
/// ```
pub struct QuotaTracker {
    store: StateStore,
    clock: Arc<dyn Clock>,
    state: Mutex<QuotaState>,
    origin: StateOrigin,
}

impl QuotaTracker {
    /// Load the tracker from `store` using the local calendar.
    pub fn load(store: StateStore) -> Self {
        Self::load_with_clock(store, Arc::new(LocalClock))
    }

    /// Load the tracker from `store`, taking dates from `clock`.
    ///
    /// A missing, unreadable or malformed record is replaced by a zeroed one
    /// for today, which is written back immediately.
    pub fn load_with_clock(store: StateStore, clock: Arc<dyn Clock>) -> Self {
        let today = clock.today();
        let (state, origin) = match store.load() {
            Ok(state) => (state, StateOrigin::Restored),
            Err(PersistError::Missing(_)) => (QuotaState::fresh(today), StateOrigin::Fresh),
            Err(e) => {
                error!("Error loading rate limit data: {}", e);
                (QuotaState::fresh(today), StateOrigin::Recovered(e.kind()))
            }
        };

        let tracker = QuotaTracker {
            store,
            clock,
            state: Mutex::new(state),
            origin,
        };

        if origin == StateOrigin::Restored {
            tracker.check_and_roll_daily();
        } else {
            let state = tracker.lock();
            tracker.persist(&state);
        }
        tracker
    }

    pub fn origin(&self) -> StateOrigin {
        self.origin
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Zero the request counter if the calendar day changed since the last
    /// reset. Returns `true` if a rollover happened.
    pub fn check_and_roll_daily(&self) -> bool {
        let mut state = self.lock();
        self.roll(&mut state)
    }

    /// Count one request. Returns the updated count for today.
    pub fn record_request(&self) -> u32 {
        let mut state = self.lock();
        self.roll(&mut state);
        self.increment(&mut state);
        state.request_count
    }

    /// Check the budget and count one request in a single step.
    ///
    /// Returns the day the request was counted against, or `None` when the
    /// safe limit is spent. Concurrent callers cannot overshoot the limit.
    pub fn try_acquire(&self) -> Option<NaiveDate> {
        let mut state = self.lock();
        self.roll(&mut state);
        if state.remaining() == 0 {
            return None;
        }
        self.increment(&mut state);
        Some(state.last_reset_date)
    }

    /// Give back a request taken with [`Self::try_acquire`] that never
    /// reached the vendor. Does nothing once `day` has rolled over.
    pub fn release(&self, day: NaiveDate) {
        let mut state = self.lock();
        self.roll(&mut state);
        if state.last_reset_date == day && state.request_count > 0 {
            state.request_count -= 1;
            self.persist(&state);
            debug!("Released request: {}/{}", state.request_count, SAFE_REQUEST_LIMIT);
        }
    }

    /// Store the number of devices being polled.
    pub fn record_device_count(&self, count: u32) {
        let mut state = self.lock();
        self.roll(&mut state);
        if state.device_count != count {
            state.device_count = count;
            self.persist(&state);
            info!("Updated device count: {}", count);
        }
    }

    pub fn remaining(&self) -> u32 {
        self.current().remaining()
    }

    pub fn usage_fraction(&self) -> f64 {
        self.current().usage_fraction()
    }

    pub fn can_make_request(&self) -> bool {
        self.remaining() > 0
    }

    /// Adaptive polling interval in seconds. See [`adaptive_interval`].
    pub fn interval(&self) -> u64 {
        adaptive_interval(&self.current())
    }

    pub fn status(&self) -> QuotaStatus {
        QuotaStatus::from(&self.current())
    }

    /// A copy of the current record.
    pub fn snapshot(&self) -> QuotaState {
        self.current()
    }

    pub fn log_status(&self) {
        let status = self.status();
        info!(
            "Rate limit status: {}/{} requests used ({:.1}%), {} devices, {} remaining requests, {} second polling interval",
            status.request_count,
            SAFE_REQUEST_LIMIT,
            status.usage_percentage(),
            status.device_count,
            status.remaining_requests,
            status.adaptive_interval_seconds
        );
    }

    fn current(&self) -> QuotaState {
        let mut state = self.lock();
        self.roll(&mut state);
        state.clone()
    }

    fn roll(&self, state: &mut QuotaState) -> bool {
        let rolled = state.roll_to(self.clock.today());
        if rolled {
            info!("Resetting rate limit for new day {}", state.last_reset_date);
            self.persist(state);
        }
        rolled
    }

    fn increment(&self, state: &mut QuotaState) {
        state.request_count = state.request_count.saturating_add(1);
        self.persist(state);
        debug!("Request count: {}/{}", state.request_count, SAFE_REQUEST_LIMIT);
    }

    // Synchronous write made while the lock is held: every counted request
    // blocks the calling task for one small file write and rename.
    fn persist(&self, state: &QuotaState) {
        if let Err(e) = self.store.save(state) {
            error!("Error saving rate limit data: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, QuotaState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for QuotaTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaTracker")
            .field("store", &self.store)
            .field("state", &*self.lock())
            .field("origin", &self.origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::TestClock;
    use chrono::NaiveDate;
    use std::fs;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn tracker_in(dir: &tempfile::TempDir, clock: Arc<TestClock>) -> QuotaTracker {
        QuotaTracker::load_with_clock(StateStore::new(dir.path().join("quota.json")), clock)
    }

    #[test]
    fn test_fresh_load_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker_in(&dir, TestClock::new(day(1)));

        assert_eq!(tracker.origin(), StateOrigin::Fresh);
        assert_eq!(tracker.store().load().unwrap(), QuotaState::fresh(day(1)));
    }

    #[test]
    fn test_corrupt_record_recovers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quota.json"), "{not json").unwrap();

        let tracker = tracker_in(&dir, TestClock::new(day(1)));

        assert_eq!(
            tracker.origin(),
            StateOrigin::Recovered(PersistErrorKind::Malformed)
        );
        assert_eq!(tracker.snapshot(), QuotaState::fresh(day(1)));
        assert_eq!(tracker.store().load().unwrap(), QuotaState::fresh(day(1)));
    }

    #[test]
    fn test_record_request_persists() {
        let dir = tempfile::tempdir().unwrap();
        let clock = TestClock::new(day(1));
        let tracker = tracker_in(&dir, clock.clone());

        assert_eq!(tracker.record_request(), 1);
        assert_eq!(tracker.record_request(), 2);
        assert_eq!(tracker.remaining(), 8998);

        let reloaded = tracker_in(&dir, clock);
        assert_eq!(reloaded.origin(), StateOrigin::Restored);
        assert_eq!(reloaded.snapshot().request_count, 2);
    }

    #[test]
    fn test_device_count_only_written_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker_in(&dir, TestClock::new(day(1)));

        tracker.record_device_count(5);
        assert_eq!(tracker.store().load().unwrap().device_count, 5);

        // Remove the record; an unchanged count must not rewrite it
        fs::remove_file(tracker.store().path()).unwrap();
        tracker.record_device_count(5);
        assert!(!tracker.store().path().exists());

        tracker.record_device_count(6);
        assert_eq!(tracker.store().load().unwrap().device_count, 6);
    }

    #[test]
    fn test_daily_rollover_from_stored_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("quota.json"));
        store
            .save(&QuotaState {
                last_reset_date: day(1),
                request_count: 500,
                device_count: 8,
            })
            .unwrap();

        let tracker = QuotaTracker::load_with_clock(store, TestClock::new(day(2)));
        let status = tracker.status();

        assert_eq!(status.request_count, 0);
        assert_eq!(status.last_reset_date, day(2));
        assert_eq!(status.device_count, 8);
        assert_eq!(tracker.store().load().unwrap().request_count, 0);
    }

    #[test]
    fn test_rollover_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let clock = TestClock::new(day(1));
        let tracker = tracker_in(&dir, clock.clone());
        tracker.record_device_count(3);
        for _ in 0..500 {
            tracker.record_request();
        }
        assert_eq!(tracker.remaining(), 8500);

        clock.advance_days(1);

        assert_eq!(tracker.remaining(), 9000);
        let state = tracker.snapshot();
        assert_eq!(state.request_count, 0);
        assert_eq!(state.device_count, 3);
        assert_eq!(state.last_reset_date, day(2));
        assert!(!tracker.check_and_roll_daily());
    }

    #[test]
    fn test_status_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker_in(&dir, TestClock::new(day(1)));
        tracker.record_device_count(10);
        tracker.record_request();

        assert_eq!(tracker.status(), tracker.status());
        assert_eq!(tracker.interval(), tracker.interval());
    }

    #[test]
    fn test_exhaustion() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker_in(&dir, TestClock::new(day(1)));
        tracker.record_device_count(1);
        for _ in 0..SAFE_REQUEST_LIMIT - 1 {
            tracker.record_request();
        }

        assert_eq!(tracker.remaining(), 1);
        assert!(tracker.can_make_request());
        assert_eq!(tracker.interval(), 300);

        tracker.record_request();
        assert!(!tracker.can_make_request());
        assert!((tracker.usage_fraction() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_try_acquire_stops_at_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("quota.json"));
        store
            .save(&QuotaState {
                last_reset_date: day(1),
                request_count: SAFE_REQUEST_LIMIT - 1,
                device_count: 2,
            })
            .unwrap();
        let tracker = QuotaTracker::load_with_clock(store, TestClock::new(day(1)));

        assert_eq!(tracker.try_acquire(), Some(day(1)));
        assert_eq!(tracker.try_acquire(), None);
        assert_eq!(tracker.snapshot().request_count, SAFE_REQUEST_LIMIT);
        assert_eq!(tracker.store().load().unwrap().request_count, SAFE_REQUEST_LIMIT);
    }

    #[test]
    fn test_release_gives_back_todays_request() {
        let dir = tempfile::tempdir().unwrap();
        let clock = TestClock::new(day(1));
        let tracker = tracker_in(&dir, clock.clone());

        let reserved = tracker.try_acquire().unwrap();
        tracker.release(reserved);
        assert_eq!(tracker.snapshot().request_count, 0);
        assert_eq!(tracker.store().load().unwrap().request_count, 0);

        let reserved = tracker.try_acquire().unwrap();
        clock.advance_days(1);
        tracker.record_request();
        tracker.release(reserved);
        assert_eq!(tracker.snapshot().request_count, 1);
    }

    #[test]
    fn test_try_acquire_across_threads() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("quota.json"));
        store
            .save(&QuotaState {
                last_reset_date: day(1),
                request_count: SAFE_REQUEST_LIMIT - 3,
                device_count: 1,
            })
            .unwrap();
        let tracker = Arc::new(QuotaTracker::load_with_clock(store, TestClock::new(day(1))));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || tracker.try_acquire().is_some())
            })
            .collect();
        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(granted, 3);
        assert_eq!(tracker.snapshot().request_count, SAFE_REQUEST_LIMIT);
    }

    #[test]
    fn test_storage_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quota.json");
        fs::create_dir(&path).unwrap();

        let tracker =
            QuotaTracker::load_with_clock(StateStore::new(&path), TestClock::new(day(1)));
        assert_eq!(tracker.origin(), StateOrigin::Recovered(PersistErrorKind::Io));

        assert_eq!(tracker.record_request(), 1);
        assert_eq!(tracker.record_request(), 2);
        assert_eq!(tracker.remaining(), 8998);
    }

    #[test]
    fn test_shared_between_threads() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = Arc::new(tracker_in(&dir, TestClock::new(day(1))));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        tracker.record_request();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.snapshot().request_count, 100);
        assert_eq!(tracker.store().load().unwrap().request_count, 100);
    }
}
