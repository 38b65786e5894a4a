//! Daily API quota accounting and adaptive polling.
//!
//! The vendor caps every API key at [`DAILY_REQUEST_LIMIT`] calls per day. The
//! [`QuotaTracker`] counts the calls this crate makes against a lower
//! [`SAFE_REQUEST_LIMIT`], persists the count across restarts through a
//! [`StateStore`], and derives a polling cadence with [`adaptive_interval`].

mod clock;
mod interval;
mod state;
mod status;
mod store;
mod tracker;

pub use clock::{Clock, LocalClock};
#[cfg(test)]
pub(crate) use clock::TestClock;
pub use interval::adaptive_interval;
pub use state::QuotaState;
pub use status::{QuotaStatus, UsageLevel};
pub use store::{PersistError, PersistErrorKind, StateStore};
pub use tracker::{QuotaTracker, StateOrigin};

/// Calls per day the vendor allows a single API key.
pub const DAILY_REQUEST_LIMIT: u32 = 10_000;

/// Calls per day this crate allows itself (90% of the vendor cap).
///
/// The headroom absorbs calls made with the same key outside this tracker.
pub const SAFE_REQUEST_LIMIT: u32 = DAILY_REQUEST_LIMIT / 10 * 9;

/// Theoretical budget of one request per minute for a single device.
pub const REQUESTS_PER_DEVICE_PER_DAY: u32 = 1_440;

/// Lower bound of the polling interval, in seconds.
pub const MIN_POLLING_INTERVAL: u64 = 60;

/// Upper bound of the polling interval, in seconds.
pub const MAX_POLLING_INTERVAL: u64 = 300;

/// Polling interval used while no devices are known, in seconds.
pub const DEFAULT_POLLING_INTERVAL: u64 = 120;

/// Length of the day the remaining budget is spread over, in seconds.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Default file name of the persisted quota record.
pub const DEFAULT_STORAGE_PATH: &str = "govee_rate_limit.json";
