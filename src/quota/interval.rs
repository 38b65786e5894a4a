//! Adaptive polling interval.

use log::debug;

use super::{
    DEFAULT_POLLING_INTERVAL, MAX_POLLING_INTERVAL, MIN_POLLING_INTERVAL, QuotaState,
    SECONDS_PER_DAY,
};

/// Per-device polling interval, in whole seconds, for the rest of the day.
///
/// Spreads the remaining budget evenly over a day across all devices and
/// clamps the result to `[MIN_POLLING_INTERVAL, MAX_POLLING_INTERVAL]`. With
/// no devices the default interval is returned; with no budget left the
/// maximum is.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use govee_lights_rs::quota::{QuotaState, adaptive_interval};
///
/// let mut state = QuotaState::fresh(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
/// assert_eq!(adaptive_interval(&state), 120);
///
/// state.device_count = 10;
/// assert_eq!(adaptive_interval(&state), 96);
/// ```
pub fn adaptive_interval(state: &QuotaState) -> u64 {
    if state.device_count == 0 {
        return DEFAULT_POLLING_INTERVAL;
    }

    let remaining = state.remaining();
    if remaining == 0 {
        return MAX_POLLING_INTERVAL;
    }

    let per_device = f64::from(remaining) / f64::from(state.device_count);
    if per_device <= 0.0 {
        return MAX_POLLING_INTERVAL;
    }

    let raw = SECONDS_PER_DAY as f64 / per_device;
    let interval = raw.clamp(MIN_POLLING_INTERVAL as f64, MAX_POLLING_INTERVAL as f64);

    debug!(
        "Adaptive polling: {} devices, {} remaining requests, {:.1} requests/device/day, {:.1}s interval",
        state.device_count, remaining, per_device, interval
    );

    interval as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn state(request_count: u32, device_count: u32) -> QuotaState {
        QuotaState {
            last_reset_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            request_count,
            device_count,
        }
    }

    #[test]
    fn test_no_devices_uses_default() {
        assert_eq!(adaptive_interval(&state(0, 0)), 120);
        assert_eq!(adaptive_interval(&state(9000, 0)), 120);
    }

    #[test]
    fn test_exhausted_backs_off() {
        assert_eq!(adaptive_interval(&state(9000, 4)), 300);
        assert_eq!(adaptive_interval(&state(12_000, 1)), 300);
    }

    #[test]
    fn test_ten_devices_fresh_day() {
        assert_eq!(adaptive_interval(&state(0, 10)), 96);
    }

    #[test]
    fn test_last_request_clamps_to_max() {
        assert_eq!(adaptive_interval(&state(8999, 1)), 300);
    }

    #[test]
    fn test_few_devices_clamp_to_min() {
        // 9000 requests for 1 device is one every 9.6s
        assert_eq!(adaptive_interval(&state(0, 1)), 60);
    }

    #[test]
    fn test_always_within_bounds() {
        for devices in [1, 2, 5, 17, 50, 200, 5000] {
            for used in [0, 1, 100, 4500, 8000, 8998, 8999] {
                let interval = adaptive_interval(&state(used, devices));
                assert!(
                    (60..=300).contains(&interval),
                    "{interval} out of range for {devices} devices, {used} used"
                );
            }
        }
    }

    #[test]
    fn test_monotonic_in_request_count() {
        for devices in [1, 3, 10, 40] {
            let mut previous = 0;
            for used in (0..=9000).step_by(250) {
                let interval = adaptive_interval(&state(used, devices));
                assert!(interval >= previous);
                previous = interval;
            }
        }
    }

    #[test]
    fn test_monotonic_in_device_count() {
        for used in [0, 3000, 8500] {
            let mut previous = 0;
            for devices in 1..=120 {
                let interval = adaptive_interval(&state(used, devices));
                assert!(interval >= previous);
                previous = interval;
            }
        }
    }
}
