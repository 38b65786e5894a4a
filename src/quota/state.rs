//! The persisted quota record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SAFE_REQUEST_LIMIT;

/// Request and device counters for one calendar day.
///
/// Serialized as
/// `{"last_reset_date": "YYYY-MM-DD", "request_count": n, "device_count": n}`.
/// Every field is required, so a record missing one is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub last_reset_date: NaiveDate,
    pub request_count: u32,
    pub device_count: u32,
}

impl QuotaState {
    /// A zeroed record for `today`.
    pub fn fresh(today: NaiveDate) -> Self {
        QuotaState {
            last_reset_date: today,
            request_count: 0,
            device_count: 0,
        }
    }

    /// Requests left under [`SAFE_REQUEST_LIMIT`], never below zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use govee_lights_rs::quota::QuotaState;
    ///
    /// let mut state = QuotaState::fresh(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    /// assert_eq!(state.remaining(), 9000);
    ///
    /// state.request_count = 9500;
    /// assert_eq!(state.remaining(), 0);
    /// ```
    pub fn remaining(&self) -> u32 {
        SAFE_REQUEST_LIMIT.saturating_sub(self.request_count)
    }

    /// `request_count / SAFE_REQUEST_LIMIT`. Exceeds 1.0 when over quota.
    pub fn usage_fraction(&self) -> f64 {
        f64::from(self.request_count) / f64::from(SAFE_REQUEST_LIMIT)
    }

    /// Zero the request counter if `today` is a different day.
    ///
    /// `device_count` is kept as last observed. Returns `true` if the record
    /// was rolled over.
    pub(crate) fn roll_to(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        self.last_reset_date = today;
        self.request_count = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_usage_fraction_can_exceed_one() {
        let mut state = QuotaState::fresh(day(1));
        state.request_count = 4500;
        assert!((state.usage_fraction() - 0.5).abs() < f64::EPSILON);

        state.request_count = 9900;
        assert!(state.usage_fraction() > 1.0);
    }

    #[test]
    fn test_roll_keeps_device_count() {
        let mut state = QuotaState {
            last_reset_date: day(1),
            request_count: 500,
            device_count: 7,
        };

        assert!(!state.roll_to(day(1)));
        assert_eq!(state.request_count, 500);

        assert!(state.roll_to(day(2)));
        assert_eq!(state.request_count, 0);
        assert_eq!(state.device_count, 7);
        assert_eq!(state.last_reset_date, day(2));
    }

    #[test]
    fn test_serialized_layout() {
        let state = QuotaState {
            last_reset_date: day(9),
            request_count: 12,
            device_count: 3,
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "last_reset_date": "2024-03-09",
                "request_count": 12,
                "device_count": 3,
            })
        );
    }

    #[test]
    fn test_rejects_negative_count() {
        let raw = r#"{"last_reset_date":"2024-03-09","request_count":-1,"device_count":0}"#;
        assert!(serde_json::from_str::<QuotaState>(raw).is_err());
    }
}
