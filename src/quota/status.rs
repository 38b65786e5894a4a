//! Quota snapshot for diagnostics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::{QuotaState, REQUESTS_PER_DEVICE_PER_DAY, adaptive_interval};

/// Point-in-time view of the quota tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub request_count: u32,
    pub device_count: u32,
    pub remaining_requests: u32,
    pub usage_fraction: f64,
    pub can_make_request: bool,
    pub adaptive_interval_seconds: u64,
    pub last_reset_date: NaiveDate,
}

impl QuotaStatus {
    /// Usage as a percentage of the safe limit.
    pub fn usage_percentage(&self) -> f64 {
        self.usage_fraction * 100.0
    }

    /// Requests per day the current devices would need at one poll per minute.
    pub fn theoretical_daily_demand(&self) -> u64 {
        u64::from(self.device_count) * u64::from(REQUESTS_PER_DEVICE_PER_DAY)
    }

    pub fn usage_level(&self) -> UsageLevel {
        UsageLevel::from_percentage(self.usage_percentage())
    }
}

impl From<&QuotaState> for QuotaStatus {
    fn from(state: &QuotaState) -> Self {
        let remaining = state.remaining();
        QuotaStatus {
            request_count: state.request_count,
            device_count: state.device_count,
            remaining_requests: remaining,
            usage_fraction: state.usage_fraction(),
            can_make_request: remaining > 0,
            adaptive_interval_seconds: adaptive_interval(state),
            last_reset_date: state.last_reset_date,
        }
    }
}

/// Coarse usage band shown on the API calls sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum UsageLevel {
    Normal,
    Warning,
    Critical,
}

impl UsageLevel {
    const WARNING_PERCENT: f64 = 80.0;
    const CRITICAL_PERCENT: f64 = 95.0;

    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::quota::UsageLevel;
    ///
    /// assert_eq!(UsageLevel::from_percentage(79.9), UsageLevel::Normal);
    /// assert_eq!(UsageLevel::from_percentage(80.0), UsageLevel::Warning);
    /// assert_eq!(UsageLevel::from_percentage(95.0), UsageLevel::Critical);
    /// ```
    pub fn from_percentage(percent: f64) -> Self {
        if percent < Self::WARNING_PERCENT {
            UsageLevel::Normal
        } else if percent < Self::CRITICAL_PERCENT {
            UsageLevel::Warning
        } else {
            UsageLevel::Critical
        }
    }
}
