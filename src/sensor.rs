//! Diagnostic sensors derived from the quota tracker.

use serde::Serialize;
use serde_json::{Map, Value, json};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::client::{GoveeClient, VendorRateLimit};
use crate::quota::{DAILY_REQUEST_LIMIT, DEFAULT_POLLING_INTERVAL, QuotaStatus};

const UNKNOWN: &str = "Unknown";

/// The diagnostic sensors exposed next to the lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
pub enum DiagnosticSensor {
    /// Usage of the safe daily limit, in percent.
    RateLimit,
    DeviceCount,
    /// Current adaptive polling interval, in seconds.
    PollingInterval,
    /// Requests made today, with vendor header details.
    ApiCalls,
}

/// One sensor's value and attributes at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub sensor: DiagnosticSensor,
    pub name: &'static str,
    pub unique_id: &'static str,
    pub value: Value,
    pub unit: Option<&'static str>,
    pub attributes: Map<String, Value>,
}

impl DiagnosticSensor {
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticSensor::RateLimit => "Govee API Rate Limit",
            DiagnosticSensor::DeviceCount => "Govee Device Count",
            DiagnosticSensor::PollingInterval => "Govee Polling Interval",
            DiagnosticSensor::ApiCalls => "Govee API Calls",
        }
    }

    pub fn unique_id(self) -> &'static str {
        match self {
            DiagnosticSensor::RateLimit => "govee_rate_limit",
            DiagnosticSensor::DeviceCount => "govee_device_count",
            DiagnosticSensor::PollingInterval => "govee_polling_interval",
            DiagnosticSensor::ApiCalls => "govee_api_calls",
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            DiagnosticSensor::RateLimit => Some("%"),
            DiagnosticSensor::DeviceCount => None,
            DiagnosticSensor::PollingInterval => Some("seconds"),
            DiagnosticSensor::ApiCalls => Some("calls"),
        }
    }

    /// Project a quota snapshot into this sensor's reading.
    ///
    /// Without a snapshot (rate limiting disabled) the sensor reports its
    /// idle value and no attributes.
    pub fn read(
        self,
        status: Option<&QuotaStatus>,
        vendor: Option<&VendorRateLimit>,
    ) -> SensorReading {
        let (value, attributes) = match status {
            Some(status) => (self.value(status), self.attributes(status, vendor)),
            None => (self.idle_value(), Map::new()),
        };

        SensorReading {
            sensor: self,
            name: self.name(),
            unique_id: self.unique_id(),
            value,
            unit: self.unit(),
            attributes,
        }
    }

    fn value(self, status: &QuotaStatus) -> Value {
        match self {
            DiagnosticSensor::RateLimit => json!(status.usage_percentage()),
            DiagnosticSensor::DeviceCount => json!(status.device_count),
            DiagnosticSensor::PollingInterval => json!(status.adaptive_interval_seconds),
            DiagnosticSensor::ApiCalls => json!(status.request_count),
        }
    }

    fn idle_value(self) -> Value {
        match self {
            DiagnosticSensor::RateLimit => json!(0.0),
            DiagnosticSensor::PollingInterval => json!(DEFAULT_POLLING_INTERVAL),
            DiagnosticSensor::DeviceCount | DiagnosticSensor::ApiCalls => json!(0),
        }
    }

    fn attributes(self, status: &QuotaStatus, vendor: Option<&VendorRateLimit>) -> Map<String, Value> {
        match self {
            DiagnosticSensor::RateLimit => attributes([
                ("request_count", json!(status.request_count)),
                ("remaining_requests", json!(status.remaining_requests)),
                ("device_count", json!(status.device_count)),
                ("can_make_request", json!(status.can_make_request)),
                ("last_reset_date", json!(status.last_reset_date.to_string())),
            ]),
            DiagnosticSensor::DeviceCount => attributes([
                ("usage_percentage", json!(status.usage_percentage())),
                ("remaining_requests", json!(status.remaining_requests)),
                ("request_count", json!(status.request_count)),
            ]),
            DiagnosticSensor::PollingInterval => attributes([
                ("usage_percentage", json!(status.usage_percentage())),
                ("remaining_requests", json!(status.remaining_requests)),
                ("device_count", json!(status.device_count)),
            ]),
            DiagnosticSensor::ApiCalls => {
                let vendor = vendor.cloned().unwrap_or_default();
                let reset_time = match vendor.reset_time() {
                    Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    None => vendor.reset.clone().unwrap_or_else(|| UNKNOWN.into()),
                };
                attributes([
                    ("total_calls_today", json!(status.request_count)),
                    ("remaining_calls", json!(status.remaining_requests)),
                    ("usage_percentage", json!(status.usage_percentage())),
                    ("daily_limit", json!(DAILY_REQUEST_LIMIT)),
                    ("device_count", json!(status.device_count)),
                    ("adaptive_polling_interval", json!(status.adaptive_interval_seconds)),
                    ("theoretical_daily_demand", json!(status.theoretical_daily_demand())),
                    ("last_reset_date", json!(status.last_reset_date.to_string())),
                    ("rate_limit_status", json!(status.usage_level().to_string())),
                    (
                        "api_remaining_calls",
                        json!(vendor.remaining.unwrap_or_else(|| UNKNOWN.into())),
                    ),
                    ("api_reset_time", json!(reset_time)),
                    (
                        "last_api_call_time",
                        json!(vendor.timestamp.unwrap_or_else(|| UNKNOWN.into())),
                    ),
                ])
            }
        }
    }
}

fn attributes<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Read every diagnostic sensor from one quota snapshot.
pub fn read_sensors(client: &GoveeClient) -> Vec<SensorReading> {
    let status = client.rate_limit_status();
    let vendor = client.vendor_rate_limit();
    DiagnosticSensor::iter()
        .map(|sensor| sensor.read(status.as_ref(), vendor.as_ref()))
        .collect()
}
