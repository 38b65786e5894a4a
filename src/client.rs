//! Quota-aware client for the Govee cloud API.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, warn};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::device::{Device, DeviceList};
use crate::errors::Error;
use crate::quota::{DEFAULT_POLLING_INTERVAL, QuotaStatus, QuotaTracker, StateStore};
use crate::status::{DeviceState, RawDeviceState};
use crate::types::{Brightness, Color, Command, PowerState};

type Result<T> = std::result::Result<T, Error>;

const API_KEY_HEADER: &str = "govee-api-key";
const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";
const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

/// Rate limit headers from the most recent API response.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorRateLimit {
    pub remaining: Option<String>,
    /// Unix timestamp, as sent by the vendor.
    pub reset: Option<String>,
    /// The response's `Date` header.
    pub timestamp: Option<String>,
}

impl VendorRateLimit {
    fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        VendorRateLimit {
            remaining: get(RATE_LIMIT_REMAINING_HEADER),
            reset: get(RATE_LIMIT_RESET_HEADER),
            timestamp: get("date"),
        }
    }

    /// The reset header as a UTC time, if it holds a Unix timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::VendorRateLimit;
    ///
    /// let limit = VendorRateLimit { reset: Some("1718000000".into()), ..Default::default() };
    /// assert_eq!(limit.reset_time().unwrap().to_rfc3339(), "2024-06-10T06:13:20+00:00");
    /// ```
    pub fn reset_time(&self) -> Option<DateTime<Utc>> {
        let secs = self.reset.as_deref()?.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned + Default"))]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: T,
}

/// Client for the Govee developer API.
///
/// Every outbound call passes through the [`QuotaTracker`] when rate limiting
/// is enabled: calls are refused with [`Error::QuotaExhausted`] once the
/// daily safe limit is spent, and each call that reaches the vendor is
/// counted, whatever its outcome.
///
/// # Example
///
/// ```no_run
/// use govee_lights_rs::{ClientConfig, GoveeClient, PowerState};
///
/// # async fn run() -> Result<(), govee_lights_rs::Error> {
/// let client = GoveeClient::new(ClientConfig::new("my-api-key"))?;
/// for device in client.devices().await? {
///     client.turn(&device, PowerState::On).await?;
/// }
/// println!("next poll in {:?}", client.polling_interval());
/// # Ok(())
/// # }
/// ```
pub struct GoveeClient {
    http: reqwest::Client,
    base_url: String,
    tracker: Option<QuotaTracker>,
    devices: RwLock<HashMap<String, Device>>,
    vendor_limit: Mutex<Option<VendorRateLimit>>,
}

impl GoveeClient {
    /// Build a client; loads the quota record from `config.storage_path`
    /// when rate limiting is enabled.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let tracker = config
            .enable_rate_limiting
            .then(|| QuotaTracker::load(StateStore::new(&config.storage_path)));
        Self::with_tracker(config, tracker)
    }

    /// Build a client around an already loaded tracker, or none to disable
    /// rate limiting.
    pub fn with_tracker(config: ClientConfig, tracker: Option<QuotaTracker>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| Error::Config("api key is not a valid header value".into()))?;
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(GoveeClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tracker,
            devices: RwLock::new(HashMap::new()),
            vendor_limit: Mutex::new(None),
        })
    }

    pub fn tracker(&self) -> Option<&QuotaTracker> {
        self.tracker.as_ref()
    }

    /// List the devices on the account and refresh the device cache.
    ///
    /// The device count feeds the adaptive polling interval.
    pub async fn devices(&self) -> Result<Vec<Device>> {
        let list: DeviceList = self.request(Method::GET, "/devices", &[], None).await?;

        {
            let mut cache = self.devices.write().unwrap_or_else(PoisonError::into_inner);
            cache.clear();
            cache.extend(list.devices.iter().map(|d| (d.id.clone(), d.clone())));
        }

        if let Some(tracker) = &self.tracker {
            tracker.record_device_count(u32::try_from(list.devices.len()).unwrap_or(u32::MAX));
            tracker.log_status();
        }
        Ok(list.devices)
    }

    /// Cached device info from the last listing.
    pub fn device(&self, id: &str) -> Option<Device> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Query the current state of a device (live API call).
    pub async fn state(&self, device: &Device) -> Result<DeviceState> {
        let raw: RawDeviceState = self
            .request(
                Method::GET,
                "/devices/state",
                &[("device", device.id.as_str()), ("model", device.model.as_str())],
                None,
            )
            .await?;
        Ok(DeviceState::from(&raw))
    }

    /// Query a device by id; it must have been seen in [`Self::devices`].
    pub async fn state_by_id(&self, id: &str) -> Result<DeviceState> {
        let device = self
            .device(id)
            .ok_or_else(|| Error::UnknownDevice(id.to_string()))?;
        self.state(&device).await
    }

    /// Send a control command to a device.
    pub async fn control(&self, device: &Device, command: &Command) -> Result<()> {
        let body = json!({
            "device": device.id,
            "model": device.model,
            "cmd": command,
        });
        let response: Value = self
            .request(Method::PUT, "/devices/control", &[], Some(&body))
            .await?;
        debug!("Control response for {}: {:?}", device.id, response);
        Ok(())
    }

    pub async fn turn(&self, device: &Device, power: PowerState) -> Result<()> {
        self.control(device, &Command::turn(power)).await
    }

    pub async fn turn_on(&self, device: &Device) -> Result<()> {
        self.turn(device, PowerState::On).await
    }

    pub async fn turn_off(&self, device: &Device) -> Result<()> {
        self.turn(device, PowerState::Off).await
    }

    pub async fn set_brightness(&self, device: &Device, brightness: Brightness) -> Result<()> {
        self.control(device, &Command::brightness(brightness)).await
    }

    pub async fn set_color(&self, device: &Device, color: Color) -> Result<()> {
        self.control(device, &Command::color(color)).await
    }

    /// Quota snapshot, or `None` when rate limiting is disabled.
    pub fn rate_limit_status(&self) -> Option<QuotaStatus> {
        self.tracker.as_ref().map(QuotaTracker::status)
    }

    /// How long to wait before the next poll.
    pub fn polling_interval(&self) -> Duration {
        let secs = self
            .tracker
            .as_ref()
            .map_or(DEFAULT_POLLING_INTERVAL, QuotaTracker::interval);
        Duration::from_secs(secs)
    }

    /// Rate limit headers seen on the most recent response.
    pub fn vendor_rate_limit(&self) -> Option<VendorRateLimit> {
        self.vendor_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take one request from the local quota, or refuse the call.
    ///
    /// The check and the count are one step, so concurrent callers cannot
    /// overshoot the safe limit. Returns the day the request was counted
    /// against, or `None` when rate limiting is disabled.
    pub fn before_request(&self) -> Result<Option<NaiveDate>> {
        let Some(tracker) = &self.tracker else {
            return Ok(None);
        };
        match tracker.try_acquire() {
            Some(day) => Ok(Some(day)),
            None => {
                warn!("Rate limit reached, skipping request");
                Err(Error::QuotaExhausted)
            }
        }
    }

    /// Give back a request that never reached the vendor.
    pub fn release_request(&self, reserved: Option<NaiveDate>) {
        if let (Some(tracker), Some(day)) = (&self.tracker, reserved) {
            tracker.release(day);
        }
    }

    async fn request<T: DeserializeOwned + Default>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T> {
        let reserved = self.before_request()?;

        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                // A connection that never opened cannot have been billed
                if e.is_connect() {
                    self.release_request(reserved);
                }
                error!("Govee API request failed: {}", e);
                return Err(Error::http("send", e));
            }
        };

        let limit = VendorRateLimit::from_headers(response.headers());
        *self.vendor_limit.lock().unwrap_or_else(PoisonError::into_inner) = Some(limit.clone());

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let remaining = limit.remaining.unwrap_or_else(|| "0".into());
            let reset = limit.reset.unwrap_or_else(|| "Unknown".into());
            warn!("Rate limit exceeded! Remaining: {}, Reset: {}", remaining, reset);
            return Err(Error::VendorRateLimited { remaining, reset });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::http("read", e))?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&bytes);
            error!("Govee API request failed with status {}: {}", status, message);
            return Err(Error::status(status, &message));
        }

        let envelope: Envelope<T> = serde_json::from_slice(&bytes).map_err(Error::JsonLoad)?;
        if envelope.code != 200 {
            error!("Govee API error {}: {}", envelope.code, envelope.message);
            return Err(Error::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }
        Ok(envelope.data)
    }
}

impl std::fmt::Debug for GoveeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoveeClient")
            .field("base_url", &self.base_url)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}
