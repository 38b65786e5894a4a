//! # govee_lights_rs
//!
//! An async Rust client for Govee smart lights via the Govee cloud API, with
//! daily quota accounting and adaptive polling.
//!
//! The vendor allows 10,000 API calls per key per day. This crate counts every
//! call it makes, refuses new ones once a safe share of that budget is spent,
//! and stretches the polling interval as the device count grows so that a
//! full day of polling fits within the budget.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use govee_lights_rs::{ClientConfig, GoveeClient, Poller, TurnOn, Color};
//!
//! # async fn run() -> Result<(), govee_lights_rs::Error> {
//! let client = Arc::new(GoveeClient::new(ClientConfig::new("my-api-key"))?);
//!
//! let mut poller = Poller::new(Arc::clone(&client));
//! poller.discover().await?;
//!
//! if let Some(light) = poller.light_mut("AA:BB:CC:DD") {
//!     light
//!         .turn_on(&client, &TurnOn::new().brightness(200).rgb(Color::rgb(0, 0, 255)))
//!         .await?;
//! }
//!
//! let report = poller.poll_once().await;
//! println!("{} updated, next poll in {:?}", report.updated, client.polling_interval());
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Quota Tracking**: Persistent daily request counter, see [`quota::QuotaTracker`]
//! - **Adaptive Polling**: Interval between 60s and 300s from [`quota::adaptive_interval`]
//! - **Light Control**: Power, brightness and color through [`Light`] and [`GoveeClient`]
//! - **Diagnostics**: Quota sensors via [`read_sensors`]
//! - **Polling Loop**: Sequential state refresh with [`Poller`]
//!
//! ## Communication
//!
//! All calls go to the Govee developer API over HTTPS and carry the
//! `Govee-API-Key` header. The quota record is a small JSON file, by default
//! `govee_rate_limit.json` in the working directory.

mod client;
mod config;
mod device;
mod errors;
mod light;
mod poller;
pub mod quota;
mod sensor;
mod status;
mod types;

// Re-export public API
pub use client::{GoveeClient, VendorRateLimit};
pub use config::{ClientConfig, GOVEE_API_BASE_URL};
pub use device::Device;
pub use errors::Error;
pub use light::{Light, TurnOn};
pub use poller::{PollReport, Poller};
pub use sensor::{DiagnosticSensor, SensorReading, read_sensors};
pub use status::DeviceState;
pub use types::{Brightness, Capability, Color, Command, HueSaturation, PowerState};
