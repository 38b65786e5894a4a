//! Device state tracking.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Brightness, Capability, Color, Command, PowerState};

/// Last known state of a Govee device.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DeviceState {
    online: Option<bool>,
    power: Option<PowerState>,
    brightness: Option<Brightness>,
    color: Option<Color>,
    color_temperature: Option<u16>,
}

impl DeviceState {
    pub fn online(&self) -> Option<bool> {
        self.online
    }

    pub fn power(&self) -> Option<PowerState> {
        self.power
    }

    /// Check if the light is emitting. Unknown power counts as off.
    pub fn is_on(&self) -> bool {
        self.power.is_some_and(PowerState::is_on)
    }

    pub fn brightness(&self) -> Option<Brightness> {
        self.brightness
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Color temperature in Kelvin.
    pub fn color_temperature(&self) -> Option<u16> {
        self.color_temperature
    }

    /// Apply a control command that the API accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::{Command, DeviceState, PowerState};
    ///
    /// let mut state = DeviceState::default();
    /// assert!(!state.is_on());
    ///
    /// state.apply(&Command::turn(PowerState::On));
    /// assert!(state.is_on());
    /// ```
    pub fn apply(&mut self, command: &Command) {
        let value = &command.value;
        match command.name {
            Capability::Turn => {
                if let Some(power) = value.as_str().and_then(|s| PowerState::from_str(s).ok()) {
                    self.power = Some(power);
                }
            }
            Capability::Brightness => {
                if let Some(brightness) = as_u8(value).and_then(Brightness::create) {
                    self.brightness = Some(brightness);
                }
            }
            Capability::Color => {
                if let Ok(color) = serde_json::from_value(value.clone()) {
                    self.color = Some(color);
                }
            }
            Capability::ColorTem => {
                if let Some(kelvin) = value.as_u64().and_then(|k| u16::try_from(k).ok()) {
                    self.color_temperature = Some(kelvin);
                }
            }
        }
    }

    fn set_property(&mut self, key: &str, value: &Value) {
        match key {
            "online" => {
                self.online = match value {
                    Value::Bool(b) => Some(*b),
                    Value::String(s) => s.parse().ok(),
                    _ => None,
                }
            }
            "powerState" => {
                self.power = value.as_str().and_then(|s| PowerState::from_str(s).ok());
            }
            "brightness" => self.brightness = as_u8(value).and_then(Brightness::create),
            "color" => self.color = serde_json::from_value(value.clone()).ok(),
            "colorTem" | "colorTemInKelvin" => {
                self.color_temperature = value.as_u64().and_then(|k| u16::try_from(k).ok());
            }
            _ => {}
        }
    }
}

impl From<&RawDeviceState> for DeviceState {
    fn from(raw: &RawDeviceState) -> Self {
        let mut state = DeviceState::default();
        for (key, value) in raw.properties.iter().flatten() {
            state.set_property(key, value);
        }
        state
    }
}

/// State as reported by `GET /devices/state`.
///
/// `properties` is a list of single-key objects, e.g.
/// `[{"online": true}, {"powerState": "on"}, {"brightness": 82}]`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub(crate) struct RawDeviceState {
    #[serde(default)]
    pub properties: Vec<Map<String, Value>>,
}

fn as_u8(value: &Value) -> Option<u8> {
    value.as_u64().and_then(|v| u8::try_from(v).ok())
}
