//! Devices as returned by `GET /devices`.

use serde::{Deserialize, Serialize};

use crate::types::Capability;

/// A device registered to the API key.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Vendor device id, usually a MAC-like string.
    #[serde(rename = "device")]
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub controllable: bool,
    #[serde(default)]
    pub retrievable: bool,
    /// Raw command names; unknown ones are kept as-is.
    #[serde(default)]
    pub support_cmds: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl Device {
    /// The user-facing name, falling back to one derived from the id.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::Device;
    ///
    /// let device: Device = serde_json::from_str(r#"{"device": "AA:BB", "model": "H6159"}"#).unwrap();
    /// assert_eq!(device.name(), "Govee Light AA:BB");
    /// ```
    pub fn name(&self) -> String {
        match &self.device_name {
            Some(name) => name.clone(),
            None => format!("Govee Light {}", self.id),
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        let name = capability.to_string();
        self.support_cmds.iter().any(|cmd| *cmd == name)
    }
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct DeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_listing_entry() {
        let device: Device = serde_json::from_value(json!({
            "device": "99:E5:A4:C1:38:29:DA:7B",
            "model": "H6089",
            "deviceName": "Under Cabinet",
            "controllable": true,
            "retrievable": true,
            "supportCmds": ["turn", "brightness", "color", "colorTem"],
            "properties": {"colorTem": {"range": {"min": 2000, "max": 9000}}}
        }))
        .unwrap();

        assert_eq!(device.name(), "Under Cabinet");
        assert!(device.retrievable);
        assert!(device.supports(Capability::ColorTem));
    }

    #[test]
    fn test_missing_commands() {
        let device: Device =
            serde_json::from_value(json!({"device": "x", "model": "H6001"})).unwrap();
        assert!(!device.supports(Capability::Turn));
        assert!(!device.controllable);
    }
}
