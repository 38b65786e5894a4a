//! Light entities backed by Govee cloud devices.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::client::GoveeClient;
use crate::device::Device;
use crate::errors::Error;
use crate::status::DeviceState;
use crate::types::{Brightness, Color, Command, HueSaturation, PowerState};

type Result<T> = std::result::Result<T, Error>;

/// Options for [`Light::turn_on`].
///
/// Brightness is on the host's 0-255 scale. If both an RGB and a
/// hue/saturation color are given, RGB wins.
#[derive(Debug, Clone, Default)]
pub struct TurnOn {
    pub brightness: Option<u8>,
    pub rgb_color: Option<Color>,
    pub hs_color: Option<HueSaturation>,
}

impl TurnOn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn rgb(mut self, color: Color) -> Self {
        self.rgb_color = Some(color);
        self
    }

    pub fn hs(mut self, hs: HueSaturation) -> Self {
        self.hs_color = Some(hs);
        self
    }

    /// The commands to send after powering on, in order.
    fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some(brightness) = self.brightness {
            commands.push(Command::brightness(Brightness::from_host(brightness)));
        }
        if let Some(color) = self.rgb_color.or_else(|| self.hs_color.map(|hs| hs.to_color())) {
            commands.push(Command::color(color));
        }
        commands
    }
}

/// A single Govee light and its last known state.
///
/// Queries read the cached [`DeviceState`]; [`Light::refresh`] and the
/// control methods talk to the API through a [`GoveeClient`] and update the
/// cache from what was sent or received.
///
/// # Example
///
/// ```
/// use govee_lights_rs::{Device, Light};
///
/// let device: Device = serde_json::from_str(r#"{"device": "AA:BB", "model": "H6159"}"#).unwrap();
/// let light = Light::new(device);
/// assert!(!light.is_on());
/// assert!(light.brightness().is_none());
/// assert_eq!(light.unique_id(), "govee_light_automation_AA:BB");
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    device: Device,
    state: Option<DeviceState>,
}

impl Light {
    const UNIQUE_ID_PREFIX: &'static str = "govee_light_automation";

    pub fn new(device: Device) -> Self {
        Light {
            device,
            state: None,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn id(&self) -> &str {
        &self.device.id
    }

    pub fn name(&self) -> String {
        self.device.name()
    }

    pub fn unique_id(&self) -> String {
        format!("{}_{}", Self::UNIQUE_ID_PREFIX, self.device.id)
    }

    pub fn state(&self) -> Option<&DeviceState> {
        self.state.as_ref()
    }

    pub fn is_on(&self) -> bool {
        self.state.as_ref().is_some_and(DeviceState::is_on)
    }

    /// Brightness on the host's 0-255 scale.
    pub fn brightness(&self) -> Option<u8> {
        self.state
            .as_ref()
            .and_then(DeviceState::brightness)
            .map(|b| b.to_host())
    }

    pub fn rgb_color(&self) -> Option<Color> {
        self.state.as_ref().and_then(DeviceState::color)
    }

    pub fn hs_color(&self) -> Option<HueSaturation> {
        self.rgb_color().as_ref().map(HueSaturation::from_color)
    }

    /// Re-read the device state from the API.
    pub async fn refresh(&mut self, client: &GoveeClient) -> Result<&DeviceState> {
        let state = client.state(&self.device).await?;
        Ok(&*self.state.insert(state))
    }

    /// Power the light on, then apply brightness and color if requested.
    ///
    /// Each step is a separate API call and counts against the quota.
    pub async fn turn_on(&mut self, client: &GoveeClient, options: &TurnOn) -> Result<()> {
        self.send(client, Command::turn(PowerState::On)).await?;
        for command in options.commands() {
            self.send(client, command).await?;
        }
        Ok(())
    }

    pub async fn turn_off(&mut self, client: &GoveeClient) -> Result<()> {
        self.send(client, Command::turn(PowerState::Off)).await
    }

    /// Device info and cached state for diagnostics.
    pub fn diagnostics(&self) -> Value {
        json!({
            "id": self.device.id,
            "name": self.name(),
            "model": self.device.model,
            "version": self.device.version,
            "supported_commands": self.device.support_cmds,
            "state": self.state.as_ref().map(|s| json!({
                "online": s.online(),
                "is_on": s.is_on(),
                "brightness": s.brightness().map(|b| b.value()),
                "color": s.color().map(|c| format!("{},{},{}", c.red(), c.green(), c.blue())),
                "color_temperature": s.color_temperature(),
            })),
        })
    }

    pub(crate) fn set_state(&mut self, state: DeviceState) {
        self.state = Some(state);
    }

    async fn send(&mut self, client: &GoveeClient, command: Command) -> Result<()> {
        client.control(&self.device, &command).await?;
        debug!("{} accepted {}", self.device.id, command.name);
        self.state.get_or_insert_with(DeviceState::default).apply(&command);
        Ok(())
    }
}
