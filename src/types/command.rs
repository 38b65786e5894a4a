//! Control commands sent to `PUT /devices/control`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum_macros::{Display, EnumIter, EnumString};

use super::{Brightness, Color, PowerState};

/// Command names a device may list in its `supportCmds`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Capability {
    Turn,
    Brightness,
    Color,
    ColorTem,
}

/// A single `{"name": .., "value": ..}` control command.
///
/// # Examples
///
/// ```
/// use govee_lights_rs::{Command, Color, PowerState};
///
/// let cmd = Command::turn(PowerState::On);
/// assert_eq!(
///     serde_json::to_value(&cmd).unwrap(),
///     serde_json::json!({"name": "turn", "value": "on"})
/// );
///
/// let cmd = Command::color(Color::rgb(255, 0, 0));
/// assert_eq!(
///     serde_json::to_value(&cmd).unwrap(),
///     serde_json::json!({"name": "color", "value": {"r": 255, "g": 0, "b": 0}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: Capability,
    pub value: Value,
}

impl Command {
    pub fn turn(power: PowerState) -> Self {
        Command {
            name: Capability::Turn,
            value: json!(power),
        }
    }

    pub fn brightness(brightness: Brightness) -> Self {
        Command {
            name: Capability::Brightness,
            value: json!(brightness.value()),
        }
    }

    pub fn color(color: Color) -> Self {
        Command {
            name: Capability::Color,
            value: json!(color),
        }
    }

    /// Color temperature in Kelvin.
    pub fn color_temperature(kelvin: u16) -> Self {
        Command {
            name: Capability::ColorTem,
            value: json!(kelvin),
        }
    }
}
