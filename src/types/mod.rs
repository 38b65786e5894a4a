//! Value types for light control parameters.

mod brightness;
mod color;
mod command;
mod hue_saturation;
mod power;

pub use brightness::Brightness;
pub use color::Color;
pub use command::{Capability, Command};
pub use hue_saturation::HueSaturation;
pub use power::PowerState;
