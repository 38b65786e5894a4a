//! Brightness control for Govee lights.

use serde::{Deserialize, Serialize};

/// Brightness level from 0 to 100 percent, as the Govee API expects it.
///
/// Home-automation hosts usually express brightness as 0-255; use
/// [`Brightness::from_host`] and [`Brightness::to_host`] to convert.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    const MAX: u8 = 100;
    const HOST_MAX: u16 = 255;

    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is above 100.
    pub fn create(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Brightness { value })
        } else {
            None
        }
    }

    /// Convert from a 0-255 host value, truncating.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::Brightness;
    ///
    /// assert_eq!(Brightness::from_host(255).value(), 100);
    /// assert_eq!(Brightness::from_host(128).value(), 50);
    /// assert_eq!(Brightness::from_host(0).value(), 0);
    /// ```
    pub fn from_host(value: u8) -> Self {
        Brightness {
            value: (u16::from(value) * u16::from(Self::MAX) / Self::HOST_MAX) as u8,
        }
    }

    /// Convert to a 0-255 host value, truncating.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::Brightness;
    ///
    /// assert_eq!(Brightness::new().to_host(), 255);
    /// assert_eq!(Brightness::create(50).unwrap().to_host(), 127);
    /// ```
    pub fn to_host(&self) -> u8 {
        (u16::from(self.value) * Self::HOST_MAX / u16::from(Self::MAX)) as u8
    }
}
