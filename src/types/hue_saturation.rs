//! Hue and Saturation color representation.

use super::Color;

/// Hue and Saturation color representation.
///
/// - Hue: The color angle on the color wheel (0-360 degrees)
/// - Saturation: The intensity of the color (0-100 percent)
///
/// Hosts commonly hand colors around in this form; the Govee API only
/// accepts RGB, so conversions go both ways.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HueSaturation {
    hue: f32,
    saturation: f32,
}

impl HueSaturation {
    /// Returns `None` if values are outside valid ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::HueSaturation;
    ///
    /// assert!(HueSaturation::create(0.0, 100.0).is_some());
    /// assert!(HueSaturation::create(120.0, 50.0).is_some());
    /// assert!(HueSaturation::create(361.0, 50.0).is_none());
    /// assert!(HueSaturation::create(180.0, 101.0).is_none());
    /// ```
    pub fn create(hue: f32, saturation: f32) -> Option<Self> {
        if (0.0..=360.0).contains(&hue) && (0.0..=100.0).contains(&saturation) {
            Some(HueSaturation { hue, saturation })
        } else {
            None
        }
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    /// Convert to RGB with Value fixed at full brightness.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::HueSaturation;
    ///
    /// let color = HueSaturation::create(0.0, 100.0).unwrap().to_color();
    /// assert_eq!(color.as_tuple(), (255, 0, 0));
    /// ```
    pub fn to_color(&self) -> Color {
        let s = self.saturation / 100.0;
        let v = 1.0;

        if s == 0.0 {
            return Color::white();
        }

        let h = (self.hue % 360.0) / 60.0;
        let i = h.floor() as i32;
        let f = h - i as f32;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match i % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Color::rgb(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
        )
    }

    /// Hue and saturation of an RGB color, ignoring its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_lights_rs::{Color, HueSaturation};
    ///
    /// let hs = HueSaturation::from_color(&Color::rgb(0, 0, 255));
    /// assert_eq!(hs.hue(), 240.0);
    /// assert_eq!(hs.saturation(), 100.0);
    /// ```
    pub fn from_color(color: &Color) -> Self {
        let r = f32::from(color.red) / 255.0;
        let g = f32::from(color.green) / 255.0;
        let b = f32::from(color.blue) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        if delta == 0.0 {
            return HueSaturation::default();
        }

        let hue = if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        HueSaturation {
            hue,
            saturation: delta / max * 100.0,
        }
    }
}

impl From<&HueSaturation> for Color {
    fn from(hs: &HueSaturation) -> Self {
        hs.to_color()
    }
}

impl From<&Color> for HueSaturation {
    fn from(color: &Color) -> Self {
        HueSaturation::from_color(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grey_has_no_saturation() {
        let hs = HueSaturation::from_color(&Color::rgb(80, 80, 80));
        assert_eq!(hs, HueSaturation::default());
    }

    #[test]
    fn test_green() {
        let hs = HueSaturation::from_color(&Color::rgb(0, 255, 0));
        assert_eq!(hs.hue(), 120.0);
        assert_eq!(HueSaturation::create(120.0, 100.0).unwrap().to_color(), Color::rgb(0, 255, 0));
    }

    #[test]
    fn test_zero_saturation_is_white() {
        let color = HueSaturation::create(200.0, 0.0).unwrap().to_color();
        assert_eq!(color, Color::white());
    }
}
