use crate::{
    Result,
    constants::{MAX_PRESSURE, PRESSURIZED_ABOVE, VENTED_BELOW},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chamber pressure as an integer percentage (0-100).
///
/// Readings come from a vent's oxygen fill fraction, rounded to the nearest
/// whole percent with ties going to the even neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PressureReading(u8);

impl PressureReading {
    /// Create a reading from a whole percentage.
    ///
    /// # Errors
    /// Returns `Error::InvalidPressure` if `percent` is above 100.
    pub fn new(percent: u8) -> Result<Self> {
        if percent > MAX_PRESSURE {
            return Err(Error::InvalidPressure { value: percent });
        }
        Ok(Self(percent))
    }

    /// Convert a vent oxygen fill fraction (0.0-1.0) into a reading.
    ///
    /// Out-of-range fractions are clamped; NaN reads as vacuum.
    ///
    /// ```
    /// use airlock_core::PressureReading;
    ///
    /// assert_eq!(PressureReading::from_oxygen_level(0.034).percent(), 3);
    /// assert_eq!(PressureReading::from_oxygen_level(0.965).percent(), 96);
    /// assert_eq!(PressureReading::from_oxygen_level(1.7).percent(), 100);
    /// ```
    #[must_use]
    pub fn from_oxygen_level(level: f32) -> Self {
        let percent = (level * 100.0)
            .round_ties_even()
            .clamp(0.0, f32::from(MAX_PRESSURE));
        // NaN survives clamp and casts to 0
        Self(percent as u8)
    }

    /// Get the reading as a whole percentage.
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Chamber is fully vented (strictly below the vented threshold).
    #[must_use]
    pub fn is_vented(&self) -> bool {
        self.0 < VENTED_BELOW
    }

    /// Chamber is fully pressurized (strictly above the pressurized threshold).
    #[must_use]
    pub fn is_pressurized(&self) -> bool {
        self.0 > PRESSURIZED_ABOVE
    }

    /// Reading sits in the dead zone between the two thresholds.
    #[must_use]
    pub fn is_in_transit(&self) -> bool {
        !self.is_vented() && !self.is_pressurized()
    }
}

impl fmt::Display for PressureReading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// RGB colour written to panel fonts, panel backgrounds and lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a colour from its components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Get the RGB components.
    #[must_use]
    pub fn as_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Physical status of a door as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorStatus {
    Open,
    Closed,
    Opening,
    Closing,
}

impl DoorStatus {
    /// Upper-case label used on status panels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorStatus::Open => "OPEN",
            DoorStatus::Closed => "CLOSED",
            DoorStatus::Opening => "OPENING",
            DoorStatus::Closing => "CLOSING",
        }
    }
}

impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DoorStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(DoorStatus::Open),
            "closed" => Ok(DoorStatus::Closed),
            "opening" => Ok(DoorStatus::Opening),
            "closing" => Ok(DoorStatus::Closing),
            other => Err(Error::Device(format!("Unknown door status: {other}"))),
        }
    }
}

/// Kind of device the automations know how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Door,
    Sensor,
    AirVent,
    TextPanel,
    Light,
}

impl DeviceKind {
    /// Human-readable name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DeviceKind::Door => "Door",
            DeviceKind::Sensor => "Sensor",
            DeviceKind::AirVent => "Air Vent",
            DeviceKind::TextPanel => "Text Panel",
            DeviceKind::Light => "Light",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Horizontal text alignment on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}
