//! Value types exchanged with the device directory.
//!
//! Property reads, actions and display writes are enumerated here instead of
//! being addressed by the host's action-name strings.

use airlock_core::{
    Color, DeviceKind, DoorStatus, TextAlignment,
    constants::{BLACK, DEFAULT_FONT_SIZE, WHITE},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DeviceError, Result};

/// Directory-assigned identifier of a single device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    /// Create a block id from its raw value.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw id.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Untyped reference to a device, as returned by directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    /// Directory id.
    pub id: BlockId,

    /// Device kind.
    pub kind: DeviceKind,

    /// Player-assigned device name.
    pub name: String,
}

impl BlockRef {
    /// Create a new block reference.
    pub fn new(id: BlockId, kind: DeviceKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
        }
    }
}

/// Readable device property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    /// Device is powered on.
    Enabled,
    /// Door open/closed/moving status.
    DoorStatus,
    /// Sensor currently detects someone.
    SensorActive,
    /// Vent oxygen fill fraction (0.0-1.0).
    OxygenLevel,
    /// Vent's room is sealed and can hold pressure.
    CanPressurize,
    /// Vent is set to depressurize.
    Depressurize,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Value of a device property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Level(f32),
    DoorStatus(DoorStatus),
}

impl PropertyValue {
    /// Interpret the value as a boolean.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::TypeMismatch` for non-boolean values.
    pub fn as_bool(&self, property: Property) -> Result<bool> {
        match self {
            Self::Bool(value) => Ok(*value),
            _ => Err(DeviceError::type_mismatch(property.to_string(), "bool")),
        }
    }

    /// Interpret the value as a fill level.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::TypeMismatch` for non-level values.
    pub fn as_level(&self, property: Property) -> Result<f32> {
        match self {
            Self::Level(value) => Ok(*value),
            _ => Err(DeviceError::type_mismatch(property.to_string(), "level")),
        }
    }

    /// Interpret the value as a door status.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::TypeMismatch` for non-status values.
    pub fn as_door_status(&self, property: Property) -> Result<DoorStatus> {
        match self {
            Self::DoorStatus(value) => Ok(*value),
            _ => Err(DeviceError::type_mismatch(
                property.to_string(),
                "door status",
            )),
        }
    }
}

/// Command sent to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceAction {
    /// Power the device on or off.
    SetPowered(bool),
    /// Request a door to open (`true`) or close (`false`).
    SetOpen(bool),
    /// Switch a vent between depressurize and pressurize.
    SetDepressurize(bool),
    /// Set a light's colour.
    SetColor(Color),
}

impl fmt::Display for DeviceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetPowered(on) => write!(f, "SetPowered({on})"),
            Self::SetOpen(open) => write!(f, "SetOpen({open})"),
            Self::SetDepressurize(on) => write!(f, "SetDepressurize({on})"),
            Self::SetColor(color) => write!(f, "SetColor({color})"),
        }
    }
}

/// Formatting applied to a text panel together with its text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelFormat {
    pub font_size: f32,
    pub alignment: TextAlignment,
    pub font_color: Color,
    pub background: Color,
}

impl PanelFormat {
    /// Set the font colour.
    pub fn with_font_color(mut self, color: Color) -> Self {
        self.font_color = color;
        self
    }

    /// Set the background colour.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the alignment.
    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl Default for PanelFormat {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            alignment: TextAlignment::Left,
            font_color: WHITE,
            background: BLACK,
        }
    }
}

/// A single "set text and colours" write to a text panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelUpdate {
    pub text: String,
    pub format: PanelFormat,
    /// Append to the existing text instead of replacing it.
    pub append: bool,
}

impl PanelUpdate {
    /// Create a replacing write.
    pub fn replace(text: impl Into<String>, format: PanelFormat) -> Self {
        Self {
            text: text.into(),
            format,
            append: false,
        }
    }

    /// Create an appending write.
    pub fn append(text: impl Into<String>, format: PanelFormat) -> Self {
        Self {
            text: text.into(),
            format,
            append: true,
        }
    }
}
