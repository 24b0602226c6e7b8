//! Error types for device directory operations.
//!
//! These errors describe failures talking to the host's device directory:
//! unknown groups, vanished devices, and reads or actions a device does not
//! support. Lookup helpers turn most of them into diagnostic report lines
//! instead of propagating them.

/// Result type alias for device directory operations.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Errors that can occur while talking to the device directory.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// No block group with this name exists on the structure.
    #[error("Block group not found: {group}")]
    GroupNotFound { group: String },

    /// Device is not (or no longer) present on the structure.
    #[error("Device not found: {device}")]
    NotFound { device: String },

    /// Device does not expose the requested property.
    #[error("Property {property} not supported by {device}")]
    UnsupportedProperty { device: String, property: String },

    /// Device does not accept the requested action.
    #[error("Action {action} not supported by {device}")]
    UnsupportedAction { device: String, action: String },

    /// Property value had a different type than the caller expected.
    #[error("Type mismatch reading {property}: expected {expected}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
    },

    /// Handle kind does not match the device it points at.
    #[error("Kind mismatch for {device}: expected {expected}, found {found}")]
    KindMismatch {
        device: String,
        expected: String,
        found: String,
    },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl DeviceError {
    /// Create a new group not found error.
    pub fn group_not_found(group: impl Into<String>) -> Self {
        Self::GroupNotFound {
            group: group.into(),
        }
    }

    /// Create a new device not found error.
    pub fn not_found(device: impl Into<String>) -> Self {
        Self::NotFound {
            device: device.into(),
        }
    }

    /// Create a new unsupported property error.
    pub fn unsupported_property(device: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnsupportedProperty {
            device: device.into(),
            property: property.into(),
        }
    }

    /// Create a new unsupported action error.
    pub fn unsupported_action(device: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnsupportedAction {
            device: device.into(),
            action: action.into(),
        }
    }

    /// Create a new type mismatch error.
    pub fn type_mismatch(property: impl Into<String>, expected: &'static str) -> Self {
        Self::TypeMismatch {
            property: property.into(),
            expected,
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<DeviceError> for airlock_core::Error {
    fn from(error: DeviceError) -> Self {
        airlock_core::Error::Device(error.to_string())
    }
}
