use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Device errors
    #[error("Device error: {0}")]
    Device(String),

    #[error("Pressure out of range: {value} (max 100)")]
    InvalidPressure { value: u8 },

    #[error("Required devices unresolved: {count} error(s)")]
    DevicesUnresolved { count: u32 },

    // State machine errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
