//! Shared types for the airlock automation workspace.
//!
//! This crate holds the pieces every other crate agrees on: the error type,
//! the threshold and colour constants, and small value types such as
//! [`PressureReading`], [`DoorStatus`] and [`Color`].

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
