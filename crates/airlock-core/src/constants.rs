//! Constants shared by the airlock and gauge automations.
//!
//! Thresholds, default scheduling, default display formatting and the
//! palette used on status panels live here so that the controller, the
//! display formatter and the tests agree on a single value.
//!
//! # Pressure Thresholds
//!
//! Chamber pressure is an integer percentage. Two strict thresholds split it
//! into three bands:
//!
//! ```text
//!   0 ........ 4 | 5 ................ 95 | 96 ....... 100
//!     vented     |      in transit       |  pressurized
//! ```
//!
//! The in-transit band is a dead zone: no threshold-driven transition fires
//! while the pressure sits inside it.
//!
//! ```
//! use airlock_core::constants::{PRESSURIZED_ABOVE, VENTED_BELOW};
//!
//! assert!(3 < VENTED_BELOW);
//! assert!(96 > PRESSURIZED_ABOVE);
//! ```

use crate::types::Color;

// ============================================================================
// Pressure
// ============================================================================

/// Pressure below which the chamber counts as fully vented (strict).
pub const VENTED_BELOW: u8 = 5;

/// Pressure above which the chamber counts as fully pressurized (strict).
pub const PRESSURIZED_ABOVE: u8 = 95;

/// Upper bound of a pressure reading.
pub const MAX_PRESSURE: u8 = 100;

// ============================================================================
// Scheduling
// ============================================================================

/// Default host-tick interval between periodic runs.
pub const DEFAULT_UPDATE_INTERVAL: u32 = 10;

/// Host-tick intervals the scheduler understands.
pub const SUPPORTED_UPDATE_INTERVALS: [u32; 3] = [1, 10, 100];

// ============================================================================
// Display
// ============================================================================

/// Default font size written to status panels.
pub const DEFAULT_FONT_SIZE: f32 = 1.5;

/// Default font colour.
pub const WHITE: Color = Color::rgb(255, 255, 255);

/// Default background colour.
pub const BLACK: Color = Color::rgb(0, 0, 0);

/// Dim yellow used for "in progress" and "stand clear" messages.
pub const DIM_YELLOW: Color = Color::rgb(63, 63, 0);

/// Dim green used for "enter airlock" messages.
pub const DIM_GREEN: Color = Color::rgb(0, 63, 0);

/// Trailer shown on every panel while the airlock is in manual mode.
pub const MANUAL_MODE_TEXT: &str = "AIRLOCK IN MANUAL MODE";

/// Shown instead of the pressure number when the chamber cannot hold air.
pub const NO_SEAL_TEXT: &str = "NO SEAL";

// ============================================================================
// Presence monitor
// ============================================================================

/// Background while someone is inside the chamber.
pub const IN_USE_RED: Color = Color::rgb(255, 0, 0);

/// Background inviting someone waiting on one side to enter.
pub const DARK_GREEN: Color = Color::rgb(0, 31, 0);

// ============================================================================
// Pressure gauge
// ============================================================================

/// Gauge readings at or above this level are shown in cyan.
pub const DEFAULT_SAFE_LEVEL: u8 = 75;

/// Gauge readings at or above this level (and below safe) are shown in green.
pub const DEFAULT_WARNING_LEVEL: u8 = 50;

/// Gauge readings at or above this level (and below warning) are shown in yellow.
pub const DEFAULT_DANGER_LEVEL: u8 = 25;

/// Default number of `|` characters in a full gauge bar.
pub const DEFAULT_BAR_DIVISIONS: u8 = 20;

/// Default gauge label.
pub const DEFAULT_GAUGE_LABEL: &str = "PRESSURE: ";

/// Gauge colour for safe pressure.
pub const GAUGE_CYAN: Color = Color::rgb(0, 255, 255);

/// Gauge colour for acceptable pressure.
pub const GAUGE_GREEN: Color = Color::rgb(0, 255, 0);

/// Gauge colour for low pressure.
pub const GAUGE_YELLOW: Color = Color::rgb(255, 255, 0);

/// Gauge colour for dangerous pressure.
pub const GAUGE_RED: Color = Color::rgb(255, 0, 0);

// ============================================================================
// Diagnostics
// ============================================================================

/// Hint appended to the diagnostic report whenever anything was reported.
///
/// Devices owned by another player are invisible to the directory, which is
/// the most common cause of a missing device.
pub const OWNERSHIP_HINT: &str = "(make sure block ownership is set correctly)";
