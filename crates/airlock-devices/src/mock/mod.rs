//! Mock device directory for testing and development.
//!
//! [`MockGrid`] stands in for the host's structure: tests and the simulator
//! place named devices and groups on it, drive sensor and pressure values,
//! and inspect the actions and display writes the automations produced.

pub mod grid;

pub use grid::{ActionRecord, MockGrid, PanelState};
