//! Airlock automation crate.
//!
//! This crate contains the airlock state machine, the per-run device
//! resolution, the status display formatting and the controller that ties
//! them to a [`DeviceDirectory`](airlock_devices::DeviceDirectory). A small
//! pressure gauge and a read-only presence status monitor share the same
//! device layer.

pub mod config;
pub mod controller;
pub mod display;
pub mod gauge;
pub mod resolve;
pub mod schedule;
pub mod state_machine;
pub mod status_monitor;

pub use config::{AirlockConfig, GaugeConfig, MonitorConfig};
pub use controller::{AirlockController, RunOutcome, RunReport};
pub use display::{PanelMessage, StatusScreen, StatusStyle, render_status};
pub use gauge::{GaugeReport, PressureGauge};
pub use resolve::{DeviceSet, Readings};
pub use schedule::{TickDivider, UpdateFrequency};
pub use state_machine::{
    AirlockCommand, AirlockState, AirlockStateMachine, AirlockStateMachineBuilder, StateTransition,
    Trigger,
};
pub use status_monitor::{MonitorReport, Presence, PresenceMessage, StatusMonitor, render_presence};
