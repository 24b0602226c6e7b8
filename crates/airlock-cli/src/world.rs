//! Simulator configuration and the mock structure built from it.

use std::path::Path;

use airlock_controller::{AirlockConfig, GaugeConfig, MonitorConfig};
use airlock_core::DeviceKind;
use airlock_devices::mock::MockGrid;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Everything the simulator needs to build a structure and its automations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub airlock: AirlockConfig,
    /// Also run a vent pressure gauge when present.
    pub gauge: Option<GaugeConfig>,
    /// Also run a presence status monitor when present.
    pub monitor: Option<MonitorConfig>,
}

impl SimulatorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.airlock.validate()?;
        if let Some(gauge) = &config.gauge {
            gauge.validate()?;
        }
        if let Some(monitor) = &config.monitor {
            monitor.validate()?;
        }
        Ok(config)
    }
}

/// Build a structure with one device for every configured role.
///
/// Each door group gets a plain door plus its monitor door; the vent group
/// holds the monitor vent. Devices start closed, pressurized and sealed.
pub fn build_grid(config: &SimulatorConfig) -> MockGrid {
    let airlock = &config.airlock;
    let mut grid = MockGrid::new();

    for (group, monitor) in [
        (&airlock.door_int_group, &airlock.monitor_door_int_name),
        (&airlock.door_ext_group, &airlock.monitor_door_ext_name),
    ] {
        let door = grid.add_door(&format!("{group} door"));
        grid.add_to_group(group, door);
        if airlock.use_status_display {
            let door = grid.add_door(monitor);
            grid.add_to_group(group, door);
        }
    }

    let vent_name = if airlock.use_status_display {
        airlock.monitor_vent_name.clone()
    } else {
        format!("{} vent", airlock.vent_group)
    };
    let vent = grid.add_air_vent(&vent_name);
    grid.add_to_group(&airlock.vent_group, vent);

    for name in [
        &airlock.sensor_int_name,
        &airlock.sensor_chmb_name,
        &airlock.sensor_ext_name,
    ] {
        grid.add_sensor(name);
    }

    if airlock.use_status_display {
        for (enabled, group) in [
            (airlock.use_interior_panels, &airlock.status_panel_int_group),
            (airlock.use_chamber_panels, &airlock.status_panel_chmb_group),
            (airlock.use_exterior_panels, &airlock.status_panel_ext_group),
        ] {
            if enabled {
                let panel = grid.add_text_panel(&format!("{group} panel"));
                grid.add_to_group(group, panel);
            }
        }
    }

    if let Some(gauge) = &config.gauge {
        grid.add_air_vent(&gauge.vent_name);
        if gauge.use_text_panels {
            let panel = grid.add_text_panel(&format!("{} panel", gauge.status_panel_group));
            grid.add_to_group(&gauge.status_panel_group, panel);
        }
        if gauge.use_lights {
            let light = grid.add_light(&format!("{} light", gauge.status_light_group));
            grid.add_to_group(&gauge.status_light_group, light);
        }
    }

    if let Some(monitor) = &config.monitor {
        // the watched door and vent join the airlock's groups so the
        // monitor sees the cycle the controller drives
        for (name, group) in [
            (&monitor.door_int_name, &airlock.door_int_group),
            (&monitor.door_ext_name, &airlock.door_ext_group),
        ] {
            if !has_device(&grid, DeviceKind::Door, name) {
                let door = grid.add_door(name);
                grid.add_to_group(group, door);
            }
        }
        if !has_device(&grid, DeviceKind::AirVent, &monitor.vent_name) {
            let vent = grid.add_air_vent(&monitor.vent_name);
            grid.add_to_group(&airlock.vent_group, vent);
        }
        for name in [
            &monitor.sensor_int_name,
            &monitor.sensor_chmb_name,
            &monitor.sensor_ext_name,
        ] {
            if !has_device(&grid, DeviceKind::Sensor, name) {
                grid.add_sensor(name);
            }
        }
        let panel_name = format!("{} panel", monitor.status_panel_group);
        if !has_device(&grid, DeviceKind::TextPanel, &panel_name) {
            let panel = grid.add_text_panel(&panel_name);
            grid.add_to_group(&monitor.status_panel_group, panel);
        }
    }

    grid
}

fn has_device(grid: &MockGrid, kind: DeviceKind, name: &str) -> bool {
    grid.device_names().any(|(k, n)| k == kind && n == name)
}
