//! Common test utilities for airlock integration tests.
//!
//! [`airlock_grid`] builds the structure every flow test starts from: two
//! doors per group (one of them the monitor door), two vents, the three
//! presence sensors and one panel per status group, all matching the
//! default configuration.

#![allow(dead_code)]

use airlock_controller::{AirlockConfig, AirlockController, AirlockState, RunReport};
use airlock_core::DoorStatus;
use airlock_devices::mock::MockGrid;

pub const INTERIOR_DOORS: [&str; 2] = ["doorInt", "monitorDoorInt"];
pub const EXTERIOR_DOORS: [&str; 2] = ["doorExt", "monitorDoorExt"];

pub const PANEL_INT: &str = "panelInt";
pub const PANEL_CHMB: &str = "panelChmb";
pub const PANEL_EXT: &str = "panelExt";

/// Structure matching [`AirlockConfig::default`], pressurized and sealed.
pub fn airlock_grid() -> MockGrid {
    let mut grid = MockGrid::new();
    for name in INTERIOR_DOORS {
        let id = grid.add_door(name);
        grid.add_to_group("doorsInt", id);
    }
    for name in EXTERIOR_DOORS {
        let id = grid.add_door(name);
        grid.add_to_group("doorsExt", id);
    }
    for name in ["monitorVent", "vent2"] {
        let id = grid.add_air_vent(name);
        grid.add_to_group("vents", id);
    }
    for name in ["sensorInt", "sensorChmb", "sensorExt"] {
        grid.add_sensor(name);
    }
    for (group, name) in [
        ("statusPanelsInt", PANEL_INT),
        ("statusPanelsChmb", PANEL_CHMB),
        ("statusPanelsExt", PANEL_EXT),
    ] {
        let id = grid.add_text_panel(name);
        grid.add_to_group(group, id);
    }
    grid
}

pub fn controller() -> AirlockController {
    AirlockController::new(AirlockConfig::default()).expect("default config is valid")
}

/// Set every vent to the given pressure percentage.
pub fn set_pressure(grid: &mut MockGrid, percent: u8) {
    grid.set_all_oxygen_levels(f32::from(percent) / 100.0);
}

/// Run once and unwrap, for steps that must succeed.
pub fn run(controller: &mut AirlockController, grid: &mut MockGrid, argument: &str) -> RunReport {
    controller
        .run(grid, argument)
        .unwrap_or_else(|e| panic!("run {argument:?} failed: {e}\n{}", controller.diagnostics()))
}

/// Run the periodic logic `n` times and return the final state.
pub fn run_periodic(
    controller: &mut AirlockController,
    grid: &mut MockGrid,
    n: usize,
) -> AirlockState {
    for _ in 0..n {
        run(controller, grid, "");
    }
    controller.state()
}

pub fn group_has_open_door(grid: &MockGrid, names: &[&str]) -> bool {
    names
        .iter()
        .any(|name| grid.door_status_of(name) == Some(DoorStatus::Open))
}

pub fn interior_open(grid: &MockGrid) -> bool {
    group_has_open_door(grid, &INTERIOR_DOORS)
}

pub fn exterior_open(grid: &MockGrid) -> bool {
    group_has_open_door(grid, &EXTERIOR_DOORS)
}

pub fn panel_text(grid: &MockGrid, name: &str) -> String {
    grid.panel(name).map(|p| p.text.clone()).unwrap_or_default()
}
