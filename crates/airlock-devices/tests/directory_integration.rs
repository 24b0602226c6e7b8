//! Integration tests for lookups and actuation against the mock grid.
//!
//! These tests resolve a full airlock layout the way the controller does and
//! check that diagnostics and door convergence behave across calls.

use airlock_core::{DeviceKind, DoorStatus};
use airlock_devices::lookup::{BlockFinder, NameMatch};
use airlock_devices::mock::MockGrid;
use airlock_devices::report::Reporter;
use airlock_devices::traits::{AirVent, DirectoryExt, Door, Sensor, TextPanel};
use airlock_devices::types::DeviceAction;

// ============================================================================
// Fixtures
// ============================================================================

fn airlock_layout() -> MockGrid {
    let mut grid = MockGrid::new();
    for (group, names) in [
        ("doorsInt", ["doorInt 1", "doorInt 2"]),
        ("doorsExt", ["doorExt 1", "doorExt 2"]),
    ] {
        for name in names {
            let id = grid.add_door(name);
            grid.add_to_group(group, id);
        }
    }
    let vent = grid.add_air_vent("airlock vent");
    grid.add_to_group("vents", vent);
    for name in ["sensorInt", "sensorChmb", "sensorExt"] {
        grid.add_sensor(name);
    }
    let panel = grid.add_text_panel("panel int");
    grid.add_to_group("statusPanelsInt", panel);
    grid
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_full_layout_resolves_cleanly() {
    let grid = airlock_layout();
    let mut reporter = Reporter::new();
    let mut finder = BlockFinder::new(&grid, &mut reporter);

    assert_eq!(finder.all_in_group::<Door>("doorsInt").len(), 2);
    assert_eq!(finder.all_in_group::<Door>("doorsExt").len(), 2);
    assert_eq!(finder.all_in_group::<AirVent>("vents").len(), 1);
    assert!(finder.first_named::<Sensor>(NameMatch::Exact("sensorChmb")).is_some());
    assert_eq!(finder.all_in_group::<TextPanel>("statusPanelsInt").len(), 1);

    assert!(!reporter.has_errors());
    assert_eq!(reporter.render(), "0 SCRIPT ERRORS\n0 SCRIPT WARNINGS\n");
}

#[test]
fn test_removed_sensor_and_group_are_reported() {
    let mut grid = airlock_layout();
    grid.remove("sensorExt").unwrap();
    grid.remove_group("vents");

    let mut reporter = Reporter::new();
    let mut finder = BlockFinder::new(&grid, &mut reporter);
    assert!(finder.first_named::<Sensor>(NameMatch::Exact("sensorExt")).is_none());
    assert!(finder.all_in_group::<AirVent>("vents").is_empty());

    assert_eq!(
        reporter.render(),
        "2 SCRIPT ERRORS\n0 SCRIPT WARNINGS\n\
         (make sure block ownership is set correctly)\n\
         -- ERROR 1: no Sensor found matching condition (exact name ; sensorExt)\n\
         -- ERROR 2: no block group with name vents found\n"
    );
}

#[test]
fn test_docked_devices_are_invisible() {
    let mut grid = MockGrid::new();
    grid.add_foreign(DeviceKind::Sensor, "sensorInt");

    let mut reporter = Reporter::new();
    let found = BlockFinder::new(&grid, &mut reporter).first_named::<Sensor>(NameMatch::Exact("sensorInt"));
    assert!(found.is_none());
    assert_eq!(reporter.entries()[0].message, "no Sensors found");
}

// ============================================================================
// Actuation
// ============================================================================

#[test]
fn test_group_force_closed_converges() {
    let mut grid = airlock_layout();
    grid.set_door_status("doorInt 1", DoorStatus::Open).unwrap();

    let mut reporter = Reporter::new();
    let doors = BlockFinder::new(&grid, &mut reporter).all_in_group::<Door>("doorsInt");

    // first call closes the open door, powers down the closed one
    grid.force_doors_closed(&doors).unwrap();
    assert_eq!(
        grid.actions_for("doorInt 1").map(|a| a.action).collect::<Vec<_>>(),
        vec![DeviceAction::SetPowered(true), DeviceAction::SetOpen(false)]
    );
    assert_eq!(
        grid.actions_for("doorInt 2").map(|a| a.action).collect::<Vec<_>>(),
        vec![DeviceAction::SetPowered(false)]
    );

    // second call powers down the door that just closed
    grid.force_doors_closed(&doors).unwrap();
    // third call is silent
    grid.clear_actions();
    grid.force_doors_closed(&doors).unwrap();
    assert!(grid.actions().is_empty());
    assert_eq!(grid.is_enabled_of("doorInt 1"), Some(false));
}

#[test]
fn test_vent_group_depressurize() {
    let mut grid = airlock_layout();
    let mut reporter = Reporter::new();
    let vents = BlockFinder::new(&grid, &mut reporter).all_in_group::<AirVent>("vents");

    grid.set_vents_depressurize(&vents, true).unwrap();
    assert_eq!(grid.depressurize_of("airlock vent"), Some(true));
}

#[test]
fn test_repeated_group_lookup_is_identical() {
    let grid = airlock_layout();
    let mut reporter = Reporter::new();
    let mut finder = BlockFinder::new(&grid, &mut reporter);

    let first = finder.all_in_group::<Door>("doorsExt");
    let second = finder.all_in_group::<Door>("doorsExt");
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|d| d.name()).collect::<Vec<_>>(),
        vec!["doorExt 1", "doorExt 2"]
    );
}
