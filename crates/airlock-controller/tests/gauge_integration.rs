//! Integration tests for the vent pressure gauge.

use airlock_controller::{GaugeConfig, PressureGauge};
use airlock_core::{
    Error,
    constants::{BLACK, GAUGE_GREEN, GAUGE_RED},
};
use airlock_devices::mock::MockGrid;

fn gauge_grid() -> MockGrid {
    let mut grid = MockGrid::new();
    grid.add_air_vent("vent");
    grid.add_air_vent("vent 2");
    for name in ["gauge panel", "gauge panel 2"] {
        let id = grid.add_text_panel(name);
        grid.add_to_group("statusPanels", id);
    }
    let light = grid.add_light("gauge light");
    grid.add_to_group("statusLights", light);
    grid
}

#[test]
fn test_gauge_writes_panels_and_lights() {
    let mut grid = gauge_grid();
    grid.set_oxygen_level("vent", 0.6).unwrap();
    grid.set_oxygen_level("vent 2", 0.1).unwrap();

    let mut gauge = PressureGauge::new(GaugeConfig::default()).unwrap();
    let report = gauge.run(&mut grid).unwrap();

    assert_eq!(report.pressure.percent(), 60);
    assert_eq!(report.color, GAUGE_GREEN);
    assert_eq!(report.text, format!("PRESSURE: {}", "|".repeat(12)));

    for name in ["gauge panel", "gauge panel 2"] {
        let panel = grid.panel(name).unwrap();
        assert_eq!(panel.text, report.text);
        assert_eq!(panel.format.font_color, GAUGE_GREEN);
        assert_eq!(panel.format.background, BLACK);
    }
    assert_eq!(grid.light_color("gauge light"), Some(GAUGE_GREEN));
}

#[test]
fn test_gauge_follows_pressure() {
    let mut grid = gauge_grid();
    let mut gauge = PressureGauge::new(GaugeConfig::default().with_text_readout(true)).unwrap();

    gauge.run(&mut grid).unwrap();
    assert_eq!(grid.panel("gauge panel").unwrap().text, "PRESSURE: 100%");

    grid.set_oxygen_level("vent", 0.2).unwrap();
    let report = gauge.run(&mut grid).unwrap();
    assert_eq!(report.color, GAUGE_RED);
    assert_eq!(grid.panel("gauge panel").unwrap().text, "PRESSURE: 20%");
    assert_eq!(grid.panel("gauge panel").unwrap().writes, 2);
}

#[test]
fn test_gauge_without_outputs() {
    let mut grid = MockGrid::new();
    grid.add_air_vent("vent");

    let config = GaugeConfig::default().with_outputs(None, None);
    let mut gauge = PressureGauge::new(config).unwrap();
    let report = gauge.run(&mut grid).unwrap();
    assert_eq!(report.pressure.percent(), 100);
    assert!(grid.actions().is_empty());
}

#[test]
fn test_missing_vent_aborts() {
    let mut grid = gauge_grid();
    grid.remove("vent").unwrap();
    grid.remove_group("statusLights");

    let mut gauge = PressureGauge::new(GaugeConfig::default()).unwrap();
    let result = gauge.run(&mut grid);
    assert!(matches!(result, Err(Error::DevicesUnresolved { count: 2 })));
    assert!(grid.display_writes().is_empty());

    let diagnostics = gauge.diagnostics();
    assert!(diagnostics.contains("no Air Vent found matching condition (exact name ; vent)"));
    assert!(diagnostics.contains("no block group with name statusLights found"));
}

#[test]
fn test_vent_name_must_match_exactly() {
    let mut grid = MockGrid::new();
    grid.add_air_vent("vent 2");

    let mut gauge = PressureGauge::new(GaugeConfig::default().with_outputs(None, None)).unwrap();
    assert!(gauge.run(&mut grid).is_err());
}
