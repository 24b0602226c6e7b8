//! Host simulator: a mock structure, a clock and the automations on it.

use std::io::Write;

use airlock_controller::{
    AirlockController, PressureGauge, RunOutcome, StatusMonitor, TickDivider, UpdateFrequency,
};
use airlock_core::{DeviceKind, Error};
use airlock_devices::mock::MockGrid;
use anyhow::Result;
use tracing::debug;

use crate::script::{ScriptCommand, ScriptLine};
use crate::world::{SimulatorConfig, build_grid};

struct Gauge {
    gauge: PressureGauge,
    divider: TickDivider,
}

struct Monitor {
    monitor: StatusMonitor,
    divider: TickDivider,
}

/// Drives the automations the way the host does.
pub struct Simulator {
    grid: MockGrid,
    airlock: AirlockController,
    divider: TickDivider,
    gauge: Option<Gauge>,
    monitor: Option<Monitor>,
    tick: u64,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        let grid = build_grid(&config);
        let gauge = match config.gauge {
            Some(gauge) => Some(Gauge {
                gauge: PressureGauge::new(gauge)?,
                divider: TickDivider::new(),
            }),
            None => None,
        };
        let monitor = match config.monitor {
            Some(monitor) => Some(Monitor {
                monitor: StatusMonitor::new(monitor)?,
                divider: TickDivider::new(),
            }),
            None => None,
        };
        Ok(Self {
            grid,
            airlock: AirlockController::new(config.airlock)?,
            divider: TickDivider::new(),
            gauge,
            monitor,
            tick: 0,
        })
    }

    #[cfg(test)]
    pub fn grid(&self) -> &MockGrid {
        &self.grid
    }

    pub fn airlock(&self) -> &AirlockController {
        &self.airlock
    }

    pub fn run_script(&mut self, lines: &[ScriptLine], out: &mut impl Write) -> Result<()> {
        for line in lines {
            debug!("line {}: {:?}", line.line, line.command);
            self.execute(&line.command, out)?;
        }
        Ok(())
    }

    pub fn execute(&mut self, command: &ScriptCommand, out: &mut impl Write) -> Result<()> {
        match command {
            ScriptCommand::Tick(count) => {
                for _ in 0..*count {
                    self.advance_clock(out)?;
                }
            }
            ScriptCommand::Trigger(argument) => self.run_airlock(argument, out)?,
            ScriptCommand::Pressure(percent) => {
                self.grid.set_all_oxygen_levels(f32::from(*percent) / 100.0);
            }
            ScriptCommand::Seal(sealed) => self.grid.set_all_can_pressurize(*sealed),
            ScriptCommand::Sensor { name, active } => self.grid.set_sensor_active(name, *active)?,
            ScriptCommand::Door { name, status } => self.grid.set_door_status(name, *status)?,
            ScriptCommand::Remove(name) => self.grid.remove(name)?,
            ScriptCommand::Show => self.show(out)?,
        }
        Ok(())
    }

    fn advance_clock(&mut self, out: &mut impl Write) -> Result<()> {
        self.tick += 1;
        if self.divider.tick(self.airlock.schedule()) {
            self.run_airlock("", out)?;
        }
        if let Some(gauge) = &mut self.gauge
            && gauge.divider.tick(gauge.gauge.schedule())
        {
            match gauge.gauge.run(&mut self.grid) {
                Ok(report) => {
                    debug!("tick {}: gauge {}", self.tick, report.text);
                }
                Err(Error::DevicesUnresolved { .. }) => {
                    writeln!(out, "[{:>5}] gauge aborted", self.tick)?;
                    write!(out, "{}", gauge.gauge.diagnostics())?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        if let Some(monitor) = &mut self.monitor
            && monitor.divider.tick(monitor.monitor.schedule())
        {
            match monitor.monitor.run(&mut self.grid) {
                Ok(report) => {
                    debug!("tick {}: monitor {:?}", self.tick, report.presence);
                }
                Err(Error::DevicesUnresolved { .. }) => {
                    writeln!(out, "[{:>5}] status monitor aborted", self.tick)?;
                    write!(out, "{}", monitor.monitor.diagnostics())?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn run_airlock(&mut self, argument: &str, out: &mut impl Write) -> Result<()> {
        let previous_schedule = self.airlock.schedule();
        match self.airlock.run(&mut self.grid, argument) {
            Ok(report) => {
                let cause = match &report.outcome {
                    RunOutcome::Periodic => "periodic".to_string(),
                    RunOutcome::Commanded(command) => format!("trigger {command}"),
                    RunOutcome::Ignored(argument) => format!("ignored {argument:?}"),
                };
                if report.changed_state() || !matches!(report.outcome, RunOutcome::Periodic) {
                    writeln!(
                        out,
                        "[{:>5}] {} -> {} ({}) pressure {}",
                        self.tick,
                        report.previous_state,
                        report.state,
                        cause,
                        report.readings.pressure
                    )?;
                }
                if report.schedule != previous_schedule {
                    writeln!(out, "[{:>5}] schedule: {}", self.tick, report.schedule)?;
                    if report.schedule == UpdateFrequency::None {
                        self.divider.reset();
                    }
                }
            }
            Err(Error::DevicesUnresolved { count }) => {
                writeln!(out, "[{:>5}] airlock aborted: {count} lookup error(s)", self.tick)?;
                write!(out, "{}", self.airlock.diagnostics())?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn show(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "== tick {} ==", self.tick)?;
        writeln!(out, "state: {}", self.airlock.state())?;
        writeln!(out, "schedule: {}", self.airlock.schedule())?;
        for (kind, name) in self.grid.device_names() {
            match kind {
                DeviceKind::Door => {
                    if let Some(status) = self.grid.door_status_of(name) {
                        let power = match self.grid.is_enabled_of(name) {
                            Some(true) => "on",
                            _ => "off",
                        };
                        writeln!(out, "door {name}: {status} (power {power})")?;
                    }
                }
                DeviceKind::AirVent => {
                    if let Some(depressurize) = self.grid.depressurize_of(name) {
                        let mode = if depressurize { "depressurize" } else { "pressurize" };
                        writeln!(out, "vent {name}: {mode}")?;
                    }
                }
                DeviceKind::TextPanel => {
                    if let Some(panel) = self.grid.panel(name) {
                        writeln!(out, "panel {name}:")?;
                        for text in panel.text.lines() {
                            writeln!(out, "  | {text}")?;
                        }
                    }
                }
                DeviceKind::Light => {
                    if let Some(color) = self.grid.light_color(name) {
                        writeln!(out, "light {name}: {color}")?;
                    }
                }
                DeviceKind::Sensor => {}
            }
        }
        write!(out, "{}", self.airlock.diagnostics())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use airlock_controller::{AirlockState, GaugeConfig, MonitorConfig};
    use airlock_core::DoorStatus;

    fn run(simulator: &mut Simulator, script: &str) -> String {
        let lines = parse_script(script).unwrap();
        let mut out = Vec::new();
        simulator.run_script(&lines, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_enter_cycle_script() {
        let mut simulator = Simulator::new(SimulatorConfig::default()).unwrap();
        let script = "\
            trigger enter\n\
            pressure 2\n\
            tick 20\n\
            sensor sensorChmb on\n\
            tick 10\n";
        let out = run(&mut simulator, script);

        assert!(out.contains("STANDBY -> STANDBY_TO_ENTER (trigger enter)"));
        assert!(out.contains("STANDBY_TO_ENTER -> ENTER (periodic) pressure 2%"));
        assert!(out.contains("ENTER -> ENTER_TO_STANDBY (periodic)"));
        assert_eq!(simulator.airlock().state(), AirlockState::EnterToStandby);
        assert_eq!(
            simulator.grid().door_status_of("doorsExt door"),
            Some(DoorStatus::Open)
        );
    }

    #[test]
    fn test_off_stops_the_clock() {
        let mut simulator = Simulator::new(SimulatorConfig::default()).unwrap();
        let out = run(&mut simulator, "trigger off\ntick 50\ntrigger reset\n");

        assert!(out.contains("schedule: triggered only"));
        assert!(out.contains("schedule: every 10 ticks"));
        // no periodic run happened while off
        assert_eq!(out.matches("(periodic)").count(), 0);
    }

    #[test]
    fn test_removed_device_reports() {
        let mut simulator = Simulator::new(SimulatorConfig::default()).unwrap();
        let out = run(&mut simulator, "remove sensorInt\ntick 10\n");

        assert!(out.contains("airlock aborted: 1 lookup error(s)"));
        assert!(out.contains("-- ERROR 1: no Sensor found matching condition (exact name ; sensorInt)"));
    }

    #[test]
    fn test_show_lists_panels() {
        let mut simulator = Simulator::new(SimulatorConfig::default()).unwrap();
        let out = run(&mut simulator, "trigger off\nshow\n");

        assert!(out.contains("state: OFF"));
        assert!(out.contains("panel statusPanelsChmb panel:\n  | OFF\n"));
        assert!(out.contains("  | AIRLOCK IN MANUAL MODE\n"));
    }

    #[test]
    fn test_gauge_runs_on_its_own_schedule() {
        let config = SimulatorConfig {
            gauge: Some(GaugeConfig::default().with_text_readout(true)),
            ..Default::default()
        };
        let mut simulator = Simulator::new(config).unwrap();
        run(&mut simulator, "pressure 40\ntick 99\n");
        assert!(simulator.grid().panel("statusPanels panel").unwrap().text.is_empty());

        run(&mut simulator, "tick\n");
        assert_eq!(
            simulator.grid().panel("statusPanels panel").unwrap().text,
            "PRESSURE: 40%"
        );
    }

    #[test]
    fn test_unknown_device_is_an_error() {
        let mut simulator = Simulator::new(SimulatorConfig::default()).unwrap();
        let lines = parse_script("sensor nobody on\n").unwrap();
        assert!(simulator.run_script(&lines, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_monitor_shows_presence() {
        let config = SimulatorConfig {
            monitor: Some(MonitorConfig::default()),
            ..Default::default()
        };
        let mut simulator = Simulator::new(config).unwrap();
        run(&mut simulator, "sensor sensorInt on\ntick 10\n");
        assert_eq!(
            simulator.grid().panel("statusPanels panel").unwrap().text,
            "AIRLOCK PRESSURE: 100%\nINTERIOR DOOR CLOSED\nEXTERIOR DOOR CLOSED\n\nINTERIOR:\nENTER WHEN READY"
        );

        let out = run(&mut simulator, "remove doorExt\ntick 10\n");
        assert!(out.contains("status monitor aborted"));
        assert!(out.contains("no Door found matching condition (exact name ; doorExt)"));
    }
}
