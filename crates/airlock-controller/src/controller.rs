//! The airlock controller.
//!
//! [`AirlockController`] is what the host invokes: once per scheduled tick
//! with an empty argument, or once per trigger with a command string. Each
//! run resolves every device, reads the chamber, evaluates the state
//! machine, actuates doors and vents, and refreshes the status panels.
//!
//! A run that cannot resolve a required device writes nothing and returns
//! `Error::DevicesUnresolved`; the rendered report explains what is missing
//! and the next run tries again.

use airlock_core::{Error, Result};
use airlock_devices::{DeviceDirectory, DirectoryExt, Reporter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AirlockConfig;
use crate::display::{StatusScreen, StatusStyle, render_status};
use crate::resolve::{DeviceSet, Readings};
use crate::schedule::UpdateFrequency;
use crate::state_machine::{
    Actuation, AirlockState, AirlockStateMachine, DoorCommand, DoorGroup, ScheduleChange,
    StateTransition, Step, Trigger,
};

/// How a run was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Periodic logic ran.
    Periodic,
    /// A command was applied (it may not have changed the state).
    Commanded(String),
    /// The argument named no command; nothing was actuated.
    Ignored(String),
}

/// Summary of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub previous_state: AirlockState,
    pub state: AirlockState,
    pub schedule: UpdateFrequency,
    pub readings: Readings,
    /// Panel text written this run, if the status display is enabled.
    pub screen: Option<StatusScreen>,
}

impl RunReport {
    pub fn changed_state(&self) -> bool {
        self.previous_state != self.state
    }
}

/// Airlock automation bound to one configuration.
///
/// # Examples
///
/// ```
/// use airlock_controller::{AirlockConfig, AirlockController, AirlockState};
/// use airlock_devices::mock::MockGrid;
///
/// let mut grid = MockGrid::new();
/// let mut controller = AirlockController::new(AirlockConfig::default()).unwrap();
///
/// // an empty structure cannot run
/// assert!(controller.run(&mut grid, "").is_err());
/// assert!(controller.diagnostics().contains("no block group with name doorsInt found"));
/// assert_eq!(controller.state(), AirlockState::Standby);
/// ```
#[derive(Debug, Clone)]
pub struct AirlockController {
    config: AirlockConfig,
    machine: AirlockStateMachine,
    schedule: UpdateFrequency,
    reporter: Reporter,
}

impl AirlockController {
    /// Create a controller in `Standby` with periodic runs enabled.
    ///
    /// # Errors
    ///
    /// Returns whatever [`AirlockConfig::validate`] rejects.
    pub fn new(config: AirlockConfig) -> Result<Self> {
        Self::with_machine(config, AirlockStateMachine::new())
    }

    /// Create a controller around an existing state machine.
    ///
    /// A machine in `Off` starts with periodic runs disabled.
    pub fn with_machine(config: AirlockConfig, machine: AirlockStateMachine) -> Result<Self> {
        config.validate()?;
        let schedule = if machine.current_state().is_manual() {
            UpdateFrequency::None
        } else {
            config.update_frequency()
        };
        Ok(Self {
            config,
            machine,
            schedule,
            reporter: Reporter::new(),
        })
    }

    pub fn config(&self) -> &AirlockConfig {
        &self.config
    }

    pub fn state(&self) -> AirlockState {
        self.machine.current_state()
    }

    /// Current periodic schedule; `None` after `off` until `reset`.
    pub fn schedule(&self) -> UpdateFrequency {
        self.schedule
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &StateTransition> {
        self.machine.history().iter()
    }

    /// Rendered diagnostic report of the last run.
    pub fn diagnostics(&self) -> String {
        self.reporter.render()
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Execute one run with the host's argument.
    ///
    /// An empty argument runs the periodic logic; a known command is
    /// applied instead; any other argument is ignored. The status panels are
    /// refreshed in every case.
    ///
    /// # Errors
    ///
    /// Returns `Error::DevicesUnresolved` if a required device is missing,
    /// in which case nothing was read, actuated or written. Directory
    /// failures after resolution surface as `Error::Device`; writes already
    /// made in that run are not rolled back.
    pub fn run<D: DeviceDirectory + ?Sized>(&mut self, directory: &mut D, argument: &str) -> Result<RunReport> {
        self.reporter.clear();

        let Some(devices) = DeviceSet::resolve(&*directory, &self.config, &mut self.reporter) else {
            let count = self.reporter.error_count();
            warn!("Airlock run aborted: {} lookup error(s)", count);
            return Err(Error::DevicesUnresolved { count });
        };

        let readings = devices.read(&*directory)?;
        let previous_state = self.machine.current_state();

        let (outcome, step) = match Trigger::parse(argument) {
            Trigger::Periodic => (
                RunOutcome::Periodic,
                Some(self.machine.advance(&readings.tick_inputs())?),
            ),
            Trigger::Command(command) => (
                RunOutcome::Commanded(command.to_string()),
                Some(self.machine.handle_command(command, self.config.use_auto_open)?),
            ),
            Trigger::Unrecognized(argument) => {
                warn!("Ignoring unknown airlock command: {:?}", argument);
                (RunOutcome::Ignored(argument), None)
            }
        };

        if let Some(step) = &step {
            self.actuate(directory, &devices, step)?;
        }

        let screen = if self.config.use_status_display {
            Some(self.refresh_display(directory, &devices, &readings)?)
        } else {
            None
        };

        let state = self.machine.current_state();
        if state != previous_state {
            debug!("Run {} left the airlock in {}", self.machine.runs(), state);
        }

        Ok(RunReport {
            outcome,
            previous_state,
            state,
            schedule: self.schedule,
            readings,
            screen,
        })
    }

    fn actuate<D: DeviceDirectory + ?Sized>(
        &mut self,
        directory: &mut D,
        devices: &DeviceSet,
        step: &Step,
    ) -> Result<()> {
        for actuation in &step.actuations {
            match *actuation {
                Actuation::Vents { depressurize } => {
                    directory.set_vents_depressurize(&devices.vents, depressurize)?;
                }
                Actuation::Doors { group, command } => {
                    let doors = match group {
                        DoorGroup::Interior => &devices.doors_int,
                        DoorGroup::Exterior => &devices.doors_ext,
                    };
                    match command {
                        DoorCommand::ForceOpen => directory.force_doors_open(doors)?,
                        DoorCommand::ForceClosed => directory.force_doors_closed(doors)?,
                        DoorCommand::PowerOnClosed => directory.set_doors_state(doors, true, false)?,
                    }
                }
                Actuation::Schedule(change) => {
                    self.schedule = match change {
                        ScheduleChange::Disable => UpdateFrequency::None,
                        ScheduleChange::Restore => self.config.update_frequency(),
                    };
                    info!("Airlock schedule: {}", self.schedule);
                }
            }
        }
        Ok(())
    }

    fn refresh_display<D: DeviceDirectory + ?Sized>(
        &self,
        directory: &mut D,
        devices: &DeviceSet,
        readings: &Readings,
    ) -> Result<StatusScreen> {
        let screen = render_status(self.machine.current_state(), readings);
        let style = StatusStyle {
            font_size: self.config.font_size,
            alignment: self.config.text_align,
        };

        let panels = &devices.panels;
        directory.write_panels(&panels.interior, &style.update(&screen.interior, &screen.trailer))?;
        directory.write_panels(&panels.chamber, &style.update(&screen.chamber, &screen.trailer))?;
        directory.write_panels(&panels.exterior, &style.update(&screen.exterior, &screen.trailer))?;
        Ok(screen)
    }
}
