//! Airlock state machine.
//!
//! The airlock cycles a chamber between the pressurized interior and the
//! vacuum outside. Two door groups and a vent group are driven from the
//! current state, the chamber pressure and three presence sensors.
//!
//! # States
//!
//! - `Off`: manual mode, the automation leaves the doors alone
//! - `Standby`: both door groups held closed
//! - `StandbyToEnter`: venting the chamber for someone outside
//! - `Enter`: exterior doors open, waiting for someone in the chamber
//! - `EnterToStandby`: refilling, then opening the interior doors
//! - `StandbyToExit`: filling the chamber for someone inside
//! - `Exit`: interior doors open, waiting for someone in the chamber
//! - `ExitToStandby`: venting, then opening the exterior doors
//!
//! # Periodic Cycle
//!
//! ```text
//! Standby -> StandbyToEnter -> Enter -> EnterToStandby -> Standby
//! Standby -> StandbyToExit  -> Exit  -> ExitToStandby  -> Standby
//! ```
//!
//! Commands (`off`, `reset`, `enter`, `enterOverride`, ...) can jump out of
//! the cycle; see [`AirlockCommand`].
//!
//! The decision logic lives in two pure functions, [`periodic_step`] and
//! [`command_step`], which return the next state plus the [`Actuation`]s to
//! perform. [`AirlockStateMachine`] wraps them with state ownership and a
//! bounded transition history.
//!
//! # Examples
//!
//! ```
//! use airlock_controller::state_machine::{AirlockCommand, AirlockState, AirlockStateMachine, TickInputs};
//! use airlock_core::PressureReading;
//!
//! let mut machine = AirlockStateMachine::new();
//! machine.handle_command(AirlockCommand::Enter, true).unwrap();
//! assert_eq!(machine.current_state(), AirlockState::StandbyToEnter);
//!
//! let vented = TickInputs::new(PressureReading::new(2).unwrap());
//! machine.advance(&vented).unwrap();
//! assert_eq!(machine.current_state(), AirlockState::Enter);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use airlock_core::{Error, PressureReading, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Maximum number of state transitions to keep in history.
const MAX_HISTORY_SIZE: usize = 100;

/// The eight airlock states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirlockState {
    /// Manual mode; periodic runs hold both door groups closed like `Standby`.
    Off,

    /// Idle with both door groups closed.
    Standby,

    /// Venting before the exterior doors open.
    StandbyToEnter,

    /// Exterior doors open for someone coming in.
    Enter,

    /// Refilling before the interior doors open.
    EnterToStandby,

    /// Filling before the interior doors open.
    StandbyToExit,

    /// Interior doors open for someone going out.
    Exit,

    /// Venting before the exterior doors open.
    ExitToStandby,
}

impl AirlockState {
    /// Every state, in declaration order.
    pub const ALL: [AirlockState; 8] = [
        AirlockState::Off,
        AirlockState::Standby,
        AirlockState::StandbyToEnter,
        AirlockState::Enter,
        AirlockState::EnterToStandby,
        AirlockState::StandbyToExit,
        AirlockState::Exit,
        AirlockState::ExitToStandby,
    ];

    /// Upper-case name shown on status panels.
    pub fn as_str(&self) -> &'static str {
        match self {
            AirlockState::Off => "OFF",
            AirlockState::Standby => "STANDBY",
            AirlockState::StandbyToEnter => "STANDBY_TO_ENTER",
            AirlockState::Enter => "ENTER",
            AirlockState::EnterToStandby => "ENTER_TO_STANDBY",
            AirlockState::StandbyToExit => "STANDBY_TO_EXIT",
            AirlockState::Exit => "EXIT",
            AirlockState::ExitToStandby => "EXIT_TO_STANDBY",
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, AirlockState::Off)
    }

    /// Check if a transition to `target` is reachable in one run.
    ///
    /// `off` and `reset` reach `Off` and `Standby` from anywhere, the
    /// overrides reach `Enter` and `Exit` from any automatic state, and
    /// `enter`/`exit` leave `Standby`. The periodic cycle adds the remaining
    /// edges.
    ///
    /// ```
    /// use airlock_controller::state_machine::AirlockState;
    ///
    /// assert!(AirlockState::Enter.can_transition_to(&AirlockState::EnterToStandby));
    /// assert!(!AirlockState::Enter.can_transition_to(&AirlockState::StandbyToExit));
    /// assert!(!AirlockState::Off.can_transition_to(&AirlockState::Enter));
    /// ```
    pub fn can_transition_to(&self, target: &AirlockState) -> bool {
        match (self, target) {
            // off / reset
            (_, AirlockState::Off | AirlockState::Standby) => true,
            // enter / exit
            (AirlockState::Standby, AirlockState::StandbyToEnter | AirlockState::StandbyToExit) => {
                true
            }
            // overrides, which also cover StandbyToEnter -> Enter and StandbyToExit -> Exit
            (from, AirlockState::Enter | AirlockState::Exit) => !from.is_manual(),
            // periodic
            (AirlockState::Enter, AirlockState::EnterToStandby)
            | (AirlockState::Exit, AirlockState::ExitToStandby) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AirlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A textual trigger the host passes to the automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AirlockCommand {
    /// Switch to manual mode and stop periodic runs.
    Off,
    /// Return to standby and restore periodic runs.
    Reset,
    Enter,
    /// `enter`, but only if auto-open is enabled.
    EnterAuto,
    /// Jump straight to `Enter` from any automatic state.
    EnterOverride,
    Exit,
    /// `exit`, but only if auto-open is enabled.
    ExitAuto,
    /// Jump straight to `Exit` from any automatic state.
    ExitOverride,
}

impl AirlockCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            AirlockCommand::Off => "off",
            AirlockCommand::Reset => "reset",
            AirlockCommand::Enter => "enter",
            AirlockCommand::EnterAuto => "enterAuto",
            AirlockCommand::EnterOverride => "enterOverride",
            AirlockCommand::Exit => "exit",
            AirlockCommand::ExitAuto => "exitAuto",
            AirlockCommand::ExitOverride => "exitOverride",
        }
    }
}

impl fmt::Display for AirlockCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AirlockCommand {
    type Err = Error;

    /// Parse a trigger argument. Matching is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "off" => Ok(AirlockCommand::Off),
            "reset" => Ok(AirlockCommand::Reset),
            "enter" => Ok(AirlockCommand::Enter),
            "enterAuto" => Ok(AirlockCommand::EnterAuto),
            "enterOverride" => Ok(AirlockCommand::EnterOverride),
            "exit" => Ok(AirlockCommand::Exit),
            "exitAuto" => Ok(AirlockCommand::ExitAuto),
            "exitOverride" => Ok(AirlockCommand::ExitOverride),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

/// What a single run was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Empty argument: run the periodic logic.
    Periodic,
    Command(AirlockCommand),
    /// Non-empty argument that names no command.
    Unrecognized(String),
}

impl Trigger {
    /// Classify a host argument.
    ///
    /// ```
    /// use airlock_controller::state_machine::{AirlockCommand, Trigger};
    ///
    /// assert_eq!(Trigger::parse(""), Trigger::Periodic);
    /// assert_eq!(Trigger::parse("exitAuto"), Trigger::Command(AirlockCommand::ExitAuto));
    /// assert_eq!(Trigger::parse("Enter"), Trigger::Unrecognized("Enter".to_string()));
    /// ```
    pub fn parse(argument: &str) -> Self {
        if argument.is_empty() {
            return Trigger::Periodic;
        }
        match argument.parse() {
            Ok(command) => Trigger::Command(command),
            Err(_) => Trigger::Unrecognized(argument.to_string()),
        }
    }
}

/// Sensor and pressure readings for one periodic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInputs {
    pub pressure: PressureReading,
    pub player_at_int: bool,
    pub player_at_chmb: bool,
    pub player_at_ext: bool,
}

impl TickInputs {
    /// Inputs with nobody present.
    pub fn new(pressure: PressureReading) -> Self {
        Self {
            pressure,
            player_at_int: false,
            player_at_chmb: false,
            player_at_ext: false,
        }
    }

    pub fn with_presence(mut self, interior: bool, chamber: bool, exterior: bool) -> Self {
        self.player_at_int = interior;
        self.player_at_chmb = chamber;
        self.player_at_ext = exterior;
        self
    }
}

/// Which door group an actuation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorGroup {
    Interior,
    Exterior,
}

/// Door group command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorCommand {
    /// Drive open, then power down.
    ForceOpen,
    /// Drive closed, then power down.
    ForceClosed,
    /// Power on and request closed, unconditionally.
    PowerOnClosed,
}

/// Change to the host's periodic schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleChange {
    /// Stop periodic runs; only triggers run the automation.
    Disable,
    /// Restore the configured periodic schedule.
    Restore,
}

/// One effect of a run, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actuation {
    /// Set the depressurize flag on every vent of the group.
    Vents { depressurize: bool },
    Doors {
        group: DoorGroup,
        command: DoorCommand,
    },
    Schedule(ScheduleChange),
}

impl Actuation {
    fn doors(group: DoorGroup, command: DoorCommand) -> Self {
        Actuation::Doors { group, command }
    }
}

/// Result of evaluating one run: the next state and what to actuate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: AirlockState,
    pub actuations: Vec<Actuation>,
}

impl Step {
    fn stay(state: AirlockState) -> Self {
        Self {
            next: state,
            actuations: Vec::new(),
        }
    }

    /// Door groups commanded open by this step.
    pub fn groups_opened(&self) -> impl Iterator<Item = DoorGroup> + '_ {
        self.actuations.iter().filter_map(|a| match a {
            Actuation::Doors {
                group,
                command: DoorCommand::ForceOpen,
            } => Some(*group),
            _ => None,
        })
    }

    /// Depressurize flag written by this step, if any.
    pub fn depressurize(&self) -> Option<bool> {
        self.actuations.iter().find_map(|a| match a {
            Actuation::Vents { depressurize } => Some(*depressurize),
            _ => None,
        })
    }
}

/// Evaluate the periodic logic for one run.
///
/// `Off` falls back to the `Standby` branch without leaving `Off`.
///
/// ```
/// use airlock_controller::state_machine::{periodic_step, AirlockState, TickInputs};
/// use airlock_core::PressureReading;
///
/// // dead zone: keep filling
/// let inputs = TickInputs::new(PressureReading::new(50).unwrap());
/// let step = periodic_step(AirlockState::StandbyToExit, &inputs);
/// assert_eq!(step.next, AirlockState::StandbyToExit);
/// assert_eq!(step.depressurize(), Some(false));
/// ```
pub fn periodic_step(state: AirlockState, inputs: &TickInputs) -> Step {
    use DoorCommand::{ForceClosed, ForceOpen};
    use DoorGroup::{Exterior, Interior};

    let pressure = inputs.pressure;
    let mut next = state;
    let actuations = match state {
        AirlockState::Off | AirlockState::Standby => vec![
            Actuation::doors(Interior, ForceClosed),
            Actuation::doors(Exterior, ForceClosed),
        ],
        AirlockState::StandbyToEnter => {
            if pressure.is_vented() {
                next = AirlockState::Enter;
            }
            vec![
                Actuation::Vents { depressurize: true },
                Actuation::doors(Interior, ForceClosed),
                Actuation::doors(Exterior, ForceClosed),
            ]
        }
        AirlockState::Enter => {
            if inputs.player_at_chmb {
                next = AirlockState::EnterToStandby;
            }
            vec![
                Actuation::Vents { depressurize: true },
                Actuation::doors(Interior, ForceClosed),
                Actuation::doors(Exterior, ForceOpen),
            ]
        }
        AirlockState::EnterToStandby => {
            let interior = if pressure.is_pressurized() {
                if inputs.player_at_int {
                    next = AirlockState::Standby;
                }
                ForceOpen
            } else {
                ForceClosed
            };
            vec![
                Actuation::Vents {
                    depressurize: false,
                },
                Actuation::doors(Exterior, ForceClosed),
                Actuation::doors(Interior, interior),
            ]
        }
        AirlockState::StandbyToExit => {
            if pressure.is_pressurized() {
                next = AirlockState::Exit;
            }
            vec![
                Actuation::Vents {
                    depressurize: false,
                },
                Actuation::doors(Interior, ForceClosed),
                Actuation::doors(Exterior, ForceClosed),
            ]
        }
        AirlockState::Exit => {
            if inputs.player_at_chmb {
                next = AirlockState::ExitToStandby;
            }
            vec![
                Actuation::Vents {
                    depressurize: false,
                },
                Actuation::doors(Interior, ForceOpen),
                Actuation::doors(Exterior, ForceClosed),
            ]
        }
        AirlockState::ExitToStandby => {
            let exterior = if pressure.is_vented() {
                if inputs.player_at_ext {
                    next = AirlockState::Standby;
                }
                ForceOpen
            } else {
                ForceClosed
            };
            vec![
                Actuation::Vents { depressurize: true },
                Actuation::doors(Interior, ForceClosed),
                Actuation::doors(Exterior, exterior),
            ]
        }
    };
    Step { next, actuations }
}

/// Evaluate a command for one run.
///
/// Commands whose precondition does not hold leave the state unchanged and
/// actuate nothing.
///
/// ```
/// use airlock_controller::state_machine::{command_step, AirlockCommand, AirlockState};
///
/// let step = command_step(AirlockState::Enter, AirlockCommand::Exit, true);
/// assert_eq!(step.next, AirlockState::Enter);
/// assert!(step.actuations.is_empty());
/// ```
pub fn command_step(state: AirlockState, command: AirlockCommand, auto_open: bool) -> Step {
    let standby = state == AirlockState::Standby;
    let automatic = !state.is_manual();
    match command {
        AirlockCommand::Off => Step {
            next: AirlockState::Off,
            actuations: vec![
                Actuation::doors(DoorGroup::Interior, DoorCommand::PowerOnClosed),
                Actuation::doors(DoorGroup::Exterior, DoorCommand::PowerOnClosed),
                Actuation::Schedule(ScheduleChange::Disable),
            ],
        },
        AirlockCommand::Reset => Step {
            next: AirlockState::Standby,
            actuations: vec![Actuation::Schedule(ScheduleChange::Restore)],
        },
        AirlockCommand::Enter if standby => Step::stay(AirlockState::StandbyToEnter),
        AirlockCommand::EnterAuto if standby && auto_open => {
            Step::stay(AirlockState::StandbyToEnter)
        }
        AirlockCommand::EnterOverride if automatic => Step::stay(AirlockState::Enter),
        AirlockCommand::Exit if standby => Step::stay(AirlockState::StandbyToExit),
        AirlockCommand::ExitAuto if standby && auto_open => Step::stay(AirlockState::StandbyToExit),
        AirlockCommand::ExitOverride if automatic => Step::stay(AirlockState::Exit),
        _ => Step::stay(state),
    }
}

/// Why a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionCause {
    Command(AirlockCommand),
    Periodic,
}

impl fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionCause::Command(command) => write!(f, "command {command}"),
            TransitionCause::Periodic => f.write_str("periodic"),
        }
    }
}

/// A recorded state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: AirlockState,
    pub to: AirlockState,
    pub cause: TransitionCause,
    /// Run number the transition happened on.
    pub run: u64,
}

/// Owns the airlock state and its transition history.
///
/// Runs are counted from 1; every call to [`advance`](Self::advance) or
/// [`handle_command`](Self::handle_command) is one run.
#[derive(Debug, Clone)]
pub struct AirlockStateMachine {
    current_state: AirlockState,
    history: VecDeque<StateTransition>,
    runs: u64,
}

impl AirlockStateMachine {
    /// Create a machine in `Standby`.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// ```
    /// use airlock_controller::state_machine::{AirlockState, AirlockStateMachine};
    ///
    /// let machine = AirlockStateMachine::builder()
    ///     .with_initial_state(AirlockState::Off)
    ///     .build();
    /// assert_eq!(machine.current_state(), AirlockState::Off);
    /// ```
    pub fn builder() -> AirlockStateMachineBuilder {
        AirlockStateMachineBuilder::default()
    }

    pub fn current_state(&self) -> AirlockState {
        self.current_state
    }

    /// Number of runs evaluated so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last N state transitions.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Run the periodic logic once.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the evaluated step would
    /// leave the state graph; the state is left unchanged in that case.
    pub fn advance(&mut self, inputs: &TickInputs) -> Result<Step> {
        self.runs += 1;
        let step = periodic_step(self.current_state, inputs);
        debug!(
            "Periodic run {} in {} at {}",
            self.runs, self.current_state, inputs.pressure
        );
        self.transition_to(step.next, TransitionCause::Periodic)?;
        Ok(step)
    }

    /// Apply a command once.
    ///
    /// # Errors
    ///
    /// As [`advance`](Self::advance).
    pub fn handle_command(&mut self, command: AirlockCommand, auto_open: bool) -> Result<Step> {
        self.runs += 1;
        let step = command_step(self.current_state, command, auto_open);
        if step.next == self.current_state && step.actuations.is_empty() {
            debug!("Command {} ignored in {}", command, self.current_state);
        }
        self.transition_to(step.next, TransitionCause::Command(command))?;
        Ok(step)
    }

    fn transition_to(&mut self, new_state: AirlockState, cause: TransitionCause) -> Result<()> {
        if new_state == self.current_state {
            return Ok(());
        }
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        info!("Airlock {} -> {} ({})", self.current_state, new_state, cause);
        self.add_to_history(StateTransition {
            from: self.current_state,
            to: new_state,
            cause,
            run: self.runs,
        });
        self.current_state = new_state;
        Ok(())
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for AirlockStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`AirlockStateMachine`].
#[derive(Debug)]
pub struct AirlockStateMachineBuilder {
    initial_state: AirlockState,
    history: VecDeque<StateTransition>,
}

impl AirlockStateMachineBuilder {
    pub fn with_initial_state(mut self, state: AirlockState) -> Self {
        self.initial_state = state;
        self
    }

    /// Pre-populate history; only the newest entries up to the cap are kept.
    pub fn with_history(mut self, history: impl IntoIterator<Item = StateTransition>) -> Self {
        self.history = history.into_iter().collect();
        while self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self
    }

    pub fn build(self) -> AirlockStateMachine {
        AirlockStateMachine {
            current_state: self.initial_state,
            history: self.history,
            runs: 0,
        }
    }
}

impl Default for AirlockStateMachineBuilder {
    fn default() -> Self {
        Self {
            initial_state: AirlockState::Standby,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(pressure: u8) -> TickInputs {
        TickInputs::new(PressureReading::new(pressure).unwrap())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    #[rstest]
    #[case("off", AirlockCommand::Off)]
    #[case("reset", AirlockCommand::Reset)]
    #[case("enter", AirlockCommand::Enter)]
    #[case("enterAuto", AirlockCommand::EnterAuto)]
    #[case("enterOverride", AirlockCommand::EnterOverride)]
    #[case("exit", AirlockCommand::Exit)]
    #[case("exitAuto", AirlockCommand::ExitAuto)]
    #[case("exitOverride", AirlockCommand::ExitOverride)]
    fn test_command_parse(#[case] text: &str, #[case] command: AirlockCommand) {
        assert_eq!(text.parse::<AirlockCommand>().unwrap(), command);
        assert_eq!(command.to_string(), text);
    }

    #[rstest]
    #[case("OFF")]
    #[case("enter ")]
    #[case("cycle")]
    fn test_command_parse_is_exact(#[case] text: &str) {
        assert!(matches!(
            text.parse::<AirlockCommand>(),
            Err(Error::UnknownCommand(_))
        ));
    }

    #[rstest]
    #[case(AirlockState::Standby, AirlockCommand::Enter, true, AirlockState::StandbyToEnter)]
    #[case(AirlockState::Standby, AirlockCommand::EnterAuto, true, AirlockState::StandbyToEnter)]
    #[case(AirlockState::Standby, AirlockCommand::EnterAuto, false, AirlockState::Standby)]
    #[case(AirlockState::Exit, AirlockCommand::Enter, true, AirlockState::Exit)]
    #[case(AirlockState::Standby, AirlockCommand::Exit, true, AirlockState::StandbyToExit)]
    #[case(AirlockState::Standby, AirlockCommand::ExitAuto, false, AirlockState::Standby)]
    #[case(AirlockState::Enter, AirlockCommand::ExitAuto, true, AirlockState::Enter)]
    #[case(AirlockState::StandbyToExit, AirlockCommand::EnterOverride, true, AirlockState::Enter)]
    #[case(AirlockState::Off, AirlockCommand::EnterOverride, true, AirlockState::Off)]
    #[case(AirlockState::Enter, AirlockCommand::ExitOverride, true, AirlockState::Exit)]
    #[case(AirlockState::Off, AirlockCommand::ExitOverride, true, AirlockState::Off)]
    #[case(AirlockState::Off, AirlockCommand::Enter, true, AirlockState::Off)]
    #[case(AirlockState::Off, AirlockCommand::Reset, true, AirlockState::Standby)]
    #[case(AirlockState::EnterToStandby, AirlockCommand::Reset, true, AirlockState::Standby)]
    #[case(AirlockState::Exit, AirlockCommand::Off, true, AirlockState::Off)]
    fn test_command_table(
        #[case] from: AirlockState,
        #[case] command: AirlockCommand,
        #[case] auto_open: bool,
        #[case] expected: AirlockState,
    ) {
        assert_eq!(command_step(from, command, auto_open).next, expected);
    }

    #[test]
    fn test_off_secures_doors_and_disables_schedule() {
        let step = command_step(AirlockState::Enter, AirlockCommand::Off, true);
        assert_eq!(
            step.actuations,
            vec![
                Actuation::doors(DoorGroup::Interior, DoorCommand::PowerOnClosed),
                Actuation::doors(DoorGroup::Exterior, DoorCommand::PowerOnClosed),
                Actuation::Schedule(ScheduleChange::Disable),
            ]
        );
    }

    #[test]
    fn test_reset_restores_schedule() {
        let step = command_step(AirlockState::Off, AirlockCommand::Reset, true);
        assert_eq!(
            step.actuations,
            vec![Actuation::Schedule(ScheduleChange::Restore)]
        );
    }

    // ========================================================================
    // Periodic logic
    // ========================================================================

    #[test]
    fn test_off_falls_back_to_standby_branch() {
        let step = periodic_step(AirlockState::Off, &at(50).with_presence(true, true, true));
        assert_eq!(step.next, AirlockState::Off);
        assert_eq!(
            step.actuations,
            vec![
                Actuation::doors(DoorGroup::Interior, DoorCommand::ForceClosed),
                Actuation::doors(DoorGroup::Exterior, DoorCommand::ForceClosed),
            ]
        );
        assert_eq!(
            step.actuations,
            periodic_step(AirlockState::Standby, &at(50)).actuations
        );
    }

    #[test]
    fn test_standby_holds_doors_closed() {
        let step = periodic_step(AirlockState::Standby, &at(100).with_presence(true, true, true));
        assert_eq!(step.next, AirlockState::Standby);
        assert_eq!(step.depressurize(), None);
        assert_eq!(step.groups_opened().count(), 0);
    }

    #[rstest]
    #[case(AirlockState::StandbyToEnter, 4, AirlockState::Enter)]
    #[case(AirlockState::StandbyToEnter, 5, AirlockState::StandbyToEnter)]
    #[case(AirlockState::StandbyToExit, 96, AirlockState::Exit)]
    #[case(AirlockState::StandbyToExit, 95, AirlockState::StandbyToExit)]
    fn test_pressure_thresholds_are_strict(
        #[case] state: AirlockState,
        #[case] pressure: u8,
        #[case] expected: AirlockState,
    ) {
        assert_eq!(periodic_step(state, &at(pressure)).next, expected);
    }

    #[test]
    fn test_enter_opens_exterior_and_waits_for_chamber() {
        let step = periodic_step(AirlockState::Enter, &at(0));
        assert_eq!(step.next, AirlockState::Enter);
        assert_eq!(step.groups_opened().collect::<Vec<_>>(), vec![DoorGroup::Exterior]);
        assert_eq!(step.depressurize(), Some(true));

        let step = periodic_step(AirlockState::Enter, &at(0).with_presence(false, true, false));
        assert_eq!(step.next, AirlockState::EnterToStandby);
    }

    #[test]
    fn test_enter_to_standby_waits_for_pressure() {
        let filling = at(60).with_presence(true, false, false);
        let step = periodic_step(AirlockState::EnterToStandby, &filling);
        assert_eq!(step.next, AirlockState::EnterToStandby);
        assert_eq!(step.groups_opened().count(), 0);

        let full = at(96);
        let step = periodic_step(AirlockState::EnterToStandby, &full);
        assert_eq!(step.next, AirlockState::EnterToStandby);
        assert_eq!(step.depressurize(), Some(false));
        assert_eq!(
            &step.actuations[1..],
            &[
                Actuation::doors(DoorGroup::Exterior, DoorCommand::ForceClosed),
                Actuation::doors(DoorGroup::Interior, DoorCommand::ForceOpen),
            ]
        );

        let step = periodic_step(AirlockState::EnterToStandby, &full.with_presence(true, false, false));
        assert_eq!(step.next, AirlockState::Standby);
    }

    #[test]
    fn test_exit_to_standby_waits_for_vacuum() {
        let step = periodic_step(AirlockState::ExitToStandby, &at(40).with_presence(false, false, true));
        assert_eq!(step.next, AirlockState::ExitToStandby);
        assert_eq!(step.depressurize(), Some(true));
        assert_eq!(step.groups_opened().count(), 0);

        let step = periodic_step(AirlockState::ExitToStandby, &at(3).with_presence(false, false, true));
        assert_eq!(step.next, AirlockState::Standby);
        assert_eq!(step.groups_opened().collect::<Vec<_>>(), vec![DoorGroup::Exterior]);
    }

    #[test]
    fn test_exit_opens_interior() {
        let step = periodic_step(AirlockState::Exit, &at(100).with_presence(false, true, false));
        assert_eq!(step.next, AirlockState::ExitToStandby);
        assert_eq!(step.groups_opened().collect::<Vec<_>>(), vec![DoorGroup::Interior]);
        assert_eq!(step.depressurize(), Some(false));
    }

    // ========================================================================
    // Machine
    // ========================================================================

    #[test]
    fn test_new_machine_starts_in_standby() {
        let machine = AirlockStateMachine::new();
        assert_eq!(machine.current_state(), AirlockState::Standby);
        assert!(machine.history().is_empty());
        assert_eq!(machine.runs(), 0);
    }

    #[test]
    fn test_history_records_cause_and_run() {
        let mut machine = AirlockStateMachine::new();
        machine.advance(&at(100)).unwrap();
        machine.handle_command(AirlockCommand::Exit, true).unwrap();
        machine.advance(&at(100)).unwrap();

        let history = machine.last_transitions(10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].cause, TransitionCause::Command(AirlockCommand::Exit));
        assert_eq!(history[0].run, 2);
        assert_eq!(history[1].from, AirlockState::StandbyToExit);
        assert_eq!(history[1].to, AirlockState::Exit);
        assert_eq!(history[1].cause, TransitionCause::Periodic);
        assert_eq!(history[1].run, 3);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = AirlockStateMachine::new();
        for _ in 0..(MAX_HISTORY_SIZE + 20) {
            machine.handle_command(AirlockCommand::Off, true).unwrap();
            machine.handle_command(AirlockCommand::Reset, true).unwrap();
        }
        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(machine.last_transitions(1)[0].to, AirlockState::Standby);
    }

    #[test]
    fn test_unchanged_state_is_not_recorded() {
        let mut machine = AirlockStateMachine::new();
        machine.handle_command(AirlockCommand::Reset, true).unwrap();
        machine.handle_command(AirlockCommand::Enter, false).unwrap();
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn test_builder_with_history() {
        let old = StateTransition {
            from: AirlockState::Standby,
            to: AirlockState::Off,
            cause: TransitionCause::Command(AirlockCommand::Off),
            run: 7,
        };
        let machine = AirlockStateMachine::builder()
            .with_initial_state(AirlockState::Off)
            .with_history(vec![old.clone(); MAX_HISTORY_SIZE + 1])
            .build();
        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(machine.history()[0], old);
    }

    #[rstest]
    #[case(AirlockState::Off, AirlockState::Exit, false)]
    #[case(AirlockState::Off, AirlockState::Standby, true)]
    #[case(AirlockState::Standby, AirlockState::Enter, true)]
    #[case(AirlockState::Enter, AirlockState::StandbyToEnter, false)]
    #[case(AirlockState::Exit, AirlockState::EnterToStandby, false)]
    #[case(AirlockState::ExitToStandby, AirlockState::Standby, true)]
    fn test_can_transition_to(
        #[case] from: AirlockState,
        #[case] to: AirlockState,
        #[case] valid: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), valid);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&AirlockState::StandbyToEnter).unwrap();
        assert_eq!(json, "\"STANDBY_TO_ENTER\"");
        for state in AirlockState::ALL {
            let back: AirlockState = serde_json::from_str(&format!("\"{state}\"")).unwrap();
            assert_eq!(back, state);
        }
    }
}
