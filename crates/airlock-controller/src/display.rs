//! Status panel text for the airlock.
//!
//! [`render_status`] is a pure function of the state and the run's
//! readings. It produces one headline per panel group (interior, chamber,
//! exterior) plus a trailer shared by all three:
//!
//! ```text
//! STAND CLEAR
//!
//! PRESSURE: 97%
//! INTERIOR DOORS OPEN
//! EXTERIOR DOORS CLOSED
//!
//! ```
//!
//! In manual mode the trailer is replaced by `AIRLOCK IN MANUAL MODE`.

use airlock_core::{
    Color, TextAlignment,
    constants::{DIM_GREEN, DIM_YELLOW, MANUAL_MODE_TEXT, NO_SEAL_TEXT, WHITE},
};
use airlock_devices::{PanelFormat, PanelUpdate};

use crate::resolve::Readings;
use crate::state_machine::AirlockState;

const VENTING: &str = "VENTING";
const FILLING: &str = "FILLING";
const STAND_CLEAR: &str = "STAND CLEAR";
const ENTER_AIRLOCK: &str = "ENTER AIRLOCK";
const EXIT_AIRLOCK: &str = "EXIT AIRLOCK";

/// Headline and font colour for one panel group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelMessage {
    pub text: String,
    pub color: Color,
}

impl PanelMessage {
    fn new(text: &str, color: Color) -> Self {
        Self {
            text: text.to_string(),
            color,
        }
    }

    fn blank() -> Self {
        Self::new("", WHITE)
    }
}

/// Rendered status for all three panel groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusScreen {
    pub interior: PanelMessage,
    pub chamber: PanelMessage,
    pub exterior: PanelMessage,
    /// Appended to every headline.
    pub trailer: String,
}

impl StatusScreen {
    /// Full text for the interior panels.
    pub fn interior_text(&self) -> String {
        format!("{}{}", self.interior.text, self.trailer)
    }

    pub fn chamber_text(&self) -> String {
        format!("{}{}", self.chamber.text, self.trailer)
    }

    pub fn exterior_text(&self) -> String {
        format!("{}{}", self.exterior.text, self.trailer)
    }
}

/// Font settings shared by every status panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusStyle {
    pub font_size: f32,
    pub alignment: TextAlignment,
}

impl StatusStyle {
    /// Build the display write for one panel group.
    pub fn update(&self, message: &PanelMessage, trailer: &str) -> PanelUpdate {
        let format = PanelFormat::default()
            .with_font_size(self.font_size)
            .with_alignment(self.alignment)
            .with_font_color(message.color);
        PanelUpdate::replace(format!("{}{}", message.text, trailer), format)
    }
}

/// Format the status screen for a state and its readings.
///
/// ```
/// use airlock_controller::display::render_status;
/// use airlock_controller::resolve::Readings;
/// use airlock_controller::state_machine::AirlockState;
/// use airlock_core::{DoorStatus, PressureReading};
///
/// let readings = Readings {
///     pressure: PressureReading::new(97).unwrap(),
///     sealed: true,
///     interior_doors: DoorStatus::Closed,
///     exterior_doors: DoorStatus::Closed,
///     player_at_int: false,
///     player_at_chmb: false,
///     player_at_ext: false,
/// };
/// let screen = render_status(AirlockState::Standby, &readings);
/// assert_eq!(
///     screen.chamber_text(),
///     "STANDBY\n\nPRESSURE: 97%\nINTERIOR DOORS CLOSED\nEXTERIOR DOORS CLOSED\n\n"
/// );
/// ```
pub fn render_status(state: AirlockState, readings: &Readings) -> StatusScreen {
    let yellow = |text: &str| PanelMessage::new(text, DIM_YELLOW);

    let (interior, chamber, exterior) = match state {
        AirlockState::Off | AirlockState::Standby => {
            let name = PanelMessage::new(state.as_str(), WHITE);
            (name.clone(), name.clone(), name)
        }
        AirlockState::StandbyToEnter => (yellow(VENTING), yellow(VENTING), yellow(VENTING)),
        AirlockState::Enter => (
            yellow(STAND_CLEAR),
            PanelMessage::blank(),
            PanelMessage::new(ENTER_AIRLOCK, DIM_GREEN),
        ),
        AirlockState::EnterToStandby | AirlockState::ExitToStandby => {
            (yellow(STAND_CLEAR), yellow(EXIT_AIRLOCK), yellow(STAND_CLEAR))
        }
        AirlockState::StandbyToExit => (yellow(FILLING), yellow(FILLING), yellow(FILLING)),
        AirlockState::Exit => (
            PanelMessage::new(ENTER_AIRLOCK, DIM_GREEN),
            PanelMessage::blank(),
            yellow(STAND_CLEAR),
        ),
    };

    StatusScreen {
        interior,
        chamber,
        exterior,
        trailer: render_trailer(state, readings),
    }
}

fn render_trailer(state: AirlockState, readings: &Readings) -> String {
    if state.is_manual() {
        return format!("\n\n{MANUAL_MODE_TEXT}");
    }
    let pressure = if readings.sealed {
        readings.pressure.to_string()
    } else {
        NO_SEAL_TEXT.to_string()
    };
    format!(
        "\n\nPRESSURE: {}\nINTERIOR DOORS {}\nEXTERIOR DOORS {}\n\n",
        pressure, readings.interior_doors, readings.exterior_doors
    )
}
