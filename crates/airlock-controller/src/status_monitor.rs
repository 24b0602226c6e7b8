//! Passive airlock status monitor.
//!
//! A standalone automation that never actuates anything. Each run reads the
//! chamber pressure, one door on each side and the three presence sensors,
//! then writes a header plus a presence message to a panel group:
//!
//! ```text
//! AIRLOCK PRESSURE: 100%
//! INTERIOR DOOR CLOSED
//! EXTERIOR DOOR CLOSED
//!
//! INTERIOR:
//! ENTER WHEN READY
//! ```

use airlock_core::{
    Color, DoorStatus, Error, PressureReading, Result,
    constants::{BLACK, DARK_GREEN, DIM_YELLOW, IN_USE_RED, WHITE},
};
use airlock_devices::{
    BlockFinder, DeviceDirectory, DirectoryExt, NameMatch, PanelFormat, PanelUpdate, Reporter,
    traits::{AirVent, Door, Sensor, TextPanel},
};
use tracing::{debug, warn};

use crate::config::MonitorConfig;
use crate::schedule::UpdateFrequency;

/// Who the three sensors currently see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence {
    pub interior: bool,
    pub chamber: bool,
    pub exterior: bool,
}

impl Presence {
    pub fn new(interior: bool, chamber: bool, exterior: bool) -> Self {
        Self {
            interior,
            chamber,
            exterior,
        }
    }
}

/// Message and colours for the presence part of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceMessage {
    pub text: &'static str,
    pub font: Color,
    pub background: Color,
}

/// Pick the presence message; someone in the chamber wins over both sides.
///
/// ```
/// use airlock_controller::status_monitor::{Presence, render_presence};
///
/// let message = render_presence(Presence::new(true, false, false));
/// assert_eq!(message.text, "INTERIOR:\nENTER WHEN READY");
/// ```
pub fn render_presence(presence: Presence) -> PresenceMessage {
    let (text, font, background) = if presence.chamber {
        (
            "AIRLOCK IN USE\nDO NOT ENTER\n\nCHAMBER:\nEXIT WHEN READY",
            WHITE,
            IN_USE_RED,
        )
    } else if presence.interior && presence.exterior {
        (
            "INTERIOR:\nDO NOT ENTER\n\nEXTERIOR:\nENTER WHEN READY",
            BLACK,
            DIM_YELLOW,
        )
    } else if presence.interior {
        ("INTERIOR:\nENTER WHEN READY", WHITE, DARK_GREEN)
    } else if presence.exterior {
        ("EXTERIOR:\nENTER WHEN READY", WHITE, DARK_GREEN)
    } else {
        ("IDLE", WHITE, BLACK)
    };
    PresenceMessage {
        text,
        font,
        background,
    }
}

/// Pressure and door lines written above the presence message.
pub fn status_header(pressure: PressureReading, interior: DoorStatus, exterior: DoorStatus) -> String {
    format!("AIRLOCK PRESSURE: {pressure}\nINTERIOR DOOR {interior}\nEXTERIOR DOOR {exterior}\n\n")
}

/// What one monitor run showed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorReport {
    pub pressure: PressureReading,
    pub presence: Presence,
    pub message: PresenceMessage,
    /// Full panel text.
    pub text: String,
}

/// Airlock status monitor automation.
#[derive(Debug, Clone)]
pub struct StatusMonitor {
    config: MonitorConfig,
    schedule: UpdateFrequency,
    reporter: Reporter,
}

impl StatusMonitor {
    /// # Errors
    ///
    /// Returns whatever [`MonitorConfig::validate`] rejects.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            schedule: config.update_frequency(),
            config,
            reporter: Reporter::new(),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn schedule(&self) -> UpdateFrequency {
        self.schedule
    }

    pub fn diagnostics(&self) -> String {
        self.reporter.render()
    }

    /// Resolve every device, then refresh the panels.
    ///
    /// # Errors
    ///
    /// Returns `Error::DevicesUnresolved` without writing anything if any
    /// device is missing, or `Error::Device` if a read or write fails.
    pub fn run<D: DeviceDirectory + ?Sized>(&mut self, directory: &mut D) -> Result<MonitorReport> {
        self.reporter.clear();

        let config = &self.config;
        let mut finder = BlockFinder::new(&*directory, &mut self.reporter);
        let door_int = finder.first_named::<Door>(NameMatch::Exact(&config.door_int_name));
        let door_ext = finder.first_named::<Door>(NameMatch::Exact(&config.door_ext_name));
        let sensor_int = finder.first_named::<Sensor>(NameMatch::Exact(&config.sensor_int_name));
        let sensor_chmb = finder.first_named::<Sensor>(NameMatch::Exact(&config.sensor_chmb_name));
        let sensor_ext = finder.first_named::<Sensor>(NameMatch::Exact(&config.sensor_ext_name));
        let vent = finder.first_named::<AirVent>(NameMatch::Exact(&config.vent_name));
        let panels = finder.all_in_group::<TextPanel>(&config.status_panel_group);

        let (
            Some(door_int),
            Some(door_ext),
            Some(sensor_int),
            Some(sensor_chmb),
            Some(sensor_ext),
            Some(vent),
        ) = (door_int, door_ext, sensor_int, sensor_chmb, sensor_ext, vent)
        else {
            return Err(self.abort());
        };
        if self.reporter.has_errors() {
            return Err(self.abort());
        }

        let pressure = directory.pressure(&vent)?;
        let interior = directory.door_status(&door_int)?;
        let exterior = directory.door_status(&door_ext)?;
        let presence = Presence::new(
            directory.sensor_active(&sensor_int)?,
            directory.sensor_active(&sensor_chmb)?,
            directory.sensor_active(&sensor_ext)?,
        );

        let message = render_presence(presence);
        let text = format!("{}{}", status_header(pressure, interior, exterior), message.text);
        debug!("Status monitor: {:?} at {}", presence, pressure);

        let update = PanelUpdate::replace(
            text.clone(),
            PanelFormat::default()
                .with_font_color(message.font)
                .with_background(message.background),
        );
        directory.write_panels(&panels, &update)?;

        Ok(MonitorReport {
            pressure,
            presence,
            message,
            text,
        })
    }

    fn abort(&self) -> Error {
        let count = self.reporter.error_count();
        warn!("Status monitor run aborted: {} lookup error(s)", count);
        Error::DevicesUnresolved { count }
    }
}
