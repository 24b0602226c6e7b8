//! Per-run device resolution and readings.
//!
//! The controller never caches devices between runs: devices can be built,
//! renamed or destroyed at any time, so every run resolves the full
//! [`DeviceSet`] again and aborts if any required device is missing.

use airlock_core::{DoorStatus, PressureReading};
use airlock_devices::{
    BlockFinder, DeviceDirectory, DirectoryExt, Handle, NameMatch, Reporter,
    traits::{AirVent, Door, Sensor, TextPanel},
};
use tracing::debug;

use crate::config::AirlockConfig;
use crate::state_machine::TickInputs;

/// Devices read for the status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitors {
    pub vent: Handle<AirVent>,
    pub door_int: Handle<Door>,
    pub door_ext: Handle<Door>,
}

/// Status panel groups; a disabled group is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPanels {
    pub interior: Vec<Handle<TextPanel>>,
    pub chamber: Vec<Handle<TextPanel>>,
    pub exterior: Vec<Handle<TextPanel>>,
}

/// Every device one airlock run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSet {
    pub doors_int: Vec<Handle<Door>>,
    pub doors_ext: Vec<Handle<Door>>,
    pub vents: Vec<Handle<AirVent>>,
    pub sensor_int: Handle<Sensor>,
    pub sensor_chmb: Handle<Sensor>,
    pub sensor_ext: Handle<Sensor>,
    /// Present when the status display is enabled.
    pub monitors: Option<Monitors>,
    pub panels: StatusPanels,
}

impl DeviceSet {
    /// Resolve every configured role.
    ///
    /// All lookups run even after a failure so the report lists every
    /// missing device at once. Returns `None` if anything was reported as an
    /// error.
    pub fn resolve<D: DeviceDirectory + ?Sized>(
        directory: &D,
        config: &AirlockConfig,
        reporter: &mut Reporter,
    ) -> Option<Self> {
        let mut finder = BlockFinder::new(directory, reporter);

        let doors_int = finder.all_in_group::<Door>(&config.door_int_group);
        let doors_ext = finder.all_in_group::<Door>(&config.door_ext_group);

        let monitor_doors = if config.use_status_display {
            let doors = finder.all::<Door>();
            let door_int =
                finder.pick_named(&doors, NameMatch::Exact(&config.monitor_door_int_name));
            let door_ext =
                finder.pick_named(&doors, NameMatch::Exact(&config.monitor_door_ext_name));
            Some((door_int, door_ext))
        } else {
            None
        };

        let sensors = finder.all::<Sensor>();
        let sensor_int = finder.pick_named(&sensors, NameMatch::Exact(&config.sensor_int_name));
        let sensor_chmb = finder.pick_named(&sensors, NameMatch::Exact(&config.sensor_chmb_name));
        let sensor_ext = finder.pick_named(&sensors, NameMatch::Exact(&config.sensor_ext_name));

        let vents = finder.all_in_group::<AirVent>(&config.vent_group);

        let monitor_vent = if config.use_status_display {
            let all_vents = finder.all::<AirVent>();
            Some(finder.pick_named(&all_vents, NameMatch::Exact(&config.monitor_vent_name)))
        } else {
            None
        };

        let mut panels = StatusPanels::default();
        if config.use_status_display {
            if config.use_interior_panels {
                panels.interior = finder.all_in_group::<TextPanel>(&config.status_panel_int_group);
            }
            if config.use_chamber_panels {
                panels.chamber = finder.all_in_group::<TextPanel>(&config.status_panel_chmb_group);
            }
            if config.use_exterior_panels {
                panels.exterior = finder.all_in_group::<TextPanel>(&config.status_panel_ext_group);
            }
        }

        if reporter.has_errors() {
            debug!("Device resolution failed with {} error(s)", reporter.error_count());
            return None;
        }

        let monitors = match (monitor_vent, monitor_doors) {
            (Some(Some(vent)), Some((Some(door_int), Some(door_ext)))) => Some(Monitors {
                vent,
                door_int,
                door_ext,
            }),
            _ => None,
        };

        Some(Self {
            doors_int,
            doors_ext,
            vents,
            sensor_int: sensor_int?,
            sensor_chmb: sensor_chmb?,
            sensor_ext: sensor_ext?,
            monitors,
            panels,
        })
    }

    /// Read pressure, seal, door and presence state.
    ///
    /// Without monitors the first vent and the first door of each group
    /// stand in for them.
    ///
    /// # Errors
    ///
    /// Returns an error if a device vanished or rejects a read.
    pub fn read<D: DeviceDirectory + ?Sized>(&self, directory: &D) -> airlock_devices::Result<Readings> {
        let (vent, door_int, door_ext) = match &self.monitors {
            Some(m) => (&m.vent, &m.door_int, &m.door_ext),
            None => (
                first(&self.vents)?,
                first(&self.doors_int)?,
                first(&self.doors_ext)?,
            ),
        };

        Ok(Readings {
            pressure: directory.pressure(vent)?,
            sealed: directory.can_pressurize(vent)?,
            interior_doors: directory.door_status(door_int)?,
            exterior_doors: directory.door_status(door_ext)?,
            player_at_int: directory.sensor_active(&self.sensor_int)?,
            player_at_chmb: directory.sensor_active(&self.sensor_chmb)?,
            player_at_ext: directory.sensor_active(&self.sensor_ext)?,
        })
    }
}

fn first<K: airlock_devices::traits::BlockKind>(
    handles: &[Handle<K>],
) -> airlock_devices::Result<&Handle<K>> {
    handles
        .first()
        .ok_or_else(|| airlock_devices::DeviceError::not_found(K::KIND.to_string()))
}

/// Values read at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readings {
    pub pressure: PressureReading,
    /// Chamber can hold pressure.
    pub sealed: bool,
    pub interior_doors: DoorStatus,
    pub exterior_doors: DoorStatus,
    pub player_at_int: bool,
    pub player_at_chmb: bool,
    pub player_at_ext: bool,
}

impl Readings {
    pub fn tick_inputs(&self) -> TickInputs {
        TickInputs::new(self.pressure).with_presence(
            self.player_at_int,
            self.player_at_chmb,
            self.player_at_ext,
        )
    }
}
