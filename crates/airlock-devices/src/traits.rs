//! Device directory trait and typed device handles.
//!
//! [`DeviceDirectory`] is the contract between the automations and the host:
//! enumerate devices on the structure, read their properties, invoke actions,
//! and write to text panels. Everything else in the workspace talks to the
//! host only through this trait, so tests swap in a
//! [`MockGrid`](crate::mock::MockGrid).
//!
//! Lookups return typed [`Handle`]s tagged with a [`BlockKind`] marker
//! (`Handle<Door>`, `Handle<AirVent>`, ...). The typed reads and actuation
//! helpers on [`DirectoryExt`] only accept handles of the right kind, so a
//! sensor can never be asked to open.

use std::marker::PhantomData;

use airlock_core::{Color, DeviceKind, DoorStatus, PressureReading};
use tracing::debug;

use crate::error::{DeviceError, Result};
use crate::types::{BlockId, BlockRef, DeviceAction, PanelUpdate, Property};

/// Host-provided device directory for a single structure.
///
/// Implementations only expose devices on the controlling structure;
/// devices on docked structures are never returned.
///
/// # Examples
///
/// ```
/// use airlock_core::DeviceKind;
/// use airlock_devices::mock::MockGrid;
/// use airlock_devices::traits::DeviceDirectory;
///
/// let mut grid = MockGrid::new();
/// let door = grid.add_door("doorA");
/// grid.add_to_group("doors", door);
///
/// let doors = grid.find_all(DeviceKind::Door, Some("doors")).unwrap();
/// assert_eq!(doors.len(), 1);
/// assert!(grid.find_all(DeviceKind::Door, Some("missing")).is_err());
/// ```
pub trait DeviceDirectory {
    /// Enumerate devices of `kind`, optionally restricted to a named group.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::GroupNotFound` if `group` names no group.
    fn find_all(&self, kind: DeviceKind, group: Option<&str>) -> Result<Vec<BlockRef>>;

    /// Read a property of a device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is gone or lacks the property.
    fn read(&self, block: BlockId, property: Property) -> Result<crate::types::PropertyValue>;

    /// Invoke an action on a device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is gone or rejects the action.
    fn invoke(&mut self, block: BlockId, action: DeviceAction) -> Result<()>;

    /// Write text and formatting to a text panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is gone or is not a text panel.
    fn write_display(&mut self, block: BlockId, update: &PanelUpdate) -> Result<()>;
}

/// Compile-time device kind tag for [`Handle`].
pub trait BlockKind: std::fmt::Debug + Clone + Copy + PartialEq + Eq + 'static {
    /// Directory kind this tag stands for.
    const KIND: DeviceKind;
}

/// Door tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Door;

/// Presence sensor tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sensor;

/// Air vent tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AirVent;

/// Text panel tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPanel;

/// Light tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Light;

impl BlockKind for Door {
    const KIND: DeviceKind = DeviceKind::Door;
}

impl BlockKind for Sensor {
    const KIND: DeviceKind = DeviceKind::Sensor;
}

impl BlockKind for AirVent {
    const KIND: DeviceKind = DeviceKind::AirVent;
}

impl BlockKind for TextPanel {
    const KIND: DeviceKind = DeviceKind::TextPanel;
}

impl BlockKind for Light {
    const KIND: DeviceKind = DeviceKind::Light;
}

/// Typed reference to a device of kind `K`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle<K> {
    id: BlockId,
    name: String,
    _kind: PhantomData<K>,
}

impl<K: BlockKind> Handle<K> {
    /// Directory id of the device.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Player-assigned name of the device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device kind of this handle.
    pub fn kind(&self) -> DeviceKind {
        K::KIND
    }
}

impl<K: BlockKind> TryFrom<BlockRef> for Handle<K> {
    type Error = DeviceError;

    fn try_from(block: BlockRef) -> Result<Self> {
        if block.kind != K::KIND {
            return Err(DeviceError::KindMismatch {
                device: block.name,
                expected: K::KIND.to_string(),
                found: block.kind.to_string(),
            });
        }
        Ok(Self {
            id: block.id,
            name: block.name,
            _kind: PhantomData,
        })
    }
}

/// Typed reads and idempotent actuation on top of [`DeviceDirectory`].
///
/// Implemented for every directory; import the trait to use it.
pub trait DirectoryExt: DeviceDirectory {
    /// Whether the device is powered on.
    fn is_enabled<K: BlockKind>(&self, device: &Handle<K>) -> Result<bool> {
        self.read(device.id(), Property::Enabled)?
            .as_bool(Property::Enabled)
    }

    /// Current physical status of a door.
    fn door_status(&self, door: &Handle<Door>) -> Result<DoorStatus> {
        self.read(door.id(), Property::DoorStatus)?
            .as_door_status(Property::DoorStatus)
    }

    /// Whether a sensor currently detects someone.
    fn sensor_active(&self, sensor: &Handle<Sensor>) -> Result<bool> {
        self.read(sensor.id(), Property::SensorActive)?
            .as_bool(Property::SensorActive)
    }

    /// Raw oxygen fill fraction reported by a vent.
    fn oxygen_level(&self, vent: &Handle<AirVent>) -> Result<f32> {
        self.read(vent.id(), Property::OxygenLevel)?
            .as_level(Property::OxygenLevel)
    }

    /// Vent oxygen level as a whole-percent pressure reading.
    fn pressure(&self, vent: &Handle<AirVent>) -> Result<PressureReading> {
        Ok(PressureReading::from_oxygen_level(self.oxygen_level(vent)?))
    }

    /// Whether the vent's room is sealed.
    fn can_pressurize(&self, vent: &Handle<AirVent>) -> Result<bool> {
        self.read(vent.id(), Property::CanPressurize)?
            .as_bool(Property::CanPressurize)
    }

    /// Unconditionally set a door's power and open flags.
    fn set_door_state(&mut self, door: &Handle<Door>, powered: bool, open: bool) -> Result<()> {
        self.invoke(door.id(), DeviceAction::SetPowered(powered))?;
        self.invoke(door.id(), DeviceAction::SetOpen(open))
    }

    /// Drive a door open, then power it down once it is open.
    ///
    /// No write happens when the door is already open and unpowered.
    fn force_door_open(&mut self, door: &Handle<Door>) -> Result<()> {
        force_door(self, door, true)
    }

    /// Drive a door closed, then power it down once it is closed.
    ///
    /// No write happens when the door is already closed and unpowered.
    fn force_door_closed(&mut self, door: &Handle<Door>) -> Result<()> {
        force_door(self, door, false)
    }

    /// Apply [`set_door_state`](Self::set_door_state) to every door.
    fn set_doors_state(&mut self, doors: &[Handle<Door>], powered: bool, open: bool) -> Result<()> {
        for door in doors {
            self.set_door_state(door, powered, open)?;
        }
        Ok(())
    }

    /// Apply [`force_door_open`](Self::force_door_open) to every door.
    fn force_doors_open(&mut self, doors: &[Handle<Door>]) -> Result<()> {
        for door in doors {
            self.force_door_open(door)?;
        }
        Ok(())
    }

    /// Apply [`force_door_closed`](Self::force_door_closed) to every door.
    fn force_doors_closed(&mut self, doors: &[Handle<Door>]) -> Result<()> {
        for door in doors {
            self.force_door_closed(door)?;
        }
        Ok(())
    }

    /// Switch every vent between depressurize and pressurize.
    fn set_vents_depressurize(&mut self, vents: &[Handle<AirVent>], depressurize: bool) -> Result<()> {
        for vent in vents {
            self.invoke(vent.id(), DeviceAction::SetDepressurize(depressurize))?;
        }
        Ok(())
    }

    /// Set the colour of every light.
    fn set_lights_color(&mut self, lights: &[Handle<Light>], color: Color) -> Result<()> {
        for light in lights {
            self.invoke(light.id(), DeviceAction::SetColor(color))?;
        }
        Ok(())
    }

    /// Write the same update to every panel.
    fn write_panels(&mut self, panels: &[Handle<TextPanel>], update: &PanelUpdate) -> Result<()> {
        for panel in panels {
            self.write_display(panel.id(), update)?;
        }
        Ok(())
    }
}

impl<D: DeviceDirectory + ?Sized> DirectoryExt for D {}

fn force_door<D: DeviceDirectory + ?Sized>(
    directory: &mut D,
    door: &Handle<Door>,
    open: bool,
) -> Result<()> {
    let target = if open {
        DoorStatus::Open
    } else {
        DoorStatus::Closed
    };

    if directory.door_status(door)? != target {
        debug!("Driving door {} to {}", door.name(), target);
        directory.invoke(door.id(), DeviceAction::SetPowered(true))?;
        directory.invoke(door.id(), DeviceAction::SetOpen(open))?;
    } else if directory.is_enabled(door)? {
        debug!("Door {} is {}, powering down", door.name(), target);
        directory.invoke(door.id(), DeviceAction::SetPowered(false))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGrid;

    fn door_handle(grid: &MockGrid, name: &str) -> Handle<Door> {
        let block = grid
            .find_all(DeviceKind::Door, None)
            .unwrap()
            .into_iter()
            .find(|b| b.name == name)
            .unwrap();
        Handle::try_from(block).unwrap()
    }

    #[test]
    fn test_handle_kind_mismatch() {
        let block = BlockRef::new(BlockId::new(1), DeviceKind::Sensor, "sensorInt");
        let result = Handle::<Door>::try_from(block);
        assert!(matches!(result, Err(DeviceError::KindMismatch { .. })));
    }

    #[test]
    fn test_handle_accessors() {
        let block = BlockRef::new(BlockId::new(3), DeviceKind::AirVent, "vent");
        let handle = Handle::<AirVent>::try_from(block).unwrap();
        assert_eq!(handle.id(), BlockId::new(3));
        assert_eq!(handle.name(), "vent");
        assert_eq!(handle.kind(), DeviceKind::AirVent);
    }

    #[test]
    fn test_force_open_closed_door_powers_and_opens() {
        let mut grid = MockGrid::new();
        grid.add_door("door");
        grid.set_enabled("door", false).unwrap();
        let door = door_handle(&grid, "door");

        grid.force_door_open(&door).unwrap();

        let actions: Vec<_> = grid.actions_for("door").map(|a| a.action).collect();
        assert_eq!(
            actions,
            vec![DeviceAction::SetPowered(true), DeviceAction::SetOpen(true)]
        );
        assert_eq!(grid.door_status_of("door"), Some(DoorStatus::Open));
    }

    #[test]
    fn test_force_open_converges_to_no_writes() {
        let mut grid = MockGrid::new();
        grid.add_door("door");
        let door = door_handle(&grid, "door");

        // closed -> open
        grid.force_door_open(&door).unwrap();
        // open and powered -> power down
        grid.force_door_open(&door).unwrap();
        assert_eq!(grid.is_enabled_of("door"), Some(false));
        grid.clear_actions();

        // open and unpowered -> nothing
        grid.force_door_open(&door).unwrap();
        assert!(grid.actions().is_empty());
    }

    #[test]
    fn test_force_closed_on_closed_unpowered_door_is_noop() {
        let mut grid = MockGrid::new();
        grid.add_door("door");
        grid.set_enabled("door", false).unwrap();
        let door = door_handle(&grid, "door");

        grid.force_door_closed(&door).unwrap();
        assert!(grid.actions().is_empty());
    }

    #[test]
    fn test_force_closed_on_moving_door() {
        let mut grid = MockGrid::new();
        grid.add_door("door");
        grid.set_door_status("door", DoorStatus::Opening).unwrap();
        let door = door_handle(&grid, "door");

        grid.force_door_closed(&door).unwrap();
        assert_eq!(grid.door_status_of("door"), Some(DoorStatus::Closed));
        assert_eq!(grid.is_enabled_of("door"), Some(true));
    }

    #[test]
    fn test_set_door_state_always_writes() {
        let mut grid = MockGrid::new();
        grid.add_door("door");
        let door = door_handle(&grid, "door");

        grid.set_door_state(&door, true, false).unwrap();
        grid.set_door_state(&door, true, false).unwrap();
        assert_eq!(grid.actions().len(), 4);
    }

    #[test]
    fn test_pressure_read_rounds_level() {
        let mut grid = MockGrid::new();
        grid.add_air_vent("vent");
        grid.set_oxygen_level("vent", 0.034).unwrap();
        let block = grid.find_all(DeviceKind::AirVent, None).unwrap().remove(0);
        let vent = Handle::<AirVent>::try_from(block).unwrap();

        assert_eq!(grid.pressure(&vent).unwrap().percent(), 3);
        assert!(grid.can_pressurize(&vent).unwrap());
    }
}
