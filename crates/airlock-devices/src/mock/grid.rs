//! In-memory device directory for tests and the host simulator.

use airlock_core::{Color, DeviceKind, DoorStatus};
use tracing::debug;

use crate::error::{DeviceError, Result};
use crate::traits::DeviceDirectory;
use crate::types::{BlockId, BlockRef, DeviceAction, PanelFormat, PanelUpdate, Property, PropertyValue};

/// Text and formatting currently shown on a mock text panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub text: String,
    pub format: PanelFormat,
    /// Number of display writes received.
    pub writes: u32,
}

/// A successful action invocation, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub block: BlockId,
    pub name: String,
    pub action: DeviceAction,
}

#[derive(Debug, Clone, PartialEq)]
enum BlockState {
    Door { status: DoorStatus },
    Sensor { active: bool },
    AirVent { oxygen_level: f32, can_pressurize: bool, depressurize: bool },
    TextPanel(PanelState),
    Light { color: Color },
}

impl BlockState {
    fn for_kind(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Door => BlockState::Door {
                status: DoorStatus::Closed,
            },
            DeviceKind::Sensor => BlockState::Sensor { active: false },
            DeviceKind::AirVent => BlockState::AirVent {
                oxygen_level: 1.0,
                can_pressurize: true,
                depressurize: false,
            },
            DeviceKind::TextPanel => BlockState::TextPanel(PanelState::default()),
            DeviceKind::Light => BlockState::Light {
                color: airlock_core::constants::WHITE,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct MockBlock {
    id: BlockId,
    kind: DeviceKind,
    name: String,
    /// Lives on a docked structure and is hidden from enumeration.
    foreign: bool,
    enabled: bool,
    state: BlockState,
}

impl MockBlock {
    fn to_ref(&self) -> BlockRef {
        BlockRef::new(self.id, self.kind, self.name.clone())
    }
}

/// Mock structure holding named devices and groups.
///
/// Doors settle instantly: a powered door told to open reports `Open` on
/// the next read, an unpowered one ignores the request. Vent pressure only
/// changes when a test sets it.
///
/// # Examples
///
/// ```
/// use airlock_core::DoorStatus;
/// use airlock_devices::mock::MockGrid;
/// use airlock_devices::traits::DeviceDirectory;
/// use airlock_devices::types::DeviceAction;
///
/// let mut grid = MockGrid::new();
/// let door = grid.add_door("doorA");
///
/// grid.invoke(door, DeviceAction::SetOpen(true)).unwrap();
/// assert_eq!(grid.door_status_of("doorA"), Some(DoorStatus::Open));
/// assert_eq!(grid.actions().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockGrid {
    next_id: u32,
    blocks: Vec<MockBlock>,
    groups: Vec<(String, Vec<BlockId>)>,
    actions: Vec<ActionRecord>,
    display_writes: Vec<(BlockId, PanelUpdate)>,
}

impl MockGrid {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_block(&mut self, kind: DeviceKind, name: &str, foreign: bool) -> BlockId {
        self.next_id += 1;
        let id = BlockId::new(self.next_id);
        self.blocks.push(MockBlock {
            id,
            kind,
            name: name.to_string(),
            foreign,
            enabled: true,
            state: BlockState::for_kind(kind),
        });
        id
    }

    /// Add a closed, powered door.
    pub fn add_door(&mut self, name: &str) -> BlockId {
        self.add_block(DeviceKind::Door, name, false)
    }

    /// Add an idle sensor.
    pub fn add_sensor(&mut self, name: &str) -> BlockId {
        self.add_block(DeviceKind::Sensor, name, false)
    }

    /// Add a sealed, fully pressurized vent.
    pub fn add_air_vent(&mut self, name: &str) -> BlockId {
        self.add_block(DeviceKind::AirVent, name, false)
    }

    /// Add a blank text panel.
    pub fn add_text_panel(&mut self, name: &str) -> BlockId {
        self.add_block(DeviceKind::TextPanel, name, false)
    }

    /// Add a white light.
    pub fn add_light(&mut self, name: &str) -> BlockId {
        self.add_block(DeviceKind::Light, name, false)
    }

    /// Add a device that belongs to a docked structure.
    pub fn add_foreign(&mut self, kind: DeviceKind, name: &str) -> BlockId {
        self.add_block(kind, name, true)
    }

    /// Create an empty group if it does not exist yet.
    pub fn create_group(&mut self, group: &str) {
        if !self.groups.iter().any(|(name, _)| name == group) {
            self.groups.push((group.to_string(), Vec::new()));
        }
    }

    /// Add a device to a group, creating the group on first use.
    pub fn add_to_group(&mut self, group: &str, block: BlockId) {
        self.create_group(group);
        if let Some((_, members)) = self.groups.iter_mut().find(|(name, _)| name == group)
            && !members.contains(&block)
        {
            members.push(block);
        }
    }

    /// Delete a group; its devices stay on the structure.
    pub fn remove_group(&mut self, group: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|(name, _)| name != group);
        self.groups.len() != before
    }

    /// Delete the first device with this name, including group memberships.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::NotFound` if no device has this name.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let id = self.block_named(name)?.id;
        self.blocks.retain(|b| b.id != id);
        for (_, members) in &mut self.groups {
            members.retain(|m| *m != id);
        }
        debug!("Removed device {} ({})", name, id);
        Ok(())
    }

    pub fn set_sensor_active(&mut self, name: &str, active: bool) -> Result<()> {
        match &mut self.block_named_mut(name)?.state {
            BlockState::Sensor { active: current } => {
                *current = active;
                Ok(())
            }
            _ => Err(DeviceError::unsupported_property(name, "SensorActive")),
        }
    }

    /// Set a vent's oxygen fill fraction.
    pub fn set_oxygen_level(&mut self, name: &str, level: f32) -> Result<()> {
        match &mut self.block_named_mut(name)?.state {
            BlockState::AirVent { oxygen_level, .. } => {
                *oxygen_level = level;
                Ok(())
            }
            _ => Err(DeviceError::unsupported_property(name, "OxygenLevel")),
        }
    }

    /// Set the oxygen fill fraction of every vent.
    pub fn set_all_oxygen_levels(&mut self, level: f32) {
        for block in &mut self.blocks {
            if let BlockState::AirVent { oxygen_level, .. } = &mut block.state {
                *oxygen_level = level;
            }
        }
    }

    pub fn set_can_pressurize(&mut self, name: &str, sealed: bool) -> Result<()> {
        match &mut self.block_named_mut(name)?.state {
            BlockState::AirVent { can_pressurize, .. } => {
                *can_pressurize = sealed;
                Ok(())
            }
            _ => Err(DeviceError::unsupported_property(name, "CanPressurize")),
        }
    }

    /// Set the seal flag of every vent.
    pub fn set_all_can_pressurize(&mut self, sealed: bool) {
        for block in &mut self.blocks {
            if let BlockState::AirVent { can_pressurize, .. } = &mut block.state {
                *can_pressurize = sealed;
            }
        }
    }

    /// Force a door's reported status without going through an action.
    pub fn set_door_status(&mut self, name: &str, status: DoorStatus) -> Result<()> {
        match &mut self.block_named_mut(name)?.state {
            BlockState::Door { status: current } => {
                *current = status;
                Ok(())
            }
            _ => Err(DeviceError::unsupported_property(name, "DoorStatus")),
        }
    }

    /// Set a device's power flag without recording an action.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        self.block_named_mut(name)?.enabled = enabled;
        Ok(())
    }

    pub fn door_status_of(&self, name: &str) -> Option<DoorStatus> {
        match self.block_named(name).ok()?.state {
            BlockState::Door { status } => Some(status),
            _ => None,
        }
    }

    pub fn is_enabled_of(&self, name: &str) -> Option<bool> {
        self.block_named(name).ok().map(|b| b.enabled)
    }

    pub fn depressurize_of(&self, name: &str) -> Option<bool> {
        match self.block_named(name).ok()?.state {
            BlockState::AirVent { depressurize, .. } => Some(depressurize),
            _ => None,
        }
    }

    pub fn panel(&self, name: &str) -> Option<&PanelState> {
        match &self.block_named(name).ok()?.state {
            BlockState::TextPanel(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn light_color(&self, name: &str) -> Option<Color> {
        match self.block_named(name).ok()?.state {
            BlockState::Light { color } => Some(color),
            _ => None,
        }
    }

    /// Every successful action, oldest first.
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Successful actions sent to devices with this name.
    pub fn actions_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ActionRecord> + 'a {
        self.actions.iter().filter(move |a| a.name == name)
    }

    /// Every display write, oldest first.
    pub fn display_writes(&self) -> &[(BlockId, PanelUpdate)] {
        &self.display_writes
    }

    /// Forget recorded actions and display writes.
    pub fn clear_actions(&mut self) {
        self.actions.clear();
        self.display_writes.clear();
    }

    /// Names of every device on the structure, foreign ones included.
    pub fn device_names(&self) -> impl Iterator<Item = (DeviceKind, &str)> {
        self.blocks.iter().map(|b| (b.kind, b.name.as_str()))
    }

    fn block_named(&self, name: &str) -> Result<&MockBlock> {
        self.blocks
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| DeviceError::not_found(name))
    }

    fn block_named_mut(&mut self, name: &str) -> Result<&mut MockBlock> {
        self.blocks
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| DeviceError::not_found(name))
    }

    fn block(&self, id: BlockId) -> Result<&MockBlock> {
        self.blocks
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| DeviceError::not_found(id.to_string()))
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut MockBlock> {
        self.blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| DeviceError::not_found(id.to_string()))
    }
}

impl DeviceDirectory for MockGrid {
    fn find_all(&self, kind: DeviceKind, group: Option<&str>) -> Result<Vec<BlockRef>> {
        let visible = |b: &&MockBlock| b.kind == kind && !b.foreign;
        match group {
            None => Ok(self.blocks.iter().filter(visible).map(MockBlock::to_ref).collect()),
            Some(group) => {
                let (_, members) = self
                    .groups
                    .iter()
                    .find(|(name, _)| name == group)
                    .ok_or_else(|| DeviceError::group_not_found(group))?;
                Ok(members
                    .iter()
                    .filter_map(|id| self.blocks.iter().find(|b| b.id == *id))
                    .filter(visible)
                    .map(MockBlock::to_ref)
                    .collect())
            }
        }
    }

    fn read(&self, block: BlockId, property: Property) -> Result<PropertyValue> {
        let device = self.block(block)?;
        match (property, &device.state) {
            (Property::Enabled, _) => Ok(PropertyValue::Bool(device.enabled)),
            (Property::DoorStatus, BlockState::Door { status }) => {
                Ok(PropertyValue::DoorStatus(*status))
            }
            (Property::SensorActive, BlockState::Sensor { active }) => {
                Ok(PropertyValue::Bool(*active))
            }
            (Property::OxygenLevel, BlockState::AirVent { oxygen_level, .. }) => {
                Ok(PropertyValue::Level(*oxygen_level))
            }
            (Property::CanPressurize, BlockState::AirVent { can_pressurize, .. }) => {
                Ok(PropertyValue::Bool(*can_pressurize))
            }
            (Property::Depressurize, BlockState::AirVent { depressurize, .. }) => {
                Ok(PropertyValue::Bool(*depressurize))
            }
            _ => Err(DeviceError::unsupported_property(
                &device.name,
                property.to_string(),
            )),
        }
    }

    fn invoke(&mut self, block: BlockId, action: DeviceAction) -> Result<()> {
        let device = self.block_mut(block)?;
        match (action, &mut device.state) {
            (DeviceAction::SetPowered(on), _) => device.enabled = on,
            (DeviceAction::SetOpen(open), BlockState::Door { status }) => {
                if device.enabled {
                    *status = if open {
                        DoorStatus::Open
                    } else {
                        DoorStatus::Closed
                    };
                }
            }
            (DeviceAction::SetDepressurize(on), BlockState::AirVent { depressurize, .. }) => {
                *depressurize = on;
            }
            (DeviceAction::SetColor(new_color), BlockState::Light { color }) => {
                *color = new_color;
            }
            _ => {
                return Err(DeviceError::unsupported_action(
                    &device.name,
                    action.to_string(),
                ));
            }
        }
        let name = device.name.clone();
        self.actions.push(ActionRecord {
            block,
            name,
            action,
        });
        Ok(())
    }

    fn write_display(&mut self, block: BlockId, update: &PanelUpdate) -> Result<()> {
        let device = self.block_mut(block)?;
        let BlockState::TextPanel(panel) = &mut device.state else {
            return Err(DeviceError::unsupported_action(&device.name, "WriteDisplay"));
        };
        if update.append {
            panel.text.push_str(&update.text);
        } else {
            panel.text.clone_from(&update.text);
        }
        panel.format = update.format;
        panel.writes += 1;
        self.display_writes.push((block, update.clone()));
        Ok(())
    }
}
