//! Automation configuration.
//!
//! Every device role is addressed by a player-assigned name or group name.
//! Defaults match a freshly built airlock: groups `doorsInt`, `doorsExt` and
//! `vents`, sensors `sensorInt`, `sensorChmb` and `sensorExt`, and so on.
//! Configuration is loaded once; changing it means building a new
//! controller.
//!
//! # Example
//!
//! ```
//! use airlock_controller::config::AirlockConfig;
//!
//! let config = AirlockConfig::from_json_str(r#"{ "use_auto_open": false }"#).unwrap();
//! assert!(!config.use_auto_open);
//! assert_eq!(config.door_int_group, "doorsInt");
//! ```

use std::path::Path;

use airlock_core::{
    Error, Result, TextAlignment,
    constants::{
        DEFAULT_BAR_DIVISIONS, DEFAULT_DANGER_LEVEL, DEFAULT_FONT_SIZE, DEFAULT_GAUGE_LABEL,
        DEFAULT_SAFE_LEVEL, DEFAULT_UPDATE_INTERVAL, DEFAULT_WARNING_LEVEL, MAX_PRESSURE,
    },
};
use serde::{Deserialize, Serialize};

use crate::schedule::UpdateFrequency;

/// Airlock controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirlockConfig {
    /// Host ticks between periodic runs (1, 10 or 100).
    pub update_interval: u32,

    pub door_int_group: String,
    pub door_ext_group: String,
    pub vent_group: String,

    pub sensor_int_name: String,
    pub sensor_chmb_name: String,
    pub sensor_ext_name: String,

    /// Honor `enterAuto`/`exitAuto` triggers.
    pub use_auto_open: bool,
    pub use_status_display: bool,

    // Only used with the status display.
    pub monitor_vent_name: String,
    pub monitor_door_int_name: String,
    pub monitor_door_ext_name: String,

    pub use_interior_panels: bool,
    pub status_panel_int_group: String,
    pub use_chamber_panels: bool,
    pub status_panel_chmb_group: String,
    pub use_exterior_panels: bool,
    pub status_panel_ext_group: String,

    pub font_size: f32,
    pub text_align: TextAlignment,
}

impl Default for AirlockConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            door_int_group: "doorsInt".to_string(),
            door_ext_group: "doorsExt".to_string(),
            vent_group: "vents".to_string(),
            sensor_int_name: "sensorInt".to_string(),
            sensor_chmb_name: "sensorChmb".to_string(),
            sensor_ext_name: "sensorExt".to_string(),
            use_auto_open: true,
            use_status_display: true,
            monitor_vent_name: "monitorVent".to_string(),
            monitor_door_int_name: "monitorDoorInt".to_string(),
            monitor_door_ext_name: "monitorDoorExt".to_string(),
            use_interior_panels: true,
            status_panel_int_group: "statusPanelsInt".to_string(),
            use_chamber_panels: true,
            status_panel_chmb_group: "statusPanelsChmb".to_string(),
            use_exterior_panels: true,
            status_panel_ext_group: "statusPanelsExt".to_string(),
            font_size: DEFAULT_FONT_SIZE,
            text_align: TextAlignment::Left,
        }
    }
}

impl AirlockConfig {
    /// Parse a JSON document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigParse` on malformed JSON and whatever
    /// [`validate`](Self::validate) rejects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every role the controller will look up has a name.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingConfig` naming the first empty key, or
    /// `Error::Config` for a font size that is not a positive number.
    pub fn validate(&self) -> Result<()> {
        let mut required = vec![
            ("door_int_group", &self.door_int_group),
            ("door_ext_group", &self.door_ext_group),
            ("vent_group", &self.vent_group),
            ("sensor_int_name", &self.sensor_int_name),
            ("sensor_chmb_name", &self.sensor_chmb_name),
            ("sensor_ext_name", &self.sensor_ext_name),
        ];
        if self.use_status_display {
            required.extend([
                ("monitor_vent_name", &self.monitor_vent_name),
                ("monitor_door_int_name", &self.monitor_door_int_name),
                ("monitor_door_ext_name", &self.monitor_door_ext_name),
            ]);
            if self.use_interior_panels {
                required.push(("status_panel_int_group", &self.status_panel_int_group));
            }
            if self.use_chamber_panels {
                required.push(("status_panel_chmb_group", &self.status_panel_chmb_group));
            }
            if self.use_exterior_panels {
                required.push(("status_panel_ext_group", &self.status_panel_ext_group));
            }
        }
        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::MissingConfig((*key).to_string()));
        }

        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(Error::Config(format!(
                "font_size must be a positive number, got {}",
                self.font_size
            )));
        }
        Ok(())
    }

    /// Periodic schedule for the configured interval.
    pub fn update_frequency(&self) -> UpdateFrequency {
        UpdateFrequency::from_interval(self.update_interval)
    }

    pub fn with_update_interval(mut self, interval: u32) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_auto_open(mut self, enabled: bool) -> Self {
        self.use_auto_open = enabled;
        self
    }

    pub fn with_status_display(mut self, enabled: bool) -> Self {
        self.use_status_display = enabled;
        self
    }

    /// Toggle the interior, chamber and exterior panel groups.
    pub fn with_panels(mut self, interior: bool, chamber: bool, exterior: bool) -> Self {
        self.use_interior_panels = interior;
        self.use_chamber_panels = chamber;
        self.use_exterior_panels = exterior;
        self
    }

    pub fn with_font(mut self, size: f32, alignment: TextAlignment) -> Self {
        self.font_size = size;
        self.text_align = alignment;
        self
    }
}

/// Vent pressure gauge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Host ticks between periodic runs (1, 10 or 100).
    pub update_interval: u32,

    /// Readings at or above this are cyan.
    pub safe_level: u8,
    /// Readings at or above this are green.
    pub warning_level: u8,
    /// Readings at or above this are yellow; below it red.
    pub danger_level: u8,

    pub use_label: bool,
    pub label: String,
    /// Show `"<p>%"` instead of a bar.
    pub text_readout: bool,
    /// Bar characters at 100%.
    pub bar_divisions: u8,

    pub vent_name: String,
    pub use_text_panels: bool,
    pub status_panel_group: String,
    pub use_lights: bool,
    pub status_light_group: String,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            update_interval: 100,
            safe_level: DEFAULT_SAFE_LEVEL,
            warning_level: DEFAULT_WARNING_LEVEL,
            danger_level: DEFAULT_DANGER_LEVEL,
            use_label: true,
            label: DEFAULT_GAUGE_LABEL.to_string(),
            text_readout: false,
            bar_divisions: DEFAULT_BAR_DIVISIONS,
            vent_name: "vent".to_string(),
            use_text_panels: true,
            status_panel_group: "statusPanels".to_string(),
            use_lights: true,
            status_light_group: "statusLights".to_string(),
        }
    }
}

impl GaugeConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check level ordering, bar size and device names.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for out-of-order levels or a bar of zero or
    /// more than 100 divisions, `Error::MissingConfig` for empty names.
    pub fn validate(&self) -> Result<()> {
        if !(self.danger_level <= self.warning_level
            && self.warning_level <= self.safe_level
            && self.safe_level <= MAX_PRESSURE)
        {
            return Err(Error::Config(format!(
                "gauge levels must satisfy danger <= warning <= safe <= {}, got {} / {} / {}",
                MAX_PRESSURE, self.danger_level, self.warning_level, self.safe_level
            )));
        }
        if self.bar_divisions == 0 || self.bar_divisions > MAX_PRESSURE {
            return Err(Error::Config(format!(
                "bar_divisions must be between 1 and {}, got {}",
                MAX_PRESSURE, self.bar_divisions
            )));
        }
        if self.vent_name.trim().is_empty() {
            return Err(Error::MissingConfig("vent_name".to_string()));
        }
        if self.use_text_panels && self.status_panel_group.trim().is_empty() {
            return Err(Error::MissingConfig("status_panel_group".to_string()));
        }
        if self.use_lights && self.status_light_group.trim().is_empty() {
            return Err(Error::MissingConfig("status_light_group".to_string()));
        }
        Ok(())
    }

    pub fn update_frequency(&self) -> UpdateFrequency {
        UpdateFrequency::from_interval(self.update_interval)
    }

    pub fn with_levels(mut self, safe: u8, warning: u8, danger: u8) -> Self {
        self.safe_level = safe;
        self.warning_level = warning;
        self.danger_level = danger;
        self
    }

    pub fn with_text_readout(mut self, enabled: bool) -> Self {
        self.text_readout = enabled;
        self
    }

    pub fn with_label(mut self, label: Option<&str>) -> Self {
        match label {
            Some(label) => {
                self.use_label = true;
                self.label = label.to_string();
            }
            None => self.use_label = false,
        }
        self
    }

    pub fn with_bar_divisions(mut self, divisions: u8) -> Self {
        self.bar_divisions = divisions;
        self
    }

    /// Select outputs; `None` disables that output.
    pub fn with_outputs(mut self, panels: Option<&str>, lights: Option<&str>) -> Self {
        self.use_text_panels = panels.is_some();
        if let Some(group) = panels {
            self.status_panel_group = group.to_string();
        }
        self.use_lights = lights.is_some();
        if let Some(group) = lights {
            self.status_light_group = group.to_string();
        }
        self
    }
}

/// Presence status monitor configuration.
///
/// The monitor only reads; it shares sensor names with the airlock and
/// watches one door on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub update_interval: u32,
    pub door_int_name: String,
    pub door_ext_name: String,
    pub sensor_int_name: String,
    pub sensor_chmb_name: String,
    pub sensor_ext_name: String,
    pub vent_name: String,
    pub status_panel_group: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            door_int_name: "doorInt".to_string(),
            door_ext_name: "doorExt".to_string(),
            sensor_int_name: "sensorInt".to_string(),
            sensor_chmb_name: "sensorChmb".to_string(),
            sensor_ext_name: "sensorExt".to_string(),
            vent_name: "vent".to_string(),
            status_panel_group: "statusPanels".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Every name is required.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("door_int_name", &self.door_int_name),
            ("door_ext_name", &self.door_ext_name),
            ("sensor_int_name", &self.sensor_int_name),
            ("sensor_chmb_name", &self.sensor_chmb_name),
            ("sensor_ext_name", &self.sensor_ext_name),
            ("vent_name", &self.vent_name),
            ("status_panel_group", &self.status_panel_group),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((key, _)) => Err(Error::MissingConfig((*key).to_string())),
            None => Ok(()),
        }
    }

    pub fn update_frequency(&self) -> UpdateFrequency {
        UpdateFrequency::from_interval(self.update_interval)
    }

    pub fn with_doors(mut self, interior: &str, exterior: &str) -> Self {
        self.door_int_name = interior.to_string();
        self.door_ext_name = exterior.to_string();
        self
    }

    pub fn with_panel_group(mut self, group: &str) -> Self {
        self.status_panel_group = group.to_string();
        self
    }
}
