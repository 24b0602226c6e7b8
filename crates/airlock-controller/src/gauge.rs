//! Vent pressure gauge.
//!
//! A small standalone automation: read one named vent and show its pressure
//! on a panel group (as a number or a bar of `|` characters) and as a colour
//! on the panels and a light group.

use airlock_core::{
    Color, Error, PressureReading, Result,
    constants::{BLACK, GAUGE_CYAN, GAUGE_GREEN, GAUGE_RED, GAUGE_YELLOW},
};
use airlock_devices::{
    BlockFinder, DeviceDirectory, DirectoryExt, NameMatch, PanelFormat, PanelUpdate, Reporter,
    traits::{AirVent, Light, TextPanel},
};
use tracing::{debug, warn};

use crate::config::GaugeConfig;
use crate::schedule::UpdateFrequency;

/// Colour for a pressure reading.
///
/// ```
/// use airlock_controller::config::GaugeConfig;
/// use airlock_controller::gauge::gauge_color;
/// use airlock_core::{PressureReading, constants::{GAUGE_CYAN, GAUGE_RED}};
///
/// let config = GaugeConfig::default();
/// assert_eq!(gauge_color(PressureReading::new(75).unwrap(), &config), GAUGE_CYAN);
/// assert_eq!(gauge_color(PressureReading::new(24).unwrap(), &config), GAUGE_RED);
/// ```
pub fn gauge_color(pressure: PressureReading, config: &GaugeConfig) -> Color {
    let p = pressure.percent();
    if p >= config.safe_level {
        GAUGE_CYAN
    } else if p >= config.warning_level {
        GAUGE_GREEN
    } else if p >= config.danger_level {
        GAUGE_YELLOW
    } else {
        GAUGE_RED
    }
}

/// Panel text for a pressure reading.
///
/// The bar has one `|` per full `100 / bar_divisions` percent.
///
/// ```
/// use airlock_controller::config::GaugeConfig;
/// use airlock_controller::gauge::readout;
/// use airlock_core::PressureReading;
///
/// let p = PressureReading::new(47).unwrap();
/// assert_eq!(readout(p, &GaugeConfig::default()), "PRESSURE: |||||||||");
/// assert_eq!(readout(p, &GaugeConfig::default().with_text_readout(true)), "PRESSURE: 47%");
/// ```
pub fn readout(pressure: PressureReading, config: &GaugeConfig) -> String {
    let label = if config.use_label {
        config.label.as_str()
    } else {
        ""
    };
    if config.text_readout {
        return format!("{label}{pressure}");
    }
    let step = 100.0_f32 / f32::from(config.bar_divisions.max(1));
    let bars = (f32::from(pressure.percent()) / step) as usize;
    format!("{label}{}", "|".repeat(bars.min(usize::from(config.bar_divisions))))
}

/// What one gauge run showed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeReport {
    pub pressure: PressureReading,
    pub color: Color,
    pub text: String,
}

/// Vent pressure gauge automation.
#[derive(Debug, Clone)]
pub struct PressureGauge {
    config: GaugeConfig,
    schedule: UpdateFrequency,
    reporter: Reporter,
}

impl PressureGauge {
    /// Create a gauge from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns whatever [`GaugeConfig::validate`] rejects.
    pub fn new(config: GaugeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            schedule: config.update_frequency(),
            config,
            reporter: Reporter::new(),
        })
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn schedule(&self) -> UpdateFrequency {
        self.schedule
    }

    /// Rendered diagnostic report of the last run.
    pub fn diagnostics(&self) -> String {
        self.reporter.render()
    }

    /// Resolve the vent and outputs, then show the current pressure.
    ///
    /// # Errors
    ///
    /// Returns `Error::DevicesUnresolved` without writing anything if any
    /// device is missing, or `Error::Device` if a read or write fails.
    pub fn run<D: DeviceDirectory + ?Sized>(&mut self, directory: &mut D) -> Result<GaugeReport> {
        self.reporter.clear();

        let mut finder = BlockFinder::new(&*directory, &mut self.reporter);
        let vent = finder.first_named::<AirVent>(NameMatch::Exact(&self.config.vent_name));
        let panels = if self.config.use_text_panels {
            finder.all_in_group::<TextPanel>(&self.config.status_panel_group)
        } else {
            Vec::new()
        };
        let lights = if self.config.use_lights {
            finder.all_in_group::<Light>(&self.config.status_light_group)
        } else {
            Vec::new()
        };

        let vent = match vent {
            Some(vent) if !self.reporter.has_errors() => vent,
            _ => {
                let count = self.reporter.error_count();
                warn!("Pressure gauge run aborted: {} lookup error(s)", count);
                return Err(Error::DevicesUnresolved { count });
            }
        };

        let pressure = directory.pressure(&vent)?;
        let color = gauge_color(pressure, &self.config);
        let text = readout(pressure, &self.config);
        debug!("Gauge {} reads {}", vent.name(), pressure);

        let update = PanelUpdate::replace(
            text.clone(),
            PanelFormat::default()
                .with_font_color(color)
                .with_background(BLACK),
        );
        directory.write_panels(&panels, &update)?;
        directory.set_lights_color(&lights, color)?;

        Ok(GaugeReport {
            pressure,
            color,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn reading(p: u8) -> PressureReading {
        PressureReading::new(p).unwrap()
    }

    #[rstest]
    #[case(100, GAUGE_CYAN)]
    #[case(75, GAUGE_CYAN)]
    #[case(74, GAUGE_GREEN)]
    #[case(50, GAUGE_GREEN)]
    #[case(49, GAUGE_YELLOW)]
    #[case(25, GAUGE_YELLOW)]
    #[case(24, GAUGE_RED)]
    #[case(0, GAUGE_RED)]
    fn test_default_color_bands(#[case] p: u8, #[case] expected: Color) {
        assert_eq!(gauge_color(reading(p), &GaugeConfig::default()), expected);
    }

    #[rstest]
    #[case(0, 20, 0)]
    #[case(4, 20, 0)]
    #[case(5, 20, 1)]
    #[case(99, 20, 19)]
    #[case(100, 20, 20)]
    #[case(100, 3, 3)]
    #[case(66, 3, 1)]
    #[case(67, 3, 2)]
    fn test_bar_length(#[case] p: u8, #[case] divisions: u8, #[case] bars: usize) {
        let config = GaugeConfig::default()
            .with_label(None)
            .with_bar_divisions(divisions);
        assert_eq!(readout(reading(p), &config), "|".repeat(bars));
    }

    #[test]
    fn test_text_readout_without_label() {
        let config = GaugeConfig::default()
            .with_label(None)
            .with_text_readout(true);
        assert_eq!(readout(reading(12), &config), "12%");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GaugeConfig::default().with_levels(10, 50, 25);
        assert!(PressureGauge::new(config).is_err());
    }
}
