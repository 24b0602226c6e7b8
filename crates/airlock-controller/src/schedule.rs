//! Periodic run scheduling.
//!
//! The host runs an automation either on an explicit trigger or on a fixed
//! cadence of every 1, 10 or 100 host ticks. [`TickDivider`] turns a stream
//! of host ticks into periodic runs at the selected cadence.

use airlock_core::constants::DEFAULT_UPDATE_INTERVAL;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// How often the host runs the automation without a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateFrequency {
    /// Only explicit triggers run the automation.
    None,
    Every1,
    #[default]
    Every10,
    Every100,
}

impl UpdateFrequency {
    /// Map a configured interval onto a supported frequency.
    ///
    /// Intervals other than 1, 10 and 100 fall back to every 10th tick.
    ///
    /// ```
    /// use airlock_controller::schedule::UpdateFrequency;
    ///
    /// assert_eq!(UpdateFrequency::from_interval(100), UpdateFrequency::Every100);
    /// assert_eq!(UpdateFrequency::from_interval(7), UpdateFrequency::Every10);
    /// ```
    pub fn from_interval(interval: u32) -> Self {
        match interval {
            1 => UpdateFrequency::Every1,
            10 => UpdateFrequency::Every10,
            100 => UpdateFrequency::Every100,
            other => {
                warn!(
                    "Unsupported update interval {}, using every {} ticks",
                    other, DEFAULT_UPDATE_INTERVAL
                );
                UpdateFrequency::Every10
            }
        }
    }

    /// Host ticks between periodic runs, or `None` when disabled.
    pub fn interval(&self) -> Option<u32> {
        match self {
            UpdateFrequency::None => None,
            UpdateFrequency::Every1 => Some(1),
            UpdateFrequency::Every10 => Some(10),
            UpdateFrequency::Every100 => Some(100),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, UpdateFrequency::None)
    }
}

impl fmt::Display for UpdateFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.interval() {
            Some(n) => write!(f, "every {n} ticks"),
            None => f.write_str("triggered only"),
        }
    }
}

/// Counts host ticks and fires on every N-th one.
#[derive(Debug, Clone, Default)]
pub struct TickDivider {
    elapsed: u32,
}

impl TickDivider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one host tick and report whether a periodic run is due.
    ///
    /// A disabled frequency never fires and holds the counter at zero, so
    /// re-enabling starts a fresh interval.
    pub fn tick(&mut self, frequency: UpdateFrequency) -> bool {
        let Some(interval) = frequency.interval() else {
            self.elapsed = 0;
            return false;
        };
        self.elapsed += 1;
        if self.elapsed >= interval {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, UpdateFrequency::Every1)]
    #[case(10, UpdateFrequency::Every10)]
    #[case(100, UpdateFrequency::Every100)]
    #[case(0, UpdateFrequency::Every10)]
    #[case(50, UpdateFrequency::Every10)]
    fn test_from_interval(#[case] interval: u32, #[case] expected: UpdateFrequency) {
        assert_eq!(UpdateFrequency::from_interval(interval), expected);
    }

    #[rstest]
    #[case(UpdateFrequency::Every1, 1)]
    #[case(UpdateFrequency::Every10, 10)]
    #[case(UpdateFrequency::Every100, 100)]
    fn test_divider_fires_on_interval(#[case] frequency: UpdateFrequency, #[case] every: usize) {
        let mut divider = TickDivider::new();
        let fired: Vec<usize> = (1..=300)
            .filter(|_| divider.tick(frequency))
            .collect();
        assert_eq!(fired.len(), 300 / every);
        assert_eq!(fired[0], every);
    }

    #[test]
    fn test_disabled_never_fires() {
        let mut divider = TickDivider::new();
        for _ in 0..5 {
            divider.tick(UpdateFrequency::Every10);
        }
        assert!(!(0..1000).any(|_| divider.tick(UpdateFrequency::None)));

        // counter restarted while disabled
        let first = (1..=10)
            .find(|_| divider.tick(UpdateFrequency::Every10));
        assert_eq!(first, Some(10));
    }

    #[test]
    fn test_display() {
        assert_eq!(UpdateFrequency::Every10.to_string(), "every 10 ticks");
        assert_eq!(UpdateFrequency::None.to_string(), "triggered only");
        assert!(!UpdateFrequency::None.is_enabled());
    }
}
