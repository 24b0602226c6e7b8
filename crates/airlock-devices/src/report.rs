//! Diagnostic collection for device lookups.
//!
//! A [`Reporter`] counts errors and warnings raised while resolving devices
//! and renders them as the block of text the host shows in its detail area.

use airlock_core::constants::OWNERSHIP_HINT;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Severity of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single reported line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub severity: Severity,
    /// 1-based index within its severity; `0` for info lines.
    pub index: u32,
    pub message: String,
}

impl ReportEntry {
    fn render(&self) -> String {
        match self.severity {
            Severity::Error => format!("-- ERROR {}: {}", self.index, self.message),
            Severity::Warning => format!("-- WARNING {}: {}", self.index, self.message),
            Severity::Info => self.message.clone(),
        }
    }
}

/// Error and warning collector for one script run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reporter {
    error_count: u32,
    warning_count: u32,
    entries: Vec<ReportEntry>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything reported so far.
    pub fn clear(&mut self) {
        self.error_count = 0;
        self.warning_count = 0;
        self.entries.clear();
    }

    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error_count += 1;
        let message = message.into();
        debug!("Lookup error {}: {}", self.error_count, message);
        self.entries.push(ReportEntry {
            severity: Severity::Error,
            index: self.error_count,
            message,
        });
    }

    pub fn report_warning(&mut self, message: impl Into<String>) {
        self.warning_count += 1;
        let message = message.into();
        debug!("Lookup warning {}: {}", self.warning_count, message);
        self.entries.push(ReportEntry {
            severity: Severity::Warning,
            index: self.warning_count,
            message,
        });
    }

    pub fn report_info(&mut self, message: impl Into<String>) {
        self.entries.push(ReportEntry {
            severity: Severity::Info,
            index: 0,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Render the report for the host's detail area.
    ///
    /// ```
    /// use airlock_devices::report::Reporter;
    ///
    /// let mut reporter = Reporter::new();
    /// reporter.report_error("no Doors found");
    /// assert_eq!(
    ///     reporter.render(),
    ///     "1 SCRIPT ERRORS\n0 SCRIPT WARNINGS\n\
    ///      (make sure block ownership is set correctly)\n\
    ///      -- ERROR 1: no Doors found\n"
    /// );
    /// ```
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} SCRIPT ERRORS\n{} SCRIPT WARNINGS\n",
            self.error_count, self.warning_count
        );
        if self.error_count > 0 || self.warning_count > 0 {
            out.push_str(OWNERSHIP_HINT);
            out.push('\n');
        }
        for entry in &self.entries {
            out.push_str(&entry.render());
            out.push('\n');
        }
        out
    }
}
