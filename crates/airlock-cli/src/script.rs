//! Simulator script parsing.
//!
//! A script is one command per line:
//!
//! ```text
//! # comment
//! tick 20
//! trigger enter
//! pressure 3
//! seal off
//! sensor sensorChmb on
//! door monitorDoorExt closing
//! remove sensorInt
//! show
//! ```

use airlock_core::DoorStatus;
use anyhow::{Context, Result, bail};

/// One simulator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Advance the host clock by this many ticks.
    Tick(u32),
    /// Run the airlock immediately with this argument.
    Trigger(String),
    /// Set every vent to this pressure percentage.
    Pressure(u8),
    /// Set whether every vent can hold pressure.
    Seal(bool),
    Sensor { name: String, active: bool },
    Door { name: String, status: DoorStatus },
    Remove(String),
    Show,
}

/// A parsed command and its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: ScriptCommand,
}

/// Parse a whole script, skipping blank lines and comments.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if let Some(command) = parse_line(raw).with_context(|| format!("line {line}: {raw:?}"))? {
            lines.push(ScriptLine { line, command });
        }
    }
    Ok(lines)
}

/// Parse a single line; `None` for blank lines and comments.
pub fn parse_line(raw: &str) -> Result<Option<ScriptCommand>> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "tick" => {
            let count = if rest.is_empty() {
                1
            } else {
                rest.parse().context("tick count must be a non-negative integer")?
            };
            ScriptCommand::Tick(count)
        }
        "trigger" => ScriptCommand::Trigger(rest.to_string()),
        "pressure" => {
            let percent: u8 = rest.parse().context("pressure must be 0-100")?;
            if percent > 100 {
                bail!("pressure must be 0-100, got {percent}");
            }
            ScriptCommand::Pressure(percent)
        }
        "seal" => ScriptCommand::Seal(on_off(rest)?),
        "sensor" => {
            let (name, state) = name_and_value(rest)?;
            ScriptCommand::Sensor {
                name,
                active: on_off(state)?,
            }
        }
        "door" => {
            let (name, state) = name_and_value(rest)?;
            ScriptCommand::Door {
                name,
                status: state.parse()?,
            }
        }
        "remove" if !rest.is_empty() => ScriptCommand::Remove(rest.to_string()),
        "remove" => bail!("remove needs a device name"),
        "show" => ScriptCommand::Show,
        other => bail!("unknown script command {other:?}"),
    };
    Ok(Some(command))
}

fn on_off(value: &str) -> Result<bool> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        other => bail!("expected on or off, got {other:?}"),
    }
}

/// Split `<name> <value>`; the name may contain spaces, the value may not.
fn name_and_value(rest: &str) -> Result<(String, &str)> {
    match rest.rsplit_once(char::is_whitespace) {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value)),
        _ => bail!("expected <name> <value>"),
    }
}
