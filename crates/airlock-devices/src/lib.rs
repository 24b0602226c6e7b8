//! Device directory abstraction for the airlock automations.
//!
//! The host exposes the devices of a structure (doors, sensors, air vents,
//! text panels, lights) through a directory that can enumerate them by kind
//! and group, read their properties, invoke actions and write to displays.
//! This crate models that contract as the [`DeviceDirectory`] trait and
//! layers typed, reporting helpers on top of it.
//!
//! # Layers
//!
//! - [`traits`]: the directory trait, kind-tagged [`Handle`]s and the
//!   [`DirectoryExt`] extension with typed reads and idempotent door
//!   actuation.
//! - [`lookup`]: [`BlockFinder`], which resolves devices by kind, group and
//!   name and records every failure in a [`Reporter`].
//! - [`report`]: the per-run diagnostic report.
//! - [`mock`]: [`MockGrid`](mock::MockGrid), an in-memory structure used by
//!   tests and the host simulator.
//!
//! # Example
//!
//! ```
//! use airlock_devices::lookup::{BlockFinder, NameMatch};
//! use airlock_devices::mock::MockGrid;
//! use airlock_devices::report::Reporter;
//! use airlock_devices::traits::{DirectoryExt, Door};
//!
//! let mut grid = MockGrid::new();
//! let door = grid.add_door("doorInt");
//! grid.add_to_group("doorsInt", door);
//!
//! let mut reporter = Reporter::new();
//! let doors = BlockFinder::new(&grid, &mut reporter).all_in_group::<Door>("doorsInt");
//! assert!(!reporter.has_errors());
//!
//! grid.force_doors_open(&doors).unwrap();
//! assert_eq!(grid.door_status(&doors[0]).unwrap().as_str(), "OPEN");
//! ```

pub mod error;
pub mod lookup;
pub mod mock;
pub mod report;
pub mod traits;
pub mod types;

pub use error::{DeviceError, Result};
pub use lookup::{BlockFinder, NameMatch};
pub use report::Reporter;
pub use traits::{DeviceDirectory, DirectoryExt, Handle};
pub use types::{BlockId, BlockRef, DeviceAction, PanelFormat, PanelUpdate, Property, PropertyValue};
