//! Reporting device lookups.
//!
//! [`BlockFinder`] wraps a directory and a [`Reporter`]. Every lookup that
//! comes back empty appends one diagnostic line and returns an empty list or
//! `None`; callers decide whether an empty result aborts their run by
//! checking [`Reporter::has_errors`].

use airlock_core::DeviceKind;

use crate::error::DeviceError;
use crate::report::Reporter;
use crate::traits::{BlockKind, DeviceDirectory, Handle};
use crate::types::BlockRef;

/// How a device name is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch<'n> {
    /// Name equals the needle.
    Exact(&'n str),
    /// Name contains the needle.
    Including(&'n str),
}

impl NameMatch<'_> {
    /// Whether `name` satisfies this condition.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Exact(needle) => name == *needle,
            NameMatch::Including(needle) => name.contains(needle),
        }
    }

    /// Needle being matched.
    pub fn needle(&self) -> &str {
        match self {
            NameMatch::Exact(needle) | NameMatch::Including(needle) => needle,
        }
    }

    fn condition(&self) -> &'static str {
        match self {
            NameMatch::Exact(_) => "exact name",
            NameMatch::Including(_) => "name including",
        }
    }

    fn group_phrase(&self) -> &'static str {
        match self {
            NameMatch::Exact(_) => "named",
            NameMatch::Including(_) => "with name including",
        }
    }
}

/// Device lookups that report their failures.
///
/// # Examples
///
/// ```
/// use airlock_devices::lookup::{BlockFinder, NameMatch};
/// use airlock_devices::mock::MockGrid;
/// use airlock_devices::report::Reporter;
/// use airlock_devices::traits::Sensor;
///
/// let mut grid = MockGrid::new();
/// grid.add_sensor("sensorInt");
///
/// let mut reporter = Reporter::new();
/// let mut finder = BlockFinder::new(&grid, &mut reporter);
/// assert!(finder.first_named::<Sensor>(NameMatch::Exact("sensorInt")).is_some());
/// assert!(finder.first_named::<Sensor>(NameMatch::Exact("sensorExt")).is_none());
///
/// assert_eq!(reporter.error_count(), 1);
/// ```
pub struct BlockFinder<'a, D: ?Sized> {
    directory: &'a D,
    reporter: &'a mut Reporter,
}

impl<'a, D: DeviceDirectory + ?Sized> BlockFinder<'a, D> {
    pub fn new(directory: &'a D, reporter: &'a mut Reporter) -> Self {
        Self {
            directory,
            reporter,
        }
    }

    /// Every device of kind `K` on the structure.
    pub fn all<K: BlockKind>(&mut self) -> Vec<Handle<K>> {
        let blocks = match self.directory.find_all(K::KIND, None) {
            Ok(blocks) => blocks,
            Err(err) => {
                self.reporter.report_error(err.to_string());
                return Vec::new();
            }
        };
        let handles = self.typed::<K>(blocks);
        if handles.is_empty() {
            self.reporter
                .report_error(format!("no {}s found", K::KIND));
        }
        handles
    }

    /// Every device of kind `K` in a named group.
    pub fn all_in_group<K: BlockKind>(&mut self, group: &str) -> Vec<Handle<K>> {
        let blocks = match self.directory.find_all(K::KIND, Some(group)) {
            Ok(blocks) => blocks,
            Err(DeviceError::GroupNotFound { group }) => {
                self.reporter
                    .report_error(format!("no block group with name {group} found"));
                return Vec::new();
            }
            Err(err) => {
                self.reporter.report_error(err.to_string());
                return Vec::new();
            }
        };
        let handles = self.typed::<K>(blocks);
        if handles.is_empty() {
            self.reporter
                .report_error(format!("group {group} has no {}s", K::KIND));
        }
        handles
    }

    /// First device of kind `K` on the structure.
    pub fn first<K: BlockKind>(&mut self) -> Option<Handle<K>> {
        self.all::<K>().into_iter().next()
    }

    /// First device of kind `K` in a named group.
    pub fn first_in_group<K: BlockKind>(&mut self, group: &str) -> Option<Handle<K>> {
        self.all_in_group::<K>(group).into_iter().next()
    }

    /// First device of kind `K` whose name satisfies `name`.
    pub fn first_named<K: BlockKind>(&mut self, name: NameMatch<'_>) -> Option<Handle<K>> {
        let candidates = self.all::<K>();
        self.pick_named(&candidates, name)
    }

    /// Pick the first of an already enumerated list whose name satisfies
    /// `name`.
    ///
    /// An empty list returns `None` without reporting, since enumerating it
    /// already did.
    pub fn pick_named<K: BlockKind>(
        &mut self,
        candidates: &[Handle<K>],
        name: NameMatch<'_>,
    ) -> Option<Handle<K>> {
        if candidates.is_empty() {
            return None;
        }
        let found = candidates.iter().find(|h| name.matches(h.name())).cloned();
        if found.is_none() {
            self.report_no_match(K::KIND, name);
        }
        found
    }

    /// First device of kind `K` in a group whose name satisfies `name`.
    pub fn first_named_in_group<K: BlockKind>(
        &mut self,
        group: &str,
        name: NameMatch<'_>,
    ) -> Option<Handle<K>> {
        let candidates = self.all_in_group::<K>(group);
        if candidates.is_empty() {
            return None;
        }
        let found = candidates.into_iter().find(|h| name.matches(h.name()));
        if found.is_none() {
            self.report_no_match_in_group(K::KIND, group, name);
        }
        found
    }

    /// Every device of kind `K` whose name satisfies `name`.
    pub fn all_named<K: BlockKind>(&mut self, name: NameMatch<'_>) -> Vec<Handle<K>> {
        let candidates = self.all::<K>();
        if candidates.is_empty() {
            return candidates;
        }
        let found: Vec<_> = candidates
            .into_iter()
            .filter(|h| name.matches(h.name()))
            .collect();
        if found.is_empty() {
            self.report_no_match(K::KIND, name);
        }
        found
    }

    /// Every device of kind `K` in a group whose name satisfies `name`.
    pub fn all_named_in_group<K: BlockKind>(
        &mut self,
        group: &str,
        name: NameMatch<'_>,
    ) -> Vec<Handle<K>> {
        let candidates = self.all_in_group::<K>(group);
        if candidates.is_empty() {
            return candidates;
        }
        let found: Vec<_> = candidates
            .into_iter()
            .filter(|h| name.matches(h.name()))
            .collect();
        if found.is_empty() {
            self.report_no_match_in_group(K::KIND, group, name);
        }
        found
    }

    fn typed<K: BlockKind>(&mut self, blocks: Vec<BlockRef>) -> Vec<Handle<K>> {
        let mut handles = Vec::with_capacity(blocks.len());
        for block in blocks {
            match Handle::<K>::try_from(block) {
                Ok(handle) => handles.push(handle),
                Err(err) => self.reporter.report_warning(err.to_string()),
            }
        }
        handles
    }

    fn report_no_match(&mut self, kind: DeviceKind, name: NameMatch<'_>) {
        self.reporter.report_error(format!(
            "no {kind} found matching condition ({} ; {})",
            name.condition(),
            name.needle()
        ));
    }

    fn report_no_match_in_group(&mut self, kind: DeviceKind, group: &str, name: NameMatch<'_>) {
        self.reporter.report_error(format!(
            "group {group} has no {kind} {} {}",
            name.group_phrase(),
            name.needle()
        ));
    }
}
