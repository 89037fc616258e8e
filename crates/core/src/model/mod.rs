//! Core data model for framework processing.
//!
//! This module contains:
//! - `ArchSet`: an ordered set of architecture identifiers (e.g. `arm64`, `x86_64`).
//! - `SlicePlan`: the decision of whether a framework's binaries need slicing.
//! - `FrameworkLocation`: a binary member resolved against its bundle root.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directory suffix that marks the root of a framework bundle.
pub const FRAMEWORK_SUFFIX: &str = ".framework";

/// Prefix carried by simulator slice identifiers (e.g. `sim_arm64`).
pub const SIMULATOR_PREFIX: &str = "sim_";

/// Set of architecture identifiers.
///
/// Backed by a `BTreeSet` so iteration (and therefore tool arguments and log
/// output) is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchSet(BTreeSet<String>);

impl ArchSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Build the required architecture set from raw `--slice` values, stripping
    /// a leading simulator prefix from each entry.
    pub fn from_slices<I, S>(slices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        slices
            .into_iter()
            .map(|s| {
                let s = s.as_ref();
                s.strip_prefix(SIMULATOR_PREFIX).unwrap_or(s).to_string()
            })
            .collect()
    }

    pub fn insert(&mut self, arch: impl Into<String>) -> bool {
        self.0.insert(arch.into())
    }

    pub fn contains(&self, arch: &str) -> bool {
        self.0.contains(arch)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn intersection(&self, other: &ArchSet) -> ArchSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn extend(&mut self, other: ArchSet) {
        self.0.extend(other.0);
    }
}

impl<S: Into<String>> FromIterator<S> for ArchSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ArchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, arch) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arch}")?;
        }
        write!(f, "}}")
    }
}

/// Outcome of slice planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlicePlan {
    /// Binaries are copied unmodified.
    NoExtraction,
    /// Binaries are thinned to exactly these architectures (never empty).
    Retain(ArchSet),
}

impl SlicePlan {
    /// Architectures to retain, or `None` when no extraction is needed.
    pub fn retained(&self) -> Option<&ArchSet> {
        match self {
            SlicePlan::NoExtraction => None,
            SlicePlan::Retain(archs) => Some(archs),
        }
    }

    pub fn needs_extraction(&self) -> bool {
        matches!(self, SlicePlan::Retain(_))
    }
}

/// A binary member resolved against the framework bundle that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkLocation {
    /// Path of the member relative to `root`.
    pub relative_path: PathBuf,
    /// Absolute path of the bundle directory (ends in `.framework`).
    pub root: PathBuf,
}
