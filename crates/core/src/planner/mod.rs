//! Architecture slice planning.
//!
//! Decides whether a precompiled framework has to be thinned before it is
//! embedded, and if so which architectures survive.

use thiserror::Error;

use crate::model::{ArchSet, SlicePlan};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error(
        "Precompiled framework does not share any binary architectures with the binaries that \
         were built (framework: {framework}, required: {required})"
    )]
    IncompatibleArchitectures { framework: ArchSet, required: ArchSet },
}

/// Plan slicing for a framework built for `framework_archs` when the target
/// needs `required_archs` (already normalized, see [`ArchSet::from_slices`]).
///
/// Single-architecture frameworks and exact matches are copied as-is.
pub fn plan_slices(
    framework_archs: &ArchSet,
    required_archs: &ArchSet,
) -> Result<SlicePlan, PlanError> {
    if framework_archs.len() == 1 || framework_archs == required_archs {
        return Ok(SlicePlan::NoExtraction);
    }

    let needed = framework_archs.intersection(required_archs);
    if needed.is_empty() {
        return Err(PlanError::IncompatibleArchitectures {
            framework: framework_archs.clone(),
            required: required_archs.clone(),
        });
    }
    Ok(SlicePlan::Retain(needed))
}
