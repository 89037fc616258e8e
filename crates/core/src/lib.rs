//! framework-core
//!
//! Core library for preparing precompiled `.framework` bundles for embedding
//! in an application build.
//!
//! This crate locates the bundle root for a set of binary members, plans
//! architecture slicing, copies and fixes up the bundle in a staging directory,
//! drives signing, and packages the result as a deterministic zip suitable for
//! build caches.
//!
//! External developer tools (`lipo`, `bitcode_strip`, `codesign`) sit behind
//! the traits in [`backends`] so everything here is testable without them.

pub mod backends;
pub mod config;
pub mod locator;
pub mod model;
pub mod planner;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
