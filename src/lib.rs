//! Wireup - compile-time dependency injection container synthesis
//!
//! This crate turns component descriptors into a statically generated
//! composition root: contracts and references are resolved, dependency
//! graphs are sorted with every cycle reported, and TypeScript code that
//! instantiates each component in order is emitted.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod synth;
pub mod util;

/// Test utilities for Wireup unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides fluent builders for descriptor sets.
#[cfg(test)]
pub mod test_support;

pub use core::{ComponentDescriptor, DependencySlot, DescriptorSet, Lifecycle, TypeShape};
pub use resolver::{resolve, Resolution, ResolveError, ResolveErrors, ResolveOptions};
pub use synth::{synthesize, Output, OutputUnit, SynthError, SynthOptions};
pub use util::context::GlobalContext;
