//! Core data model for Wireup.

pub mod descriptor;
pub mod intake;

pub use descriptor::{
    ComponentDescriptor, ComponentId, DependencyReference, DependencySlot, Lifecycle,
    ReferenceKind, TypeShape,
};
pub use intake::{DescriptorInput, DescriptorSet, GroupId, IntakeError, DEFAULT_GROUP};
