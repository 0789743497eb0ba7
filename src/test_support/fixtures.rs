//! Descriptor fixtures.

use std::path::PathBuf;

use crate::core::{ComponentDescriptor, DependencySlot, DescriptorSet, Lifecycle, TypeShape};

/// Builder for a single [`ComponentDescriptor`].
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    desc: ComponentDescriptor,
}

/// Start a shared component declared in `src/<name>.ts`.
pub fn component(name: &str) -> ComponentBuilder {
    ComponentBuilder {
        desc: ComponentDescriptor::new(name, format!("src/{}.ts", name)),
    }
}

impl ComponentBuilder {
    /// Append a required dependency slot.
    pub fn depends_on(mut self, type_name: &str) -> Self {
        self.desc.dependency_slots.push(DependencySlot::new(type_name));
        self
    }

    /// Append an optional dependency slot.
    pub fn optional_dep(mut self, type_name: &str) -> Self {
        self.desc
            .dependency_slots
            .push(DependencySlot::optional(type_name));
        self
    }

    pub fn contract(mut self, contract: &str) -> Self {
        self.desc.contract_name = Some(contract.to_string());
        self
    }

    pub fn base_type(mut self, base: &str) -> Self {
        self.desc.base_type_name = Some(base.to_string());
        self
    }

    pub fn unique(mut self) -> Self {
        self.desc.lifecycle = Lifecycle::Unique;
        self
    }

    pub fn source(mut self, path: &str) -> Self {
        self.desc.source_locator = PathBuf::from(path);
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.desc.group = Some(group.to_string());
        self
    }

    pub fn build(self) -> ComponentDescriptor {
        self.desc
    }
}

/// A flat descriptor set.
pub fn set_of(components: Vec<ComponentBuilder>) -> DescriptorSet {
    DescriptorSet::from_components(components.into_iter().map(ComponentBuilder::build))
        .expect("valid fixture")
}

/// A grouped descriptor set, groups in the given order.
pub fn grouped(groups: Vec<(&str, Vec<ComponentBuilder>)>) -> DescriptorSet {
    DescriptorSet::from_groups(groups.into_iter().map(|(name, components)| {
        (
            name.to_string(),
            components.into_iter().map(ComponentBuilder::build).collect(),
        )
    }))
    .expect("valid fixture")
}

/// A known-but-unmanaged type shape.
pub fn shape(name: &str, slots: &[&str]) -> TypeShape {
    TypeShape {
        name: name.to_string(),
        dependency_slots: slots.iter().map(|s| DependencySlot::new(*s)).collect(),
    }
}
