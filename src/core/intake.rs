//! Descriptor intake.
//!
//! Accepts a flat list or a group-name -> list mapping and normalizes it
//! into a [`DescriptorSet`]. No parsing happens here beyond serde; the
//! front-end is responsible for well-formed type names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::descriptor::{ComponentDescriptor, ComponentId, TypeShape};

/// Group used when the caller supplies no partitioning.
pub const DEFAULT_GROUP: &str = "main";

/// Index of a group inside a [`DescriptorSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Malformed intake.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("component #{position} in group `{group}` has an empty name")]
    EmptyName { group: String, position: usize },

    #[error("group names must not be empty")]
    EmptyGroupName,
}

/// On-disk / on-wire form of the descriptor list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorInput {
    Grouped {
        groups: GroupMap,
        #[serde(default)]
        types: Vec<TypeShape>,
    },
    Flat {
        components: Vec<ComponentDescriptor>,
        #[serde(default)]
        types: Vec<TypeShape>,
    },
    List(Vec<ComponentDescriptor>),
}

/// Group map preserving the order groups were written in.
///
/// serde_json's default map is sorted, so the groups are collected through a
/// visitor into a vector of pairs instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMap(pub Vec<(String, Vec<ComponentDescriptor>)>);

impl Serialize for GroupMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (group, components) in &self.0 {
            map.serialize_entry(group, components)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GroupMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = GroupMap;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of group name to component list")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(self, mut access: A) -> Result<GroupMap, A::Error> {
                let mut groups = Vec::new();
                while let Some((name, components)) = access.next_entry()? {
                    groups.push((name, components));
                }
                Ok(GroupMap(groups))
            }
        }

        deserializer.deserialize_map(Visitor)
    }
}

impl DescriptorInput {
    /// Normalize into a descriptor set.
    pub fn into_set(self) -> Result<DescriptorSet, IntakeError> {
        match self {
            DescriptorInput::Grouped { groups, types } => {
                Ok(DescriptorSet::from_groups(groups.0)?.with_shapes(types))
            }
            DescriptorInput::Flat { components, types } => {
                Ok(DescriptorSet::from_components(components)?.with_shapes(types))
            }
            DescriptorInput::List(components) => DescriptorSet::from_components(components),
        }
    }
}

/// The immutable, normalized input of one synthesis run.
///
/// Every descriptor's `group` is filled in. Groups are kept in
/// first-appearance order and components in input order; this is the
/// insertion order every later stage iterates in.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    components: Vec<ComponentDescriptor>,
    groups: Vec<String>,
    members: Vec<Vec<ComponentId>>,
    group_of: Vec<GroupId>,
    shapes: Vec<TypeShape>,
}

impl DescriptorSet {
    /// Build from a flat list. Descriptors without a group land in
    /// [`DEFAULT_GROUP`].
    pub fn from_components(
        components: impl IntoIterator<Item = ComponentDescriptor>,
    ) -> Result<Self, IntakeError> {
        let mut set = DescriptorSet::default();
        for desc in components {
            let group = desc
                .group
                .clone()
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| DEFAULT_GROUP.to_string());
            set.push(group, desc)?;
        }
        Ok(set)
    }

    /// Build from a group-name -> components mapping. The mapping key wins
    /// over a descriptor's own `group` field.
    pub fn from_groups(
        groups: impl IntoIterator<Item = (String, Vec<ComponentDescriptor>)>,
    ) -> Result<Self, IntakeError> {
        let mut set = DescriptorSet::default();
        for (group, components) in groups {
            if group.is_empty() {
                return Err(IntakeError::EmptyGroupName);
            }
            set.ensure_group(&group);
            for desc in components {
                if let Some(declared) = desc.group.as_deref() {
                    if !declared.is_empty() && declared != group {
                        tracing::warn!(
                            "component `{}` declares group `{}` but was supplied under `{}`",
                            desc.name,
                            declared,
                            group
                        );
                    }
                }
                set.push(group.clone(), desc)?;
            }
        }
        Ok(set)
    }

    /// Attach known-but-unmanaged type shapes.
    pub fn with_shapes(mut self, shapes: Vec<TypeShape>) -> Self {
        self.shapes = shapes;
        self
    }

    fn ensure_group(&mut self, group: &str) -> GroupId {
        if let Some(pos) = self.groups.iter().position(|g| g == group) {
            return GroupId(pos);
        }
        self.groups.push(group.to_string());
        self.members.push(Vec::new());
        GroupId(self.groups.len() - 1)
    }

    fn push(&mut self, group: String, mut desc: ComponentDescriptor) -> Result<(), IntakeError> {
        let group_id = self.ensure_group(&group);
        if desc.name.is_empty() {
            return Err(IntakeError::EmptyName {
                group,
                position: self.members[group_id.0].len(),
            });
        }

        let id = ComponentId(self.components.len());
        desc.group = Some(group);
        self.components.push(desc);
        self.members[group_id.0].push(id);
        self.group_of.push(group_id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get a descriptor by id.
    ///
    /// Ids are only ever minted by this set, so indexing cannot fail for ids
    /// obtained from it.
    pub fn get(&self, id: ComponentId) -> &ComponentDescriptor {
        &self.components[id.0]
    }

    /// Iterate over all components in input order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &ComponentDescriptor)> {
        self.components
            .iter()
            .enumerate()
            .map(|(i, d)| (ComponentId(i), d))
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> {
        (0..self.components.len()).map(ComponentId)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Group ids in first-appearance order.
    pub fn group_ids(&self) -> impl Iterator<Item = GroupId> {
        (0..self.groups.len()).map(GroupId)
    }

    pub fn group_name(&self, group: GroupId) -> &str {
        &self.groups[group.0]
    }

    pub fn group_by_name(&self, name: &str) -> Option<GroupId> {
        self.groups.iter().position(|g| g == name).map(GroupId)
    }

    /// Components of a group in input order.
    pub fn members(&self, group: GroupId) -> &[ComponentId] {
        &self.members[group.0]
    }

    pub fn group_of(&self, id: ComponentId) -> GroupId {
        self.group_of[id.0]
    }

    pub fn group_name_of(&self, id: ComponentId) -> &str {
        self.group_name(self.group_of(id))
    }

    pub fn shapes(&self) -> &[TypeShape] {
        &self.shapes
    }

    /// Index of type shapes by name. The first shape with a given name wins.
    pub fn shape_index(&self) -> HashMap<&str, &TypeShape> {
        let mut index = HashMap::new();
        for shape in &self.shapes {
            index.entry(shape.name.as_str()).or_insert(shape);
        }
        index
    }

    /// Flatten back into the grouped input form.
    pub fn to_input(&self) -> DescriptorInput {
        let groups = self
            .group_ids()
            .map(|g| {
                let components = self
                    .members(g)
                    .iter()
                    .map(|&id| self.get(id).clone())
                    .collect();
                (self.group_name(g).to_string(), components)
            })
            .collect();

        DescriptorInput::Grouped {
            groups: GroupMap(groups),
            types: self.shapes.clone(),
        }
    }
}
