//! Instantiation planning.
//!
//! Decides how each component is declared and turns every dependency slot
//! into the expression passed at its constructor position.

use serde::Serialize;

use crate::core::{ComponentId, DescriptorSet, GroupId, Lifecycle};
use crate::resolver::{ResolveErrors, Resolution, ResolvedEdge};
use crate::synth::defaults::DefaultSynthesizer;
use crate::synth::errors::SynthError;
use crate::synth::naming::{property_access, NameTable};

/// How a component is declared in the composition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclarationKind {
    /// Lazily initialized slot plus an accessor that fills it on first call.
    /// Accessors are functions, so siblings declared earlier can still call
    /// them.
    EagerMemoized,
    /// A factory returning a fresh instance on every call.
    LazyFactory,
}

impl From<Lifecycle> for DeclarationKind {
    fn from(lifecycle: Lifecycle) -> Self {
        match lifecycle {
            Lifecycle::Shared => DeclarationKind::EagerMemoized,
            Lifecycle::Unique => DeclarationKind::LazyFactory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentPlan {
    #[serde(skip)]
    pub id: ComponentId,
    pub name: String,
    pub declaration_kind: DeclarationKind,
    /// Constructor arguments in slot order.
    pub argument_expressions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPlan {
    #[serde(skip)]
    pub group: GroupId,
    pub name: String,
    /// Groups passed to this group's composition function, in parameter order.
    #[serde(skip)]
    pub dependencies: Vec<GroupId>,
    pub components: Vec<ComponentPlan>,
}

/// Plan for the whole run: groups in group order, components in component
/// order within each group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstantiationPlan {
    pub groups: Vec<GroupPlan>,
}

impl InstantiationPlan {
    pub fn component_count(&self) -> usize {
        self.groups.iter().map(|g| g.components.len()).sum()
    }
}

/// Builds an [`InstantiationPlan`] from a validated resolution.
pub struct Planner<'a> {
    set: &'a DescriptorSet,
    resolution: &'a Resolution,
    names: &'a NameTable,
    defaults: DefaultSynthesizer<'a>,
}

impl<'a> Planner<'a> {
    pub fn new(
        set: &'a DescriptorSet,
        resolution: &'a Resolution,
        names: &'a NameTable,
        string_placeholder: &str,
    ) -> Self {
        Planner {
            set,
            resolution,
            names,
            defaults: DefaultSynthesizer::new(set, string_placeholder),
        }
    }

    pub fn plan(&self) -> Result<InstantiationPlan, SynthError> {
        let cycles = self.resolution.cycle_errors(self.set);
        if !cycles.is_empty() {
            return Err(SynthError::Unvalidated(ResolveErrors(cycles)));
        }

        let order = self.resolution.planning_order();
        if order.len() != self.set.group_count() {
            return Err(SynthError::InternalInvariant(format!(
                "group order has {} entries for {} groups",
                order.len(),
                self.set.group_count()
            )));
        }

        let mut groups = Vec::with_capacity(order.len());
        for (group, members) in order {
            if members.len() != self.set.members(group).len() {
                return Err(SynthError::InternalInvariant(format!(
                    "component order of group `{}` has {} entries for {} components",
                    self.set.group_name(group),
                    members.len(),
                    self.set.members(group).len()
                )));
            }

            let components = members
                .iter()
                .map(|&id| self.plan_component(id))
                .collect::<Result<Vec<_>, _>>()?;

            groups.push(GroupPlan {
                group,
                name: self.set.group_name(group).to_string(),
                dependencies: self.resolution.group_dependencies(group),
                components,
            });
        }

        let plan = InstantiationPlan { groups };
        tracing::debug!("planned {} components", plan.component_count());
        Ok(plan)
    }

    fn plan_component(&self, id: ComponentId) -> Result<ComponentPlan, SynthError> {
        let desc = self.set.get(id);
        let edges = self.resolution.edges(id);
        if edges.len() != desc.dependency_slots.len() {
            return Err(SynthError::InternalInvariant(format!(
                "`{}` has {} slots but {} resolved edges",
                desc.name,
                desc.dependency_slots.len(),
                edges.len()
            )));
        }

        let mut argument_expressions = Vec::with_capacity(edges.len());
        for (position, (slot, edge)) in desc.dependency_slots.iter().zip(edges).enumerate() {
            let expr = match edge {
                ResolvedEdge::Internal(reference) => self.reference(reference.target),
                ResolvedEdge::CrossGroup { group, reference } => property_access(
                    &self.names.group(*group).instance(),
                    &self.names.component(reference.target).export_key,
                ),
                ResolvedEdge::Unmanaged => self.defaults.slot_default(slot).map_err(|reason| {
                    SynthError::UnresolvableDefault {
                        component: desc.name.clone(),
                        group: self.set.group_name_of(id).to_string(),
                        position,
                        type_name: slot.declared_type_name.clone(),
                        reason: reason.to_string(),
                    }
                })?,
            };
            argument_expressions.push(expr);
        }

        Ok(ComponentPlan {
            id,
            name: desc.name.clone(),
            declaration_kind: desc.lifecycle.into(),
            argument_expressions,
        })
    }

    /// Call expression that yields an instance of a same-group component:
    /// the accessor for shared components, the factory for unique ones.
    fn reference(&self, target: ComponentId) -> String {
        let names = self.names.component(target);
        match self.set.get(target).lifecycle {
            Lifecycle::Shared => format!("{}()", names.accessor()),
            Lifecycle::Unique => format!("{}()", names.factory()),
        }
    }
}
