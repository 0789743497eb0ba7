//! Component descriptors - the unit of input handed over by the front-end.
//!
//! A descriptor is created once per discovered component and is immutable
//! for the lifetime of a synthesis run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How many instances of a component exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// One instance, constructed lazily on first use and reused afterwards.
    #[default]
    Shared,
    /// A fresh instance on every resolution.
    Unique,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Shared => write!(f, "shared"),
            Lifecycle::Unique => write!(f, "unique"),
        }
    }
}

impl std::str::FromStr for Lifecycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared" | "singleton" => Ok(Lifecycle::Shared),
            "unique" | "transient" => Ok(Lifecycle::Unique),
            _ => Err(format!(
                "invalid lifecycle '{}'; expected 'shared' or 'unique'",
                s
            )),
        }
    }
}

/// One positional constructor input.
///
/// Slots carry no explicit index: their position in
/// [`ComponentDescriptor::dependency_slots`] is the constructor argument
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySlot {
    /// Canonical type name as resolved by the front-end.
    pub declared_type_name: String,

    /// Whether the constructor accepts an absent value here.
    #[serde(default)]
    pub optional: bool,
}

impl DependencySlot {
    pub fn new(declared_type_name: impl Into<String>) -> Self {
        DependencySlot {
            declared_type_name: declared_type_name.into(),
            optional: false,
        }
    }

    pub fn optional(declared_type_name: impl Into<String>) -> Self {
        DependencySlot {
            declared_type_name: declared_type_name.into(),
            optional: true,
        }
    }
}

/// A discovered component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    /// Class name. Unique only within its group.
    pub name: String,

    /// Path of the declaring source file. Opaque to the engine apart from
    /// import rendering, tie-breaking and diagnostics.
    #[serde(default)]
    pub source_locator: PathBuf,

    /// Constructor inputs in declaration order.
    #[serde(default)]
    pub dependency_slots: Vec<DependencySlot>,

    /// Named capability this component satisfies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,

    /// Abstract base this component extends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type_name: Option<String>,

    #[serde(default)]
    pub lifecycle: Lifecycle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl ComponentDescriptor {
    /// Create a shared, dependency-free descriptor.
    pub fn new(name: impl Into<String>, source_locator: impl Into<PathBuf>) -> Self {
        ComponentDescriptor {
            name: name.into(),
            source_locator: source_locator.into(),
            dependency_slots: Vec::new(),
            contract_name: None,
            base_type_name: None,
            lifecycle: Lifecycle::Shared,
            group: None,
        }
    }

    /// The contract name, treating an empty string as absent.
    pub fn contract(&self) -> Option<&str> {
        self.contract_name.as_deref().filter(|c| !c.is_empty())
    }

    /// The base type name, treating an empty string as absent.
    pub fn base_type(&self) -> Option<&str> {
        self.base_type_name.as_deref().filter(|b| !b.is_empty())
    }

    /// Directory of the declaring source file.
    pub fn source_dir(&self) -> &Path {
        self.source_locator.parent().unwrap_or(Path::new(""))
    }
}

/// A type the front-end saw but did not register as a component.
///
/// Shapes are only consulted when synthesizing default expressions for
/// unmanaged slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeShape {
    pub name: String,

    #[serde(default)]
    pub dependency_slots: Vec<DependencySlot>,
}

/// Index of a component inside a [`DescriptorSet`](super::DescriptorSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a dependency slot names its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    ComponentName,
    Contract,
    BaseType,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::ComponentName => write!(f, "component"),
            ReferenceKind::Contract => write!(f, "contract"),
            ReferenceKind::BaseType => write!(f, "base type"),
        }
    }
}

/// A dependency slot matched against a known component, tagged with the
/// kind of name that matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyReference {
    pub kind: ReferenceKind,
    pub value: String,
    pub target: ComponentId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_json_defaults() {
        let json = r#"{
            "name": "UserService",
            "sourceLocator": "src/users/service.ts",
            "dependencySlots": [
                { "declaredTypeName": "UserRepo" },
                { "declaredTypeName": "Clock", "optional": true }
            ],
            "contractName": "IUserService"
        }"#;

        let desc: ComponentDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.name, "UserService");
        assert_eq!(desc.lifecycle, Lifecycle::Shared);
        assert_eq!(desc.contract(), Some("IUserService"));
        assert_eq!(desc.base_type(), None);
        assert!(!desc.dependency_slots[0].optional);
        assert!(desc.dependency_slots[1].optional);
        assert_eq!(desc.source_dir(), Path::new("src/users"));
    }

    #[test]
    fn test_empty_contract_is_absent() {
        let mut desc = ComponentDescriptor::new("A", "a.ts");
        desc.contract_name = Some(String::new());
        assert_eq!(desc.contract(), None);
    }

    #[test]
    fn test_lifecycle_parse() {
        assert_eq!("Shared".parse::<Lifecycle>().unwrap(), Lifecycle::Shared);
        assert_eq!("transient".parse::<Lifecycle>().unwrap(), Lifecycle::Unique);
        assert!("scoped".parse::<Lifecycle>().is_err());
    }
}
