//! Default expressions for unmanaged dependency slots.
//!
//! A slot nothing in the descriptor set satisfies still has to be filled so
//! the constructor call keeps its arity. Primitives map to fixed literals,
//! optional slots to `undefined`, and anything else to a construction of the
//! declared type, recursing into the type's own slots when its shape is
//! known.

use std::collections::HashMap;
use std::fmt;

use crate::core::{DependencySlot, DescriptorSet};
use crate::synth::naming::quote;

/// Literal used for unmanaged `string` slots unless configured otherwise.
pub const DEFAULT_STRING_PLACEHOLDER: &str = "";

/// Why no default could be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolvable {
    /// The type name is not something `new` can be applied to.
    NotConstructible,
    /// The type's own slots lead back to itself.
    Recursive(Vec<String>),
}

impl fmt::Display for Unresolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolvable::NotConstructible => write!(f, "the type has no constructible shape"),
            Unresolvable::Recursive(path) => {
                write!(f, "the type's default requires itself ({})", path.join(" -> "))
            }
        }
    }
}

/// Synthesizes default expressions.
pub struct DefaultSynthesizer<'a> {
    shapes: HashMap<&'a str, &'a [DependencySlot]>,
    string_placeholder: String,
}

impl<'a> DefaultSynthesizer<'a> {
    /// Known shapes come from the set's type shapes first, then from
    /// component descriptors (first by input order).
    pub fn new(set: &'a DescriptorSet, string_placeholder: impl Into<String>) -> Self {
        let mut shapes: HashMap<&str, &[DependencySlot]> = HashMap::new();
        for shape in set.shapes() {
            shapes
                .entry(shape.name.as_str())
                .or_insert(shape.dependency_slots.as_slice());
        }
        for (_, desc) in set.iter() {
            shapes
                .entry(desc.name.as_str())
                .or_insert(desc.dependency_slots.as_slice());
        }

        DefaultSynthesizer {
            shapes,
            string_placeholder: string_placeholder.into(),
        }
    }

    /// Default expression for one slot.
    pub fn slot_default(&self, slot: &DependencySlot) -> Result<String, Unresolvable> {
        self.expr(&slot.declared_type_name, slot.optional, &mut Vec::new())
    }

    fn expr(&self, type_name: &str, optional: bool, stack: &mut Vec<String>) -> Result<String, Unresolvable> {
        if optional {
            return Ok("undefined".to_string());
        }

        let type_name = type_name.trim();
        if let Some(literal) = self.primitive(type_name) {
            return Ok(literal);
        }

        let base = constructible_base(type_name).ok_or(Unresolvable::NotConstructible)?;

        let Some(slots) = self.shapes.get(base) else {
            return Ok(format!("new {}()", base));
        };

        if stack.iter().any(|s| s == base) {
            let mut path = stack.clone();
            path.push(base.to_string());
            return Err(Unresolvable::Recursive(path));
        }

        stack.push(base.to_string());
        let args = slots
            .iter()
            .map(|slot| self.expr(&slot.declared_type_name, slot.optional, stack))
            .collect::<Result<Vec<_>, _>>()?;
        stack.pop();

        Ok(format!("new {}({})", base, args.join(", ")))
    }

    fn primitive(&self, type_name: &str) -> Option<String> {
        let literal = match type_name.to_ascii_lowercase().as_str() {
            "string" => quote(&self.string_placeholder),
            "number" => "0".to_string(),
            "bigint" => "0n".to_string(),
            "boolean" => "false".to_string(),
            "date" => "new Date()".to_string(),
            "any" | "unknown" | "object" => "{}".to_string(),
            "null" => "null".to_string(),
            "undefined" | "void" => "undefined".to_string(),
            _ => {
                if type_name.ends_with("[]")
                    || type_name.starts_with("Array<")
                    || type_name.starts_with("ReadonlyArray<")
                {
                    "[]".to_string()
                } else if type_name == "Map" || type_name.starts_with("Map<") {
                    "new Map()".to_string()
                } else if type_name == "Set" || type_name.starts_with("Set<") {
                    "new Set()".to_string()
                } else {
                    return None;
                }
            }
        };
        Some(literal)
    }
}

/// The constructible part of a type reference: `ns.Foo<Bar>` -> `ns.Foo`.
///
/// Returns `None` for unions, function types, object literals and other
/// names `new` cannot be applied to.
fn constructible_base(type_name: &str) -> Option<&str> {
    let base = match type_name.find('<') {
        Some(pos) if type_name.ends_with('>') => &type_name[..pos],
        Some(_) => return None,
        None => type_name,
    };

    let valid = !base.is_empty()
        && base.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        });

    valid.then_some(base)
}
