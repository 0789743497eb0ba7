//! Resolution error types and diagnostics.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::{ComponentId, DescriptorSet};
use crate::util::diagnostic::Diagnostic;

/// A component named in an error, with enough context to locate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub name: String,
    pub group: String,
    pub source: PathBuf,
}

impl Candidate {
    pub fn of(set: &DescriptorSet, id: ComponentId) -> Self {
        let desc = set.get(id);
        Candidate {
            name: desc.name.clone(),
            group: set.group_name_of(id).to_string(),
            source: desc.source_locator.clone(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` in group `{}` ({})", self.name, self.group, self.source.display())
    }
}

/// A fatal resolution problem.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("contract `{contract}` is satisfied by {} components", .components.len())]
    #[diagnostic(
        code(wireup::resolve::ambiguous_contract),
        help("Keep exactly one component per contract name")
    )]
    AmbiguousContract {
        contract: String,
        components: Vec<Candidate>,
    },

    #[error("`{}` depends on `{name}`, which names {} components", .requester.name, .candidates.len())]
    #[diagnostic(
        code(wireup::resolve::ambiguous_name),
        help("Depend on a contract instead, or rename one of the components")
    )]
    AmbiguousComponentName {
        requester: Candidate,
        name: String,
        candidates: Vec<Candidate>,
    },

    #[error("`{}` depends on base type `{base_type}`, which {} components extend", .requester.name, .candidates.len())]
    #[diagnostic(
        code(wireup::resolve::ambiguous_base_type),
        help("Declare a contract on the intended implementation and depend on that")
    )]
    AmbiguousBaseType {
        requester: Candidate,
        base_type: String,
        candidates: Vec<Candidate>,
    },

    #[error("circular dependency between components in group `{group}`")]
    #[diagnostic(
        code(wireup::resolve::component_cycle),
        help("Break the cycle by removing or restructuring a dependency")
    )]
    CircularDependency {
        group: String,
        cycles: Vec<Vec<String>>,
    },

    #[error("circular dependency between groups")]
    #[diagnostic(
        code(wireup::resolve::group_cycle),
        help("Move the shared components into a group both sides can depend on")
    )]
    CircularGroupDependency { cycles: Vec<Vec<String>> },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());
        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_code(code.to_string());
        }

        match self {
            ResolveError::AmbiguousContract { components, .. } => {
                for candidate in components {
                    diag = diag.with_context(format!("satisfied by {}", candidate));
                }
                diag.with_suggestion("Remove the contract name from all but one component")
                    .with_suggestion("Split the implementations into distinct contracts")
            }

            ResolveError::AmbiguousComponentName {
                requester,
                candidates,
                ..
            }
            | ResolveError::AmbiguousBaseType {
                requester,
                candidates,
                ..
            } => {
                diag = diag.with_location(&requester.source);
                for candidate in candidates {
                    diag = diag.with_context(format!("candidate {}", candidate));
                }
                diag = diag.with_suggestion("Depend on a contract name that only one component declares");
                if matches!(self, ResolveError::AmbiguousComponentName { .. }) {
                    diag = diag.with_suggestion(
                        "Set `resolution.colocated_tiebreak = true` in wireup.toml to prefer the component next to the requester",
                    );
                }
                diag
            }

            ResolveError::CircularDependency { cycles, .. }
            | ResolveError::CircularGroupDependency { cycles } => {
                for cycle in cycles {
                    diag = diag.with_context(format!("cycle: {}", cycle.join(" -> ")));
                }
                diag.with_suggestion("Break the cycle by removing or restructuring dependencies")
            }
        }
    }
}

/// Every problem found by one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} problem(s) found while resolving components", .0.len())]
pub struct ResolveErrors(pub Vec<ResolveError>);

impl ResolveErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolveError> {
        self.0.iter()
    }

    /// Append an error unless an identical one was already recorded.
    pub fn push(&mut self, err: ResolveError) {
        if !self.0.contains(&err) {
            self.0.push(err);
        }
    }

    pub fn extend(&mut self, errs: impl IntoIterator<Item = ResolveError>) {
        for err in errs {
            self.push(err);
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ResolveErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.0.iter().map(ResolveError::to_diagnostic).collect()
    }
}

impl IntoIterator for ResolveErrors {
    type Item = ResolveError;
    type IntoIter = std::vec::IntoIter<ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, source: &str) -> Candidate {
        Candidate {
            name: name.into(),
            group: "main".into(),
            source: source.into(),
        }
    }

    #[test]
    fn test_ambiguous_contract_diagnostic() {
        let err = ResolveError::AmbiguousContract {
            contract: "IMailer".into(),
            components: vec![candidate("SmtpMailer", "src/smtp.ts"), candidate("FakeMailer", "src/fake.ts")],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error[wireup::resolve::ambiguous_contract]"));
        assert!(output.contains("contract `IMailer` is satisfied by 2 components"));
        assert!(output.contains("`SmtpMailer` in group `main` (src/smtp.ts)"));
        assert!(output.contains("`FakeMailer` in group `main` (src/fake.ts)"));
    }

    #[test]
    fn test_cycle_diagnostic_lists_every_cycle() {
        let err = ResolveError::CircularGroupDependency {
            cycles: vec![
                vec!["a".into(), "b".into(), "a".into()],
                vec!["c".into(), "c".into()],
            ],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("cycle: a -> b -> a"));
        assert!(output.contains("cycle: c -> c"));
    }

    #[test]
    fn test_errors_deduplicate() {
        let err = ResolveError::CircularGroupDependency { cycles: vec![] };
        let mut errors = ResolveErrors::default();
        errors.push(err.clone());
        errors.push(err);
        assert_eq!(errors.len(), 1);
        assert!(errors.into_result().is_err());
    }
}
