//! Synthesis error types.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::resolver::ResolveErrors;
use crate::util::diagnostic::Diagnostic;

/// Failure while planning or emitting.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum SynthError {
    #[error("cannot synthesize a default for slot {position} (`{type_name}`) of `{component}`: {reason}")]
    #[diagnostic(
        code(wireup::synth::unresolvable_default),
        help("Register a component or contract for the type, or mark the slot optional")
    )]
    UnresolvableDefault {
        component: String,
        group: String,
        position: usize,
        type_name: String,
        reason: String,
    },

    #[error("resolution was not validated before synthesis")]
    #[diagnostic(code(wireup::synth::unvalidated))]
    Unvalidated(#[source] ResolveErrors),

    /// A precondition inside the engine was broken. Always a bug.
    #[error("internal invariant violated: {0}")]
    #[diagnostic(code(wireup::synth::internal))]
    InternalInvariant(String),
}

impl SynthError {
    /// Convert to user-facing diagnostics.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            SynthError::Unvalidated(errors) => errors.to_diagnostics(),
            SynthError::UnresolvableDefault { group, .. } => {
                let mut diag = Diagnostic::error(self.to_string())
                    .with_code("wireup::synth::unresolvable_default")
                    .with_context(format!("in group `{}`", group));
                if let Some(help) = MietteDiagnostic::help(self) {
                    diag = diag.with_suggestion(help.to_string());
                }
                vec![diag]
            }
            SynthError::InternalInvariant(_) => vec![Diagnostic::error(self.to_string())
                .with_code("wireup::synth::internal")
                .with_suggestion("This is a bug in wireup; please report it with the descriptor file")],
        }
    }
}
