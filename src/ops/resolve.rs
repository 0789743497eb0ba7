//! Resolution operations.

use std::fmt::Write;

use crate::core::DescriptorSet;
use crate::resolver::{resolve, Resolution, ResolutionReport, ResolveErrors, ResolveOptions};

/// Everything one resolution pass found.
///
/// `resolution` is present unless an ambiguity made the graph meaningless;
/// `errors` holds every ambiguity and cycle.
#[derive(Debug)]
pub struct Analysis {
    pub resolution: Option<Resolution>,
    pub errors: ResolveErrors,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.resolution.is_some() && self.errors.is_empty()
    }

    /// The validated resolution, or every problem found.
    pub fn into_result(self) -> Result<Resolution, ResolveErrors> {
        match self.resolution {
            Some(resolution) if self.errors.is_empty() => Ok(resolution),
            _ => Err(self.errors),
        }
    }
}

/// Resolve and validate a descriptor set, collecting all problems.
pub fn analyze(set: &DescriptorSet, options: &ResolveOptions) -> Analysis {
    match resolve(set, options) {
        Ok(resolution) => {
            let errors = ResolveErrors(resolution.cycle_errors(set));
            Analysis {
                resolution: Some(resolution),
                errors,
            }
        }
        Err(errors) => Analysis {
            resolution: None,
            errors,
        },
    }
}

/// Render a resolution report for humans.
///
/// ```text
/// groups: core, web
/// [core]
///   Clock, Db
/// [web] depends on core
///   Api
/// ```
pub fn format_report(report: &ResolutionReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "groups: {}", report.groups.order.join(", "));
    for cycle in &report.groups.cycles {
        let _ = writeln!(out, "  group cycle: {}", cycle.join(" -> "));
    }

    for group in &report.components {
        if group.depends_on.is_empty() {
            let _ = writeln!(out, "[{}]", group.group);
        } else {
            let _ = writeln!(out, "[{}] depends on {}", group.group, group.depends_on.join(", "));
        }

        if group.sort.order.is_empty() {
            let _ = writeln!(out, "  (no components)");
        } else {
            let _ = writeln!(out, "  {}", group.sort.order.join(", "));
        }
        for cycle in &group.sort.cycles {
            let _ = writeln!(out, "  cycle: {}", cycle.join(" -> "));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{component, grouped, set_of};

    #[test]
    fn test_analyze_clean() {
        let set = set_of(vec![component("A").depends_on("B"), component("B")]);
        let analysis = analyze(&set, &ResolveOptions::default());
        assert!(analysis.is_ok());
        assert!(analysis.into_result().is_ok());
    }

    #[test]
    fn test_analyze_keeps_resolution_with_cycles() {
        let set = set_of(vec![component("A").depends_on("B"), component("B").depends_on("A")]);
        let analysis = analyze(&set, &ResolveOptions::default());

        assert!(!analysis.is_ok());
        assert!(analysis.resolution.is_some());
        assert_eq!(analysis.errors.len(), 1);
    }

    #[test]
    fn test_analyze_ambiguity_drops_resolution() {
        let set = set_of(vec![component("A").contract("I"), component("B").contract("I")]);
        let analysis = analyze(&set, &ResolveOptions::default());

        assert!(analysis.resolution.is_none());
        assert_eq!(analysis.into_result().unwrap_err().len(), 1);
    }

    #[test]
    fn test_format_report() {
        let set = grouped(vec![
            ("web", vec![component("Api").depends_on("IClock")]),
            ("core", vec![component("Clock").contract("IClock"), component("Loop").depends_on("Loop")]),
        ]);
        let analysis = analyze(&set, &ResolveOptions::default());
        let report = analysis.resolution.as_ref().unwrap().report(&set);

        assert_eq!(
            format_report(&report),
            "groups: core, web\n[core]\n  Clock, Loop\n  cycle: Loop -> Loop\n[web] depends on core\n  Api\n"
        );
    }
}
