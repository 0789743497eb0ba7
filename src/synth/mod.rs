//! Synthesis: naming, default expressions, instantiation planning and
//! code emission.
//!
//! [`synthesize`] is the single entry point. It expects a validated
//! [`Resolution`] and is a pure function of the descriptor set and the
//! options.

pub mod defaults;
pub mod emit;
pub mod errors;
pub mod naming;
pub mod plan;

pub use defaults::{DefaultSynthesizer, DEFAULT_STRING_PLACEHOLDER};
pub use emit::{import_path, is_generated, recorded_fingerprint, Emitter, Output, OutputUnit};
pub use errors::SynthError;
pub use naming::NameTable;
pub use plan::{ComponentPlan, DeclarationKind, GroupPlan, InstantiationPlan, Planner};

use std::path::{Path, PathBuf};

use crate::core::DescriptorSet;
use crate::resolver::Resolution;
use crate::util::hash::Fingerprint;

/// Default directory generated units are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "src/generated";

/// Default file name of the single unit, or of the aggregator in split mode.
pub const DEFAULT_FILE_NAME: &str = "container.ts";

/// Group count at which output is split into one unit per group.
pub const DEFAULT_SPLIT_THRESHOLD: usize = 4;

/// Options that shape the emitted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthOptions {
    /// Directory the units will live in; import paths are relative to it.
    pub output_dir: PathBuf,
    pub file_name: String,
    pub split_threshold: usize,
    pub string_placeholder: String,
}

impl Default for SynthOptions {
    fn default() -> Self {
        SynthOptions {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            string_placeholder: DEFAULT_STRING_PLACEHOLDER.to_string(),
        }
    }
}

impl SynthOptions {
    /// Stem of the aggregator unit; group units never take it.
    pub fn file_stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }
}

/// Plan instantiation for a validated resolution.
pub fn plan(
    set: &DescriptorSet,
    resolution: &Resolution,
    options: &SynthOptions,
) -> Result<InstantiationPlan, SynthError> {
    let names = NameTable::build(set, &[options.file_stem()]);
    Planner::new(set, resolution, &names, &options.string_placeholder).plan()
}

/// Produce the composition code for a validated resolution.
pub fn synthesize(
    set: &DescriptorSet,
    resolution: &Resolution,
    options: &SynthOptions,
) -> Result<Output, SynthError> {
    let names = NameTable::build(set, &[options.file_stem()]);
    let plan = Planner::new(set, resolution, &names, &options.string_placeholder).plan()?;
    let fingerprint = fingerprint(set, options)?;

    Emitter::new(set, &names, &plan, options, &fingerprint).emit()
}

/// Fingerprint of everything the output depends on.
pub fn fingerprint(set: &DescriptorSet, options: &SynthOptions) -> Result<String, SynthError> {
    let input = serde_json::to_string(&set.to_input())
        .map_err(|e| SynthError::InternalInvariant(format!("descriptor set is not serializable: {}", e)))?;

    let mut fp = Fingerprint::new();
    fp.update_str(env!("CARGO_PKG_VERSION"))
        .update_str(&input)
        .update_str(&options.output_dir.to_string_lossy())
        .update_str(&options.file_name)
        .update_str(&options.split_threshold.to_string())
        .update_str(&options.string_placeholder);
    Ok(fp.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{resolve, ResolveOptions};
    use crate::test_support::{component, grouped, set_of};

    fn run(set: &DescriptorSet, options: &SynthOptions) -> Output {
        let resolution = resolve(set, &ResolveOptions::default()).unwrap();
        synthesize(set, &resolution, options).unwrap()
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(SynthOptions::default().file_stem(), "container");
        let options = SynthOptions {
            file_name: "di.generated.ts".into(),
            ..SynthOptions::default()
        };
        assert_eq!(options.file_stem(), "di.generated");
    }

    #[test]
    fn test_fingerprint_tracks_input_and_options() {
        let set = set_of(vec![component("A")]);
        let options = SynthOptions::default();
        let base = fingerprint(&set, &options).unwrap();

        assert_eq!(base, fingerprint(&set_of(vec![component("A")]), &options).unwrap());
        assert_ne!(base, fingerprint(&set_of(vec![component("A").unique()]), &options).unwrap());

        let placeholder = SynthOptions {
            string_placeholder: "x".into(),
            ..SynthOptions::default()
        };
        assert_ne!(base, fingerprint(&set, &placeholder).unwrap());
    }

    #[test]
    fn test_units_carry_fingerprint() {
        let set = set_of(vec![component("A")]);
        let options = SynthOptions::default();
        let output = run(&set, &options);

        let expected = fingerprint(&set, &options).unwrap();
        for unit in output.units() {
            assert_eq!(recorded_fingerprint(&unit.contents), Some(expected.as_str()));
        }
    }

    #[test]
    fn test_split_threshold() {
        let set = grouped(vec![
            ("a", vec![component("A")]),
            ("b", vec![component("B")]),
            ("c", vec![component("C")]),
        ]);

        assert!(!run(&set, &SynthOptions::default()).is_split());

        let split = SynthOptions {
            split_threshold: 3,
            ..SynthOptions::default()
        };
        let output = run(&set, &split);
        assert!(output.is_split());
        assert_eq!(output.units().len(), 4);
    }

    #[test]
    fn test_plan_entry_point() {
        let set = set_of(vec![component("A").depends_on("B"), component("B")]);
        let resolution = resolve(&set, &ResolveOptions::default()).unwrap();
        let plan = plan(&set, &resolution, &SynthOptions::default()).unwrap();
        assert_eq!(plan.component_count(), 2);
    }

    #[test]
    fn test_every_component_instantiated_once() {
        let set = grouped(vec![
            ("core", vec![component("Clock").contract("IClock"), component("Db")]),
            ("web", vec![component("Api").depends_on("IClock").depends_on("Db")]),
        ]);
        let output = run(&set, &SynthOptions::default());
        let contents = &output.units()[0].contents;

        for construct in ["new Clock()", "new Db()", "new Api(coreGroup.IClock, coreGroup.Db)"] {
            assert_eq!(contents.matches(construct).count(), 1, "{}", construct);
        }
    }
}
