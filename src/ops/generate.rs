//! Generation operations: the full pipeline from descriptors to files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::DescriptorSet;
use crate::ops::resolve::analyze;
use crate::resolver::{ResolveErrors, ResolveOptions};
use crate::synth::{is_generated, recorded_fingerprint, synthesize, Output, OutputUnit, SynthError, SynthOptions};
use crate::util::config::Config;
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::{read_if_exists, write_if_changed};

/// Options for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub resolve: ResolveOptions,
    /// `synth.output_dir` is relative to the project root, like the source
    /// locators import paths are computed from.
    pub synth: SynthOptions,
    /// Directory units are written to.
    pub out_dir: PathBuf,
}

impl GenerateOptions {
    pub fn from_config(config: &Config, root: &Path) -> Self {
        let mut synth = config.synth_options();
        let out_dir = root.join(&synth.output_dir);
        if let Some(relative) = pathdiff::diff_paths(&out_dir, root) {
            synth.output_dir = relative;
        }

        GenerateOptions {
            resolve: config.resolve_options(),
            synth,
            out_dir,
        }
    }
}

/// Why the pipeline produced no output.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveErrors),

    #[error(transparent)]
    Synth(#[from] SynthError),
}

impl PipelineError {
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            PipelineError::Resolve(errors) => errors.to_diagnostics(),
            PipelineError::Synth(err) => err.to_diagnostics(),
        }
    }
}

/// Resolve, validate and synthesize. Nothing touches the filesystem.
pub fn render(set: &DescriptorSet, options: &GenerateOptions) -> Result<Output, PipelineError> {
    let resolution = analyze(set, &options.resolve).into_result()?;
    Ok(synthesize(set, &resolution, &options.synth)?)
}

/// State of one unit on disk relative to freshly rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Written by this run.
    Written,
    /// Already identical on disk.
    Unchanged,
    /// On disk but different.
    Stale,
    /// Not on disk.
    Missing,
    /// Generated by an earlier run but no longer part of the output.
    Orphaned,
    /// Orphaned and deleted by this run.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    pub path: PathBuf,
    pub state: UnitState,
}

/// Write every unit into `dir`, skipping files whose contents already match,
/// and delete generated files no longer part of the output.
pub fn write_output(output: &Output, dir: &Path) -> Result<Vec<UnitStatus>> {
    let mut statuses = output
        .units()
        .iter()
        .map(|unit| {
            let path = dir.join(&unit.file_name);
            let state = if write_if_changed(&path, &unit.contents)? {
                tracing::debug!("wrote {}", path.display());
                UnitState::Written
            } else {
                UnitState::Unchanged
            };
            Ok(UnitStatus { path, state })
        })
        .collect::<Result<Vec<_>>>()?;

    for path in find_orphans(output, dir)? {
        fs::remove_file(&path)
            .with_context(|| format!("failed to remove file: {}", path.display()))?;
        tracing::debug!("removed {}", path.display());
        statuses.push(UnitStatus {
            path,
            state: UnitState::Removed,
        });
    }

    Ok(statuses)
}

/// Compare every unit with what is on disk in `dir`, and report generated
/// files no longer part of the output.
pub fn check_output(output: &Output, dir: &Path) -> Result<Vec<UnitStatus>> {
    let mut statuses = output
        .units()
        .iter()
        .map(|unit| {
            let path = dir.join(&unit.file_name);
            let state = match read_if_exists(&path)? {
                None => UnitState::Missing,
                Some(existing) => compare(&existing, unit, &path),
            };
            Ok(UnitStatus { path, state })
        })
        .collect::<Result<Vec<_>>>()?;

    statuses.extend(find_orphans(output, dir)?.into_iter().map(|path| UnitStatus {
        path,
        state: UnitState::Orphaned,
    }));
    Ok(statuses)
}

/// `*.ts` files directly in `dir` that carry the generated banner but are
/// not units of `output`. Hand-written files are never touched.
fn find_orphans(output: &Output, dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let current: HashSet<&str> = output.units().iter().map(|u| u.file_name.as_str()).collect();
    let mut orphans = Vec::new();

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "ts"));

    for entry in entries {
        let known = entry.file_name().to_str().is_some_and(|name| current.contains(name));
        if known {
            continue;
        }
        if read_if_exists(entry.path())?.is_some_and(|contents| is_generated(&contents)) {
            orphans.push(entry.path().to_path_buf());
        }
    }

    Ok(orphans)
}

fn compare(existing: &str, unit: &OutputUnit, path: &Path) -> UnitState {
    if existing == unit.contents {
        return UnitState::Unchanged;
    }

    let recorded = recorded_fingerprint(existing);
    if recorded.is_some() && recorded == recorded_fingerprint(&unit.contents) {
        tracing::warn!("{} was edited by hand after generation", path.display());
    }
    UnitState::Stale
}

/// Whether every checked unit is up to date.
pub fn is_fresh(statuses: &[UnitStatus]) -> bool {
    statuses.iter().all(|s| s.state == UnitState::Unchanged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{component, grouped, set_of};
    use tempfile::TempDir;

    fn options(dir: &Path) -> GenerateOptions {
        GenerateOptions {
            out_dir: dir.to_path_buf(),
            ..GenerateOptions::default()
        }
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.output.dir = Some(PathBuf::from("/work/app/src/di"));
        config.output.split_threshold = Some(2);

        let opts = GenerateOptions::from_config(&config, Path::new("/work/app"));
        assert_eq!(opts.out_dir, PathBuf::from("/work/app/src/di"));
        assert_eq!(opts.synth.output_dir, PathBuf::from("src/di"));
        assert_eq!(opts.synth.split_threshold, 2);

        let defaults = GenerateOptions::from_config(&Config::default(), Path::new("/work/app"));
        assert_eq!(defaults.out_dir, PathBuf::from("/work/app/src/generated"));
        assert_eq!(defaults.synth.output_dir, PathBuf::from("src/generated"));
    }

    #[test]
    fn test_render_reports_cycles() {
        let set = set_of(vec![component("A").depends_on("B"), component("B").depends_on("A")]);
        let err = render(&set, &GenerateOptions::default()).unwrap_err();

        assert!(matches!(err, PipelineError::Resolve(ref errors) if errors.len() == 1));
        assert_eq!(err.to_diagnostics().len(), 1);
    }

    #[test]
    fn test_write_then_check() {
        let tmp = TempDir::new().unwrap();
        let set = set_of(vec![component("A").depends_on("B"), component("B")]);
        let opts = options(tmp.path());
        let output = render(&set, &opts).unwrap();

        let before = check_output(&output, tmp.path()).unwrap();
        assert_eq!(before[0].state, UnitState::Missing);
        assert!(!is_fresh(&before));

        let written = write_output(&output, tmp.path()).unwrap();
        assert_eq!(written[0].state, UnitState::Written);
        assert_eq!(written[0].path, tmp.path().join("container.ts"));

        let again = write_output(&output, tmp.path()).unwrap();
        assert_eq!(again[0].state, UnitState::Unchanged);
        assert!(is_fresh(&check_output(&output, tmp.path()).unwrap()));
    }

    #[test]
    fn test_units_left_over_from_split_run() {
        let tmp = TempDir::new().unwrap();
        let set = grouped(vec![("core", vec![component("Clock")]), ("web", vec![component("Api")])]);

        let mut split = options(tmp.path());
        split.synth.split_threshold = 2;
        write_output(&render(&set, &split).unwrap(), tmp.path()).unwrap();
        assert!(tmp.path().join("core.ts").exists());

        // hand-written files next to the output are not orphans
        fs::write(tmp.path().join("extra.ts"), "export const x = 1;\n").unwrap();

        let single = render(&set, &options(tmp.path())).unwrap();
        write_output(&single, tmp.path()).unwrap();
        fs::write(tmp.path().join("web.ts"), split_unit(&set, &split, "web.ts")).unwrap();

        let statuses = check_output(&single, tmp.path()).unwrap();
        assert!(!is_fresh(&statuses));
        let orphaned: Vec<_> = statuses
            .iter()
            .filter(|s| s.state == UnitState::Orphaned)
            .map(|s| s.path.clone())
            .collect();
        assert_eq!(orphaned, vec![tmp.path().join("web.ts")]);

        let written = write_output(&single, tmp.path()).unwrap();
        assert!(written
            .iter()
            .any(|s| s.state == UnitState::Removed && s.path == tmp.path().join("web.ts")));
        assert!(!tmp.path().join("web.ts").exists());
        assert!(tmp.path().join("extra.ts").exists());
        assert!(is_fresh(&check_output(&single, tmp.path()).unwrap()));
    }

    fn split_unit(set: &DescriptorSet, opts: &GenerateOptions, name: &str) -> String {
        render(set, opts).unwrap().get(name).unwrap().contents.clone()
    }

    #[test]
    fn test_check_detects_stale_output() {
        let tmp = TempDir::new().unwrap();
        let opts = options(tmp.path());

        let old = render(&set_of(vec![component("A")]), &opts).unwrap();
        write_output(&old, tmp.path()).unwrap();

        let new = render(&set_of(vec![component("A"), component("B")]), &opts).unwrap();
        let statuses = check_output(&new, tmp.path()).unwrap();
        assert_eq!(statuses[0].state, UnitState::Stale);
    }
}
