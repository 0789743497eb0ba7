//! Loading descriptor sets from disk.

use std::path::Path;

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::core::{ComponentDescriptor, DescriptorInput, DescriptorSet, TypeShape};
use crate::util::diagnostic::suggestions;
use crate::util::fs::read_to_string;

/// Load descriptors from a JSON file, or from a directory holding one
/// `*.json` file per group.
pub fn load_descriptors(path: &Path) -> Result<DescriptorSet> {
    if path.is_dir() {
        load_dir(path)
    } else if path.is_file() {
        load_file(path)
    } else {
        bail!(
            "descriptor input not found: {}\n{}",
            path.display(),
            suggestions::NO_DESCRIPTORS
        )
    }
}

/// Parse descriptors from JSON text.
pub fn parse_descriptors(json: &str) -> Result<DescriptorSet> {
    let input: DescriptorInput =
        serde_json::from_str(json).context("descriptor JSON does not match any accepted shape")?;
    Ok(input.into_set()?)
}

fn load_file(path: &Path) -> Result<DescriptorSet> {
    let contents = read_to_string(path)?;
    let set = parse_descriptors(&contents)
        .with_context(|| format!("failed to load descriptors from {}", path.display()))?;

    tracing::debug!(
        "loaded {} components in {} groups from {}",
        set.len(),
        set.group_count(),
        path.display()
    );
    Ok(set)
}

fn load_dir(dir: &Path) -> Result<DescriptorSet> {
    let mut groups: Vec<(String, Vec<ComponentDescriptor>)> = Vec::new();
    let mut types: Vec<TypeShape> = Vec::new();

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"));

    for entry in entries {
        let path = entry.path();
        let group = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let contents = read_to_string(path)?;
        let input: DescriptorInput = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse descriptors in {}", path.display()))?;

        let (components, shapes) = match input {
            DescriptorInput::Flat { components, types } => (components, types),
            DescriptorInput::List(components) => (components, Vec::new()),
            DescriptorInput::Grouped { .. } => bail!(
                "{} uses the grouped form; files inside a descriptor directory each hold one group",
                path.display()
            ),
        };

        tracing::debug!("group `{}`: {} components from {}", group, components.len(), path.display());
        groups.push((group, components));
        types.extend(shapes);
    }

    if groups.is_empty() {
        bail!(
            "no *.json descriptor files in {}\n{}",
            dir.display(),
            suggestions::NO_DESCRIPTORS
        );
    }

    Ok(DescriptorSet::from_groups(groups)?.with_shapes(types))
}
