//! Code emission.
//!
//! Renders an [`InstantiationPlan`] as TypeScript: one composition function
//! per group, instantiated in group order and collected into a single
//! `container` object. Large runs are split into one unit per group plus an
//! aggregator unit.

use std::path::{Component, Path};

use serde::Serialize;

use crate::core::{ComponentId, DescriptorSet};
use crate::synth::errors::SynthError;
use crate::synth::naming::{property_name, quote, NameTable};
use crate::synth::plan::{DeclarationKind, GroupPlan, InstantiationPlan};
use crate::synth::SynthOptions;

/// First line of every emitted unit.
pub const BANNER: &str = "// This file is generated by wireup. Do not edit.";

/// Prefix of the fingerprint line that follows the banner.
pub const FINGERPRINT_PREFIX: &str = "// wireup-fingerprint: ";

const INDENT: &str = "  ";

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputUnit {
    pub file_name: String,
    pub contents: String,
}

/// Rendered output of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Single(OutputUnit),
    /// Group units in group order, then the aggregator unit.
    Split(Vec<OutputUnit>),
}

impl Output {
    pub fn units(&self) -> &[OutputUnit] {
        match self {
            Output::Single(unit) => std::slice::from_ref(unit),
            Output::Split(units) => units,
        }
    }

    pub fn get(&self, file_name: &str) -> Option<&OutputUnit> {
        self.units().iter().find(|u| u.file_name == file_name)
    }

    pub fn is_split(&self) -> bool {
        matches!(self, Output::Split(_))
    }
}

/// Read the fingerprint recorded in a previously emitted unit.
pub fn recorded_fingerprint(contents: &str) -> Option<&str> {
    contents
        .lines()
        .take(2)
        .find_map(|line| line.strip_prefix(FINGERPRINT_PREFIX))
        .map(str::trim)
}

/// Whether `contents` were written by wireup.
pub fn is_generated(contents: &str) -> bool {
    contents.lines().next() == Some(BANNER)
}

/// Import path of a component's source file as seen from the output
/// directory: extension dropped, forward slashes, always relative-looking.
pub fn import_path(source: &Path, output_dir: &Path) -> String {
    let stripped = source.with_extension("");
    let relative = pathdiff::diff_paths(&stripped, output_dir).unwrap_or(stripped);

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::ParentDir => Some("..".to_string()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect();
    let joined = parts.join("/");

    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Renders a plan. Assumes a cycle-free, complete plan.
pub struct Emitter<'a> {
    set: &'a DescriptorSet,
    names: &'a NameTable,
    plan: &'a InstantiationPlan,
    options: &'a SynthOptions,
    fingerprint: &'a str,
}

impl<'a> Emitter<'a> {
    pub fn new(
        set: &'a DescriptorSet,
        names: &'a NameTable,
        plan: &'a InstantiationPlan,
        options: &'a SynthOptions,
        fingerprint: &'a str,
    ) -> Self {
        Emitter {
            set,
            names,
            plan,
            options,
            fingerprint,
        }
    }

    pub fn emit(&self) -> Result<Output, SynthError> {
        self.check_plan()?;

        let output = if self.plan.groups.len() >= self.options.split_threshold {
            self.emit_split()
        } else {
            Output::Single(self.emit_single())
        };
        tracing::debug!("emitted {} unit(s)", output.units().len());
        Ok(output)
    }

    fn check_plan(&self) -> Result<(), SynthError> {
        let planned = self.plan.component_count();
        if planned != self.set.len() {
            return Err(SynthError::InternalInvariant(format!(
                "plan covers {} of {} components",
                planned,
                self.set.len()
            )));
        }
        if self.plan.groups.len() != self.set.group_count() {
            return Err(SynthError::InternalInvariant(format!(
                "plan covers {} of {} groups",
                self.plan.groups.len(),
                self.set.group_count()
            )));
        }

        let mut seen = vec![false; self.plan.groups.len()];
        for gp in &self.plan.groups {
            for dep in &gp.dependencies {
                if !seen[dep.index()] {
                    return Err(SynthError::InternalInvariant(format!(
                        "group `{}` is emitted before its dependency `{}`",
                        gp.name,
                        self.set.group_name(*dep)
                    )));
                }
            }
            seen[gp.group.index()] = true;
        }
        Ok(())
    }

    fn header(&self) -> String {
        format!("{}\n{}{}\n", BANNER, FINGERPRINT_PREFIX, self.fingerprint)
    }

    fn emit_single(&self) -> OutputUnit {
        let mut out = self.header();

        let imports = self.component_imports(self.plan.groups.iter().flat_map(|g| &g.components).map(|c| c.id));
        if !imports.is_empty() {
            out.push('\n');
            out.push_str(&imports);
        }

        for gp in &self.plan.groups {
            out.push('\n');
            out.push_str(&self.group_function(gp));
        }

        out.push('\n');
        out.push_str(&self.aggregator_body());

        OutputUnit {
            file_name: self.options.file_name.clone(),
            contents: out,
        }
    }

    fn emit_split(&self) -> Output {
        let mut units = Vec::with_capacity(self.plan.groups.len() + 1);

        for gp in &self.plan.groups {
            let mut out = self.header();
            let mut imports = String::new();

            for dep in &gp.dependencies {
                let dep_names = self.names.group(*dep);
                imports.push_str(&format!(
                    "import type {{ {} }} from \"./{}\";\n",
                    dep_names.type_name(),
                    dep_names.file_stem
                ));
            }
            imports.push_str(&self.component_imports(gp.components.iter().map(|c| c.id)));

            if !imports.is_empty() {
                out.push('\n');
                out.push_str(&imports);
            }
            out.push('\n');
            out.push_str(&self.group_function(gp));

            units.push(OutputUnit {
                file_name: format!("{}.ts", self.names.group(gp.group).file_stem),
                contents: out,
            });
        }

        let mut out = self.header();
        out.push('\n');
        for gp in &self.plan.groups {
            let names = self.names.group(gp.group);
            out.push_str(&format!(
                "import {{ {} }} from \"./{}\";\n",
                names.function(),
                names.file_stem
            ));
        }
        out.push('\n');
        out.push_str(&self.aggregator_body());

        units.push(OutputUnit {
            file_name: self.options.file_name.clone(),
            contents: out,
        });

        Output::Split(units)
    }

    /// Import statements for component classes, one per source module, in
    /// first-use order.
    fn component_imports(&self, ids: impl Iterator<Item = ComponentId>) -> String {
        let mut modules: Vec<(String, Vec<String>)> = Vec::new();

        for id in ids {
            let desc = self.set.get(id);
            if desc.source_locator.as_os_str().is_empty() {
                tracing::debug!("`{}` has no source locator; not importing it", desc.name);
                continue;
            }

            let path = import_path(&desc.source_locator, &self.options.output_dir);
            let alias = &self.names.component(id).class_alias;
            let binding = if *alias == desc.name {
                alias.clone()
            } else {
                format!("{} as {}", desc.name, alias)
            };

            match modules.iter_mut().find(|(p, _)| *p == path) {
                Some((_, bindings)) => {
                    if !bindings.contains(&binding) {
                        bindings.push(binding);
                    }
                }
                None => modules.push((path, vec![binding])),
            }
        }

        modules
            .into_iter()
            .map(|(path, bindings)| format!("import {{ {} }} from {};\n", bindings.join(", "), quote(&path)))
            .collect()
    }

    fn group_function(&self, gp: &GroupPlan) -> String {
        let names = self.names.group(gp.group);
        let params: Vec<String> = gp
            .dependencies
            .iter()
            .map(|dep| {
                let dep_names = self.names.group(*dep);
                format!("{}: {}", dep_names.instance(), dep_names.type_name())
            })
            .collect();

        let mut out = format!("export function {}({}) {{\n", names.function(), params.join(", "));

        for cp in &gp.components {
            let component = self.names.component(cp.id);
            let class = &component.class_alias;
            let construct = format!("new {}({})", class, cp.argument_expressions.join(", "));

            match cp.declaration_kind {
                DeclarationKind::EagerMemoized => {
                    let slot = &component.ident;
                    out.push_str(&format!("{INDENT}let {}: {} | undefined;\n", slot, class));
                    out.push_str(&format!("{INDENT}function {}(): {} {{\n", component.accessor(), class));
                    out.push_str(&format!("{INDENT}{INDENT}if ({} === undefined) {{\n", slot));
                    out.push_str(&format!("{INDENT}{INDENT}{INDENT}{} = {};\n", slot, construct));
                    out.push_str(&format!("{INDENT}{INDENT}}}\n"));
                    out.push_str(&format!("{INDENT}{INDENT}return {};\n", slot));
                    out.push_str(&format!("{INDENT}}}\n\n"));
                }
                DeclarationKind::LazyFactory => {
                    out.push_str(&format!("{INDENT}function {}(): {} {{\n", component.factory(), class));
                    out.push_str(&format!("{INDENT}{INDENT}return {};\n", construct));
                    out.push_str(&format!("{INDENT}}}\n\n"));
                }
            }
        }

        out.push_str(&format!("{INDENT}return {{\n"));
        for cp in &gp.components {
            let component = self.names.component(cp.id);
            let call = match cp.declaration_kind {
                DeclarationKind::EagerMemoized => component.accessor(),
                DeclarationKind::LazyFactory => component.factory(),
            };
            out.push_str(&format!(
                "{INDENT}{INDENT}get {}(): {} {{\n",
                property_name(&component.export_key),
                component.class_alias
            ));
            out.push_str(&format!("{INDENT}{INDENT}{INDENT}return {}();\n", call));
            out.push_str(&format!("{INDENT}{INDENT}}},\n"));
        }
        out.push_str(&format!("{INDENT}}};\n"));
        out.push_str("}\n\n");

        out.push_str(&format!(
            "export type {} = ReturnType<typeof {}>;\n",
            names.type_name(),
            names.function()
        ));
        out
    }

    /// Group instantiation in group order and the aggregator object.
    fn aggregator_body(&self) -> String {
        let mut out = String::new();

        for gp in &self.plan.groups {
            let names = self.names.group(gp.group);
            let args: Vec<String> = gp
                .dependencies
                .iter()
                .map(|dep| self.names.group(*dep).instance())
                .collect();
            out.push_str(&format!(
                "export const {} = {}({});\n",
                names.instance(),
                names.function(),
                args.join(", ")
            ));
        }

        out.push_str("\nexport const container = {\n");
        for gp in &self.plan.groups {
            out.push_str(&format!(
                "{INDENT}{}: {},\n",
                property_name(&gp.name),
                self.names.group(gp.group).instance()
            ));
        }
        out.push_str("};\n\nexport type Container = typeof container;\n");
        out
    }
}
