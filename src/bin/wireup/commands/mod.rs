//! Command implementations

pub mod check;
pub mod completions;
pub mod generate;
pub mod graph;
pub mod resolve;

use std::path::Path;

use anyhow::{bail, Result};

use crate::cli::InputArgs;
use wireup::core::DescriptorSet;
use wireup::ops::load_descriptors;
use wireup::util::diagnostic::{emit_all, Diagnostic};
use wireup::util::{Config, GlobalContext, Shell};

/// Configuration and descriptors for one command run.
pub struct Project {
    pub config: Config,
    pub set: DescriptorSet,
    pub shell: Shell,
}

/// Load config, apply `--descriptors`, and read the descriptor set.
pub fn load_project(ctx: &GlobalContext, input: &InputArgs, out: Option<&Path>) -> Result<Project> {
    let mut config = ctx.load_config();
    if let Some(path) = &input.descriptors {
        config.input.descriptors = Some(ctx.resolve_path(path));
    }
    if let Some(dir) = out {
        config.output.dir = Some(ctx.resolve_path(dir));
    }

    let shell = Shell::from_flags(!ctx.color(), ctx.is_verbose());
    let descriptors = config.descriptors();
    shell.verbose_status(wireup::util::Status::Resolving, descriptors.display());

    let set = load_descriptors(&descriptors)?;
    Ok(Project { config, set, shell })
}

/// Print diagnostics and fail with a summary.
pub fn fail_with(diagnostics: &[Diagnostic], ctx: &GlobalContext, what: &str) -> Result<()> {
    emit_all(diagnostics, ctx.color());
    eprintln!();
    bail!(
        "could not {} due to {} previous error{}",
        what,
        diagnostics.len(),
        if diagnostics.len() == 1 { "" } else { "s" }
    )
}
