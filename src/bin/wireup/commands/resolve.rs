//! `wireup resolve` command

use anyhow::{Context, Result};

use crate::cli::ResolveArgs;
use crate::commands::{fail_with, load_project};
use wireup::ops::{analyze, format_report};
use wireup::util::GlobalContext;

pub fn execute(args: ResolveArgs, ctx: &GlobalContext) -> Result<()> {
    let project = load_project(ctx, &args.input, None)?;
    let analysis = analyze(&project.set, &project.config.resolve_options());

    if let Some(resolution) = &analysis.resolution {
        let report = resolution.report(&project.set);
        if args.json {
            let json = serde_json::to_string_pretty(&report).context("failed to serialize resolution")?;
            println!("{}", json);
        } else {
            print!("{}", format_report(&report));
        }
    }

    if analysis.errors.is_empty() {
        return Ok(());
    }
    fail_with(&analysis.errors.to_diagnostics(), ctx, "resolve components")
}
