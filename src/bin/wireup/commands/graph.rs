//! `wireup graph` command

use anyhow::Result;

use crate::cli::GraphArgs;
use crate::commands::{fail_with, load_project};
use wireup::ops::{analyze, component_dot, group_dot};
use wireup::util::GlobalContext;

pub fn execute(args: GraphArgs, ctx: &GlobalContext) -> Result<()> {
    let project = load_project(ctx, &args.input, None)?;
    let analysis = analyze(&project.set, &project.config.resolve_options());

    // Cycles still produce a graph; it is the easiest way to see them.
    let Some(resolution) = &analysis.resolution else {
        return fail_with(&analysis.errors.to_diagnostics(), ctx, "build the graph");
    };

    let dot = if args.groups {
        group_dot(&project.set, resolution)
    } else {
        component_dot(&project.set, resolution)
    };
    println!("{}", dot);

    Ok(())
}
