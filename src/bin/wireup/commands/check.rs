//! `wireup check` command
//!
//! Exits non-zero when the files on disk differ from what `generate` would
//! write. Meant for CI.

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use crate::commands::{fail_with, load_project};
use wireup::ops::{check_output, is_fresh, render, GenerateOptions, UnitState};
use wireup::util::diagnostic::suggestions;
use wireup::util::{GlobalContext, Status};

pub fn execute(args: CheckArgs, ctx: &GlobalContext) -> Result<()> {
    let project = load_project(ctx, &args.input, args.out.as_deref())?;
    let options = GenerateOptions::from_config(&project.config, &ctx.project_root());

    let output = match render(&project.set, &options) {
        Ok(output) => output,
        Err(e) => return fail_with(&e.to_diagnostics(), ctx, "check the container"),
    };

    let statuses = check_output(&output, &options.out_dir)?;
    for status in &statuses {
        match status.state {
            UnitState::Stale => project.shell.status(Status::Stale, status.path.display()),
            UnitState::Missing => project
                .shell
                .status(Status::Stale, format!("{} (missing)", status.path.display())),
            UnitState::Orphaned => project
                .shell
                .status(Status::Stale, format!("{} (no longer generated)", status.path.display())),
            _ => project.shell.verbose_status(Status::Fresh, status.path.display()),
        }
    }

    if !is_fresh(&statuses) {
        bail!("generated output is out of date\n{}", suggestions::STALE_OUTPUT);
    }

    project.shell.status(Status::Fresh, format!("{} file(s) up to date", statuses.len()));
    Ok(())
}
