//! `wireup generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use crate::commands::{fail_with, load_project};
use wireup::ops::{render, write_output, GenerateOptions, UnitState};
use wireup::util::{GlobalContext, Status};

pub fn execute(args: GenerateArgs, ctx: &GlobalContext) -> Result<()> {
    let mut project = load_project(ctx, &args.input, args.out.as_deref())?;
    if let Some(threshold) = args.split_threshold {
        project.config.output.split_threshold = Some(threshold);
    }

    let options = GenerateOptions::from_config(&project.config, &ctx.project_root());

    let output = match render(&project.set, &options) {
        Ok(output) => output,
        Err(e) => return fail_with(&e.to_diagnostics(), ctx, "generate the container"),
    };

    if args.dry_run {
        let units = output.units();
        for unit in units {
            if units.len() > 1 {
                println!("// ----- {} -----", unit.file_name);
            }
            print!("{}", unit.contents);
        }
        return Ok(());
    }

    let statuses = write_output(&output, &options.out_dir)?;
    let mut changed = 0;
    for status in &statuses {
        match status.state {
            UnitState::Written => {
                changed += 1;
                project.shell.status(Status::Generated, status.path.display());
            }
            UnitState::Removed => {
                changed += 1;
                project.shell.status(Status::Removed, status.path.display());
            }
            _ => project.shell.verbose_status(Status::Unchanged, status.path.display()),
        }
    }

    if changed == 0 {
        project
            .shell
            .status(Status::Fresh, format!("{} file(s) already up to date", statuses.len()));
    }

    Ok(())
}
