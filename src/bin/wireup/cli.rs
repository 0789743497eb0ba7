//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Wireup - compile-time dependency injection container synthesis
#[derive(Parser)]
#[command(name = "wireup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve descriptors and print group and component order
    Resolve(ResolveArgs),

    /// Generate the composition root
    Generate(GenerateArgs),

    /// Fail if the generated composition root is out of date
    Check(CheckArgs),

    /// Print the dependency graph in Graphviz DOT format
    Graph(GraphArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where descriptors are read from.
#[derive(Args)]
pub struct InputArgs {
    /// Descriptor JSON file, or a directory with one file per group
    #[arg(long, env = "WIREUP_DESCRIPTORS")]
    pub descriptors: Option<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory (overrides `output.dir`)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Split into one file per group at this many groups
    #[arg(long)]
    pub split_threshold: Option<usize>,

    /// Print the generated code instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory (overrides `output.dir`)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the group graph instead of the component graph
    #[arg(long)]
    pub groups: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
