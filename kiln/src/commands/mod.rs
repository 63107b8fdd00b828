mod args;
mod completions;
mod model;
mod new;
mod update;

use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use model::ModelCommand;
use new::NewCommand;
use update::UpdateCommand;

/// Extension trait for exiting on generation errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for kiln_codegen::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "kiln")]
#[command(version)]
#[command(about = "Scaffold and update Go service projects from protobuf schemas")]
pub(crate) struct Cli {
    /// Log generation progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::New(cmd) => cmd.run(),
            Commands::Update(cmd) => cmd.run(),
            Commands::Model(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project layout, and its package when a schema is given
    New(NewCommand),

    /// Regenerate the package of an existing project
    Update(UpdateCommand),

    /// Generate only the models of a schema
    Model(ModelCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
