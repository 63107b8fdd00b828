use clap::{Args, CommandFactory};
use eyre::Result;

use super::Cli;

/// Prints a completion script for `kiln` on stdout.
#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    shell: clap_complete::Shell,
}

impl CompletionsCommand {
    pub fn run(&self) -> Result<()> {
        let mut cmd = Cli::command();
        let bin = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, bin, &mut std::io::stdout().lock());
        Ok(())
    }
}
