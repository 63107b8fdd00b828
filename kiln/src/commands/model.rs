use clap::Args;
use eyre::Result;

use super::{
    UnwrapOrExit,
    args::{IdlArgs, ProjectArgs},
};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ModelCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub idl: IdlArgs,
}

impl ModelCommand {
    pub fn run(&self) -> Result<()> {
        let request = self.idl.request(&self.project, None)?;

        let report = ops::generate_package(&self.project.settings(), request).unwrap_or_exit();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
