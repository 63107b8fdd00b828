use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::{
    UnwrapOrExit,
    args::{IdlArgs, ProjectArgs, package_templates},
};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct UpdateCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub idl: IdlArgs,

    /// Package templates rendered next to the models
    #[arg(long)]
    pub customize_package: Option<PathBuf>,
}

impl UpdateCommand {
    pub fn run(&self) -> Result<()> {
        let templates = package_templates(self.customize_package.as_ref());
        let request = self.idl.request(&self.project, templates)?;

        let report = ops::generate_package(&self.project.settings(), request).unwrap_or_exit();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
