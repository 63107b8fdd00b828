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
pub struct NewCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub idl: IdlArgs,

    /// Layout file replacing the default project layout
    #[arg(long)]
    pub customize_layout: Option<PathBuf>,

    /// Data file for the layout templates (TOML, YAML or JSON)
    #[arg(long)]
    pub customize_layout_data: Option<PathBuf>,

    /// Package templates rendered next to the models
    #[arg(long)]
    pub customize_package: Option<PathBuf>,
}

impl NewCommand {
    pub fn run(&self) -> Result<()> {
        let layout = self.project.layout_options(
            self.customize_layout.clone(),
            self.customize_layout_data.clone(),
        );
        let package = if self.idl.is_given() {
            let templates = package_templates(self.customize_package.as_ref());
            Some(self.idl.request(&self.project, templates)?)
        } else {
            None
        };

        let report = ops::new_project(&self.project.settings(), layout, package).unwrap_or_exit();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
