//! Pipeline orchestrator.

use kiln_descriptor::{DescriptorSet, FileDescriptor};
use tracing::debug;

use super::{
    CompilationContext, Phase, Plugin,
    phases::{LowerPhase, ValidatePhase},
};
use crate::{error::Result, lower::LowerOptions};

/// Runs the built-in phases (validate, lower) followed by any added ones,
/// calling plugin hooks around each.
///
/// # Example
///
/// ```ignore
/// let ctx = Pipeline::new()
///     .plugin(TracingPlugin)
///     .run(&set, main, options)?;
/// let package = ctx.package.as_ref();
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Validate and lower `main`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal phase or plugin error.
    pub fn run<'a>(
        &self,
        set: &'a DescriptorSet,
        main: &'a FileDescriptor,
        options: LowerOptions,
    ) -> Result<CompilationContext<'a>> {
        let mut ctx = CompilationContext::new(set, main, options);

        let builtin_phases: Vec<Box<dyn Phase>> =
            vec![Box::new(ValidatePhase::new()), Box::new(LowerPhase)];

        for phase in builtin_phases.iter().chain(self.phases.iter()) {
            self.run_phase(phase.as_ref(), &mut ctx)?;
        }

        debug!(
            file = %main.name,
            errors = ctx.error_count(),
            warnings = ctx.warnings().count(),
            "pipeline finished"
        );
        Ok(ctx)
    }

    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext<'_>) -> Result<()> {
        let phase_name = phase.name();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
