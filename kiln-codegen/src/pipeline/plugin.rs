//! Hooks around pipeline phases.

use tracing::debug;

use super::CompilationContext;
use crate::error::Result;

/// Receives callbacks before and after each phase.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called before a phase runs. Return an error to abort the pipeline.
    #[allow(unused_variables)]
    fn on_before_phase(&self, phase: &str, ctx: &mut CompilationContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called after a phase completes. Return an error to abort the pipeline.
    #[allow(unused_variables)]
    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Logs phase boundaries at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPlugin;

impl Plugin for TracingPlugin {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn on_before_phase(&self, phase: &str, ctx: &mut CompilationContext<'_>) -> Result<()> {
        debug!(phase, file = %ctx.main.name, "phase started");
        Ok(())
    }

    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext<'_>) -> Result<()> {
        debug!(
            phase,
            diagnostics = ctx.diagnostics.len(),
            models = ctx.graph.len(),
            "phase finished"
        );
        Ok(())
    }
}
