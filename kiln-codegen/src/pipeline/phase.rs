//! Pipeline phase trait.

use super::CompilationContext;
use crate::error::Result;

/// A step of the pipeline.
///
/// Built-in phases:
/// - `ValidatePhase` - checks the descriptor set and collects diagnostics
/// - `LowerPhase` - resolves the main file into models
pub trait Phase: Send + Sync {
    /// Name used in diagnostics and plugin hooks.
    fn name(&self) -> &'static str;

    /// Run this phase on the compilation context.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase fails fatally. Non-fatal issues are
    /// recorded as diagnostics instead.
    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<()>;
}
