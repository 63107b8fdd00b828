//! Lower phase - resolves the main file into models.

use tracing::info;

use crate::{
    error::Result,
    lower::build_package,
    pipeline::{CompilationContext, Phase},
};

pub struct LowerPhase;

impl Phase for LowerPhase {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<()> {
        let package = build_package(ctx.set, ctx.main, &mut ctx.graph, &ctx.options)?;
        info!(
            file = %package.idl_name,
            package = %package.package,
            services = package.services.len(),
            "lowered"
        );
        ctx.package = Some(package);
        Ok(())
    }
}
