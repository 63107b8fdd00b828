//! Generation pipeline.
//!
//! A [`Pipeline`] turns a descriptor set into a lowered package:
//!
//! - Explicit phase boundaries (validate → lower)
//! - Plugin hooks before and after each phase
//! - Diagnostics collected in the [`CompilationContext`]
//!
//! # Example
//!
//! ```ignore
//! use kiln_codegen::pipeline::{Pipeline, TracingPlugin};
//!
//! let ctx = Pipeline::new()
//!     .plugin(TracingPlugin)
//!     .run(&set, main, LowerOptions::default())?;
//!
//! for diag in ctx.warnings() {
//!     eprintln!("{diag}");
//! }
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use plugin::{Plugin, TracingPlugin};
pub use runner::Pipeline;
