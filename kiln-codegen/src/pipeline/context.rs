//! State carried through the pipeline phases.

use kiln_descriptor::{DescriptorSet, FileDescriptor};

use super::diagnostic::{Diagnostic, Severity};
use crate::{
    lower::{LowerOptions, PackageDescription},
    model::ModelGraph,
};

#[derive(Debug)]
pub struct CompilationContext<'a> {
    pub set: &'a DescriptorSet,
    /// File being generated.
    pub main: &'a FileDescriptor,
    pub options: LowerOptions,
    /// Models of every lowered file (populated by `LowerPhase`).
    pub graph: ModelGraph,
    /// The lowered main file (populated by `LowerPhase`).
    pub package: Option<PackageDescription>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> CompilationContext<'a> {
    pub fn new(set: &'a DescriptorSet, main: &'a FileDescriptor, options: LowerOptions) -> Self {
        Self {
            set,
            main,
            options,
            graph: ModelGraph::new(),
            package: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }
}
