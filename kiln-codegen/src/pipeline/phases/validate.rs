//! Validate phase - checks the descriptor set before lowering.

use std::collections::HashSet;

use kiln_descriptor::{DescriptorSet, FileDescriptor};

use crate::{
    error::{Error, Result},
    pipeline::{CompilationContext, Diagnostic, Phase},
};

/// A check over the main file and its descriptor set.
pub trait Lint: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, set: &DescriptorSet, main: &FileDescriptor, diagnostics: &mut Vec<Diagnostic>);
}

/// Fails on imports missing from the set, then runs the configured lints.
pub struct ValidatePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl ValidatePhase {
    /// Validate phase with the built-in lints.
    pub fn new() -> Self {
        Self {
            lints: vec![
                Box::new(MissingPackageLint),
                Box::new(MissingGoPackageLint),
                Box::new(DuplicateImportLint),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }
}

impl Default for ValidatePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ValidatePhase {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<()> {
        let main = ctx.main;
        if let Some(missing) = main.dependency.iter().find(|d| ctx.set.get(d).is_none()) {
            ctx.add_diagnostic(
                Diagnostic::error(self.name(), format!("import '{missing}' not found"))
                    .at(&main.name),
            );
            return Err(Box::new(Error::UnknownDependency {
                file: main.name.clone(),
                dependency: missing.clone(),
            }));
        }

        for lint in &self.lints {
            lint.check(ctx.set, main, &mut ctx.diagnostics);
        }
        Ok(())
    }
}

/// Warns about files without a `package` statement.
pub struct MissingPackageLint;

impl Lint for MissingPackageLint {
    fn name(&self) -> &'static str {
        "missing-package"
    }

    fn check(&self, set: &DescriptorSet, main: &FileDescriptor, diagnostics: &mut Vec<Diagnostic>) {
        let mut seen = HashSet::new();
        let files = std::iter::once(main.name.as_str())
            .chain(main.dependency.iter().map(String::as_str))
            .filter(|name| seen.insert(*name));
        for file in files.filter_map(|name| set.get(name)) {
            if file.package.is_empty() {
                diagnostics.push(
                    Diagnostic::warning(
                        "validate",
                        "no package declared; symbols share the global namespace",
                    )
                    .at(&file.name),
                );
            }
        }
    }
}

/// Notes when the main file has no `go_package` option.
pub struct MissingGoPackageLint;

impl Lint for MissingGoPackageLint {
    fn name(&self) -> &'static str {
        "missing-go-package"
    }

    fn check(&self, _set: &DescriptorSet, main: &FileDescriptor, diagnostics: &mut Vec<Diagnostic>) {
        if main.go_package_option().is_none() {
            diagnostics.push(
                Diagnostic::info(
                    "validate",
                    format!(
                        "no go_package option, using '{}'",
                        main.package.replace('.', "/")
                    ),
                )
                .at(&main.name),
            );
        }
    }
}

/// Warns about imports listed more than once.
pub struct DuplicateImportLint;

impl Lint for DuplicateImportLint {
    fn name(&self) -> &'static str {
        "duplicate-import"
    }

    fn check(&self, _set: &DescriptorSet, main: &FileDescriptor, diagnostics: &mut Vec<Diagnostic>) {
        let mut seen = HashSet::new();
        for dependency in &main.dependency {
            if !seen.insert(dependency) {
                diagnostics.push(
                    Diagnostic::warning("validate", format!("'{dependency}' is imported twice"))
                        .at(&main.name),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::LowerOptions;

    fn run(set: &DescriptorSet) -> (Result<()>, Vec<Diagnostic>) {
        let main = set.main_file().unwrap();
        let mut ctx = CompilationContext::new(set, main, LowerOptions::default());
        let result = ValidatePhase::new().run(&mut ctx);
        (result, ctx.diagnostics)
    }

    #[test]
    fn test_missing_dependency_is_fatal() {
        let set = DescriptorSet::new(vec![
            FileDescriptor::new("pay.proto").package("pay").import("gone.proto"),
        ]);

        let (result, diagnostics) = run(&set);

        assert!(result.is_err());
        assert!(diagnostics[0].severity.is_error());
        assert_eq!(diagnostics[0].location.as_deref(), Some("pay.proto"));
    }

    #[test]
    fn test_lints_collect_warnings() {
        let set = DescriptorSet::new(vec![
            FileDescriptor::new("common.proto"),
            FileDescriptor::new("pay.proto")
                .package("pay")
                .import("common.proto")
                .import("common.proto"),
        ]);

        let (result, diagnostics) = run(&set);

        assert!(result.is_ok());
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "no package declared; symbols share the global namespace",
                "no go_package option, using 'pay'",
                "'common.proto' is imported twice",
            ]
        );
    }

    #[test]
    fn test_empty_phase_only_checks_imports() {
        let set = DescriptorSet::new(vec![FileDescriptor::new("bare.proto")]);
        let main = set.main_file().unwrap();
        let mut ctx = CompilationContext::new(&set, main, LowerOptions::default());

        ValidatePhase::empty().run(&mut ctx).unwrap();

        assert!(ctx.diagnostics.is_empty());
    }
}
