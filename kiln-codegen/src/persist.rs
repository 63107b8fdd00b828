//! Writing rendered files to disk.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use kiln_core::{GeneratedFile, WriteResult};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    lint::{Linter, SyntaxLinter},
    pipeline::Diagnostic,
};

const PHASE: &str = "persist";

/// What happened to one generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileStatus {
    Written,
    /// Listed only, nothing written.
    Listed,
    /// Write-once file that already exists.
    Skipped,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedFile {
    pub path: String,
    pub status: FileStatus,
}

/// Writes (or lists) generated files below an output directory.
pub struct Persister {
    output_dir: PathBuf,
    excludes: HashSet<String>,
    linter: Box<dyn Linter>,
    list_only: bool,
}

impl Persister {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            excludes: HashSet::new(),
            linter: Box::new(SyntaxLinter { gofmt: true }),
            list_only: false,
        }
    }

    /// Paths, relative to the output directory, that are never written.
    pub fn excludes(mut self, excludes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excludes
            .extend(excludes.into_iter().map(|e| normalize(&e.into()).to_string()));
        self
    }

    pub fn linter(mut self, linter: impl Linter + 'static) -> Self {
        self.linter = Box::new(linter);
        self
    }

    /// Only report what would be written.
    pub fn list_only(mut self, list_only: bool) -> Self {
        self.list_only = list_only;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the directories that did not exist before generation.
    pub fn create_dirs<'d>(&self, dirs: impl IntoIterator<Item = (&'d str, bool)>) -> Result<()> {
        if self.list_only {
            return Ok(());
        }
        for (dir, existed) in dirs {
            if existed || self.excludes.contains(normalize(dir)) {
                continue;
            }
            let target = self.output_dir.join(dir);
            std::fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
            debug!(dir = %target.display(), "created directory");
        }
        Ok(())
    }

    /// Lint and write `files` in order; the first failure aborts the batch.
    ///
    /// Write-once files that exist are dropped with a warning diagnostic.
    /// Lint failures are fatal when writing and warnings when listing.
    pub fn persist(
        &self,
        files: &[GeneratedFile],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<PersistedFile>> {
        let mut persisted = Vec::with_capacity(files.len());
        for file in files {
            let path = normalize(&file.path).to_string();
            let status = self.persist_one(file, &path, diagnostics)?;
            persisted.push(PersistedFile { path, status });
        }
        Ok(persisted)
    }

    fn persist_one(
        &self,
        file: &GeneratedFile,
        path: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<FileStatus> {
        if self.excludes.contains(path) {
            debug!(path, "excluded");
            return Ok(FileStatus::Excluded);
        }

        let target = file.target(&self.output_dir);
        if file.no_repeat && target.exists() {
            warn!(path, "file exists and is write-once, not regenerated");
            diagnostics.push(
                Diagnostic::warning(PHASE, "file exists and is write-once, not regenerated")
                    .at(path),
            );
            return Ok(FileStatus::Skipped);
        }

        if let Err(message) = self.linter.lint(path, &file.content) {
            if !self.list_only {
                return Err(Box::new(Error::Lint {
                    path: path.to_string(),
                    message,
                }));
            }
            warn!(path, %message, "lint failed");
            diagnostics.push(Diagnostic::warning(PHASE, format!("lint failed: {message}")).at(path));
        }

        if self.list_only {
            return Ok(FileStatus::Listed);
        }

        match file.write(&self.output_dir).map_err(|e| Error::io(&target, e))? {
            WriteResult::Written => {
                info!(path, "wrote");
                Ok(FileStatus::Written)
            }
            WriteResult::Skipped => Ok(FileStatus::Skipped),
        }
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches("./")
}
