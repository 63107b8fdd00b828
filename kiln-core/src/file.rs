use std::{
    io,
    path::{Path, PathBuf},
};

use serde::Serialize;

/// A rendered file waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: String,
    /// Rendered content.
    pub content: String,
    /// Never overwrite the file once it exists.
    pub no_repeat: bool,
    /// Name of the template that produced this file.
    pub template: String,
}

impl GeneratedFile {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            no_repeat: false,
            template: template.into(),
        }
    }

    /// Mark the file as write-once.
    pub fn no_repeat(mut self, no_repeat: bool) -> Self {
        self.no_repeat = no_repeat;
        self
    }

    /// Resolve the target path against a base directory.
    pub fn target(&self, base: &Path) -> PathBuf {
        base.join(&self.path)
    }

    /// How an existing file at the target is treated.
    pub fn overwrite(&self) -> Overwrite {
        if self.no_repeat {
            Overwrite::IfMissing
        } else {
            Overwrite::Always
        }
    }

    /// Write the file below `base` according to its overwrite rule.
    pub fn write(&self, base: &Path) -> io::Result<WriteResult> {
        let path = self.target(base);
        match self.overwrite() {
            Overwrite::Always => {
                write_file(&path, &self.content)?;
                Ok(WriteResult::Written)
            }
            Overwrite::IfMissing => {
                if path.exists() {
                    Ok(WriteResult::Skipped)
                } else {
                    write_file(&path, &self.content)?;
                    Ok(WriteResult::Written)
                }
            }
        }
    }
}

/// Create parent directories, then create or truncate and write `path`.
pub fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File was skipped (already exists)
    Skipped,
}

/// How to handle existing files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Always overwrite
    Always,
    /// Only create if the file doesn't exist
    IfMissing,
}
