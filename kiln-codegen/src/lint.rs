//! Syntax checks run on generated files before they are written.

use std::{
    io::Write,
    path::Path,
    process::{Command, Stdio},
};

use tracing::debug;

/// Checks generated content, returning a readable message on failure.
pub trait Linter {
    fn lint(&self, path: &str, content: &str) -> std::result::Result<(), String>;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLint;

impl Linter for NoLint {
    fn lint(&self, _path: &str, _content: &str) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Parses TOML, JSON and YAML output; Go output goes through `gofmt -e`
/// when enabled and installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxLinter {
    pub gofmt: bool,
}

impl Linter for SyntaxLinter {
    fn lint(&self, path: &str, content: &str) -> std::result::Result<(), String> {
        let extension = Path::new(path).extension().and_then(|e| e.to_str());
        match extension {
            Some("toml") => toml::from_str::<toml::Table>(content)
                .map(|_| ())
                .map_err(|e| e.message().to_string()),
            Some("json") => serde_json::from_str::<serde_json::Value>(content)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Some("yaml" | "yml") => serde_yaml::from_str::<serde_yaml::Value>(content)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Some("go") if self.gofmt => gofmt(content),
            _ => Ok(()),
        }
    }
}

fn gofmt(content: &str) -> std::result::Result<(), String> {
    let spawned = Command::new("gofmt")
        .arg("-e")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("gofmt not installed, skipping go lint");
            return Ok(());
        }
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(content.as_bytes())
            .map_err(|e| e.to_string())?;
    }
    let output = child.wait_with_output().map_err(|e| e.to_string())?;
    if output.status.success() {
        Ok(())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_formats() {
        let linter = SyntaxLinter::default();

        assert!(linter.lint("conf/app.toml", "name = \"pay\"\n").is_ok());
        assert!(linter.lint("conf/app.toml", "name = ").is_err());
        assert!(linter.lint("conf/app.json", "{\"a\": 1}").is_ok());
        assert!(linter.lint("conf/app.json", "{\"a\": }").is_err());
        assert!(linter.lint("conf/app.yaml", "a: 1\n").is_ok());
        assert!(linter.lint("conf/app.yml", "a: [1\n").is_err());
    }

    #[test]
    fn test_other_files_pass() {
        let linter = SyntaxLinter::default();

        assert!(linter.lint("build.sh", "#!/bin/bash\n{{{").is_ok());
        assert!(linter.lint("main.go", "not go at all").is_ok());
        assert!(NoLint.lint("conf/app.json", "{").is_ok());
    }
}
