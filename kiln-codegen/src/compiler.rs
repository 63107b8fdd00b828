//! Running the external schema compiler.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use kiln_descriptor::DescriptorSet;
use tracing::debug;

use crate::error::{Error, Result};

/// A blocking call to a tool that prints a protobuf-JSON descriptor set on
/// stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCompiler {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory of the tool; inherited when unset.
    pub current_dir: Option<PathBuf>,
}

impl ExternalCompiler {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            current_dir: None,
        }
    }

    /// `buf build <root> --path <idl> --as-file-descriptor-set -o -#format=json`.
    pub fn buf(root: &Path, idl: &Path) -> Self {
        Self::new(
            "buf",
            [
                "build".to_string(),
                root.display().to_string(),
                "--path".to_string(),
                idl.display().to_string(),
                "--as-file-descriptor-set".to_string(),
                "-o".to_string(),
                "-#format=json".to_string(),
            ],
        )
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// The command as a shell would show it.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the tool and return its stdout.
    ///
    /// A non-zero exit becomes [`Error::ExternalTool`] carrying stderr and
    /// stdout together. There is no timeout.
    pub fn run(&self) -> Result<String> {
        debug!(command = %self.command_line(), "running schema compiler");
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| {
            Box::new(Error::ToolSpawn {
                tool: self.program.clone(),
                source,
            })
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Box::new(Error::ExternalTool {
            tool: self.command_line(),
            status: output.status.to_string(),
            output: format!("{}{}", stderr, stdout).trim_end().to_string(),
        }))
    }

    /// Run the tool and parse what it printed.
    pub fn compile(&self) -> Result<DescriptorSet> {
        let json = self.run()?;
        DescriptorSet::from_json(&json).map_err(|source| Box::new(Error::Descriptor { source }))
    }
}

/// Read a protobuf-JSON descriptor set from a file.
pub fn read_descriptor_set(path: impl AsRef<Path>) -> Result<DescriptorSet> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    DescriptorSet::from_json(&json).map_err(|source| Box::new(Error::Descriptor { source }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buf_command_line() {
        let compiler = ExternalCompiler::buf(Path::new("idl"), Path::new("idl/pay/api.proto"));
        assert_eq!(
            compiler.command_line(),
            "buf build idl --path idl/pay/api.proto --as-file-descriptor-set -o -#format=json"
        );
    }

    #[test]
    fn test_missing_tool() {
        let compiler = ExternalCompiler::new("kiln-no-such-compiler", ["--version"]);
        let err = compiler.run().unwrap_err();
        assert!(matches!(*err, Error::ToolSpawn { ref tool, .. } if tool == "kiln-no-such-compiler"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_carries_combined_output() {
        let compiler = ExternalCompiler::new("sh", ["-c", "echo partial; echo 'api.proto:3: syntax error' >&2; exit 3"]);

        let err = compiler.run().unwrap_err();

        let Error::ExternalTool { output, .. } = *err else {
            panic!("expected ExternalTool, got {err:?}");
        };
        assert!(output.contains("syntax error"));
        assert!(output.contains("partial"));
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_parses_stdout() {
        let compiler = ExternalCompiler::new(
            "sh",
            ["-c", r#"echo '{"file":[{"name":"pay/api.proto","package":"pay"}]}'"#],
        );

        let set = compiler.compile().unwrap();

        assert_eq!(set.main_file().unwrap().package, "pay");
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_rejects_garbage() {
        let compiler = ExternalCompiler::new("sh", ["-c", "echo not json"]);
        let err = compiler.compile().unwrap_err();
        assert!(matches!(*err, Error::Descriptor { .. }));
    }

    #[test]
    fn test_read_descriptor_set() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("set.json");
        std::fs::write(&path, r#"{"file":[{"name":"a.proto"}],"fileToGenerate":["a.proto"]}"#).unwrap();

        let set = read_descriptor_set(&path).unwrap();

        assert_eq!(set.main_file().unwrap().name, "a.proto");
    }
}
