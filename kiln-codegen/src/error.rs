use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Result type for kiln-codegen operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("identifier '{name}' could not be resolved")]
    #[diagnostic(
        code(kiln::unresolved_identifier),
        help("make sure the file declaring '{name}' is imported by the main file")
    )]
    UnresolvedIdentifier { name: String },

    #[error("'{file}' imports '{dependency}', which is missing from the descriptor set")]
    #[diagnostic(
        code(kiln::unknown_dependency),
        help("pass the import directory to the schema compiler so every dependency is included")
    )]
    UnknownDependency { file: String, dependency: String },

    #[error("the descriptor set contains no files")]
    #[diagnostic(code(kiln::empty_descriptor_set))]
    EmptyDescriptorSet,

    #[error("'{name}' is not part of the descriptor set")]
    #[diagnostic(code(kiln::unknown_file))]
    UnknownFile { name: String },

    #[error("failed to parse template '{name}'")]
    #[diagnostic(code(kiln::template_parse))]
    TemplateParse {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to render template '{name}'")]
    #[diagnostic(code(kiln::template_exec))]
    TemplateExec {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("template '{name}' is not loaded")]
    #[diagnostic(code(kiln::template_not_found))]
    TemplateNotFound { name: String },

    #[error("absolute template path '{path}' is not allowed")]
    #[diagnostic(
        code(kiln::absolute_template_path),
        help("layout paths are relative to the output directory")
    )]
    AbsoluteTemplatePath { path: String },

    #[error("lint of '{path}' failed: {message}")]
    #[diagnostic(code(kiln::lint))]
    Lint { path: String, message: String },

    #[error("'{tool}' exited with {status}, output:\n{output}")]
    #[diagnostic(code(kiln::external_tool))]
    ExternalTool {
        tool: String,
        status: String,
        output: String,
    },

    #[error("failed to run '{tool}'")]
    #[diagnostic(
        code(kiln::tool_spawn),
        help("make sure '{tool}' is installed and on PATH")
    )]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to access '{path}'")]
    #[diagnostic(code(kiln::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration '{path}': {message}")]
    #[diagnostic(code(kiln::config))]
    Config { path: PathBuf, message: String },

    #[error("failed to parse descriptor set")]
    #[diagnostic(
        code(kiln::descriptor),
        help("descriptor sets must be protobuf JSON, e.g. `buf build -o -#format=json`")
    )]
    Descriptor {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to generate model '{path}'")]
    #[diagnostic(code(kiln::model_emit))]
    ModelEmit {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to update '{path}': {message}")]
    #[diagnostic(code(kiln::update))]
    Update { path: String, message: String },
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    pub fn config(path: impl AsRef<Path>, message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Config {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        })
    }

    pub fn unresolved(name: impl Into<String>) -> Box<Self> {
        Box::new(Error::UnresolvedIdentifier { name: name.into() })
    }

    pub fn template_parse(name: impl Into<String>, source: minijinja::Error) -> Box<Self> {
        Box::new(Error::TemplateParse {
            name: name.into(),
            source,
        })
    }

    pub fn template_exec(name: impl Into<String>, source: minijinja::Error) -> Box<Self> {
        Box::new(Error::TemplateExec {
            name: name.into(),
            source,
        })
    }
}
