use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// A set of templates, as read from a layout or package template file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub layouts: Vec<Template>,
}

/// One output file (or directory, for paths ending in `/`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Built into kiln rather than read from a user file.
    #[serde(skip)]
    pub default: bool,
    /// Output path relative to the output directory; may contain template
    /// expressions for package templates.
    pub path: String,
    pub delims: Delimiters,
    pub body: String,
    /// Skip this template, used to turn off a built-in one.
    pub disable: bool,
    /// Render once per method of every service.
    pub loop_method: bool,
    /// Render once per service.
    pub loop_service: bool,
    pub update_behavior: UpdateBehavior,
}

impl Template {
    pub fn new(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Paths ending in a separator only create a directory.
    pub fn is_dir(&self) -> bool {
        self.path.ends_with('/') || self.path.ends_with('\\')
    }
}

/// Start and end markers of template expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters(pub String, pub String);

impl Default for Delimiters {
    fn default() -> Self {
        Self("{{".into(), "}}".into())
    }
}

impl Delimiters {
    /// Empty markers fall back to `{{` and `}}`.
    pub fn resolved(&self) -> (&str, &str) {
        let start = if self.0.is_empty() { "{{" } else { &self.0 };
        let end = if self.1.is_empty() { "}}" } else { &self.1 };
        (start, end)
    }

    pub fn is_default(&self) -> bool {
        self.resolved() == ("{{", "}}")
    }
}

/// How `kiln update` treats a file that already exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateBehavior {
    #[serde(rename = "type")]
    pub mode: UpdateMode,
    /// Entity each appended block is rendered for.
    pub append_key: Option<AppendKey>,
    /// Rendered per entity; when already present the entity is skipped.
    pub insert_key: String,
    #[serde(rename = "append_content_tpl")]
    pub append_tpl: String,
    pub import_tpl: Vec<String>,
    /// Marker after whose last occurrence blocks are inserted; end of file
    /// when empty or missing.
    pub append_location: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Leave existing files alone.
    #[default]
    Skip,
    /// Regenerate and overwrite.
    Cover,
    /// Insert missing blocks into the existing file.
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppendKey {
    Service,
    Method,
}

/// Serialization format of a configuration or data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::config(
                path,
                "unsupported extension, expected .toml, .yaml, .yml or .json",
            )),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> std::result::Result<T, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.message().to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Read and deserialize a TOML, YAML or JSON file.
pub fn load_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    format
        .parse(&content)
        .map_err(|message| Error::config(path, message))
}

impl LayoutConfig {
    /// Load a template file; it must define at least one template.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = load_document(path)?;
        if config.layouts.is_empty() {
            return Err(Error::config(path, "no templates defined under 'layouts'"));
        }
        Ok(config)
    }
}
