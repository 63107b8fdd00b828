//! Project skeleton generation.

use std::path::PathBuf;

use kiln_core::GeneratedFile;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::Result,
    template::{GLOBAL_KEY, LayoutConfig, LayoutData, TemplateGenerator, default_layout, load_document},
};

#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    pub output_dir: PathBuf,
    pub service_name: String,
    pub go_module: String,
    /// Model directory of the default layout; `biz/model` when empty.
    pub model_dir: String,
    /// Layout file replacing the default layout.
    pub layout: Option<PathBuf>,
    /// Data file keyed by template path, with `*` applying to every
    /// template.
    pub data: Option<PathBuf>,
}

/// Renders a layout once its templates are loaded.
pub struct LayoutGenerator {
    options: LayoutOptions,
    generator: TemplateGenerator,
}

impl LayoutGenerator {
    /// Load the layout file of `options`, or the default layout.
    pub fn new(options: LayoutOptions) -> Result<Self> {
        let config = match &options.layout {
            Some(path) => {
                debug!(path = %path.display(), "loading layout");
                LayoutConfig::from_file(path)?
            }
            None => default_layout(&options.model_dir),
        };
        let mut generator = TemplateGenerator::new(&options.output_dir);
        generator.init(&config)?;
        Ok(Self { options, generator })
    }

    fn data(&self) -> LayoutData {
        LayoutData {
            service_name: self.options.service_name.clone(),
            go_module: self.options.go_module.clone(),
            model_dir: self.options.model_dir.clone(),
        }
    }

    /// Render with the data file when there is one, the service data
    /// otherwise.
    pub fn generate(&mut self) -> Result<()> {
        match self.options.data.clone() {
            Some(path) => {
                let data: Map<String, Value> = load_document(&path)?;
                self.generate_by_config(&data)
            }
            None => self.generate_by_service(),
        }
    }

    /// Render every template with the service name, module and model dir.
    pub fn generate_by_service(&mut self) -> Result<()> {
        let data = self.data().to_map(None);
        let paths: Vec<String> = self.generator.templates().map(|t| t.path.clone()).collect();
        for path in paths {
            self.generator.generate(&data, &path, &path, true)?;
        }
        Ok(())
    }

    /// Render every template with external per-path data; its global
    /// entries override the service data.
    pub fn generate_by_config(&mut self, data: &Map<String, Value>) -> Result<()> {
        let extra = data.get(GLOBAL_KEY).and_then(Value::as_object);
        let mut data = data.clone();
        data.insert(
            GLOBAL_KEY.to_string(),
            Value::Object(self.data().to_map(extra)),
        );
        self.generator.generate_all(&data, true)
    }

    /// Remove what the layout generated.
    pub fn degenerate(&self) -> Result<()> {
        self.generator.degenerate()
    }

    pub fn files(&self) -> &[GeneratedFile] {
        self.generator.files()
    }

    pub fn take_files(&mut self) -> Vec<GeneratedFile> {
        self.generator.take_files()
    }

    pub fn dirs(&self) -> impl Iterator<Item = (&str, bool)> {
        self.generator.dirs()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn options(dir: &std::path::Path) -> LayoutOptions {
        LayoutOptions {
            output_dir: dir.to_path_buf(),
            service_name: "pay".into(),
            go_module: "example/pay".into(),
            ..LayoutOptions::default()
        }
    }

    fn content<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
        &files.iter().find(|f| f.path == path).unwrap().content
    }

    #[test]
    fn test_default_layout_by_service() {
        let temp = TempDir::new().unwrap();
        let mut layout = LayoutGenerator::new(options(temp.path())).unwrap();

        layout.generate().unwrap();

        let files = layout.files();
        assert_eq!(files.len(), 4);
        assert!(files.iter().all(|f| f.no_repeat));
        assert!(content(files, "build.sh").contains("RUN_NAME=pay"));
        assert!(content(files, "go.mod").contains("module example/pay"));
        let dirs: Vec<_> = layout.dirs().collect();
        assert_eq!(dirs, [("biz/model", false), ("script", false)]);
    }

    #[test]
    fn test_data_file_merges_into_default_layout() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data.json");
        std::fs::write(
            &data,
            r#"{"*": {"ServiceName": "billing"}, "go.mod": {"GoModule": "ignored"}}"#,
        )
        .unwrap();
        let mut layout = LayoutGenerator::new(LayoutOptions {
            data: Some(data),
            ..options(temp.path())
        })
        .unwrap();

        layout.generate().unwrap();

        let files = layout.files();
        assert!(content(files, "build.sh").contains("RUN_NAME=billing"));
        // Global entries take precedence over per-path ones.
        assert!(content(files, "go.mod").contains("module example/pay"));
    }

    #[test]
    fn test_custom_layout_replaces_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("layout.yaml");
        std::fs::write(
            &path,
            "layouts:\n  - path: cmd/\n  - path: README.md\n    body: \"# {{ ServiceName|ToCamelCase }}\"\n",
        )
        .unwrap();
        let mut layout = LayoutGenerator::new(LayoutOptions {
            layout: Some(path),
            ..options(temp.path())
        })
        .unwrap();

        layout.generate().unwrap();

        let files = layout.take_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "# Pay");
        assert!(layout.files().is_empty());
    }

    #[test]
    fn test_degenerate_after_write() {
        let temp = TempDir::new().unwrap();
        let mut layout = LayoutGenerator::new(options(temp.path())).unwrap();
        layout.generate().unwrap();
        for file in layout.files() {
            file.write(temp.path()).unwrap();
        }
        std::fs::create_dir_all(temp.path().join("biz/model")).unwrap();

        layout.degenerate().unwrap();

        assert!(!temp.path().join("go.mod").exists());
        assert!(!temp.path().join("script").exists());
        assert!(!temp.path().join("biz/model").exists());
    }
}
