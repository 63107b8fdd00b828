use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use kiln_core::GeneratedFile;
use minijinja::{AutoEscape, Environment, syntax::SyntaxConfig};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{LayoutConfig, Template, funcs};
use crate::error::{Error, Result};

/// Data key whose entries are merged into every template's data.
pub const GLOBAL_KEY: &str = "*";
/// Version key added to every template's data by [`TemplateGenerator::generate_all`].
pub const VERSION_KEY: &str = "kilnVersion";

struct LoadedTemplate {
    config: Template,
    env: Environment<'static>,
}

/// Parsed templates plus the files rendered from them so far.
pub struct TemplateGenerator {
    output_dir: PathBuf,
    templates: IndexMap<String, LoadedTemplate>,
    /// Directories the templates write into, and whether each existed
    /// before generation.
    dirs: IndexMap<String, bool>,
    files: Vec<GeneratedFile>,
}

impl TemplateGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            templates: IndexMap::new(),
            dirs: IndexMap::new(),
            files: Vec::new(),
        }
    }

    /// Parse every enabled template of `config`.
    pub fn init(&mut self, config: &LayoutConfig) -> Result<()> {
        for tpl in &config.layouts {
            if tpl.disable {
                debug!(path = %tpl.path, "template disabled");
                continue;
            }
            if Path::new(&tpl.path).is_absolute() {
                return Err(Box::new(Error::AbsoluteTemplatePath {
                    path: tpl.path.clone(),
                }));
            }

            if tpl.is_dir() {
                self.track_dir(tpl.path.trim_end_matches(['/', '\\']));
                continue;
            }
            // Templated parents are only known once rendered.
            let (start, _) = tpl.delims.resolved();
            if let Some(parent) = Path::new(&tpl.path).parent()
                && !parent.to_string_lossy().contains(start)
            {
                self.track_dir(&parent.to_string_lossy());
            }

            let env = build_env(tpl)?;
            self.templates.insert(
                tpl.path.clone(),
                LoadedTemplate {
                    config: tpl.clone(),
                    env,
                },
            );
        }
        Ok(())
    }

    fn track_dir(&mut self, dir: &str) {
        if dir.is_empty() || dir == "." || self.dirs.contains_key(dir) {
            return;
        }
        let existed = self.output_dir.join(dir).exists();
        self.dirs.insert(dir.to_string(), existed);
    }

    /// Render template `name` with `data` into a file at `path`.
    pub fn generate(
        &mut self,
        data: &impl Serialize,
        name: &str,
        path: &str,
        no_repeat: bool,
    ) -> Result<()> {
        let content = self.render(name, data)?;
        self.files
            .push(GeneratedFile::new(path, content, name).no_repeat(no_repeat));
        Ok(())
    }

    /// Render every template at its own path.
    ///
    /// `data` is keyed by template path; the entries under [`GLOBAL_KEY`]
    /// are merged into each bucket and take precedence.
    pub fn generate_all(&mut self, data: &Map<String, Value>, no_repeat: bool) -> Result<()> {
        let global = data
            .get(GLOBAL_KEY)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut rendered = Vec::with_capacity(self.templates.len());
        for (path, loaded) in &self.templates {
            let mut bucket = match data.get(path) {
                Some(Value::Object(own)) => own.clone(),
                _ => Map::new(),
            };
            bucket.extend(global.clone());
            bucket.insert(
                VERSION_KEY.to_string(),
                Value::String(env!("CARGO_PKG_VERSION").to_string()),
            );

            let content = render_with(loaded, path, &bucket)?;
            rendered.push(GeneratedFile::new(path, content, path).no_repeat(no_repeat));
        }
        self.files.extend(rendered);
        Ok(())
    }

    /// Record a file produced outside the templates, e.g. a merged update.
    pub fn push(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Render a loaded template without recording a file.
    pub fn render(&self, name: &str, data: &impl Serialize) -> Result<String> {
        let loaded = self.templates.get(name).ok_or_else(|| {
            Box::new(Error::TemplateNotFound {
                name: name.to_string(),
            })
        })?;
        render_with(loaded, name, data)
    }

    /// Render an ad-hoc snippet with the syntax and helpers of template `name`.
    pub fn render_snippet(&self, name: &str, source: &str, data: &impl Serialize) -> Result<String> {
        let loaded = self.templates.get(name).ok_or_else(|| {
            Box::new(Error::TemplateNotFound {
                name: name.to_string(),
            })
        })?;
        loaded
            .env
            .render_str(source, data)
            .map_err(|e| Error::template_exec(name, e))
    }

    /// Remove every file the templates would write and every directory that
    /// did not exist before generation.
    pub fn degenerate(&self) -> Result<()> {
        for path in self.templates.keys() {
            let target = self.output_dir.join(path);
            match std::fs::remove_file(&target) {
                Ok(()) => debug!(path = %target.display(), "removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(&target, e)),
            }
        }
        for (dir, existed) in &self.dirs {
            let target = self.output_dir.join(dir);
            if *existed || !target.exists() {
                continue;
            }
            std::fs::remove_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        }
        Ok(())
    }

    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name).map(|t| &t.config)
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values().map(|t| &t.config)
    }

    pub fn dirs(&self) -> impl Iterator<Item = (&str, bool)> {
        self.dirs.iter().map(|(d, e)| (d.as_str(), *e))
    }

    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn take_files(&mut self) -> Vec<GeneratedFile> {
        std::mem::take(&mut self.files)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn render_with(loaded: &LoadedTemplate, name: &str, data: &impl Serialize) -> Result<String> {
    let template = loaded
        .env
        .get_template(&loaded.config.path)
        .map_err(|e| Error::template_exec(name, e))?;
    template
        .render(data)
        .map_err(|e| Error::template_exec(name, e))
}

fn build_env(tpl: &Template) -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);

    if !tpl.delims.is_default() {
        let (start, end) = tpl.delims.resolved();
        let (block_start, block_end) = derive_delims(start, end, '%');
        let (comment_start, comment_end) = derive_delims(start, end, '#');
        let syntax = SyntaxConfig::builder()
            .variable_delimiters(start.to_string(), end.to_string())
            .block_delimiters(block_start, block_end)
            .comment_delimiters(comment_start, comment_end)
            .build()
            .map_err(|e| Error::template_parse(&tpl.path, e))?;
        env.set_syntax(syntax);
    }

    funcs::register(&mut env);
    env.add_template_owned(tpl.path.clone(), tpl.body.clone())
        .map_err(|e| Error::template_parse(&tpl.path, e))?;
    Ok(env)
}

/// Block and comment markers for a custom variable pair: `[[`/`]]` gives
/// `[%`/`%]` and `[#`/`#]`.
fn derive_delims(start: &str, end: &str, marker: char) -> (String, String) {
    let mut open: Vec<char> = start.chars().collect();
    if open.len() > 1 {
        open.pop();
    }
    open.push(marker);

    let mut close: Vec<char> = end.chars().collect();
    if close.len() > 1 {
        close.remove(0);
    }
    close.insert(0, marker);

    (open.into_iter().collect(), close.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::template::Delimiters;

    fn config(layouts: Vec<Template>) -> LayoutConfig {
        LayoutConfig { layouts }
    }

    #[test]
    fn test_derive_delims() {
        let (open, close) = derive_delims("[[", "]]", '%');
        assert_eq!((open.as_str(), close.as_str()), ("[%", "%]"));
        let (open, close) = derive_delims("<", ">", '#');
        assert_eq!((open.as_str(), close.as_str()), ("<#", "#>"));
    }

    #[test]
    fn test_generate_with_custom_delimiters() {
        let temp = TempDir::new().unwrap();
        let mut tpl = Template::new(
            "main.go",
            "package [[ Package ]]\n[% if Debug %]// debug\n[% endif %]",
        );
        tpl.delims = Delimiters("[[".into(), "]]".into());
        let mut generator = TemplateGenerator::new(temp.path());
        generator.init(&config(vec![tpl])).unwrap();

        generator
            .generate(&json!({"Package": "main", "Debug": true}), "main.go", "cmd/main.go", true)
            .unwrap();

        let file = &generator.files()[0];
        assert_eq!(file.path, "cmd/main.go");
        assert_eq!(file.content, "package main\n// debug\n");
        assert!(file.no_repeat);
    }

    #[test]
    fn test_generate_unknown_template() {
        let temp = TempDir::new().unwrap();
        let mut generator = TemplateGenerator::new(temp.path());

        let err = generator
            .generate(&json!({}), "missing.go", "missing.go", false)
            .unwrap_err();
        assert!(matches!(*err, Error::TemplateNotFound { ref name } if name == "missing.go"));
    }

    #[test]
    fn test_generate_all_merges_global_bucket() {
        let temp = TempDir::new().unwrap();
        let mut generator = TemplateGenerator::new(temp.path());
        generator
            .init(&config(vec![
                Template::new("a.txt", "{{ Name }}/{{ Shared }}"),
                Template::new("b.txt", "{{ Shared }}@{{ kilnVersion }}"),
            ]))
            .unwrap();
        let data = json!({
            "*": {"Shared": "global", "Name": "override"},
            "a.txt": {"Name": "own"},
        });

        generator
            .generate_all(data.as_object().unwrap(), false)
            .unwrap();

        let files = generator.files();
        assert_eq!(files[0].content, "override/global");
        assert_eq!(
            files[1].content,
            format!("global@{}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_generate_all_names_failing_template() {
        let temp = TempDir::new().unwrap();
        let mut generator = TemplateGenerator::new(temp.path());
        generator
            .init(&config(vec![
                Template::new("ok.txt", "fine"),
                Template::new("broken.txt", "{{ NoSuchFunction() }}"),
            ]))
            .unwrap();

        let err = generator.generate_all(&Map::new(), false).unwrap_err();

        assert!(matches!(*err, Error::TemplateExec { ref name, .. } if name == "broken.txt"));
        assert!(generator.files().is_empty());
    }

    #[test]
    fn test_init_rejects_bad_templates() {
        let temp = TempDir::new().unwrap();

        let mut generator = TemplateGenerator::new(temp.path());
        let err = generator
            .init(&config(vec![Template::new("/etc/passwd", "")]))
            .unwrap_err();
        assert!(matches!(*err, Error::AbsoluteTemplatePath { .. }));

        let mut generator = TemplateGenerator::new(temp.path());
        let err = generator
            .init(&config(vec![Template::new("bad.txt", "{% if %}")]))
            .unwrap_err();
        assert!(matches!(*err, Error::TemplateParse { ref name, .. } if name == "bad.txt"));
    }

    #[test]
    fn test_disabled_templates_are_skipped() {
        let temp = TempDir::new().unwrap();
        let mut disabled = Template::new("skip.txt", "{% if %}");
        disabled.disable = true;
        let mut generator = TemplateGenerator::new(temp.path());

        generator.init(&config(vec![disabled])).unwrap();

        assert!(generator.template("skip.txt").is_none());
    }

    #[test]
    fn test_degenerate_removes_new_dirs_only() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("script")).unwrap();
        std::fs::write(temp.path().join("script/keep.sh"), "mine").unwrap();

        let mut generator = TemplateGenerator::new(temp.path());
        generator
            .init(&config(vec![
                Template::new("biz/model/", ""),
                Template::new("script/bootstrap.sh", "#!/bin/bash"),
                Template::new("go.mod", "module x"),
            ]))
            .unwrap();
        let dirs: Vec<_> = generator.dirs().collect();
        assert_eq!(dirs, [("biz/model", false), ("script", true)]);

        std::fs::create_dir_all(temp.path().join("biz/model")).unwrap();
        std::fs::write(temp.path().join("script/bootstrap.sh"), "#!/bin/bash").unwrap();
        std::fs::write(temp.path().join("go.mod"), "module x").unwrap();

        generator.degenerate().unwrap();

        assert!(!temp.path().join("biz/model").exists());
        assert!(!temp.path().join("go.mod").exists());
        assert!(!temp.path().join("script/bootstrap.sh").exists());
        assert!(temp.path().join("script/keep.sh").exists());
    }
}
