//! Generating a package from a descriptor set: the models of the main
//! file plus any custom package templates, merged against what is already
//! on disk.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use kiln_core::{GeneratedFile, sub_package};
use kiln_descriptor::DescriptorSet;
use tracing::debug;

use crate::{
    emit::{ModelEmitter, RenderModel},
    error::{Error, Result},
    lower::LowerOptions,
    model::{ModelGraph, ModelId},
    pipeline::{CompilationContext, Diagnostic, Pipeline, TracingPlugin},
    resolve::PackageRules,
    template::{
        AppendKey, DEFAULT_MODEL_DIR, LayoutConfig, MODEL_TEMPLATE, MethodView, ModelOptions,
        ModelView, PackageContext, PackageView, ServiceView, Template, TemplateGenerator,
        UpdateMode, default_package_templates, merge_templates,
    },
    update::{AppendBlock, append_blocks, insert_imports},
};

const PHASE: &str = "update";

/// Options for [`PackageGenerator`].
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub output_dir: PathBuf,
    pub service_name: String,
    /// Go module path, the base package of every generated model.
    pub go_module: String,
    /// Directory of relocated models; `biz/model` when empty.
    pub model_dir: String,
    /// Descriptor name of the main file; picked from the set when unset.
    pub idl: Option<String>,
    /// Also generate the models of every imported file. On by default.
    pub recursive: bool,
    pub package_map: HashMap<String, String>,
    /// Prefix stripped from every `go_package` option.
    pub trim_go_package: String,
    /// Import path of models kept in another repository. When set no model
    /// is generated and package templates import models from there.
    pub use_dir: Option<String>,
    pub model_options: ModelOptions,
    /// Package templates added to (or replacing) the built-in model template.
    pub templates: Option<LayoutConfig>,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::new(),
            service_name: String::new(),
            go_module: String::new(),
            model_dir: String::new(),
            idl: None,
            recursive: true,
            package_map: HashMap::new(),
            trim_go_package: String::new(),
            use_dir: None,
            model_options: ModelOptions::default(),
            templates: None,
        }
    }
}

/// Everything rendered for one package, not yet written.
#[derive(Debug, Default)]
pub struct PackageOutput {
    pub idl_name: String,
    pub files: Vec<GeneratedFile>,
    /// Directories the files go into, and whether each existed before.
    pub dirs: Vec<(String, bool)>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PackageGenerator {
    options: PackageOptions,
    pipeline: Pipeline,
}

impl PackageGenerator {
    pub fn new(options: PackageOptions) -> Self {
        Self {
            options,
            pipeline: Pipeline::new().plugin(TracingPlugin),
        }
    }

    /// Replace the pipeline, e.g. to add phases or plugins.
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Lower the main file of `set` and render every package template.
    ///
    /// Nothing is written; existing files are only read to apply update
    /// behaviors.
    pub fn generate(&self, set: &DescriptorSet) -> Result<PackageOutput> {
        let main = match &self.options.idl {
            Some(name) => set
                .get(name)
                .ok_or_else(|| Box::new(Error::UnknownFile { name: name.clone() }))?,
            None => set.main_file().ok_or(Box::new(Error::EmptyDescriptorSet))?,
        };

        let lower = LowerOptions {
            recursive: self.options.recursive,
            packages: PackageRules {
                package_map: self.options.package_map.clone(),
                trim_prefix: self.options.trim_go_package.clone(),
            },
        };
        let CompilationContext {
            mut graph,
            package,
            mut diagnostics,
            ..
        } = self.pipeline.run(set, main, lower)?;
        let package = package.ok_or_else(|| {
            Box::new(Error::UnknownFile {
                name: main.name.clone(),
            })
        })?;

        let config = match &self.options.templates {
            Some(custom) => merge_templates(default_package_templates(), custom.clone()),
            None => default_package_templates(),
        };
        let mut generator = TemplateGenerator::new(&self.options.output_dir);
        generator.init(&config)?;

        if generator.template(MODEL_TEMPLATE).is_some() {
            self.emit_models(&mut generator, &mut graph, package.main)?;
        }
        if let Some(use_dir) = &self.options.use_dir {
            self.use_models(&mut graph, use_dir);
        }

        let main_model = &graph[package.main];
        let context = PackageContext {
            service_name: self.options.service_name.clone(),
            go_module: self.options.go_module.clone(),
            idl_name: package.idl_name.clone(),
            model_package: main_model.package.clone(),
            model_package_name: main_model.package_name.clone(),
        };
        let view = PackageView::new(&graph, &package, context);

        let custom: Vec<Template> = generator
            .templates()
            .filter(|t| t.path != MODEL_TEMPLATE)
            .cloned()
            .collect();
        for tpl in &custom {
            for job in jobs(tpl, &view) {
                self.render_job(&mut generator, tpl, &job, &mut diagnostics)?;
            }
        }

        Ok(PackageOutput {
            idl_name: package.idl_name,
            dirs: generator.dirs().map(|(d, e)| (d.to_string(), e)).collect(),
            files: generator.take_files(),
            diagnostics,
        })
    }

    fn model_dir(&self) -> &str {
        if self.options.model_dir.is_empty() {
            DEFAULT_MODEL_DIR
        } else {
            self.options.model_dir.as_str()
        }
    }

    /// Place every model; render them unless models come from `use_dir`.
    fn emit_models(
        &self,
        generator: &mut TemplateGenerator,
        graph: &mut ModelGraph,
        main: ModelId,
    ) -> Result<()> {
        let render = self.options.use_dir.is_none();
        let mut renderer = ModelRenderer {
            generator,
            options: &self.options.model_options,
        };
        let mut emitter =
            ModelEmitter::new(&self.options.go_module, self.model_dir(), &mut renderer);

        emitter.emit_model(graph, main, render)?;
        if self.options.recursive {
            let ids: Vec<ModelId> = graph.iter().map(|(id, _)| id).collect();
            for id in ids {
                emitter.emit_model(graph, id, render)?;
            }
        }
        Ok(())
    }

    /// Point placed models at the third-party model directory.
    fn use_models(&self, graph: &mut ModelGraph, use_dir: &str) {
        let local = sub_package(&self.options.go_module, self.model_dir());
        let use_dir = use_dir.trim_end_matches('/');
        let ids: Vec<ModelId> = graph.iter().map(|(id, _)| id).collect();
        for id in ids {
            let model = &mut graph[id];
            if model.external {
                continue;
            }
            if let Some(rest) = model.package.strip_prefix(&local)
                && (rest.is_empty() || rest.starts_with('/'))
            {
                model.package = format!("{use_dir}{rest}");
            }
        }
    }

    fn render_job(
        &self,
        generator: &mut TemplateGenerator,
        tpl: &Template,
        job: &Job<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        let path = generator
            .render_snippet(&tpl.path, &tpl.path, &job.data)?
            .trim()
            .to_string();
        if Path::new(&path).is_absolute() {
            return Err(Box::new(Error::AbsoluteTemplatePath { path }));
        }

        let target = self.options.output_dir.join(&path);
        if !target.exists() {
            return generator.generate(&job.data, &tpl.path, &path, false);
        }

        match tpl.update_behavior.mode {
            UpdateMode::Skip => {
                debug!(path, "exists, skipped");
                diagnostics.push(Diagnostic::info(PHASE, "file exists, skipped").at(&path));
                Ok(())
            }
            UpdateMode::Cover => generator.generate(&job.data, &tpl.path, &path, false),
            UpdateMode::Append => {
                let existing =
                    std::fs::read_to_string(&target).map_err(|e| Error::io(&target, e))?;
                match append_update(generator, tpl, job, &existing, &path)? {
                    Some(content) => {
                        generator.push(GeneratedFile::new(path, content, &tpl.path));
                    }
                    None => debug!(path, "up to date"),
                }
                Ok(())
            }
        }
    }
}

/// Renders models through the built-in model template.
struct ModelRenderer<'g> {
    generator: &'g mut TemplateGenerator,
    options: &'g ModelOptions,
}

impl RenderModel for ModelRenderer<'_> {
    fn render(&mut self, graph: &ModelGraph, id: ModelId) -> Result<()> {
        let view = ModelView::new(graph, id, self.options);
        self.generator
            .generate(&view, MODEL_TEMPLATE, &graph[id].file_path, false)
    }
}

/// One render of a package template with the entities it covers.
struct Job<'v> {
    data: minijinja::Value,
    services: Vec<&'v ServiceView>,
    methods: Vec<&'v MethodView>,
}

fn jobs<'v>(tpl: &Template, view: &'v PackageView) -> Vec<Job<'v>> {
    if tpl.loop_method {
        view.services
            .iter()
            .flat_map(|s| {
                s.methods.iter().map(move |m| Job {
                    data: minijinja::Value::from_serialize(m),
                    services: vec![s],
                    methods: vec![m],
                })
            })
            .collect()
    } else if tpl.loop_service {
        view.services
            .iter()
            .map(|s| Job {
                data: minijinja::Value::from_serialize(s),
                services: vec![s],
                methods: s.methods.iter().collect(),
            })
            .collect()
    } else {
        vec![Job {
            data: minijinja::Value::from_serialize(view),
            services: view.services.iter().collect(),
            methods: view.services.iter().flat_map(|s| &s.methods).collect(),
        }]
    }
}

/// New content of an `append` file, or `None` when every entity is present.
fn append_update(
    generator: &TemplateGenerator,
    tpl: &Template,
    job: &Job<'_>,
    existing: &str,
    path: &str,
) -> Result<Option<String>> {
    let behavior = &tpl.update_behavior;
    let update_error = |message: &str| {
        Box::new(Error::Update {
            path: path.to_string(),
            message: message.to_string(),
        })
    };
    let key = behavior
        .append_key
        .ok_or_else(|| update_error("append updates need 'append_key'"))?;
    if behavior.append_tpl.is_empty() {
        return Err(update_error("append updates need 'append_content_tpl'"));
    }

    let entities: Vec<minijinja::Value> = match key {
        AppendKey::Service => job
            .services
            .iter()
            .map(minijinja::Value::from_serialize)
            .collect(),
        AppendKey::Method => job
            .methods
            .iter()
            .map(minijinja::Value::from_serialize)
            .collect(),
    };

    let mut blocks = Vec::with_capacity(entities.len());
    let mut imports: Vec<String> = Vec::new();
    for entity in &entities {
        let anchor = generator.render_snippet(&tpl.path, &behavior.insert_key, entity)?;
        let body = generator.render_snippet(&tpl.path, &behavior.append_tpl, entity)?;
        blocks.push(AppendBlock::new(anchor, body));
        for import in &behavior.import_tpl {
            let rendered = generator.render_snippet(&tpl.path, import, entity)?;
            if !imports.contains(&rendered) {
                imports.push(rendered);
            }
        }
    }

    let appended = append_blocks(existing, &blocks, &behavior.append_location);
    if appended.inserted == 0 {
        return Ok(None);
    }
    debug!(path, inserted = appended.inserted, "appended");
    Ok(Some(insert_imports(&appended.content, &imports)))
}
