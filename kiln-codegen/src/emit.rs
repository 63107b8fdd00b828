//! Walking the model graph and handing models to a renderer.

use std::collections::HashSet;

use kiln_core::{base_name, sub_dir, sub_package};
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{Model, ModelGraph, ModelId},
};

/// Receives every model the emitter decides to generate.
pub trait RenderModel {
    fn render(&mut self, graph: &ModelGraph, id: ModelId) -> Result<()>;
}

/// Assigns output locations to models and renders them once each.
///
/// Packages below `base_package` keep their sub-path; anything else is
/// placed under `model_dir`. External models stay where they are declared.
/// Import cycles are cut by a visited set.
pub struct ModelEmitter<'r> {
    base_package: String,
    model_dir: String,
    visited: HashSet<ModelId>,
    emitted: HashSet<ModelId>,
    renderer: &'r mut dyn RenderModel,
}

impl<'r> ModelEmitter<'r> {
    pub fn new(
        base_package: impl Into<String>,
        model_dir: impl Into<String>,
        renderer: &'r mut dyn RenderModel,
    ) -> Self {
        Self {
            base_package: base_package.into(),
            model_dir: model_dir.into().trim_matches('/').to_string(),
            visited: HashSet::new(),
            emitted: HashSet::new(),
            renderer,
        }
    }

    /// Place `id` and everything it imports, then render `id` itself when
    /// `should_emit` is set and the model has content.
    pub fn emit_model(&mut self, graph: &mut ModelGraph, id: ModelId, should_emit: bool) -> Result<()> {
        if self.visited.insert(id) {
            if !graph[id].external {
                self.relocate(&mut graph[id]);
            }
            let imports: Vec<ModelId> = graph[id].imports.values().copied().collect();
            for import in imports {
                self.emit_model(graph, import, false)?;
            }
        }

        if !should_emit || graph[id].external || graph[id].is_empty() || !self.emitted.insert(id)
        {
            return Ok(());
        }

        let package = graph[id].package.clone();
        let own: Vec<String> = graph[id]
            .imports
            .iter()
            .filter(|(_, m)| graph[**m].package == package)
            .map(|(alias, _)| alias.clone())
            .collect();
        for alias in own {
            graph[id].imports.shift_remove(&alias);
        }

        debug!(path = %graph[id].file_path, "rendering model");
        self.renderer.render(graph, id).map_err(|source| {
            Box::new(Error::ModelEmit {
                path: graph[id].file_path.clone(),
                source,
            })
        })
    }

    /// Whether `id` has been rendered by this emitter.
    pub fn is_emitted(&self, id: ModelId) -> bool {
        self.emitted.contains(&id)
    }

    fn relocate(&self, model: &mut Model) {
        let remainder = match model.package.strip_prefix(&self.base_package) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => model.package.as_str(),
        }
        .trim_matches('/');

        let under_model_dir = !self.model_dir.is_empty()
            && (remainder == self.model_dir
                || remainder.starts_with(&format!("{}/", self.model_dir)));
        let dir = if under_model_dir {
            remainder.to_string()
        } else {
            sub_dir(&self.model_dir, remainder)
        };

        let stem = base_name(&model.file_path, ".proto").to_string();
        model.package = sub_package(&self.base_package, &dir);
        model.package_name = base_name(&model.package, "").replace(['.', '-'], "_");
        model.file_path = sub_dir(&dir, &format!("{stem}.go"));
    }
}
