use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
};

use indexmap::IndexMap;
use kiln_core::base_name;
use serde::Serialize;

use super::Type;

/// Stable handle of a [`Model`] inside a [`ModelGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModelId(usize);

impl ModelId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One generated source unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Model {
    /// Descriptor file name until the emitter assigns the output path.
    pub file_path: String,
    /// Import path of the package.
    pub package: String,
    /// Short package name used in the `package` clause.
    pub package_name: String,
    /// Import alias to imported model.
    pub imports: IndexMap<String, ModelId>,
    pub enums: Vec<Enum>,
    pub structs: Vec<Struct>,
    pub oneofs: Vec<Oneof>,
    /// Generated elsewhere (well-known types): keeps its declared package
    /// and is never rendered.
    pub external: bool,
}

impl Model {
    pub fn new(file_path: impl Into<String>, package: impl Into<String>) -> Self {
        let package = package.into();
        Self {
            file_path: file_path.into(),
            package_name: base_name(&package, "").replace(['.', '-'], "_"),
            package,
            ..Self::default()
        }
    }

    /// Whether rendering this model would produce an empty file.
    pub fn is_empty(&self) -> bool {
        self.enums.is_empty() && self.structs.is_empty() && self.oneofs.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Enum {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    /// Exported field name.
    pub name: String,
    /// Name as declared in the schema.
    pub raw_name: String,
    pub number: i32,
    pub ty: Type,
    pub json_name: String,
}

/// A oneof group: an interface implemented by one wrapper per choice.
#[derive(Debug, Clone, Serialize)]
pub struct Oneof {
    /// Interface name, e.g. `Order_Payment`.
    pub name: String,
    /// Struct that owns the group.
    pub owner: String,
    pub choices: Vec<Field>,
}

/// Arena of models, addressed by [`ModelId`].
///
/// Each descriptor file maps to exactly one model, so repeated lookups from
/// different resolvers share identity.
#[derive(Debug, Default)]
pub struct ModelGraph {
    models: Vec<Model>,
    by_file: HashMap<String, ModelId>,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model that is not tied to a descriptor file.
    pub fn add(&mut self, model: Model) -> ModelId {
        let id = ModelId(self.models.len());
        self.models.push(model);
        id
    }

    /// The model for descriptor `file`, created with `make` on first use.
    pub fn intern(&mut self, file: &str, make: impl FnOnce() -> Model) -> ModelId {
        if let Some(id) = self.by_file.get(file) {
            return *id;
        }
        let id = self.add(make());
        self.by_file.insert(file.to_string(), id);
        id
    }

    pub fn by_file(&self, file: &str) -> Option<ModelId> {
        self.by_file.get(file).copied()
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.models.iter().enumerate().map(|(i, m)| (ModelId(i), m))
    }

    /// Alias under which `from` imports `target`, matching by package.
    pub fn import_alias(&self, from: ModelId, target: ModelId) -> Option<&str> {
        let package = &self[target].package;
        self[from]
            .imports
            .iter()
            .find(|(_, id)| **id == target || self[**id].package == *package)
            .map(|(alias, _)| alias.as_str())
    }
}

impl Index<ModelId> for ModelGraph {
    type Output = Model;

    fn index(&self, id: ModelId) -> &Model {
        &self.models[id.0]
    }
}

impl IndexMut<ModelId> for ModelGraph {
    fn index_mut(&mut self, id: ModelId) -> &mut Model {
        &mut self.models[id.0]
    }
}
