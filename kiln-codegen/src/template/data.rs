//! Data handed to templates.
//!
//! Built-in templates get typed views; keys are PascalCase so user
//! templates read `{{ ServiceName }}` and `{{ f.GoType }}`.

use kiln_core::to_snake_case;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    lower::{Method, PackageDescription, Service},
    model::{Category, Field, ModelGraph, ModelId, Scope, Type},
};

/// Data of the project layout templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LayoutData {
    pub service_name: String,
    pub go_module: String,
    pub model_dir: String,
}

impl LayoutData {
    /// As a template data map, with `extra` entries layered on top.
    pub fn to_map(&self, extra: Option<&Map<String, Value>>) -> Map<String, Value> {
        let mut map = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if let Some(extra) = extra {
            map.extend(extra.clone());
        }
        map
    }
}

/// Switches of the model template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModelOptions {
    /// Enums implement `encoding.TextMarshaler`.
    pub marshal_enum_to_text: bool,
    /// Enums are declared as aliases of `int32` without methods.
    pub typedef_as_type_alias: bool,
    /// Default tags use the snake_case schema name instead of the JSON name.
    pub snake_tag: bool,
    /// Default tags left out of every field, e.g. `query`.
    pub rm_tags: Vec<String>,
}

/// Tags put on every field, in output order.
pub const DEFAULT_TAGS: [&str; 3] = ["form", "json", "query"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelView {
    pub package: String,
    pub package_name: String,
    pub file_path: String,
    pub std_imports: Vec<String>,
    pub imports: Vec<ImportView>,
    pub enums: Vec<EnumView>,
    pub structs: Vec<StructView>,
    pub oneofs: Vec<OneofView>,
    pub options: ModelOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportView {
    pub alias: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnumView {
    pub name: String,
    pub values: Vec<EnumValueView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnumValueView {
    /// Constant name, e.g. `Status_OK`.
    pub name: String,
    /// Name as declared in the schema.
    pub raw: String,
    pub number: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StructView {
    pub name: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldView {
    pub name: String,
    pub go_type: String,
    pub tag: String,
    pub number: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OneofView {
    /// Unexported marker interface, e.g. `isOrder_Payment`.
    pub interface: String,
    pub owner: String,
    pub choices: Vec<OneofChoiceView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OneofChoiceView {
    /// Wrapper struct, e.g. `Order_Card`.
    pub wrapper: String,
    pub name: String,
    pub go_type: String,
    pub tag: String,
}

impl ModelView {
    pub fn new(graph: &ModelGraph, id: ModelId, options: &ModelOptions) -> Self {
        let model = &graph[id];
        let names = GoTypeNames { graph, root: id };
        let tag = |field: &Field| {
            let name = if options.snake_tag {
                to_snake_case(&field.raw_name)
            } else {
                field.json_name.clone()
            };
            DEFAULT_TAGS
                .iter()
                .filter(|tag| !options.rm_tags.iter().any(|rm| rm == *tag))
                .map(|tag| match *tag {
                    "json" => format!("json:\"{name},omitempty\""),
                    _ => format!("{tag}:\"{name}\""),
                })
                .collect::<Vec<_>>()
                .join(" ")
        };
        let field_view = |field: &Field| FieldView {
            name: field.name.clone(),
            go_type: names.go_type(&field.ty),
            tag: tag(field),
            number: field.number,
        };

        let mut std_imports = Vec::new();
        if !model.enums.is_empty() && !options.typedef_as_type_alias {
            std_imports.push("fmt".to_string());
        }

        Self {
            package: model.package.clone(),
            package_name: model.package_name.clone(),
            file_path: model.file_path.clone(),
            std_imports,
            imports: model
                .imports
                .iter()
                .map(|(alias, m)| ImportView {
                    alias: alias.clone(),
                    path: graph[*m].package.clone(),
                })
                .collect(),
            enums: model
                .enums
                .iter()
                .map(|e| EnumView {
                    name: e.name.clone(),
                    values: e
                        .values
                        .iter()
                        .map(|v| EnumValueView {
                            name: format!("{}_{}", e.name, v.name),
                            raw: v.name.clone(),
                            number: v.number,
                        })
                        .collect(),
                })
                .collect(),
            structs: model
                .structs
                .iter()
                .map(|s| StructView {
                    name: s.name.clone(),
                    fields: s.fields.iter().map(field_view).collect(),
                })
                .collect(),
            oneofs: model
                .oneofs
                .iter()
                .map(|o| OneofView {
                    interface: format!("is{}", o.name),
                    owner: o.owner.clone(),
                    choices: o
                        .choices
                        .iter()
                        .map(|c| OneofChoiceView {
                            wrapper: format!("{}_{}", o.owner, c.name),
                            name: c.name.clone(),
                            go_type: names.go_type(&c.ty),
                            tag: tag(c),
                        })
                        .collect(),
                })
                .collect(),
            options: options.clone(),
        }
    }
}

/// Go spelling of types as seen from the model `root`.
struct GoTypeNames<'g> {
    graph: &'g ModelGraph,
    root: ModelId,
}

impl GoTypeNames<'_> {
    fn go_type(&self, ty: &Type) -> String {
        match ty.category() {
            Category::Binary => "[]byte".to_string(),
            Category::List | Category::Set => match ty.elements().first() {
                Some(element) => format!("[]{}", self.go_type(element)),
                None => "[]interface{}".to_string(),
            },
            Category::Map => match ty.elements() {
                [key, value] => format!("map[{}]{}", self.go_type(key), self.go_type(value)),
                _ => "map[string]interface{}".to_string(),
            },
            Category::Struct => format!("*{}", self.qualified(ty)),
            Category::Oneof => format!("is{}", ty.name()),
            _ => self.qualified(ty),
        }
    }

    fn qualified(&self, ty: &Type) -> String {
        let Scope::Model(owner) = ty.scope() else {
            return ty.name().to_string();
        };
        if self.graph[owner].package == self.graph[self.root].package {
            return ty.name().to_string();
        }
        match self.graph.import_alias(self.root, owner) {
            Some(alias) => format!("{alias}.{}", ty.name()),
            None => ty.name().to_string(),
        }
    }
}

/// Names shared by every custom package template.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageContext {
    /// Project name.
    pub service_name: String,
    pub go_module: String,
    pub idl_name: String,
    /// Import path of the main model.
    pub model_package: String,
    pub model_package_name: String,
}

/// Data of a package template rendered once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageView {
    #[serde(flatten)]
    pub context: PackageContext,
    pub services: Vec<ServiceView>,
}

/// Data of a `loop_service` template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceView {
    #[serde(flatten)]
    pub context: PackageContext,
    pub name: String,
    pub methods: Vec<MethodView>,
}

/// Data of a `loop_method` template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MethodView {
    #[serde(flatten)]
    pub context: PackageContext,
    pub name: String,
    /// Name of the owning service.
    pub service: String,
    /// Request type qualified by its model package name, e.g. `pay.PayReq`.
    pub request_type: String,
    pub request_package: String,
    pub response_type: String,
    pub response_package: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl PackageView {
    pub fn new(graph: &ModelGraph, pkg: &PackageDescription, context: PackageContext) -> Self {
        let services = pkg
            .services
            .iter()
            .map(|s| ServiceView::new(graph, s, &context))
            .collect();
        Self { context, services }
    }
}

impl ServiceView {
    fn new(graph: &ModelGraph, service: &Service, context: &PackageContext) -> Self {
        Self {
            context: context.clone(),
            name: service.name.clone(),
            methods: service
                .methods
                .iter()
                .map(|m| MethodView::new(graph, &service.name, m, context))
                .collect(),
        }
    }
}

impl MethodView {
    fn new(graph: &ModelGraph, service: &str, method: &Method, context: &PackageContext) -> Self {
        let (request_type, request_package) = external_name(graph, &method.request);
        let (response_type, response_package) = external_name(graph, &method.response);
        Self {
            context: context.clone(),
            name: method.name.clone(),
            service: service.to_string(),
            request_type,
            request_package,
            response_type,
            response_package,
            client_streaming: method.client_streaming,
            server_streaming: method.server_streaming,
        }
    }
}

/// A type as referenced from outside any model: `pkgname.Name` plus the
/// package import path.
fn external_name(graph: &ModelGraph, ty: &Type) -> (String, String) {
    match ty.scope() {
        Scope::Model(owner) => {
            let model = &graph[owner];
            (
                format!("{}.{}", model.package_name, ty.name()),
                model.package.clone(),
            )
        }
        _ => (ty.name().to_string(), String::new()),
    }
}
