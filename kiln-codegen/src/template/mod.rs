//! Template configuration, rendering and the built-in templates.

mod config;
mod data;
mod defaults;
mod engine;
mod funcs;

pub use config::{
    AppendKey, ConfigFormat, Delimiters, LayoutConfig, Template, UpdateBehavior, UpdateMode,
    load_document,
};
pub use data::{
    EnumValueView, EnumView, FieldView, ImportView, LayoutData, MethodView, ModelOptions,
    ModelView, OneofChoiceView, OneofView, PackageContext, PackageView, ServiceView, StructView,
};
pub use defaults::{
    DEFAULT_MODEL_DIR, MODEL_TEMPLATE, default_layout, default_package_templates, merge_templates,
};
pub use engine::{GLOBAL_KEY, TemplateGenerator, VERSION_KEY};
