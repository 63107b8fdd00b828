//! Arguments shared by the generating commands.

use std::{collections::HashMap, path::PathBuf};

use clap::Args;
use eyre::{Result, bail};
use kiln_codegen::{
    ExternalCompiler, LayoutOptions, PackageOptions, read_descriptor_set,
    template::{DEFAULT_MODEL_DIR, LayoutConfig, ModelOptions},
};
use kiln_core::base_name;
use kiln_descriptor::DescriptorSet;

use super::UnwrapOrExit;
use crate::ops::{PackageRequest, Settings};

#[derive(Args)]
pub struct ProjectArgs {
    /// Go module path of the project, e.g. example.com/pay
    #[arg(short, long)]
    pub module: String,

    /// Service name (defaults to the last segment of the module path)
    #[arg(short, long)]
    pub service: Option<String>,

    /// Output directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Directory of the generated models
    #[arg(long, default_value = DEFAULT_MODEL_DIR)]
    pub model_dir: String,

    /// Never write this file (relative to the output directory)
    #[arg(short = 'E', long = "exclude")]
    pub excludes: Vec<String>,

    /// List the files that would be written without writing them
    #[arg(long)]
    pub list: bool,
}

impl ProjectArgs {
    pub fn service_name(&self) -> String {
        match &self.service {
            Some(name) => name.clone(),
            None => base_name(self.module.trim_end_matches('/'), "").to_string(),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            output_dir: self.out_dir.clone(),
            excludes: self.excludes.clone(),
            list_only: self.list,
        }
    }

    pub fn layout_options(&self, layout: Option<PathBuf>, data: Option<PathBuf>) -> LayoutOptions {
        LayoutOptions {
            output_dir: self.out_dir.clone(),
            service_name: self.service_name(),
            go_module: self.module.clone(),
            model_dir: self.model_dir.clone(),
            layout,
            data,
        }
    }
}

#[derive(Args)]
pub struct IdlArgs {
    /// Schema file to generate from, compiled with `buf`
    #[arg(long, conflicts_with = "descriptor_set")]
    pub idl: Option<PathBuf>,

    /// Root directory of the schema files
    #[arg(long, default_value = ".")]
    pub idl_root: PathBuf,

    /// Protobuf-JSON descriptor set to read instead of running `buf`
    #[arg(long)]
    pub descriptor_set: Option<PathBuf>,

    /// Only generate the models of the main schema file
    #[arg(long)]
    pub no_recurse: bool,

    /// Output package of a schema file, as FILE=PACKAGE
    #[arg(short = 'P', long = "package-map", value_parser = parse_mapping)]
    pub package_map: Vec<(String, String)>,

    /// Prefix removed from every go_package option
    #[arg(long = "trim-gopackage", default_value = "")]
    pub trim_go_package: String,

    /// Import models from this package path instead of generating them
    #[arg(long = "use")]
    pub use_dir: Option<String>,

    /// Tag fields with their snake_case schema name
    #[arg(long)]
    pub snake_tag: bool,

    /// Remove a default field tag (form, json or query)
    #[arg(long = "rm-tag")]
    pub rm_tags: Vec<String>,

    /// Implement encoding.TextMarshaler for enums
    #[arg(long)]
    pub marshal_enum_to_text: bool,

    /// Declare enums as aliases of int32
    #[arg(long)]
    pub typedef_as_type_alias: bool,
}

impl IdlArgs {
    pub fn is_given(&self) -> bool {
        self.idl.is_some() || self.descriptor_set.is_some()
    }

    /// Load the descriptor set and describe the package to generate.
    pub fn request(
        &self,
        project: &ProjectArgs,
        templates: Option<LayoutConfig>,
    ) -> Result<PackageRequest> {
        if !self.is_given() {
            bail!("a schema is required: pass --idl or --descriptor-set");
        }
        Ok(PackageRequest {
            set: self.descriptor_set().unwrap_or_exit(),
            options: self.package_options(project, templates),
        })
    }

    fn package_options(
        &self,
        project: &ProjectArgs,
        templates: Option<LayoutConfig>,
    ) -> PackageOptions {
        PackageOptions {
            output_dir: project.out_dir.clone(),
            service_name: project.service_name(),
            go_module: project.module.clone(),
            model_dir: project.model_dir.clone(),
            idl: self.main_file(),
            recursive: !self.no_recurse,
            package_map: self.package_map.iter().cloned().collect::<HashMap<_, _>>(),
            trim_go_package: self.trim_go_package.clone(),
            use_dir: self.use_dir.clone(),
            model_options: ModelOptions {
                marshal_enum_to_text: self.marshal_enum_to_text,
                typedef_as_type_alias: self.typedef_as_type_alias,
                snake_tag: self.snake_tag,
                rm_tags: self.rm_tags.clone(),
            },
            templates,
        }
    }

    fn descriptor_set(&self) -> kiln_codegen::Result<DescriptorSet> {
        match (&self.descriptor_set, &self.idl) {
            (Some(path), _) => read_descriptor_set(path),
            (None, Some(idl)) => ExternalCompiler::buf(&self.idl_root, idl).compile(),
            (None, None) => Err(Box::new(kiln_codegen::Error::EmptyDescriptorSet)),
        }
    }

    /// Descriptor name of `--idl`: its path below the schema root.
    fn main_file(&self) -> Option<String> {
        let idl = self.idl.as_ref()?;
        let relative = idl.strip_prefix(&self.idl_root).unwrap_or(idl);
        Some(relative.to_string_lossy().replace('\\', "/"))
    }
}

/// Load a package template file given on the command line.
pub fn package_templates(path: Option<&PathBuf>) -> Option<LayoutConfig> {
    path.map(|p| LayoutConfig::from_file(p).unwrap_or_exit())
}

fn parse_mapping(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((file, package)) if !file.is_empty() && !package.is_empty() => {
            Ok((file.to_string(), package.to_string()))
        }
        _ => Err(format!("expected FILE=PACKAGE, got '{s}'")),
    }
}
