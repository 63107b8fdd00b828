//! Lowering of descriptor files into models.
//!
//! Every message, enum and oneof of a schema file becomes part of the
//! file's [`Model`](crate::model::Model). Field types are resolved through a per-file
//! [`Resolver`], and the imports it reports as referred become the model's
//! imports.

use std::collections::HashSet;

use kiln_core::{to_lower_camel_case, to_pascal_case};
use kiln_descriptor::{
    DescriptorProto, DescriptorSet, EnumDescriptor, FieldDescriptor, FileDescriptor,
    ServiceDescriptor,
};
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{Enum, EnumValue, Field, ModelGraph, ModelId, Oneof, Struct, Type},
    resolve::{PackageRules, Resolver, is_well_known},
};

/// Options for [`build_package`].
#[derive(Debug, Clone, Default)]
pub struct LowerOptions {
    /// Also lower every file reachable through imports.
    pub recursive: bool,
    pub packages: PackageRules,
}

/// The lowered main file: its model plus the services it declares.
#[derive(Debug, Clone)]
pub struct PackageDescription {
    /// Descriptor name of the main file.
    pub idl_name: String,
    /// Output package of the main file.
    pub package: String,
    pub main: ModelId,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub request: Type,
    pub response: Type,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

/// Lower `main` (and with [`LowerOptions::recursive`] its imports) into `graph`.
pub fn build_package(
    set: &DescriptorSet,
    main: &FileDescriptor,
    graph: &mut ModelGraph,
    options: &LowerOptions,
) -> Result<PackageDescription> {
    let mut lowered = HashSet::new();
    let (id, services) = lower_file(set, main, graph, options, &mut lowered)?;

    Ok(PackageDescription {
        idl_name: main.name.clone(),
        package: graph[id].package.clone(),
        main: id,
        services,
    })
}

fn lower_file(
    set: &DescriptorSet,
    file: &FileDescriptor,
    graph: &mut ModelGraph,
    options: &LowerOptions,
    lowered: &mut HashSet<String>,
) -> Result<(ModelId, Vec<Service>)> {
    let id = graph.intern(&file.name, || options.packages.model(file));
    lowered.insert(file.name.clone());

    if is_well_known(file) {
        return Ok((id, Vec::new()));
    }
    debug!(file = %file.name, package = %graph[id].package, "lowering");

    let mut resolver = Resolver::new(file, set, id, graph, &options.packages)?;
    resolver.load_all()?;

    let mut builder = ModelBuilder {
        resolver: &mut resolver,
        enums: Vec::new(),
        structs: Vec::new(),
        oneofs: Vec::new(),
    };
    for e in &file.enum_type {
        builder.enumeration(e, "");
    }
    for m in &file.message_type {
        builder.message(m, "")?;
    }
    let ModelBuilder {
        enums,
        structs,
        oneofs,
        ..
    } = builder;

    let imports = resolver.export_referred(false, false);
    let services = file
        .service
        .iter()
        .map(|s| lower_service(&mut resolver, s))
        .collect::<Result<Vec<_>>>()?;
    resolver.export_referred(false, false);

    let model = &mut graph[id];
    model.enums = enums;
    model.structs = structs;
    model.oneofs = oneofs;
    for reference in imports {
        model.imports.insert(reference.alias, reference.model);
    }

    if options.recursive {
        for dependency in &file.dependency {
            if lowered.contains(dependency) {
                continue;
            }
            let dep = set.get(dependency).ok_or_else(|| {
                Box::new(Error::UnknownDependency {
                    file: file.name.clone(),
                    dependency: dependency.clone(),
                })
            })?;
            lower_file(set, dep, graph, options, lowered)?;
        }
    }

    Ok((id, services))
}

fn lower_service(resolver: &mut Resolver<'_>, service: &ServiceDescriptor) -> Result<Service> {
    let methods = service
        .method
        .iter()
        .map(|m| {
            Ok(Method {
                name: m.name.clone(),
                request: resolver.resolve_identifier(&m.input_type)?.ty,
                response: resolver.resolve_identifier(&m.output_type)?.ty,
                client_streaming: m.client_streaming.unwrap_or(false),
                server_streaming: m.server_streaming.unwrap_or(false),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Service {
        name: service.name.clone(),
        methods,
    })
}

struct ModelBuilder<'r, 'a> {
    resolver: &'r mut Resolver<'a>,
    enums: Vec<Enum>,
    structs: Vec<Struct>,
    oneofs: Vec<Oneof>,
}

impl ModelBuilder<'_, '_> {
    fn enumeration(&mut self, e: &EnumDescriptor, prefix: &str) {
        self.enums.push(Enum {
            name: format!("{prefix}{}", e.name),
            values: e
                .value
                .iter()
                .map(|v| EnumValue {
                    name: v.name.clone(),
                    number: v.number,
                })
                .collect(),
        });
    }

    fn message(&mut self, m: &DescriptorProto, prefix: &str) -> Result<()> {
        let name = format!("{prefix}{}", m.name);
        let mut fields = Vec::with_capacity(m.field.len());
        let mut groups: Vec<Option<usize>> = vec![None; m.oneof_decl.len()];

        for field in &m.field {
            let lowered = self.field(field, &m.nested_type)?;
            let Some(index) = field.oneof().filter(|i| *i < groups.len()) else {
                fields.push(lowered);
                continue;
            };

            let slot = match groups[index] {
                Some(slot) => slot,
                None => {
                    let decl = &m.oneof_decl[index].name;
                    let group = format!("{name}_{}", to_pascal_case(decl));
                    fields.push(Field {
                        name: to_pascal_case(decl),
                        raw_name: decl.clone(),
                        number: field.number,
                        ty: Type::oneof(&group),
                        json_name: to_lower_camel_case(decl),
                    });
                    self.oneofs.push(Oneof {
                        name: group,
                        owner: name.clone(),
                        choices: Vec::new(),
                    });
                    groups[index] = Some(self.oneofs.len() - 1);
                    self.oneofs.len() - 1
                }
            };
            self.oneofs[slot].choices.push(lowered);
        }

        self.structs.push(Struct {
            name: name.clone(),
            fields,
        });

        let prefix = format!("{name}_");
        for nested in m.nested_type.iter().filter(|nt| !nt.is_map_entry()) {
            self.message(nested, &prefix)?;
        }
        for e in &m.enum_type {
            self.enumeration(e, &prefix);
        }
        Ok(())
    }

    fn field(&mut self, field: &FieldDescriptor, nested: &[DescriptorProto]) -> Result<Field> {
        Ok(Field {
            name: to_pascal_case(&field.name),
            raw_name: field.name.clone(),
            number: field.number,
            ty: self.resolver.resolve_type(field, nested)?,
            json_name: field
                .json_name
                .clone()
                .unwrap_or_else(|| to_lower_camel_case(&field.name)),
        })
    }
}
