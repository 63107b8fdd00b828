use std::{collections::HashMap, rc::Rc};

use indexmap::IndexMap;
use kiln_core::{UniqueNames, base_name, split_package_name};
use kiln_descriptor::{DescriptorProto, DescriptorSet, FieldDescriptor, FileDescriptor};
use tracing::trace;

use super::{Namespace, PackageReference, PackageRules, Symbol};
use crate::{
    error::{Error, Result},
    model::{ModelGraph, ModelId, Scope, Type, types},
};

/// A resolved identifier: the shared symbol plus its type bound to the
/// model that owns the declaration.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub symbol: Rc<Symbol>,
    pub ty: Type,
}

/// Resolves fully-qualified identifiers of one schema file against the file
/// itself and its direct imports.
#[derive(Debug)]
pub struct Resolver<'a> {
    files: &'a DescriptorSet,
    main: &'a FileDescriptor,
    root_name: String,
    root: Namespace,
    /// Import namespaces keyed by schema package.
    deps: IndexMap<String, Namespace>,
    main_pkg: PackageReference,
    /// Direct imports keyed by descriptor name.
    ref_pkgs: IndexMap<String, PackageReference>,
}

impl<'a> Resolver<'a> {
    /// Set up references for `main` and each of its imports.
    ///
    /// Every import gets a model in `graph` (shared with other resolvers
    /// through the descriptor name) and an alias unique within this resolver.
    pub fn new(
        main: &'a FileDescriptor,
        files: &'a DescriptorSet,
        main_model: ModelId,
        graph: &mut ModelGraph,
        rules: &PackageRules,
    ) -> Result<Self> {
        let mut aliases = UniqueNames::new();
        let mut package_aliases: HashMap<String, String> = HashMap::new();

        let main_alias = aliases.reserve(&graph[main_model].package_name);
        package_aliases.insert(graph[main_model].package.clone(), main_alias.clone());

        let mut ref_pkgs = IndexMap::new();
        for dependency in &main.dependency {
            let file = lookup(files, main, dependency)?;
            let package = rules.go_package(file);
            let model = graph.intern(&file.name, || rules.model(file));

            let alias = match package_aliases.get(&package) {
                Some(alias) => alias.clone(),
                None => {
                    let alias = aliases.reserve(&graph[model].package_name);
                    package_aliases.insert(package.clone(), alias.clone());
                    alias
                }
            };
            trace!(file = %file.name, %package, %alias, "registered import");

            ref_pkgs.insert(
                file.name.clone(),
                PackageReference {
                    include_base: base_name(&file.name, ".proto").to_string(),
                    include_path: file.name.clone(),
                    alias,
                    model,
                    referred: false,
                },
            );
        }

        Ok(Self {
            files,
            main,
            root_name: String::new(),
            root: Namespace::new(),
            deps: IndexMap::new(),
            main_pkg: PackageReference {
                include_base: base_name(&main.name, ".proto").to_string(),
                include_path: main.name.clone(),
                alias: main_alias,
                model: main_model,
                referred: false,
            },
            ref_pkgs,
        })
    }

    /// Build the root namespace and the import namespaces.
    ///
    /// Imports sharing a package are merged in declaration order; the first
    /// file to declare a name keeps it.
    pub fn load_all(&mut self) -> Result<()> {
        self.root = Namespace::load(self.main);
        self.root_name = self.main.package.clone();

        let mut deps: IndexMap<String, Namespace> = IndexMap::new();
        for dependency in &self.main.dependency {
            let file = lookup(self.files, self.main, dependency)?;
            let ns = Namespace::load(file);
            match deps.get_mut(&file.package) {
                Some(existing) => existing.merge(ns),
                None => {
                    deps.insert(file.package.clone(), ns);
                }
            }
        }
        self.deps = deps;
        Ok(())
    }

    /// Look up a fully-qualified name such as `.pkg.Outer.Inner`.
    ///
    /// The root package is tried first, then the package implied by dropping
    /// the last segment, then every import package in declaration order.
    pub fn get(&self, name: &str) -> Option<Rc<Symbol>> {
        if let Some(symbol) = strip_space(name, &self.root_name).and_then(|id| self.root.get(id)) {
            return Some(Rc::clone(symbol));
        }

        if let Some((space, _)) = name.rsplit_once('.') {
            let space = space.trim_start_matches('.');
            let implied = self
                .deps
                .get(space)
                .and_then(|ns| strip_space(name, space).and_then(|id| ns.get(id)));
            if let Some(symbol) = implied {
                return Some(Rc::clone(symbol));
            }
        }

        self.deps.iter().find_map(|(space, ns)| {
            strip_space(name, space)
                .and_then(|id| ns.get(id))
                .map(Rc::clone)
        })
    }

    /// Resolve `name` and mark the file that declares it as referred.
    pub fn resolve_identifier(&mut self, name: &str) -> Result<Resolved> {
        let symbol = self.get(name).ok_or_else(|| Error::unresolved(name))?;

        let mut owner = None;
        if self.deps.contains_key(&symbol.space) {
            if let Some(reference) = self.ref_pkgs.get_mut(&symbol.scope) {
                reference.referred = true;
                owner = Some(reference.model);
            }
        }
        if owner.is_none() && symbol.scope == self.main_pkg.include_path {
            self.main_pkg.referred = true;
            owner = Some(self.main_pkg.model);
        }

        let ty = match owner {
            Some(model) => symbol.ty.with_scope(Scope::Model(model)),
            None => symbol.ty.clone(),
        };
        Ok(Resolved { symbol, ty })
    }

    /// Semantic type of `field`, declared in a message whose nested types
    /// are `nested`.
    pub fn resolve_type(
        &mut self,
        field: &FieldDescriptor,
        nested: &[DescriptorProto],
    ) -> Result<Type> {
        if let Some(base) = self.base_type(field, nested)? {
            return Ok(base);
        }
        let resolved = self.resolve_identifier(&field.type_name)?;
        Ok(wrap_repeated(resolved.ty, field))
    }

    fn base_type(
        &mut self,
        field: &FieldDescriptor,
        nested: &[DescriptorProto],
    ) -> Result<Option<Type>> {
        if let Some(scalar) = types::scalar(field.r#type) {
            return Ok(Some(wrap_repeated(scalar.clone(), field)));
        }

        let entry_name = split_package_name(&field.type_name);
        let entry = nested
            .iter()
            .find(|nt| nt.name == entry_name && nt.is_map_entry());
        if let Some(entry) = entry {
            let key = self.resolve_type(&entry.field[0], &entry.nested_type)?;
            let value = self.resolve_type(&entry.field[1], &entry.nested_type)?;
            return Ok(Some(Type::map_of(key, value)));
        }
        Ok(None)
    }

    /// References to emit as imports, then clear every referred flag.
    ///
    /// With `all` every import is returned, otherwise only those referred
    /// since the last export. `need_main` adds the main file on the same terms.
    pub fn export_referred(&mut self, all: bool, need_main: bool) -> Vec<PackageReference> {
        let mut refs = Vec::new();
        for reference in self.ref_pkgs.values_mut() {
            if all || reference.referred {
                refs.push(reference.clone());
            }
            reference.referred = false;
        }
        if need_main && (all || self.main_pkg.referred) {
            refs.push(self.main_pkg.clone());
        }
        self.main_pkg.referred = false;
        refs
    }

    /// Model of an import by descriptor name; empty means the main file.
    pub fn ref_model(&self, include: &str) -> Result<ModelId> {
        if include.is_empty() {
            return Ok(self.main_pkg.model);
        }
        self.ref_pkgs
            .get(include)
            .map(|reference| reference.model)
            .ok_or_else(|| {
                Box::new(Error::UnknownFile {
                    name: include.to_string(),
                })
            })
    }

    pub fn main_file(&self) -> &'a FileDescriptor {
        self.main
    }

    pub fn main_reference(&self) -> &PackageReference {
        &self.main_pkg
    }

    pub fn references(&self) -> impl Iterator<Item = &PackageReference> {
        self.ref_pkgs.values()
    }

    pub fn root(&self) -> &Namespace {
        &self.root
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Namespace of an imported package.
    pub fn dependency(&self, package: &str) -> Option<&Namespace> {
        self.deps.get(package)
    }
}

fn lookup<'f>(
    files: &'f DescriptorSet,
    main: &FileDescriptor,
    dependency: &str,
) -> Result<&'f FileDescriptor> {
    files.get(dependency).ok_or_else(|| {
        Box::new(Error::UnknownDependency {
            file: main.name.clone(),
            dependency: dependency.to_string(),
        })
    })
}

/// Name relative to `space`, if `name` is `.space.<rest>` (or `.<rest>` for
/// the empty package).
fn strip_space<'n>(name: &'n str, space: &str) -> Option<&'n str> {
    let rest = name.strip_prefix('.')?;
    if space.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(space)?.strip_prefix('.')
}

fn wrap_repeated(ty: Type, field: &FieldDescriptor) -> Type {
    if field.is_repeated() {
        Type::list_of(ty)
    } else {
        ty
    }
}

#[cfg(test)]
mod tests {
    use kiln_descriptor::{EnumDescriptor, FieldType, ServiceDescriptor};

    use super::*;
    use crate::{
        error::Error,
        model::{Category, Kind, Model},
    };

    fn money() -> FileDescriptor {
        FileDescriptor::new("common/money.proto")
            .package("common")
            .go_package("example/gen/common")
            .message(DescriptorProto::new("Money"))
            .enumeration(EnumDescriptor::new("Currency").value("USD", 0))
    }

    fn pay() -> FileDescriptor {
        FileDescriptor::new("pay/api.proto")
            .package("pay")
            .go_package("example/pay")
            .import("common/money.proto")
            .message(
                DescriptorProto::new("Order")
                    .field(FieldDescriptor::message("total", 1, ".common.Money"))
                    .field(FieldDescriptor::scalar("tags", 2, FieldType::String).repeated())
                    .field(FieldDescriptor::message("labels", 3, ".pay.Order.LabelsEntry").repeated())
                    .field(FieldDescriptor::message("items", 4, ".pay.Order.Item").repeated())
                    .nested(
                        DescriptorProto::new("LabelsEntry")
                            .field(FieldDescriptor::scalar("key", 1, FieldType::String))
                            .field(FieldDescriptor::message("value", 2, ".common.Money")),
                    )
                    .nested(DescriptorProto::new("Item")),
            )
            .service(ServiceDescriptor::new("PayService"))
    }

    struct Fixture {
        set: DescriptorSet,
        graph: ModelGraph,
    }

    impl Fixture {
        fn new(files: Vec<FileDescriptor>) -> Self {
            Self {
                set: DescriptorSet::new(files),
                graph: ModelGraph::new(),
            }
        }

        fn resolver(&mut self, main: &str) -> Resolver<'_> {
            let file = self.set.get(main).unwrap();
            let model = self
                .graph
                .intern(main, || PackageRules::default().model(file));
            let mut resolver =
                Resolver::new(file, &self.set, model, &mut self.graph, &PackageRules::default())
                    .unwrap();
            resolver.load_all().unwrap();
            resolver
        }
    }

    #[test]
    fn test_get_round_trips_root_symbols() {
        let mut fixture = Fixture::new(vec![money(), pay()]);
        let resolver = fixture.resolver("pay/api.proto");

        for (key, symbol) in resolver.root().iter() {
            let found = resolver.get(&format!(".pay.{key}")).unwrap();
            assert!(Rc::ptr_eq(&found, symbol), "{key}");
        }
    }

    #[test]
    fn test_get_respects_package_segments() {
        let mut fixture = Fixture::new(vec![money(), pay()]);
        let resolver = fixture.resolver("pay/api.proto");

        assert!(resolver.get(".pay.Order").is_some());
        assert!(resolver.get(".other.Order").is_none());
        assert!(resolver.get(".payment.Order").is_none());
        assert_eq!(resolver.get(".common.Money").unwrap().scope, "common/money.proto");
    }

    #[test]
    fn test_get_nested_name_in_dependency() {
        let nested = FileDescriptor::new("common/money.proto")
            .package("common")
            .message(DescriptorProto::new("Money").nested(DescriptorProto::new("Cents")));
        let mut fixture = Fixture::new(vec![nested, pay()]);
        let resolver = fixture.resolver("pay/api.proto");

        assert_eq!(resolver.get(".common.Money.Cents").unwrap().name, "Money_Cents");
    }

    #[test]
    fn test_empty_root_package() {
        let bare = FileDescriptor::new("bare.proto").message(DescriptorProto::new("Thing"));
        let mut fixture = Fixture::new(vec![bare]);
        let resolver = fixture.resolver("bare.proto");

        assert_eq!(resolver.get(".Thing").unwrap().name, "Thing");
    }

    #[test]
    fn test_same_package_imports_are_left_biased() {
        let first = FileDescriptor::new("common/a.proto")
            .package("common")
            .message(DescriptorProto::new("Money"));
        let second = FileDescriptor::new("common/b.proto")
            .package("common")
            .message(DescriptorProto::new("Money"));
        let main = FileDescriptor::new("main.proto")
            .package("main")
            .import("common/a.proto")
            .import("common/b.proto");
        let mut fixture = Fixture::new(vec![first, second, main]);
        let resolver = fixture.resolver("main.proto");

        assert_eq!(resolver.get(".common.Money").unwrap().scope, "common/a.proto");
    }

    #[test]
    fn test_resolve_type_scalars_and_lists() {
        let mut fixture = Fixture::new(vec![money(), pay()]);
        let mut resolver = fixture.resolver("pay/api.proto");
        let file = pay();
        let order = &file.message_type[0];

        let tags = resolver.resolve_type(&order.field[1], &order.nested_type).unwrap();
        assert_eq!(tags.category(), Category::List);
        assert_eq!(tags.elements()[0].name(), "string");

        let items = resolver.resolve_type(&order.field[3], &order.nested_type).unwrap();
        let single = resolver
            .resolve_identifier(".pay.Order.Item")
            .unwrap()
            .ty;
        assert_eq!(items.category(), Category::List);
        assert_eq!(items.elements(), &[single]);
    }

    #[test]
    fn test_resolve_type_map_entry() {
        let mut fixture = Fixture::new(vec![money(), pay()]);
        let mut resolver = fixture.resolver("pay/api.proto");
        let file = pay();
        let order = &file.message_type[0];

        let labels = resolver.resolve_type(&order.field[2], &order.nested_type).unwrap();

        assert_eq!(labels.category(), Category::Map);
        assert_eq!(labels.kind(), Kind::Map);
        assert_eq!(labels.elements()[0].name(), "string");
        assert_eq!(labels.elements()[1].name(), "Money");
    }

    #[test]
    fn test_resolve_binds_scope_without_touching_symbol() {
        let mut fixture = Fixture::new(vec![money(), pay()]);
        let mut resolver = fixture.resolver("pay/api.proto");
        let money_model = resolver.ref_model("common/money.proto").unwrap();

        let resolved = resolver.resolve_identifier(".common.Money").unwrap();

        assert_eq!(resolved.ty.scope(), Scope::Model(money_model));
        assert_eq!(resolved.symbol.ty.scope(), Scope::Unbound);
    }

    #[test]
    fn test_unresolved_identifier() {
        let mut fixture = Fixture::new(vec![money(), pay()]);
        let mut resolver = fixture.resolver("pay/api.proto");

        let err = resolver.resolve_identifier(".other.Money").unwrap_err();
        assert!(matches!(*err, Error::UnresolvedIdentifier { ref name } if name == ".other.Money"));
    }

    #[test]
    fn test_export_referred_resets_flags() {
        let mut fixture = Fixture::new(vec![money(), pay()]);
        let mut resolver = fixture.resolver("pay/api.proto");

        assert!(resolver.export_referred(false, true).is_empty());

        resolver.resolve_identifier(".common.Money").unwrap();
        resolver.resolve_identifier(".pay.Order").unwrap();
        let refs = resolver.export_referred(false, true);
        let paths: Vec<_> = refs.iter().map(|r| r.include_path.as_str()).collect();
        assert_eq!(paths, ["common/money.proto", "pay/api.proto"]);

        assert!(resolver.export_referred(false, true).is_empty());
        assert_eq!(resolver.export_referred(true, false).len(), 1);
    }

    #[test]
    fn test_unknown_dependency() {
        let set = DescriptorSet::new(vec![pay()]);
        let mut graph = ModelGraph::new();
        let main = set.get("pay/api.proto").unwrap();
        let model = graph.add(Model::new("pay/api.proto", "example/pay"));

        let err = Resolver::new(main, &set, model, &mut graph, &PackageRules::default()).unwrap_err();
        assert!(matches!(*err, Error::UnknownDependency { ref dependency, .. } if dependency == "common/money.proto"));
    }

    #[test]
    fn test_aliases_are_unique_per_resolver() {
        let theirs = FileDescriptor::new("x/pay.proto")
            .package("x.pay")
            .go_package("x/pay")
            .message(DescriptorProto::new("Other"));
        let main = pay().import("x/pay.proto");
        let mut fixture = Fixture::new(vec![money(), theirs, main]);
        let resolver = fixture.resolver("pay/api.proto");

        assert_eq!(resolver.main_reference().alias, "pay");
        let aliases: Vec<_> = resolver.references().map(|r| r.alias.as_str()).collect();
        assert_eq!(aliases, ["common", "pay0"]);
    }

    #[test]
    fn test_ref_model_shared_across_resolvers() {
        let other = FileDescriptor::new("shop/api.proto")
            .package("shop")
            .import("common/money.proto");
        let mut fixture = Fixture::new(vec![money(), pay(), other]);
        let first = fixture.resolver("pay/api.proto").ref_model("common/money.proto").unwrap();
        let second = fixture.resolver("shop/api.proto").ref_model("common/money.proto").unwrap();

        assert_eq!(first, second);
        assert!(fixture.resolver("shop/api.proto").ref_model("missing.proto").is_err());
    }
}
