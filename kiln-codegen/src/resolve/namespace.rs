use std::rc::Rc;

use indexmap::IndexMap;
use kiln_core::base_name;
use kiln_descriptor::{DescriptorProto, EnumDescriptor, FileDescriptor};

use super::{Symbol, SymbolValue};
use crate::model::{
    Type,
    types::{self, SCALAR_KEYWORDS},
};

/// Symbols declared by one schema file (or several files sharing a package).
///
/// Keys are names relative to the package: `Order`, `Order.Item` for a
/// nested message, `STATUS_OK` for an enum value.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    symbols: IndexMap<String, Rc<Symbol>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A namespace holding only literal constants and scalar keywords.
    pub fn seeded(scope: &str) -> Self {
        let mut ns = Self::new();
        let literal = |name: &str, ty: &Type, value: SymbolValue| Symbol {
            name: name.to_string(),
            space: String::new(),
            is_value: true,
            ty: ty.clone(),
            value,
            scope: scope.to_string(),
        };

        ns.insert("true", literal("true", &types::BOOL, SymbolValue::Bool(true)));
        ns.insert("false", literal("false", &types::BOOL, SymbolValue::Bool(false)));
        ns.insert(
            r#""""#,
            literal(r#""""#, &types::STRING, SymbolValue::Str(String::new())),
        );

        for keyword in SCALAR_KEYWORDS {
            if let Some(ty) = types::scalar_keyword(keyword) {
                ns.insert(
                    keyword,
                    Symbol {
                        name: ty.name().to_string(),
                        space: String::new(),
                        is_value: false,
                        ty: ty.clone(),
                        value: SymbolValue::None,
                        scope: scope.to_string(),
                    },
                );
            }
        }
        ns
    }

    /// Build the namespace of a single file.
    pub fn load(file: &FileDescriptor) -> Self {
        let mut loader = Loader {
            ns: Self::seeded(&file.name),
            space: base_name(&file.package, "").to_string(),
            scope: file.name.clone(),
        };

        for e in &file.enum_type {
            loader.enumeration(e, "", "");
        }
        for m in &file.message_type {
            loader.message(m, "", "");
        }
        for s in &file.service {
            let name = loader.local_name(&s.name);
            loader.ns.insert(
                s.name.clone(),
                Symbol {
                    ty: Type::service(&name),
                    name,
                    space: loader.space.clone(),
                    is_value: false,
                    value: SymbolValue::Service(s.clone()),
                    scope: loader.scope.clone(),
                },
            );
        }
        loader.ns
    }

    /// Register `symbol` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, symbol: Symbol) -> Rc<Symbol> {
        let symbol = Rc::new(symbol);
        self.symbols.insert(key.into(), Rc::clone(&symbol));
        symbol
    }

    pub fn get(&self, key: &str) -> Option<&Rc<Symbol>> {
        self.symbols.get(key)
    }

    /// Union with `other`; on collision the symbol already present wins.
    pub fn merge(&mut self, other: Namespace) {
        for (key, symbol) in other.symbols {
            self.symbols.entry(key).or_insert(symbol);
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<Symbol>)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }
}

struct Loader {
    ns: Namespace,
    space: String,
    scope: String,
}

impl Loader {
    fn local_name(&self, name: &str) -> String {
        let qualified = format!(".{}.", self.space);
        name.strip_prefix(&qualified).unwrap_or(name).to_string()
    }

    fn enumeration(&mut self, e: &EnumDescriptor, key_prefix: &str, name_prefix: &str) {
        let name = format!("{name_prefix}{}", self.local_name(&e.name));
        self.ns.insert(
            format!("{key_prefix}{}", e.name),
            Symbol {
                ty: Type::enumeration(&name),
                name,
                space: self.space.clone(),
                is_value: false,
                value: SymbolValue::Enum(e.clone()),
                scope: self.scope.clone(),
            },
        );

        for v in &e.value {
            self.ns.insert(
                format!("{key_prefix}{}", v.name),
                Symbol {
                    name: self.local_name(&v.name),
                    space: self.space.clone(),
                    is_value: true,
                    ty: types::INT.with_category(crate::model::Category::Enum),
                    value: SymbolValue::EnumValue(v.clone()),
                    scope: self.scope.clone(),
                },
            );
        }
    }

    fn message(&mut self, m: &DescriptorProto, key_prefix: &str, name_prefix: &str) {
        let key = format!("{key_prefix}{}", m.name);
        let name = format!("{name_prefix}{}", self.local_name(&m.name));
        self.ns.insert(
            key.clone(),
            Symbol {
                ty: Type::structure(&name),
                name: name.clone(),
                space: self.space.clone(),
                is_value: false,
                value: SymbolValue::Message(m.clone()),
                scope: self.scope.clone(),
            },
        );

        let key_prefix = format!("{key}.");
        let name_prefix = format!("{name}_");
        for nested in &m.nested_type {
            self.message(nested, &key_prefix, &name_prefix);
        }
        for e in &m.enum_type {
            self.enumeration(e, &key_prefix, &name_prefix);
        }
    }
}

#[cfg(test)]
mod tests {
    use kiln_descriptor::{FieldDescriptor, FieldType, ServiceDescriptor};

    use super::*;
    use crate::model::{Category, Kind};

    fn pay_file() -> FileDescriptor {
        FileDescriptor::new("pay/api.proto")
            .package("pay")
            .enumeration(EnumDescriptor::new("Status").value("OK", 0).value("FAILED", 1))
            .message(
                DescriptorProto::new("Order")
                    .field(FieldDescriptor::scalar("id", 1, FieldType::String))
                    .nested(DescriptorProto::new("Item"))
                    .enumeration(EnumDescriptor::new("Kind").value("DIGITAL", 0)),
            )
            .service(ServiceDescriptor::new("PayService"))
    }

    #[test]
    fn test_seeded_namespace() {
        let ns = Namespace::seeded("a.proto");

        assert_eq!(ns.len(), 18);
        assert_eq!(ns.get("sfixed64").unwrap().ty.name(), "int64");
        assert_eq!(ns.get("true").unwrap().value, SymbolValue::Bool(true));
        assert!(ns.get(r#""""#).unwrap().is_value);
    }

    #[test]
    fn test_load_registers_declarations() {
        let ns = Namespace::load(&pay_file());

        let status = ns.get("Status").unwrap();
        assert_eq!(status.ty.category(), Category::Enum);
        assert_eq!(status.space, "pay");
        assert_eq!(status.scope, "pay/api.proto");

        let ok = ns.get("OK").unwrap();
        assert!(ok.is_value);
        assert_eq!(ok.ty.kind(), Kind::Int);
        assert_eq!(ok.ty.category(), Category::Enum);

        let item = ns.get("Order.Item").unwrap();
        assert_eq!(item.name, "Order_Item");
        assert_eq!(item.ty.name(), "Order_Item");

        let kind = ns.get("Order.Kind").unwrap();
        assert_eq!(kind.name, "Order_Kind");
        assert!(ns.get("Order.DIGITAL").unwrap().is_value);

        assert_eq!(ns.get("PayService").unwrap().ty.category(), Category::Service);
    }

    #[test]
    fn test_merge_is_left_biased() {
        let first = FileDescriptor::new("common/a.proto")
            .package("common")
            .message(DescriptorProto::new("Money"))
            .message(DescriptorProto::new("OnlyA"));
        let second = FileDescriptor::new("common/b.proto")
            .package("common")
            .message(DescriptorProto::new("Money"))
            .message(DescriptorProto::new("OnlyB"));

        let mut merged = Namespace::load(&first);
        let kept = Rc::clone(merged.get("Money").unwrap());
        merged.merge(Namespace::load(&second));

        assert!(Rc::ptr_eq(merged.get("Money").unwrap(), &kept));
        assert_eq!(merged.get("Money").unwrap().scope, "common/a.proto");
        assert_eq!(merged.get("OnlyB").unwrap().scope, "common/b.proto");
        assert!(merged.get("OnlyA").is_some());
    }
}
