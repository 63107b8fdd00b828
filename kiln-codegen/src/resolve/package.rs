use std::collections::HashMap;

use kiln_descriptor::FileDescriptor;

use crate::model::{Model, ModelId};

/// A schema file reachable from the file being generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    /// File name without directory and `.proto` extension.
    pub include_base: String,
    /// Descriptor name of the file, e.g. `common/money.proto`.
    pub include_path: String,
    /// Import alias, unique within one resolver.
    pub alias: String,
    /// Model that will hold the file's declarations.
    pub model: ModelId,
    /// Set once a resolution lands in this file; cleared by export.
    pub referred: bool,
}

/// How schema files map to output packages.
#[derive(Debug, Clone, Default)]
pub struct PackageRules {
    /// Descriptor name to output package overrides.
    pub package_map: HashMap<String, String>,
    /// Prefix stripped from `go_package` options.
    pub trim_prefix: String,
}

impl PackageRules {
    /// Output package of a schema file.
    ///
    /// An explicit entry in `package_map` wins over the file's `go_package`
    /// option (less `trim_prefix`), which wins over the schema package with
    /// dots turned into slashes.
    pub fn go_package(&self, file: &FileDescriptor) -> String {
        if let Some(package) = self.package_map.get(&file.name) {
            return package.clone();
        }
        match file.go_package_option() {
            Some(package) if is_well_known(file) => package.to_string(),
            Some(package) => {
                let trimmed = package
                    .strip_prefix(self.trim_prefix.as_str())
                    .filter(|_| !self.trim_prefix.is_empty())
                    .unwrap_or(package)
                    .trim_start_matches('/');
                if trimmed.is_empty() {
                    file.package.replace('.', "/")
                } else {
                    trimmed.to_string()
                }
            }
            None => file.package.replace('.', "/"),
        }
    }

    /// The model that will hold `file`, before the emitter places it.
    pub fn model(&self, file: &FileDescriptor) -> Model {
        let mut model = Model::new(&file.name, self.go_package(file));
        model.external = is_well_known(file);
        model
    }
}

/// Well-known types ship with their own generated Go packages.
pub fn is_well_known(file: &FileDescriptor) -> bool {
    file.package.starts_with("google.protobuf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_package_precedence() {
        let file = FileDescriptor::new("common/money.proto")
            .package("acme.common")
            .go_package("example/gen/common;common");
        let mut rules = PackageRules::default();

        assert_eq!(rules.go_package(&file), "example/gen/common");

        rules
            .package_map
            .insert("common/money.proto".to_string(), "example/override".to_string());
        assert_eq!(rules.go_package(&file), "example/override");

        let plain = FileDescriptor::new("plain.proto").package("acme.plain");
        assert_eq!(PackageRules::default().go_package(&plain), "acme/plain");
    }

    #[test]
    fn test_trim_prefix() {
        let file = FileDescriptor::new("common/money.proto")
            .package("acme.common")
            .go_package("github.com/acme/idl/common");
        let rules = PackageRules {
            trim_prefix: "github.com/acme/idl".into(),
            ..PackageRules::default()
        };

        assert_eq!(rules.go_package(&file), "common");

        let other = FileDescriptor::new("x.proto").package("x").go_package("example/x");
        assert_eq!(rules.go_package(&other), "example/x");
    }

    #[test]
    fn test_well_known_models_are_external() {
        let empty = FileDescriptor::new("google/protobuf/empty.proto")
            .package("google.protobuf")
            .go_package("google.golang.org/protobuf/types/known/emptypb");
        let rules = PackageRules {
            trim_prefix: "google.golang.org".into(),
            ..PackageRules::default()
        };

        let model = rules.model(&empty);

        assert!(model.external);
        assert_eq!(model.package, "google.golang.org/protobuf/types/known/emptypb");
        assert_eq!(model.package_name, "emptypb");
        assert!(!rules.model(&FileDescriptor::new("a.proto").package("a")).external);
    }
}
