use serde::{Deserialize, Serialize};

use crate::{DescriptorProto, EnumDescriptor, ServiceDescriptor};

/// A set of descriptor files, as emitted by `buf build`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DescriptorSet {
    pub file: Vec<FileDescriptor>,
    /// Files requested for generation; absent in plain descriptor sets.
    pub file_to_generate: Vec<String>,
}

impl DescriptorSet {
    pub fn new(files: impl IntoIterator<Item = FileDescriptor>) -> Self {
        Self {
            file: files.into_iter().collect(),
            file_to_generate: Vec::new(),
        }
    }

    /// Parse a protobuf-JSON encoded descriptor set.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Look up a file by its descriptor name (e.g. `pay/api.proto`).
    pub fn get(&self, name: &str) -> Option<&FileDescriptor> {
        self.file.iter().find(|f| f.name == name)
    }

    /// The primary file: the last one requested for generation, or the last
    /// file of the set when nothing was requested explicitly.
    pub fn main_file(&self) -> Option<&FileDescriptor> {
        match self.file_to_generate.last() {
            Some(name) => self.get(name),
            None => self.file.last(),
        }
    }
}

/// One parsed schema file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileDescriptor {
    pub name: String,
    pub package: String,
    pub dependency: Vec<String>,
    pub message_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptor>,
    pub service: Vec<ServiceDescriptor>,
    pub options: Option<FileOptions>,
    pub syntax: Option<String>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn go_package(mut self, go_package: impl Into<String>) -> Self {
        self.options.get_or_insert_with(FileOptions::default).go_package = Some(go_package.into());
        self
    }

    pub fn import(mut self, dependency: impl Into<String>) -> Self {
        self.dependency.push(dependency.into());
        self
    }

    pub fn message(mut self, message: DescriptorProto) -> Self {
        self.message_type.push(message);
        self
    }

    pub fn enumeration(mut self, e: EnumDescriptor) -> Self {
        self.enum_type.push(e);
        self
    }

    pub fn service(mut self, service: ServiceDescriptor) -> Self {
        self.service.push(service);
        self
    }

    /// The `go_package` option with any `;alias` suffix removed.
    pub fn go_package_option(&self) -> Option<&str> {
        let raw = self.options.as_ref()?.go_package.as_deref()?;
        let path = raw.split(';').next().unwrap_or(raw).trim();
        (!path.is_empty()).then_some(path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileOptions {
    pub go_package: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldLabel, FieldType};

    const BUF_JSON: &str = r#"{
      "file": [
        {
          "name": "common/money.proto",
          "package": "common",
          "messageType": [
            {"name": "Money", "field": [
              {"name": "units", "number": 1, "label": "LABEL_OPTIONAL", "type": "TYPE_INT64", "jsonName": "units"}
            ]}
          ],
          "options": {"goPackage": "example/pay/common;common"}
        },
        {
          "name": "pay/api.proto",
          "package": "pay",
          "dependency": ["common/money.proto"],
          "messageType": [
            {"name": "Order", "field": [
              {"name": "amount", "number": 1, "label": "LABEL_OPTIONAL", "type": "TYPE_MESSAGE", "typeName": ".common.Money", "jsonName": "amount"},
              {"name": "tags", "number": 2, "label": "LABEL_REPEATED", "type": "TYPE_STRING", "jsonName": "tags"}
            ]}
          ],
          "service": [
            {"name": "PayService", "method": [
              {"name": "Charge", "inputType": ".pay.Order", "outputType": ".pay.Order"}
            ]}
          ]
        }
      ],
      "fileToGenerate": ["pay/api.proto"]
    }"#;

    #[test]
    fn test_parse_buf_json() {
        let set = DescriptorSet::from_json(BUF_JSON).unwrap();

        assert_eq!(set.file.len(), 2);
        let main = set.main_file().unwrap();
        assert_eq!(main.name, "pay/api.proto");
        assert_eq!(main.dependency, vec!["common/money.proto"]);

        let order = &main.message_type[0];
        assert_eq!(order.field[0].r#type, FieldType::Message);
        assert_eq!(order.field[0].type_name, ".common.Money");
        assert_eq!(order.field[1].label, FieldLabel::Repeated);
        assert_eq!(main.service[0].method[0].input_type, ".pay.Order");
    }

    #[test]
    fn test_go_package_option_strips_alias() {
        let set = DescriptorSet::from_json(BUF_JSON).unwrap();
        let money = set.get("common/money.proto").unwrap();

        assert_eq!(money.go_package_option(), Some("example/pay/common"));
        assert_eq!(set.get("pay/api.proto").unwrap().go_package_option(), None);
    }

    #[test]
    fn test_main_file_falls_back_to_last() {
        let set = DescriptorSet::new([FileDescriptor::new("a.proto"), FileDescriptor::new("b.proto")]);
        assert_eq!(set.main_file().unwrap().name, "b.proto");
    }
}
