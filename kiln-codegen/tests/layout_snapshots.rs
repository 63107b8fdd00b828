//! Snapshot tests for the built-in templates.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use kiln_codegen::{
    LayoutGenerator, LayoutOptions, PackageGenerator, PackageOptions,
};
use kiln_core::GeneratedFile;
use kiln_descriptor::{
    DescriptorProto, DescriptorSet, EnumDescriptor, FieldDescriptor, FieldType, FileDescriptor,
};
use tempfile::TempDir;

fn layout_files() -> Vec<GeneratedFile> {
    let temp = TempDir::new().unwrap();
    let mut layout = LayoutGenerator::new(LayoutOptions {
        output_dir: temp.path().to_path_buf(),
        service_name: "pay".into(),
        go_module: "example/pay".into(),
        ..LayoutOptions::default()
    })
    .unwrap();
    layout.generate().unwrap();
    layout.take_files()
}

fn get_file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path == path)
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| panic!("{path} not generated"))
}

#[test]
fn test_default_layout_files() {
    let files = layout_files();

    let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, ["go.mod", ".gitignore", "build.sh", "script/bootstrap.sh"]);
    assert!(get_file(&files, "build.sh").contains("pay"));
    assert!(get_file(&files, "go.mod").contains("example/pay"));
}

#[test]
fn test_default_build_script() {
    let files = layout_files();
    insta::assert_snapshot!("default_build_sh", get_file(&files, "build.sh"));
}

#[test]
fn test_default_bootstrap_script() {
    let files = layout_files();
    insta::assert_snapshot!("default_bootstrap_sh", get_file(&files, "script/bootstrap.sh"));
}

#[test]
fn test_default_go_mod() {
    let files = layout_files();
    insta::assert_snapshot!("default_go_mod", get_file(&files, "go.mod"));
}

#[test]
fn test_model_file() {
    let set = DescriptorSet::new(vec![
        FileDescriptor::new("pay/api.proto")
            .package("pay")
            .go_package("pay")
            .enumeration(EnumDescriptor::new("Status").value("OK", 0).value("FAILED", 1))
            .message(
                DescriptorProto::new("Order")
                    .field(FieldDescriptor::scalar("order_id", 1, FieldType::String))
                    .field(FieldDescriptor::scalar("total", 2, FieldType::Int64)),
            ),
    ]);
    let temp = TempDir::new().unwrap();
    let generator = PackageGenerator::new(PackageOptions {
        output_dir: temp.path().to_path_buf(),
        service_name: "pay".into(),
        go_module: "example/pay".into(),
        ..PackageOptions::default()
    });

    let out = generator.generate(&set).unwrap();

    insta::assert_snapshot!("model_go", get_file(&out.files, "biz/model/pay/api.go"));
}
