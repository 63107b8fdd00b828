//! Generate operations - render a layout and packages, then persist them.

use std::path::PathBuf;

use kiln_codegen::{
    FileStatus, LayoutGenerator, LayoutOptions, PackageGenerator, PackageOptions, Persister,
    Result,
};
use kiln_descriptor::DescriptorSet;
use tracing::warn;

use crate::reports::GenerateReport;

/// Where and how rendered files are persisted.
pub struct Settings {
    pub output_dir: PathBuf,
    /// Paths never written, relative to the output directory.
    pub excludes: Vec<String>,
    /// Report what would be written without writing.
    pub list_only: bool,
}

impl Settings {
    fn persister(&self) -> Persister {
        Persister::new(&self.output_dir)
            .excludes(self.excludes.iter().cloned())
            .list_only(self.list_only)
    }

    fn report(&self) -> GenerateReport {
        GenerateReport {
            output_dir: self.output_dir.clone(),
            list_only: self.list_only,
            ..GenerateReport::default()
        }
    }
}

/// A descriptor set and the package to generate from it.
pub struct PackageRequest {
    pub set: DescriptorSet,
    pub options: PackageOptions,
}

/// Execute the new operation.
///
/// Writes the project layout, then the package when one is requested. When
/// the package fails and every layout file was freshly written, the layout
/// is removed again.
pub fn new_project(
    settings: &Settings,
    layout: LayoutOptions,
    package: Option<PackageRequest>,
) -> Result<GenerateReport> {
    let persister = settings.persister();
    let mut report = settings.report();

    let mut layout = LayoutGenerator::new(layout)?;
    layout.generate()?;
    persister.create_dirs(layout.dirs())?;
    let written = persister.persist(layout.files(), &mut report.diagnostics)?;
    let fresh = !settings.list_only && written.iter().all(|f| f.status == FileStatus::Written);
    report.files.extend(written);

    let Some(request) = package else {
        return Ok(report);
    };
    if let Err(err) = persist_package(&persister, request, &mut report) {
        if fresh {
            warn!("package generation failed, removing the new layout");
            layout.degenerate()?;
        }
        return Err(err);
    }
    Ok(report)
}

/// Execute the update operation: regenerate the package of an existing
/// project.
pub fn generate_package(settings: &Settings, request: PackageRequest) -> Result<GenerateReport> {
    let persister = settings.persister();
    let mut report = settings.report();
    persist_package(&persister, request, &mut report)?;
    Ok(report)
}

fn persist_package(
    persister: &Persister,
    request: PackageRequest,
    report: &mut GenerateReport,
) -> Result<()> {
    let output = PackageGenerator::new(request.options).generate(&request.set)?;
    report.idl = Some(output.idl_name);
    report.diagnostics.extend(output.diagnostics);

    persister.create_dirs(output.dirs.iter().map(|(dir, existed)| (dir.as_str(), *existed)))?;
    let written = persister.persist(&output.files, &mut report.diagnostics)?;
    report.files.extend(written);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use kiln_codegen::template::{LayoutConfig, Template};
    use kiln_descriptor::{DescriptorProto, FieldDescriptor, FieldType, FileDescriptor};
    use tempfile::TempDir;

    use super::*;

    fn settings(dir: &Path) -> Settings {
        Settings {
            output_dir: dir.to_path_buf(),
            excludes: Vec::new(),
            list_only: false,
        }
    }

    fn layout(dir: &Path) -> LayoutOptions {
        LayoutOptions {
            output_dir: dir.to_path_buf(),
            service_name: "pay".into(),
            go_module: "example/pay".into(),
            ..LayoutOptions::default()
        }
    }

    fn request(dir: &Path, templates: Option<LayoutConfig>) -> PackageRequest {
        PackageRequest {
            set: DescriptorSet::new(vec![
                FileDescriptor::new("pay/api.proto")
                    .package("pay")
                    .go_package("pay")
                    .message(DescriptorProto::new("Order").field(FieldDescriptor::scalar(
                        "order_id",
                        1,
                        FieldType::String,
                    ))),
            ]),
            options: PackageOptions {
                output_dir: dir.to_path_buf(),
                service_name: "pay".into(),
                go_module: "example/pay".into(),
                templates,
                ..PackageOptions::default()
            },
        }
    }

    #[test]
    fn test_new_project_writes_layout_and_model() {
        let temp = TempDir::new().unwrap();

        let report = new_project(
            &settings(temp.path()),
            layout(temp.path()),
            Some(request(temp.path(), None)),
        )
        .unwrap();

        assert_eq!(report.idl.as_deref(), Some("pay/api.proto"));
        assert!(temp.path().join("go.mod").exists());
        assert!(temp.path().join("script/bootstrap.sh").exists());
        let model = fs::read_to_string(temp.path().join("biz/model/pay/api.go")).unwrap();
        assert!(model.contains("type Order struct"));
    }

    #[test]
    fn test_list_only_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            list_only: true,
            ..settings(temp.path())
        };

        let report = new_project(&settings, layout(temp.path()), None).unwrap();

        assert!(report.files.iter().all(|f| f.status == FileStatus::Listed));
        assert!(fs::read_dir(temp.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_failed_package_reverts_fresh_layout() {
        let temp = TempDir::new().unwrap();
        let broken = LayoutConfig {
            layouts: vec![Template::new("biz/handler.go", "{{ NoSuchFunction() }}")],
        };

        let err = new_project(
            &settings(temp.path()),
            layout(temp.path()),
            Some(request(temp.path(), Some(broken))),
        )
        .unwrap_err();

        assert!(matches!(*err, kiln_codegen::Error::TemplateExec { .. }));
        assert!(!temp.path().join("go.mod").exists());
        assert!(!temp.path().join("script").exists());
    }

    #[test]
    fn test_update_keeps_existing_layout() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example/pay\n").unwrap();

        let report = generate_package(&settings(temp.path()), request(temp.path(), None)).unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("go.mod")).unwrap(),
            "module example/pay\n"
        );
    }
}
