//! Report of a generating command.

use std::path::PathBuf;

use kiln_codegen::{FileStatus, PersistedFile, pipeline::Diagnostic};

use super::output::{Output, Report};

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    /// Main schema file, when a package was generated.
    pub idl: Option<String>,
    pub list_only: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub files: Vec<PersistedFile>,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        for diag in self.diagnostics.iter().filter(|d| d.severity.is_warning()) {
            match &diag.location {
                Some(location) => out.warning(&format!("{location}: {}", diag.message)),
                None => out.warning(&diag.message),
            }
        }

        if let Some(idl) = &self.idl {
            out.entry("Schema", idl);
        }
        out.entry("Output", &self.output_dir.display().to_string());

        let written = if self.list_only { "Would write" } else { "Written" };
        let groups: [(&str, &[FileStatus]); 2] = [
            (written, &[FileStatus::Written, FileStatus::Listed]),
            ("Unchanged", &[FileStatus::Skipped, FileStatus::Excluded]),
        ];
        for (heading, statuses) in groups {
            let mut files = self
                .files
                .iter()
                .filter(|f| statuses.contains(&f.status))
                .peekable();
            if files.peek().is_none() {
                continue;
            }
            out.blank();
            out.heading(heading);
            for file in files {
                out.file(file.status, &file.path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorded(Vec<String>);

    impl Output for Recorded {
        fn heading(&mut self, name: &str) {
            self.0.push(format!("[{name}]"));
        }
        fn entry(&mut self, key: &str, value: &str) {
            self.0.push(format!("{key}={value}"));
        }
        fn file(&mut self, status: FileStatus, path: &str) {
            self.0.push(format!("{status:?} {path}"));
        }
        fn warning(&mut self, msg: &str) {
            self.0.push(format!("!{msg}"));
        }
        fn blank(&mut self) {}
    }

    fn file(path: &str, status: FileStatus) -> PersistedFile {
        PersistedFile {
            path: path.into(),
            status,
        }
    }

    #[test]
    fn test_render_written_and_skipped() {
        let report = GenerateReport {
            output_dir: PathBuf::from("out"),
            idl: Some("pay/api.proto".into()),
            diagnostics: vec![
                Diagnostic::warning("persist", "file exists").at("go.mod"),
                Diagnostic::info("validate", "no go_package"),
            ],
            files: vec![
                file("biz/model/pay/api.go", FileStatus::Written),
                file("go.mod", FileStatus::Skipped),
            ],
            ..GenerateReport::default()
        };
        let mut out = Recorded::default();

        report.render(&mut out);

        assert_eq!(
            out.0,
            [
                "!go.mod: file exists",
                "Schema=pay/api.proto",
                "Output=out",
                "[Written]",
                "Written biz/model/pay/api.go",
                "[Unchanged]",
                "Skipped go.mod",
            ]
        );
    }

    #[test]
    fn test_render_list_only() {
        let report = GenerateReport {
            output_dir: PathBuf::from("."),
            list_only: true,
            files: vec![file("go.mod", FileStatus::Listed)],
            ..GenerateReport::default()
        };
        let mut out = Recorded::default();

        report.render(&mut out);

        assert_eq!(out.0, ["Output=.", "[Would write]", "Listed go.mod"]);
    }
}
