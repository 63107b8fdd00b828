//! Where reports are rendered.

use kiln_codegen::FileStatus;

/// Render target of a [`Report`].
///
/// Reports say what happened to which file; the target picks markers and
/// streams.
pub trait Output {
    fn heading(&mut self, name: &str);

    fn entry(&mut self, key: &str, value: &str);

    /// One persisted file.
    fn file(&mut self, status: FileStatus, path: &str);

    fn warning(&mut self, msg: &str);

    fn blank(&mut self);
}

pub trait Report {
    fn render(&self, out: &mut dyn Output);
}

/// Plain text on stdout, warnings on stderr.
#[derive(Debug, Default)]
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

fn marker(status: FileStatus) -> char {
    match status {
        FileStatus::Written | FileStatus::Listed => '+',
        FileStatus::Skipped => '=',
        FileStatus::Excluded => '-',
    }
}

impl Output for TerminalOutput {
    fn heading(&mut self, name: &str) {
        println!("{name}:");
    }

    fn entry(&mut self, key: &str, value: &str) {
        println!("{key:<8}{value}");
    }

    fn file(&mut self, status: FileStatus, path: &str) {
        println!("  {} {path}", marker(status));
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("warning: {msg}");
    }

    fn blank(&mut self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(marker(FileStatus::Listed), '+');
        assert_eq!(marker(FileStatus::Skipped), '=');
        assert_eq!(marker(FileStatus::Excluded), '-');
    }
}
