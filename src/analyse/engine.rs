//! Built-in batch engine: reports files that fail to parse.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::syntax::{SyntaxError, SyntaxIndex};

use super::{BatchAnalyser, Diagnostic};

/// Parses every file through a [`SyntaxIndex`].
///
/// Successful parses stay in the index's cache.
pub struct SyntaxCheckAnalyser {
    index: Arc<dyn SyntaxIndex>,
}

impl SyntaxCheckAnalyser {
    pub fn new(index: Arc<dyn SyntaxIndex>) -> Self {
        Self { index }
    }
}

impl BatchAnalyser for SyntaxCheckAnalyser {
    fn analyse(&self, files: &[PathBuf], on_file_done: &mut dyn FnMut()) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for file in files {
            if let Err(e) = self.index.parse_file(file) {
                tracing::debug!("{}", e);
                diagnostics.push(to_diagnostic(file, e));
            }
            on_file_done();
        }

        diagnostics
    }
}

fn to_diagnostic(file: &Path, error: SyntaxError) -> Diagnostic {
    let file = file.display().to_string();
    match error {
        SyntaxError::Invalid { line, .. } => {
            Diagnostic::new("Syntax error, unexpected input", file, Some(line))
        }
        SyntaxError::Io { source, .. } => {
            Diagnostic::new(format!("Could not read file: {}", source), file, None)
        }
        other => Diagnostic::new(other.to_string(), file, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::PhpSyntaxIndex;
    use tempfile::TempDir;

    #[test]
    fn test_reports_syntax_errors_and_advances_per_file() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.php");
        let bad = temp.path().join("bad.php");
        std::fs::write(&good, "<?php\nclass Good { public function f() {} }\n").unwrap();
        std::fs::write(&bad, "<?php\n\nclass Bad {\n    public function f( {\n}\n").unwrap();

        let analyser = SyntaxCheckAnalyser::new(Arc::new(PhpSyntaxIndex::new()));
        let mut done = 0;
        let diagnostics = analyser.analyse(&[good, bad.clone()], &mut || done += 1);

        assert_eq!(done, 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].file, bad.display().to_string());
        assert_eq!(diagnostics[0].message, "Syntax error, unexpected input");
        assert!(diagnostics[0].line.is_some());
    }

    #[test]
    fn test_unreadable_file() {
        let analyser = SyntaxCheckAnalyser::new(Arc::new(PhpSyntaxIndex::new()));
        let missing = PathBuf::from("/nonexistent/gone.php");
        let diagnostics = analyser.analyse(&[missing], &mut || {});

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("Could not read file"));
        assert_eq!(diagnostics[0].line, None);
    }
}
