//! Integration tests for the analysis driver.
//!
//! These run the built-in syntax check over the testdata fixtures and
//! verify file collection, grouped reporting and exit codes.

use std::path::PathBuf;
use std::sync::Arc;

use globset::{Glob, GlobSetBuilder};
use sigscan::analyse::{EXIT_FAILED, EXIT_SUCCESS};
use sigscan::{AnalysisDriver, PhpSyntaxIndex, ReportSink, SyntaxCheckAnalyser, SyntaxIndex};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join("php")
}

fn fixture(name: &str) -> String {
    fixtures().join(name).display().to_string()
}

#[derive(Default)]
struct Recorder {
    progress_total: Option<usize>,
    advanced: usize,
    finished: bool,
    success: Option<String>,
    tables: Vec<(String, Vec<(String, String)>)>,
    error: Option<String>,
}

impl ReportSink for Recorder {
    fn progress_start(&mut self, total: usize) {
        self.progress_total = Some(total);
    }

    fn progress_advance(&mut self) {
        self.advanced += 1;
    }

    fn progress_finish(&mut self) {
        self.finished = true;
    }

    fn success(&mut self, message: &str) {
        self.success = Some(message.to_string());
    }

    fn table(&mut self, header: (&str, &str), rows: &[(String, String)]) {
        assert_eq!(header.0, "Line");
        self.tables.push((header.1.to_string(), rows.to_vec()));
    }

    fn error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}

fn syntax_driver() -> AnalysisDriver<SyntaxCheckAnalyser> {
    let index: Arc<dyn SyntaxIndex> = Arc::new(PhpSyntaxIndex::new());
    AnalysisDriver::new(SyntaxCheckAnalyser::new(index))
}

// =============================================================================
// File collection
// =============================================================================

#[test]
fn test_collects_php_files_recursively_in_name_order() {
    let (files, diagnostics) = syntax_driver().collect_files(&[fixtures().display().to_string()]);

    assert!(diagnostics.is_empty());
    let names: Vec<_> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Broken.php", "Collection.php", "Helpers.php"]);
}

#[test]
fn test_explicit_file_is_kept_regardless_of_exclusions() {
    let mut builder = GlobSetBuilder::new();
    builder.add(Glob::new("**/Broken.php").unwrap());
    let driver = syntax_driver().exclude(builder.build().unwrap());

    let (from_dir, _) = driver.collect_files(&[fixtures().display().to_string()]);
    assert_eq!(from_dir.len(), 2);

    let (explicit, _) = driver.collect_files(&[fixture("Broken.php")]);
    assert_eq!(explicit.len(), 1);
}

// =============================================================================
// Reporting and exit codes
// =============================================================================

#[test]
fn test_clean_files_exit_success() {
    let mut sink = Recorder::default();
    let code = syntax_driver().analyse(
        &[fixture("Collection.php"), fixture("nested/Helpers.php")],
        &mut sink,
    );

    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(sink.progress_total, Some(2));
    assert_eq!(sink.advanced, 2);
    assert!(sink.finished);
    assert_eq!(sink.success.as_deref(), Some("No errors"));
    assert!(sink.tables.is_empty());
    assert!(sink.error.is_none());
}

#[test]
fn test_syntax_error_is_grouped_under_cropped_file() {
    let mut sink = Recorder::default();
    let code = syntax_driver().analyse(&[fixtures().display().to_string()], &mut sink);

    assert_eq!(code, EXIT_FAILED);
    assert_eq!(sink.progress_total, Some(3));
    assert_eq!(sink.advanced, 3);
    assert!(sink.success.is_none());

    assert_eq!(sink.tables.len(), 1);
    let (file, rows) = &sink.tables[0];
    assert_eq!(PathBuf::from(file), PathBuf::from("php").join("Broken.php"));
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].0.is_empty(), "syntax errors carry a line number");
    assert_eq!(rows[0].1, "Syntax error, unexpected input");
    assert_eq!(sink.error.as_deref(), Some("Found 1 error"));
}

#[test]
fn test_missing_path_and_syntax_error_are_counted_together() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("gone.php").display().to_string();

    let mut sink = Recorder::default();
    let code = syntax_driver().analyse(&[missing.clone(), fixture("Broken.php")], &mut sink);

    assert_eq!(code, EXIT_FAILED);
    // Only the resolvable path counts towards progress
    assert_eq!(sink.progress_total, Some(1));
    assert_eq!(sink.tables.len(), 2);

    let (file, rows) = &sink.tables[0];
    assert!(missing.ends_with(file.as_str()));
    assert_eq!(rows[0].0, "");
    assert_eq!(rows[0].1, format!("Path {} does not exist", missing));
    assert_eq!(sink.error.as_deref(), Some("Found 2 errors"));
}

#[test]
fn test_index_is_shared_with_later_lookups() {
    let index = Arc::new(PhpSyntaxIndex::new());
    let shared: Arc<dyn SyntaxIndex> = index.clone();
    let driver = AnalysisDriver::new(SyntaxCheckAnalyser::new(shared));

    let mut sink = Recorder::default();
    driver.analyse(&[fixture("Collection.php")], &mut sink);

    assert_eq!(index.cached(), 1);
}
