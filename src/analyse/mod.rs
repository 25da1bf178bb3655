//! Batch analysis driver.
//!
//! The driver turns input paths into a file list, hands the list to a
//! [`BatchAnalyser`], and reports the collected diagnostics through a
//! [`ReportSink`], grouped per file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::WalkDir;

mod engine;

pub use engine::SyntaxCheckAnalyser;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;

/// Extension of analysable source files.
pub const SOURCE_EXTENSION: &str = "php";

/// One analysis finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Path of the offending file, or the literal input path for unresolved paths.
    pub file: String,
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, file: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            message: message.into(),
            file: file.into(),
            line,
        }
    }
}

/// The analysis engine run over the collected files.
pub trait BatchAnalyser {
    /// Analyse `files`, calling `on_file_done` once after each file.
    fn analyse(&self, files: &[PathBuf], on_file_done: &mut dyn FnMut()) -> Vec<Diagnostic>;
}

impl<F> BatchAnalyser for F
where
    F: Fn(&[PathBuf], &mut dyn FnMut()) -> Vec<Diagnostic>,
{
    fn analyse(&self, files: &[PathBuf], on_file_done: &mut dyn FnMut()) -> Vec<Diagnostic> {
        self(files, on_file_done)
    }
}

/// Output surface for progress and results.
pub trait ReportSink {
    fn progress_start(&mut self, total: usize);
    fn progress_advance(&mut self);
    fn progress_finish(&mut self);
    fn success(&mut self, message: &str);
    fn table(&mut self, header: (&str, &str), rows: &[(String, String)]);
    fn error(&mut self, message: &str);
}

/// Runs a [`BatchAnalyser`] over paths and reports the outcome.
pub struct AnalysisDriver<A> {
    analyser: A,
    excluded: Option<GlobSet>,
}

impl<A: BatchAnalyser> AnalysisDriver<A> {
    pub fn new(analyser: A) -> Self {
        Self {
            analyser,
            excluded: None,
        }
    }

    /// Skip directory entries matching `patterns`. Explicitly named files are kept.
    pub fn exclude(mut self, patterns: GlobSet) -> Self {
        self.excluded = Some(patterns);
        self
    }

    /// Analyse `paths` and return the process exit code.
    pub fn analyse(&self, paths: &[String], style: &mut dyn ReportSink) -> i32 {
        let (files, mut diagnostics) = self.collect_files(paths);

        style.progress_start(files.len());
        diagnostics.extend(
            self.analyser
                .analyse(&files, &mut || style.progress_advance()),
        );
        style.progress_finish();

        if diagnostics.is_empty() {
            style.success("No errors");
            return EXIT_SUCCESS;
        }

        let prefix = paths.first().and_then(|first| crop_prefix(first));
        for (file, group) in group_by_file(&diagnostics) {
            let rows: Vec<(String, String)> = group
                .iter()
                .map(|d| {
                    let line = d.line.map(|l| l.to_string()).unwrap_or_default();
                    (line, d.message.clone())
                })
                .collect();
            style.table(("Line", crop(file, prefix.as_deref())), &rows);
        }

        style.error(&summary(diagnostics.len()));
        EXIT_FAILED
    }

    /// Resolve input paths into source files.
    ///
    /// Unresolvable paths become diagnostics against the literal input.
    pub fn collect_files(&self, paths: &[String]) -> (Vec<PathBuf>, Vec<Diagnostic>) {
        let mut files = Vec::new();
        let mut diagnostics = Vec::new();

        for path in paths {
            let real = match fs::canonicalize(path) {
                Ok(real) => real,
                Err(e) => {
                    tracing::debug!("cannot resolve {}: {}", path, e);
                    diagnostics.push(Diagnostic::new(
                        format!("Path {} does not exist", path),
                        path.clone(),
                        None,
                    ));
                    continue;
                }
            };

            if real.is_file() {
                files.push(real);
            } else {
                files.extend(self.source_files(&real));
            }
        }

        (files, diagnostics)
    }

    /// Source files below `root`, sorted by name at each level.
    fn source_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Skip hidden entries below the root
                e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            // Symlinked directories are not entered; symlinked files are kept
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
                continue;
            }
            if let Some(excluded) = &self.excluded {
                if excluded.is_match(path) {
                    continue;
                }
            }
            files.push(path.to_path_buf());
        }

        files
    }
}

/// Group diagnostics by file, keeping first-seen file order.
fn group_by_file(diagnostics: &[Diagnostic]) -> Vec<(&str, Vec<&Diagnostic>)> {
    let mut groups: Vec<(&str, Vec<&Diagnostic>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for diagnostic in diagnostics {
        let file = diagnostic.file.as_str();
        match index.get(file) {
            Some(&i) => groups[i].1.push(diagnostic),
            None => {
                index.insert(file, groups.len());
                groups.push((file, vec![diagnostic]));
            }
        }
    }

    groups
}

/// Canonical directory of the first input path, used to shorten file headers.
fn crop_prefix(first: &str) -> Option<String> {
    let path = Path::new(first);
    let dir = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => path,
    };
    fs::canonicalize(dir)
        .ok()
        .map(|d| d.to_string_lossy().into_owned())
}

/// Strip `prefix` from `file` when it is a whole leading directory.
fn crop<'a>(file: &'a str, prefix: Option<&str>) -> &'a str {
    prefix
        .and_then(|p| Path::new(file).strip_prefix(p).ok())
        .and_then(Path::to_str)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(file)
}

fn summary(count: usize) -> String {
    if count == 1 {
        "Found 1 error".to_string()
    } else {
        format!("Found {} errors", count)
    }
}
