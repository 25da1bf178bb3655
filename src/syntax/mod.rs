//! PHP parsing and the per-path syntax index.
//!
//! Parsing goes through tree-sitter with the `tree-sitter-php` grammar. The
//! concrete tree is then lowered into the crate's own [`SyntaxTree`], which is
//! what the analysis passes walk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tree_sitter::{Language, Parser};

mod lower;
mod tree;

pub use tree::{Element, Node, NodeKind, SyntaxTree};

/// Errors raised while turning a file into a syntax tree.
#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load PHP grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("parser produced no tree for {0}")]
    NoTree(String),
    #[error("syntax error in {path} on line {line}")]
    Invalid { path: String, line: usize },
}

/// Holds a parsed tree-sitter tree and the source it was built from.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: PathBuf,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Text of the named field of `node`, if present.
    pub fn field_text(&self, node: tree_sitter::Node, field: &str) -> Option<&str> {
        node.child_by_field_name(field).map(|n| self.node_text(n))
    }

    /// 1-indexed line of the first error or missing node, if any.
    pub fn first_error_line(&self) -> Option<usize> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return None;
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                return Some(node.start_position().row + 1);
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).filter(|c| c.has_error()).collect();
            // reversed so the earliest child is visited first
            stack.extend(children.into_iter().rev());
        }

        Some(root.start_position().row + 1)
    }

    /// Lower the tree-sitter tree into an owned [`SyntaxTree`].
    pub fn lower(&self) -> SyntaxTree {
        lower::lower_file(self)
    }
}

/// tree-sitter backed PHP parser.
///
/// tree_sitter::Parser is not Sync, so a fresh parser is created per parse.
#[derive(Clone)]
pub struct PhpParser {
    language: Language,
}

impl PhpParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }

    /// Parse in-memory source. The tree may contain error nodes.
    pub fn parse_source(&self, path: &Path, source: Vec<u8>) -> Result<ParsedFile, SyntaxError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| SyntaxError::NoTree(path.display().to_string()))?;

        Ok(ParsedFile {
            tree,
            source,
            path: path.to_path_buf(),
        })
    }

    /// Read and parse a file. The tree may contain error nodes.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile, SyntaxError> {
        let source = fs::read(path).map_err(|source| SyntaxError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.parse_source(path, source)
    }

    /// Read and parse a file, rejecting trees that contain syntax errors.
    pub fn parse_valid_file(&self, path: &Path) -> Result<ParsedFile, SyntaxError> {
        let parsed = self.parse_file(path)?;
        if let Some(line) = parsed.first_error_line() {
            return Err(SyntaxError::Invalid {
                path: path.display().to_string(),
                line,
            });
        }
        Ok(parsed)
    }
}

impl Default for PhpParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces the syntax tree of a file.
pub trait SyntaxIndex {
    /// Parse `path`. Implementations may cache per path.
    fn parse_file(&self, path: &Path) -> Result<Arc<SyntaxTree>, SyntaxError>;
}

/// [`SyntaxIndex`] over real PHP files, caching successful parses by path.
///
/// Failures are not cached. Source files are assumed not to change during a run.
#[derive(Default)]
pub struct PhpSyntaxIndex {
    parser: PhpParser,
    cache: RwLock<HashMap<PathBuf, Arc<SyntaxTree>>>,
}

impl PhpSyntaxIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached trees.
    pub fn cached(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl SyntaxIndex for PhpSyntaxIndex {
    fn parse_file(&self, path: &Path) -> Result<Arc<SyntaxTree>, SyntaxError> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(tree) = cache.get(path) {
                return Ok(Arc::clone(tree));
            }
        }

        let parsed = self.parser.parse_valid_file(path)?;
        let tree = Arc::new(parsed.lower());

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.insert(path.to_path_buf(), Arc::clone(&tree));
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_valid_source() {
        let parser = PhpParser::new();
        let parsed = parser
            .parse_source(Path::new("a.php"), b"<?php\nfunction f() { return 1; }\n".to_vec())
            .unwrap();
        assert_eq!(parsed.first_error_line(), None);
    }

    #[test]
    fn test_first_error_line() {
        let parser = PhpParser::new();
        let parsed = parser
            .parse_source(
                Path::new("bad.php"),
                b"<?php\n\nclass A {\n    public function f( {\n}\n".to_vec(),
            )
            .unwrap();
        let line = parsed.first_error_line().expect("should report an error");
        assert!(line >= 3, "unexpected error line {}", line);
    }

    #[test]
    fn test_index_caches_by_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.php");
        std::fs::write(&file, "<?php\nclass A { public function f() {} }\n").unwrap();

        let index = PhpSyntaxIndex::new();
        let first = index.parse_file(&file).unwrap();
        let second = index.parse_file(&file).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(index.cached(), 1);
    }

    #[test]
    fn test_index_missing_file() {
        let index = PhpSyntaxIndex::new();
        let err = index.parse_file(Path::new("/nonexistent/a.php")).unwrap_err();
        assert!(matches!(err, SyntaxError::Io { .. }));
        assert_eq!(index.cached(), 0);
    }

    #[test]
    fn test_index_rejects_invalid_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("bad.php");
        std::fs::write(&file, "<?php\nclass A { public function f( }\n").unwrap();

        let index = PhpSyntaxIndex::new();
        let err = index.parse_file(&file).unwrap_err();
        assert!(matches!(err, SyntaxError::Invalid { .. }));
    }
}
