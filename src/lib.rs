//! sigscan - static analysis core for PHP.
//!
//! sigscan builds faithful models of method signatures by combining
//! introspection metadata with evidence from the parsed source, and drives
//! batch analysis over PHP files with per-file diagnostics.
//!
//! # Architecture
//!
//! - `syntax`: tree-sitter parsing, lowered syntax trees, per-path index
//! - `types`: semantic type values and type-hint resolution
//! - `reflection`: introspection metadata, quirk corrections, method signatures
//! - `analyse`: path collection, batch engine, grouped diagnostics, exit codes
//! - `config`: YAML configuration file
//! - `report`: terminal and JSON output

pub mod analyse;
pub mod cli;
pub mod config;
pub mod reflection;
pub mod report;
pub mod syntax;
pub mod types;

pub use analyse::{AnalysisDriver, BatchAnalyser, Diagnostic, ReportSink, SyntaxCheckAnalyser};
pub use config::Config;
pub use reflection::{
    ClassInfo, ClassMetadata, MethodInfo, MethodMetadata, MethodSignature, ParameterSignature,
    QuirkTable, SignatureResolver, SourceReflector,
};
pub use syntax::{PhpSyntaxIndex, SyntaxIndex};
pub use types::{Type, TypeHintResolver};
