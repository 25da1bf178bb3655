//! Command-line interface for sigscan.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analyse::{AnalysisDriver, SyntaxCheckAnalyser};
use crate::config::Config;
use crate::reflection::{
    ClassMetadata, ClassRegistry, MethodMetadata, QuirkTable, SignatureResolver, SourceReflector,
};
use crate::report::{self, ConsoleStyle};
use crate::syntax::{PhpSyntaxIndex, SyntaxIndex};

pub use crate::analyse::{EXIT_FAILED, EXIT_SUCCESS};

/// Exit code for usage and configuration errors.
pub const EXIT_ERROR: i32 = 2;

/// Static analysis core for PHP.
///
/// Resolves method signatures from reflection metadata and source, and runs
/// batch analysis over PHP files with CI-friendly exit codes.
#[derive(Parser)]
#[command(name = "sigscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyse files and directories
    #[command(visible_alias = "analyze")]
    Analyse(AnalyseArgs),
    /// Print the resolved method signatures of a file
    Signatures(SignaturesArgs),
}

/// Arguments for the analyse command.
#[derive(Parser)]
pub struct AnalyseArgs {
    /// Files or directories to analyse (default: `paths` from the config file)
    pub paths: Vec<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the signatures command.
#[derive(Parser)]
pub struct SignaturesArgs {
    /// PHP file to reflect
    pub file: PathBuf,

    /// Only show methods of this class
    #[arg(long)]
    pub class: Option<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not search method bodies for func_get_args()
    #[arg(long)]
    pub no_implicit_variadic: bool,
}

/// Load the explicit config, or discover one in the working directory.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Config::discover(Path::new(".")),
    };

    match path {
        Some(p) => {
            tracing::debug!("using config {}", p.display());
            Config::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))
        }
        None => Ok(Config::default()),
    }
}

/// Run the analyse command.
pub fn run_analyse(args: &AnalyseArgs) -> anyhow::Result<i32> {
    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let excluded = match config.excluded_set() {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let paths = if args.paths.is_empty() {
        config.paths.clone()
    } else {
        args.paths.clone()
    };
    if paths.is_empty() {
        eprintln!("Warning: no paths to analyse");
    }

    let index: Arc<dyn SyntaxIndex> = Arc::new(PhpSyntaxIndex::new());
    let mut driver = AnalysisDriver::new(SyntaxCheckAnalyser::new(index));
    if let Some(set) = excluded {
        driver = driver.exclude(set);
    }

    let mut style = ConsoleStyle::new(!args.no_progress);
    Ok(driver.analyse(&paths, &mut style))
}

/// Run the signatures command.
pub fn run_signatures(args: &SignaturesArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let file = match args.file.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.file, e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut registry = ClassRegistry::new();
    if let Err(e) = registry.load_file(&SourceReflector::new(), &file) {
        eprintln!("Error: {}", e);
        return Ok(EXIT_FAILED);
    }

    let resolver = SignatureResolver::new(
        Arc::new(PhpSyntaxIndex::new()),
        Arc::new(QuirkTable::builtin()),
    )
    .look_for_implicit_variadic(config.look_for_implicit_variadic && !args.no_implicit_variadic);

    let classes: Vec<_> = match &args.class {
        Some(name) => match registry.find(name) {
            Some(class) => vec![Arc::clone(class)],
            None => {
                eprintln!("Error: class {:?} is not declared in {}", name, file.display());
                return Ok(EXIT_FAILED);
            }
        },
        None => registry.classes().to_vec(),
    };

    let mut signatures = Vec::new();
    for class in &classes {
        let class_meta: Arc<dyn ClassMetadata> = class.clone();
        for method in &class.methods {
            let method_meta: Arc<dyn MethodMetadata> = method.clone();
            signatures.push(resolver.signature(Arc::clone(&class_meta), method_meta));
        }
    }

    let refs: Vec<_> = signatures.iter().map(|s| &**s).collect();
    match args.format.as_str() {
        "json" => report::write_signatures_json(&refs)?,
        _ => report::write_signatures_pretty(&refs),
    }

    Ok(EXIT_SUCCESS)
}
