//! Output formatting for sigscan.
//!
//! - `ConsoleStyle`: terminal [`ReportSink`] with a progress bar and tables
//! - Signature listings in pretty or JSON form

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::analyse::ReportSink;
use crate::reflection::{MethodSignature, ParameterSignature};
use crate::types::Type;

// =============================================================================
// Console sink
// =============================================================================

/// Terminal reporter used by `sigscan analyse`.
pub struct ConsoleStyle {
    show_progress: bool,
    progress: Option<ProgressBar>,
}

impl ConsoleStyle {
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            progress: None,
        }
    }
}

impl ReportSink for ConsoleStyle {
    fn progress_start(&mut self, total: usize) {
        if !self.show_progress {
            return;
        }
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(" {pos:>3}/{len:3} [{bar:28}] {percent:>3}%")
            .map(|s| s.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        self.progress = Some(bar);
    }

    fn progress_advance(&mut self) {
        if let Some(bar) = &self.progress {
            bar.inc(1);
        }
    }

    fn progress_finish(&mut self) {
        if let Some(bar) = self.progress.take() {
            bar.finish();
            println!();
        }
    }

    fn success(&mut self, message: &str) {
        println!();
        println!(" {}", format!("[OK] {}", message).green().bold());
        println!();
    }

    fn table(&mut self, header: (&str, &str), rows: &[(String, String)]) {
        print!("{}", render_table(header, rows));
        println!();
    }

    fn error(&mut self, message: &str) {
        println!();
        println!(" {}", format!("[ERROR] {}", message).red().bold());
        println!();
    }
}

/// Render a two-column table with ruled borders.
pub fn render_table(header: (&str, &str), rows: &[(String, String)]) -> String {
    let left = rows
        .iter()
        .map(|(l, _)| l.chars().count())
        .chain(std::iter::once(header.0.chars().count()))
        .max()
        .unwrap_or(0);
    let right = rows
        .iter()
        .map(|(_, r)| r.chars().count())
        .chain(std::iter::once(header.1.chars().count()))
        .max()
        .unwrap_or(0);

    let rule = format!(" {} {}\n", "-".repeat(left + 2), "-".repeat(right + 2));
    let line = |a: &str, b: &str| format!("  {:<left$}   {}\n", a, b, left = left);

    let mut out = String::new();
    out.push_str(&rule);
    out.push_str(&line(header.0, header.1));
    out.push_str(&rule);
    for (a, b) in rows {
        out.push_str(&line(a, b));
    }
    out.push_str(&rule);
    out
}

// =============================================================================
// Signature listings
// =============================================================================

/// JSON form of one resolved method signature.
#[derive(Serialize)]
pub struct JsonSignature {
    pub class: String,
    pub name: String,
    pub is_static: bool,
    pub is_public: bool,
    pub is_private: bool,
    pub is_abstract: bool,
    pub is_variadic: bool,
    pub parameters: Vec<ParameterSignature>,
    pub return_type: Type,
}

impl JsonSignature {
    pub fn from_signature(signature: &MethodSignature) -> Self {
        Self {
            class: signature.declaring_class().name().to_string(),
            name: signature.name().to_string(),
            is_static: signature.is_static(),
            is_public: signature.is_public(),
            is_private: signature.is_private(),
            is_abstract: signature.is_abstract(),
            is_variadic: signature.is_variadic(),
            parameters: signature.parameters().to_vec(),
            return_type: signature.return_type().clone(),
        }
    }
}

/// Write signatures as a JSON array.
pub fn write_signatures_json(signatures: &[&MethodSignature]) -> anyhow::Result<()> {
    let report: Vec<JsonSignature> = signatures
        .iter()
        .map(|s| JsonSignature::from_signature(s))
        .collect();
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

/// Write signatures one per line, PHP-style.
pub fn write_signatures_pretty(signatures: &[&MethodSignature]) {
    for signature in signatures {
        println!("{}", format_signature(signature));
    }
}

/// Format e.g. `public static App\User::find(int $id, mixed ...$rest): ?App\User`.
pub fn format_signature(signature: &MethodSignature) -> String {
    let visibility = if signature.is_public() {
        "public"
    } else if signature.is_private() {
        "private"
    } else {
        "protected"
    };
    let modifier = match (signature.is_abstract(), signature.is_static()) {
        (true, true) => " abstract static",
        (true, false) => " abstract",
        (false, true) => " static",
        (false, false) => "",
    };

    let mut params: Vec<String> = signature.parameters().iter().map(format_parameter).collect();
    if signature.is_variadic() && !signature.parameters().iter().any(|p| p.is_variadic) {
        // implicit variadic
        params.push("...".to_string());
    }

    format!(
        "{}{} {}::{}({}): {}",
        visibility,
        modifier,
        signature.declaring_class().name().cyan(),
        signature.name().bold(),
        params.join(", "),
        signature.return_type()
    )
}

fn format_parameter(param: &ParameterSignature) -> String {
    let mut out = format!("{} ", param.type_);
    if param.passed_by_reference {
        out.push('&');
    }
    if param.is_variadic {
        out.push_str("...");
    }
    out.push('$');
    out.push_str(&param.name);
    if param.is_optional && !param.is_variadic {
        out.push_str(" = ?");
    }
    out
}
