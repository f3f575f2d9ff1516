//! The Bolt compiler CLI.
//!
//! Provides the `boltc` command:
//!
//! - `boltc check <files...>` - Parse, resolve and type-check Bolt sources
//!
//! The front-end collects diagnostics across all phases and renders them
//! here with ariadne once the pipeline finishes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process;

use ariadne::{Config, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};

use bolt_common::report::{Diagnostic, Severity};

#[derive(Parser)]
#[command(name = "boltc", version, about = "The Bolt compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, resolve and type-check Bolt source files
    Check {
        /// Source files to check, in order
        files: Vec<PathBuf>,

        /// Name of the package being compiled
        #[arg(long = "pkg-name", default_value = "main")]
        pkg_name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { files, pkg_name } => match check(&files, &pkg_name) {
            Ok(()) => {}
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
    }
}

/// Run the front-end over the given files and render every diagnostic.
fn check(files: &[PathBuf], pkg_name: &str) -> Result<(), String> {
    if files.is_empty() {
        return Err("no input files".to_string());
    }

    let mut sources: Vec<(String, String)> = Vec::with_capacity(files.len());
    for path in files {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
        sources.push((path.display().to_string(), text));
    }

    let borrowed: Vec<(&str, &str)> =
        sources.iter().map(|(n, s)| (n.as_str(), s.as_str())).collect();
    let analysis = bolt_sema::analyze(pkg_name, &borrowed);

    let by_name: HashMap<&str, &str> =
        sources.iter().map(|(n, s)| (n.as_str(), s.as_str())).collect();
    for diag in analysis.reporter.diagnostics() {
        let source = by_name.get(diag.file.as_str()).copied().unwrap_or("");
        eprint!("{}", render_diagnostic(diag, source));
    }

    if analysis.has_errors() {
        return Err(format!(
            "could not compile `{pkg_name}` due to {} previous error(s)",
            analysis.reporter.error_count()
        ));
    }
    Ok(())
}

/// Render one diagnostic with ariadne. Output is colorless so it stays
/// stable across terminals and in tests.
fn render_diagnostic(diag: &Diagnostic, source: &str) -> String {
    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };
    // clamp to the source bounds so labels never point past the text
    let span = diag
        .span
        .map(|s| {
            let start = (s.start as usize).min(source.len());
            let end = (s.end as usize).min(source.len()).max(start);
            start..end
        })
        .unwrap_or(0..0);

    let mut builder = Report::<std::ops::Range<usize>>::build(kind, span.clone())
        .with_config(Config::default().with_color(false))
        .with_message(&diag.message)
        .with_label(Label::new(span).with_message(&diag.message));
    for note in &diag.notes {
        builder = builder.with_note(note);
    }
    for help in &diag.helps {
        builder = builder.with_help(help);
    }

    let mut out = Vec::new();
    let _ = builder.finish().write(Source::from(source), &mut out);
    String::from_utf8_lossy(&out).into_owned()
}
