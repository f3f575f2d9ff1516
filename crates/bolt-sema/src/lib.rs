//! Semantic analysis for Bolt: symbol registration, name resolution and
//! type checking over the parsed AST.
//!
//! The three passes run strictly in order and are gated on the error
//! counter: registration errors skip resolution, and any error before the
//! checker skips checking. Each pass decorates the AST in place.
//!
//! # Architecture
//!
//! - [`register`]: pass 1 -- create symbols for declarations and attach
//!   them to their parent scope
//! - [`resolve`]: pass 2 -- bind identifiers, paths and type nodes;
//!   intern structural types; unalias aliases
//! - [`check`]: pass 3 -- assign a type to every expression and enforce
//!   operator/argument/assignment/unsafe rules
//! - [`compat`]: the type-compatibility rules shared by assignments,
//!   arguments, returns and struct literals

pub mod check;
pub mod compat;
pub mod register;
pub mod resolve;

use bolt_common::report::Reporter;
use bolt_parser::ast::SourceFile;
use bolt_parser::context::{CompilerContext, Prefs};

use check::Checker;
use resolve::Resolver;

/// Everything a compilation produced: the context (symbol graph included),
/// the diagnostics, and the decorated files.
pub struct Analysis {
    pub ctx: CompilerContext,
    pub reporter: Reporter,
    pub files: Vec<SourceFile>,
}

impl Analysis {
    /// Whether any error was reported in any phase.
    pub fn has_errors(&self) -> bool {
        self.reporter.has_errors()
    }
}

/// Run the whole front-end over in-memory sources: lex, parse, register,
/// resolve, check.
pub fn analyze(pkg_name: &str, sources: &[(&str, &str)]) -> Analysis {
    let prefs = Prefs {
        inputs: sources.iter().map(|(name, _)| name.to_string()).collect(),
        pkg_name: pkg_name.to_string(),
    };
    let mut ctx = CompilerContext::new(prefs);
    let mut reporter = Reporter::new();

    let mut files: Vec<SourceFile> = sources
        .iter()
        .map(|(name, src)| bolt_parser::parse_file(&mut ctx, &mut reporter, name, src))
        .collect();

    Resolver::new(&mut ctx, &mut reporter).resolve_files(&mut files);

    if !reporter.has_errors() {
        Checker::new(&mut ctx, &mut reporter).check_files(&mut files);
    }

    Analysis { ctx, reporter, files }
}
