//! velac-drv - The middle-end driver.
//!
//! Orchestrates the phases this workspace owns and times each one:
//!
//! ```text
//! named program ──[compile]──▶ resolved program ──▶ (type inference,
//!        simplification: external) ──▶ simplified defs ──[reduce]──▶
//!        reduced defs + continuation interfaces
//! ```
//!
//! `compile` runs name resolution and returns the resolved program with a
//! per-phase nanosecond breakdown for the type checker to pick up.
//! `reduce` runs the partial evaluator over a simplified root and then
//! the continuation-interface emitter over the reduced program's types.
//!
//! User errors come back as a batch of `ResolutionError`s; internal
//! errors (a malformed simplified tree) abort with a diagnostic naming
//! the offending construct.

use std::time::Instant;

use indexmap::IndexMap;
use thiserror::Error;

use velac_ast::Program;
use velac_eval::{canonicalize, EvalError, PartialEvaluator, SExpr};
use velac_gen::ContinuationInterface;
use velac_res::ast::ResolvedProgram;
use velac_res::error::ResolutionError;
use velac_res::symbol::{DefnSym, SymbolFactory};
use velac_util::Handler;

/// Driver configuration.
#[derive(Clone, Debug)]
pub struct Options {
    /// Run the canonicalizer over reduced definitions so equivalent
    /// residuals get one spelling.
    pub canonicalize: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { canonicalize: true }
    }
}

/// Per-phase wall-clock nanoseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTimes {
    pub resolver_ns: u64,
    pub evaluator_ns: u64,
    pub interfaces_ns: u64,
}

/// Driver-level failure.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Resolution found user errors; all of them, not just the first.
    #[error("resolution failed with {} error(s)", .0.len())]
    Resolution(Vec<ResolutionError>),

    /// An internal invariant broke; the pass is aborted.
    #[error("internal compiler error: {0}")]
    Internal(#[from] EvalError),
}

impl CompileError {
    /// Report the carried errors to a diagnostic handler.
    pub fn report(&self, handler: &Handler) {
        match self {
            CompileError::Resolution(errors) => {
                for e in errors {
                    handler.emit(e.to_diagnostic());
                }
            }
            CompileError::Internal(e) => {
                handler.emit(velac_util::Diagnostic::error(
                    "InternalCompilerError",
                    e.to_string(),
                    velac_util::SrcLoc::UNKNOWN,
                ));
            }
        }
    }
}

/// The output of the resolution pipeline.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub program: ResolvedProgram,
    pub times: PhaseTimes,
}

/// The output of partial evaluation plus interface synthesis.
#[derive(Clone, Debug)]
pub struct Reduction {
    pub defs: IndexMap<DefnSym, SExpr>,
    pub interfaces: Vec<ContinuationInterface>,
    pub times: PhaseTimes,
}

/// Resolve a named program.
///
/// Consumes the program; the symbol factory is the caller's, so fresh
/// identities stay unique across the whole compilation unit.
pub fn compile(program: Program, factory: &SymbolFactory) -> Result<Resolution, CompileError> {
    let start = Instant::now();
    let resolved = velac_res::resolve(program, factory).map_err(CompileError::Resolution)?;
    let resolver_ns = start.elapsed().as_nanos() as u64;
    log::debug!("resolution finished in {resolver_ns}ns");

    Ok(Resolution {
        program: resolved,
        times: PhaseTimes {
            resolver_ns,
            ..PhaseTimes::default()
        },
    })
}

/// Partially evaluate a simplified root and synthesize continuation
/// interfaces for the reduced program's types.
pub fn reduce(
    defs: IndexMap<DefnSym, SExpr>,
    options: &Options,
) -> Result<Reduction, CompileError> {
    let mut times = PhaseTimes::default();

    let start = Instant::now();
    let reduced = PartialEvaluator::new(&defs).reduce_all()?;
    let reduced: IndexMap<DefnSym, SExpr> = if options.canonicalize {
        reduced
            .into_iter()
            .map(|(sym, body)| {
                let canonical = canonicalize(&body);
                (sym, canonical)
            })
            .collect()
    } else {
        reduced
    };
    times.evaluator_ns = start.elapsed().as_nanos() as u64;
    log::debug!("partial evaluation finished in {}ns", times.evaluator_ns);

    let start = Instant::now();
    let interfaces = velac_gen::interfaces_for_program(&reduced);
    times.interfaces_ns = start.elapsed().as_nanos() as u64;
    log::debug!(
        "synthesized {} continuation interfaces in {}ns",
        interfaces.len(),
        times.interfaces_ns
    );

    Ok(Reduction {
        defs: reduced,
        interfaces,
        times,
    })
}
