//! Diagnostics.
//!
//! Resolution does not stop at the first broken subtree: it keeps walking
//! and reports every error it can find in one pass. The [`Handler`]
//! collects those diagnostics; the pass as a whole fails iff any
//! error-level diagnostic was emitted.

use std::cell::RefCell;
use std::fmt;

use crate::loc::SrcLoc;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that fails the pass.
    Error,
    /// A condition worth reporting that does not fail the pass.
    Warning,
    /// Additional context attached to another diagnostic.
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A single diagnostic message.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    /// Machine-readable tag, e.g. `"UndefinedDef"`.
    pub code: &'static str,
    pub message: String,
    pub loc: SrcLoc,
    /// Extra locations, e.g. the candidates of an ambiguity.
    pub related: Vec<SrcLoc>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, loc: SrcLoc) -> Self {
        Self {
            level: Level::Error,
            code,
            message: message.into(),
            loc,
            related: Vec::new(),
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, loc: SrcLoc) -> Self {
        Self {
            level: Level::Warning,
            code,
            message: message.into(),
            loc,
            related: Vec::new(),
        }
    }

    /// Attach related locations (sorted for deterministic output).
    pub fn with_related(mut self, mut locs: Vec<SrcLoc>) -> Self {
        locs.sort();
        self.related = locs;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {}",
            self.level, self.code, self.message, self.loc
        )
    }
}

/// Collects diagnostics across a pass.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Record a diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Whether any error-level diagnostic has been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// All diagnostics recorded so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}
