//! Resolution errors.
//!
//! These are user errors: each carries the offending name, the namespace
//! the reference was made from, and a source location. The resolver
//! accumulates them across independent subtrees rather than stopping at
//! the first.

use thiserror::Error;

use velac_ast::{NsPath, QName};
use velac_util::{Diagnostic, Ident, SrcLoc};

/// A name-resolution error.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ResolutionError {
    #[error("undefined reference `{name}` in namespace `{ns}`")]
    UndefinedDef { name: QName, ns: NsPath, loc: SrcLoc },

    #[error("undefined table `{name}` in namespace `{ns}`")]
    UndefinedTable { name: QName, ns: NsPath, loc: SrcLoc },

    #[error("undefined type `{name}` in namespace `{ns}`")]
    UndefinedType { name: QName, ns: NsPath, loc: SrcLoc },

    #[error("no enum declares the tag `{tag}` (referenced from namespace `{ns}`)")]
    UndefinedTag { tag: Ident, ns: NsPath, loc: SrcLoc },

    #[error("ambiguous reference `{name}` in namespace `{ns}`")]
    AmbiguousRef { name: QName, ns: NsPath, loc: SrcLoc },

    #[error("the tag `{tag}` is declared by multiple enums (referenced from namespace `{ns}`)")]
    AmbiguousTag {
        tag: Ident,
        ns: NsPath,
        loc: SrcLoc,
        /// Locations of the candidate enum declarations, sorted.
        candidates: Vec<SrcLoc>,
    },

    #[error("definition `{name}` is not accessible from namespace `{ns}`")]
    InaccessibleDef { name: QName, ns: NsPath, loc: SrcLoc },

    #[error("enum `{name}` is not accessible from namespace `{ns}`")]
    InaccessibleEnum { name: QName, ns: NsPath, loc: SrcLoc },
}

impl ResolutionError {
    /// The machine-readable tag of this error.
    pub fn code(&self) -> &'static str {
        match self {
            ResolutionError::UndefinedDef { .. } => "UndefinedDef",
            ResolutionError::UndefinedTable { .. } => "UndefinedTable",
            ResolutionError::UndefinedType { .. } => "UndefinedType",
            ResolutionError::UndefinedTag { .. } => "UndefinedTag",
            ResolutionError::AmbiguousRef { .. } => "AmbiguousRef",
            ResolutionError::AmbiguousTag { .. } => "AmbiguousTag",
            ResolutionError::InaccessibleDef { .. } => "InaccessibleDef",
            ResolutionError::InaccessibleEnum { .. } => "InaccessibleEnum",
        }
    }

    pub fn loc(&self) -> SrcLoc {
        match self {
            ResolutionError::UndefinedDef { loc, .. }
            | ResolutionError::UndefinedTable { loc, .. }
            | ResolutionError::UndefinedType { loc, .. }
            | ResolutionError::UndefinedTag { loc, .. }
            | ResolutionError::AmbiguousRef { loc, .. }
            | ResolutionError::AmbiguousTag { loc, .. }
            | ResolutionError::InaccessibleDef { loc, .. }
            | ResolutionError::InaccessibleEnum { loc, .. } => *loc,
        }
    }

    /// Render as a diagnostic for the handler.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string(), self.loc());
        match self {
            ResolutionError::AmbiguousTag { candidates, .. } => {
                diag.with_related(candidates.clone())
            }
            _ => diag,
        }
    }
}
