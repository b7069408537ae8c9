//! Internal compiler errors raised by the partial evaluator.
//!
//! None of these are user errors: an unresolved variable or reference at
//! this tier means an earlier phase broke its contract, and an illegal
//! node means the simplified tree is malformed. The driver turns any of
//! them into a fatal diagnostic naming the offending construct.

use thiserror::Error;

use velac_res::symbol::DefnSym;
use velac_util::{Ident, SrcLoc};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("unresolved variable `{name}` at {loc}")]
    UnresolvedVariable { name: Ident, loc: SrcLoc },

    #[error("unresolved reference `{sym}` at {loc}")]
    UnresolvedReference { sym: DefnSym, loc: SrcLoc },

    #[error("illegal {construct} at {loc}")]
    IllegalType { construct: &'static str, loc: SrcLoc },
}
