//! velac-eval - The partial evaluator.
//!
//! An online specializer over the simplified IR: constants fold, algebraic
//! identities apply, short-circuit operators cut, and whatever cannot be
//! reduced is reconstructed as a *residual* expression embedded back in
//! the output tree. The evaluator preserves observable semantics: a
//! closed expression and its reduction mean the same thing under the
//! language's operational semantics.
//!
//! The walk is single-threaded, strict, and left-to-right everywhere.
//! Environments are persistent; extending one never invalidates an
//! ancestor's view.

pub mod env;
pub mod equality;
pub mod error;
pub mod eval;
pub mod ir;

pub use env::Env;
pub use equality::{canonicalize, syntactic_equal, Equality};
pub use error::EvalError;
pub use eval::PartialEvaluator;
pub use ir::{Annotations, SExpr, SFormal};
