//! velac-ast - The named abstract syntax tree.
//!
//! This crate defines what the parser hands to the middle end: a program
//! keyed by namespace whose declarations and expressions still refer to
//! things by *name*. Resolution (in `velac-res`) turns every one of those
//! names into a symbol.
//!
//! Nothing in here is resolved or typed; the types that appear are surface
//! syntax ([`SurfaceType`]), not semantic type terms.

pub mod ast;
pub mod name;
pub mod types;

pub use ast::{
    Attribute, BinaryOp, CaseDecl, ConstraintDecl, DefDecl, EnumDecl, Expr, FormalParam,
    HookDecl, IndexDecl, LatticeDecl, Literal, NamedExpr, Namespace, Pattern, Predicate,
    Program, PropertyDecl, TableDecl, Term, UnaryOp,
};
pub use name::{NsPath, QName};
pub use types::SurfaceType;
