//! The simplified IR.
//!
//! This is the tree the partial evaluator consumes and produces. It comes
//! out of the simplification phase that runs after type inference: matches
//! are compiled to `CheckTag`/`GetTagValue` chains, closure conversion has
//! made captured environments explicit, and lambda lifting has left only
//! saturated calls. Every non-literal node carries its type and source
//! location.
//!
//! `Load`/`Store` are the packing primitives a later boxing phase
//! introduces; they are illegal at this tier and the evaluator treats one
//! as a compiler invariant violation.

use velac_ast::{BinaryOp, UnaryOp};
use velac_res::symbol::{DefnSym, EnumSym};
use velac_res::types::Type;
use velac_util::{Ident, SrcLoc};

use crate::env::Env;

/// Annotations attached to a lambda (inlining hints and the like).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotations(pub Vec<Ident>);

/// A formal parameter of a lambda or closure.
#[derive(Clone, Debug, PartialEq)]
pub struct SFormal {
    pub name: Ident,
    pub ty: Type,
    pub loc: SrcLoc,
}

/// A simplified expression.
#[derive(Clone, Debug, PartialEq)]
pub enum SExpr {
    Unit,
    True,
    False,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Str(String),

    /// A bound variable occurrence. The offset is the stack slot a later
    /// phase assigned; the evaluator keys environments by name.
    Var {
        name: Ident,
        offset: i32,
        ty: Type,
        loc: SrcLoc,
    },

    /// A reference to a top-level definition.
    Ref {
        sym: DefnSym,
        ty: Type,
        loc: SrcLoc,
    },

    /// A closure-free lambda (closure conversion ran earlier).
    Lambda {
        ann: Annotations,
        formals: Vec<SFormal>,
        body: Box<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    /// A lambda paired with its captured environment.
    Closure {
        formals: Vec<SFormal>,
        body: Box<SExpr>,
        env: Env,
        ty: Type,
        loc: SrcLoc,
    },

    /// A saturated call (the only call form after lambda lifting).
    Apply {
        callee: Box<SExpr>,
        args: Vec<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    Unary {
        op: UnaryOp,
        expr: Box<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    Binary {
        op: BinaryOp,
        lhs: Box<SExpr>,
        rhs: Box<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    Let {
        name: Ident,
        offset: i32,
        value: Box<SExpr>,
        body: Box<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    IfThenElse {
        cond: Box<SExpr>,
        then: Box<SExpr>,
        otherwise: Box<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    Tag {
        enum_sym: EnumSym,
        tag: Ident,
        payload: Box<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    /// `true` iff the scrutinee is the given tag.
    CheckTag {
        tag: Ident,
        expr: Box<SExpr>,
        loc: SrcLoc,
    },

    /// Project the payload out of a tag value.
    GetTagValue {
        expr: Box<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    Tuple {
        elms: Vec<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    GetTupleIndex {
        expr: Box<SExpr>,
        offset: usize,
        ty: Type,
        loc: SrcLoc,
    },

    SetLit {
        elms: Vec<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },

    /// A user-visible error value of the given type.
    Error {
        ty: Type,
        loc: SrcLoc,
    },

    /// A match that fell through every rule.
    MatchError {
        ty: Type,
        loc: SrcLoc,
    },

    /// Bit-packing read; must not appear before the boxing phase.
    Load {
        expr: Box<SExpr>,
        offset: i64,
        ty: Type,
        loc: SrcLoc,
    },

    /// Bit-packing write; must not appear before the boxing phase.
    Store {
        expr: Box<SExpr>,
        offset: i64,
        value: Box<SExpr>,
        ty: Type,
        loc: SrcLoc,
    },
}

impl SExpr {
    /// Whether this expression is a value: a literal, a closure, or a
    /// tag/tuple whose components are all values. Everything else is a
    /// residual.
    pub fn is_value(&self) -> bool {
        match self {
            SExpr::Unit
            | SExpr::True
            | SExpr::False
            | SExpr::Int8(_)
            | SExpr::Int16(_)
            | SExpr::Int32(_)
            | SExpr::Int64(_)
            | SExpr::Str(_)
            | SExpr::Closure { .. } => true,
            SExpr::Tag { payload, .. } => payload.is_value(),
            SExpr::Tuple { elms, .. } => elms.iter().all(SExpr::is_value),
            _ => false,
        }
    }

    /// The type of this expression.
    pub fn ty(&self) -> Type {
        match self {
            SExpr::Unit => Type::Unit,
            SExpr::True | SExpr::False => Type::Bool,
            SExpr::Int8(_) => Type::Int8,
            SExpr::Int16(_) => Type::Int16,
            SExpr::Int32(_) => Type::Int32,
            SExpr::Int64(_) => Type::Int64,
            SExpr::Str(_) => Type::Str,
            SExpr::CheckTag { .. } => Type::Bool,
            SExpr::Var { ty, .. }
            | SExpr::Ref { ty, .. }
            | SExpr::Lambda { ty, .. }
            | SExpr::Closure { ty, .. }
            | SExpr::Apply { ty, .. }
            | SExpr::Unary { ty, .. }
            | SExpr::Binary { ty, .. }
            | SExpr::Let { ty, .. }
            | SExpr::IfThenElse { ty, .. }
            | SExpr::Tag { ty, .. }
            | SExpr::GetTagValue { ty, .. }
            | SExpr::Tuple { ty, .. }
            | SExpr::GetTupleIndex { ty, .. }
            | SExpr::SetLit { ty, .. }
            | SExpr::Error { ty, .. }
            | SExpr::MatchError { ty, .. }
            | SExpr::Load { ty, .. }
            | SExpr::Store { ty, .. } => ty.clone(),
        }
    }

    /// The source location, if the node carries one. Literals are
    /// location-free.
    pub fn loc(&self) -> SrcLoc {
        match self {
            SExpr::Unit
            | SExpr::True
            | SExpr::False
            | SExpr::Int8(_)
            | SExpr::Int16(_)
            | SExpr::Int32(_)
            | SExpr::Int64(_)
            | SExpr::Str(_) => SrcLoc::UNKNOWN,
            SExpr::Var { loc, .. }
            | SExpr::Ref { loc, .. }
            | SExpr::Lambda { loc, .. }
            | SExpr::Closure { loc, .. }
            | SExpr::Apply { loc, .. }
            | SExpr::Unary { loc, .. }
            | SExpr::Binary { loc, .. }
            | SExpr::Let { loc, .. }
            | SExpr::IfThenElse { loc, .. }
            | SExpr::Tag { loc, .. }
            | SExpr::CheckTag { loc, .. }
            | SExpr::GetTagValue { loc, .. }
            | SExpr::Tuple { loc, .. }
            | SExpr::GetTupleIndex { loc, .. }
            | SExpr::SetLit { loc, .. }
            | SExpr::Error { loc, .. }
            | SExpr::MatchError { loc, .. }
            | SExpr::Load { loc, .. }
            | SExpr::Store { loc, .. } => *loc,
        }
    }
}
