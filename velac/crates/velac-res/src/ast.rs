//! The resolved program.
//!
//! Same shape as the named program, but every name occurrence is a symbol,
//! every type occurrence is a semantic [`Type`] term, and every tag
//! carries the enum symbol that declares it. Local variables and
//! wildcards pass through by name; binding structure is the business of a
//! later phase.

use indexmap::IndexMap;

use velac_ast::{BinaryOp, Literal, UnaryOp};
use velac_util::{Ident, SrcLoc};

use crate::symbol::{DefnSym, EnumSym, HoleSym, TableSym};
use crate::types::{Effect, Scheme, Type};

/// A fully resolved program.
#[derive(Clone, Debug, Default)]
pub struct ResolvedProgram {
    pub defs: IndexMap<DefnSym, RDef>,
    pub enums: IndexMap<EnumSym, REnum>,
    pub lattices: Vec<RLattice>,
    pub tables: IndexMap<TableSym, RTable>,
    pub indices: IndexMap<TableSym, RIndex>,
    pub constraints: Vec<RConstraint>,
    pub properties: Vec<RProperty>,
    pub hooks: IndexMap<DefnSym, RHook>,
}

/// A resolved definition.
#[derive(Clone, Debug)]
pub struct RDef {
    pub sym: DefnSym,
    pub public: bool,
    pub params: Vec<RFormalParam>,
    pub scheme: Scheme,
    pub eff: Effect,
    pub body: RExpr,
    pub loc: SrcLoc,
}

#[derive(Clone, Debug)]
pub struct RFormalParam {
    pub ident: Ident,
    pub ty: Type,
    pub loc: SrcLoc,
}

/// A resolved enum with its cases.
#[derive(Clone, Debug)]
pub struct REnum {
    pub sym: EnumSym,
    pub public: bool,
    /// Type parameters with the fresh type variable each was assigned.
    pub type_params: Vec<(Ident, u64)>,
    pub cases: IndexMap<Ident, RCase>,
    pub loc: SrcLoc,
}

#[derive(Clone, Debug)]
pub struct RCase {
    pub tag: Ident,
    pub payload: Type,
    pub loc: SrcLoc,
}

/// A resolved bounded-lattice declaration.
#[derive(Clone, Debug)]
pub struct RLattice {
    pub ty: Type,
    pub bot: RExpr,
    pub top: RExpr,
    pub leq: RExpr,
    pub lub: RExpr,
    pub glb: RExpr,
    pub loc: SrcLoc,
}

/// A resolved table.
#[derive(Clone, Debug)]
pub enum RTable {
    Relation {
        sym: TableSym,
        attributes: Vec<RAttribute>,
        loc: SrcLoc,
    },
    Lattice {
        sym: TableSym,
        keys: Vec<RAttribute>,
        value: RAttribute,
        loc: SrcLoc,
    },
}

impl RTable {
    pub fn sym(&self) -> &TableSym {
        match self {
            RTable::Relation { sym, .. } | RTable::Lattice { sym, .. } => sym,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RAttribute {
    pub ident: Ident,
    pub ty: Type,
    pub loc: SrcLoc,
}

/// A resolved index hint.
#[derive(Clone, Debug)]
pub struct RIndex {
    pub table: TableSym,
    pub attribute_sets: Vec<Vec<Ident>>,
    pub loc: SrcLoc,
}

/// A resolved constraint.
#[derive(Clone, Debug)]
pub struct RConstraint {
    pub head: RPredicate,
    pub body: Vec<RPredicate>,
    pub loc: SrcLoc,
}

/// A resolved predicate: either a table atom or a filter application.
#[derive(Clone, Debug)]
pub enum RPredicate {
    Table {
        sym: TableSym,
        terms: Vec<RTerm>,
        loc: SrcLoc,
    },
    Filter {
        sym: DefnSym,
        terms: Vec<RTerm>,
        loc: SrcLoc,
    },
    NotEqual {
        x: Ident,
        y: Ident,
        loc: SrcLoc,
    },
}

/// A resolved term.
#[derive(Clone, Debug)]
pub enum RTerm {
    Wild(SrcLoc),
    Var(Ident, SrcLoc),
    Lit(Literal, SrcLoc),
    Tag {
        enum_sym: EnumSym,
        tag: Ident,
        payload: Option<Box<RTerm>>,
        loc: SrcLoc,
    },
    Tuple(Vec<RTerm>, SrcLoc),
    App {
        sym: DefnSym,
        args: Vec<RTerm>,
        loc: SrcLoc,
    },
}

/// A resolved property: a law symbol applied to an expression.
#[derive(Clone, Debug)]
pub struct RProperty {
    pub law: DefnSym,
    pub exp: RExpr,
    pub loc: SrcLoc,
}

/// A resolved hook signature.
#[derive(Clone, Debug)]
pub struct RHook {
    pub sym: DefnSym,
    pub ty: Type,
    pub loc: SrcLoc,
}

/// A resolved expression.
#[derive(Clone, Debug)]
pub enum RExpr {
    Wild {
        loc: SrcLoc,
    },
    Var {
        ident: Ident,
        loc: SrcLoc,
    },
    /// A reference to a definition with a source body.
    Ref {
        sym: DefnSym,
        loc: SrcLoc,
    },
    /// A reference to an externally provided definition.
    HookRef {
        sym: DefnSym,
        loc: SrcLoc,
    },
    Hole {
        sym: HoleSym,
        loc: SrcLoc,
    },
    Lit {
        lit: Literal,
        loc: SrcLoc,
    },
    Lambda {
        params: Vec<RFormalParam>,
        body: Box<RExpr>,
        loc: SrcLoc,
    },
    Apply {
        callee: Box<RExpr>,
        args: Vec<RExpr>,
        loc: SrcLoc,
    },
    Unary {
        op: UnaryOp,
        expr: Box<RExpr>,
        loc: SrcLoc,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<RExpr>,
        rhs: Box<RExpr>,
        loc: SrcLoc,
    },
    IfThenElse {
        cond: Box<RExpr>,
        then: Box<RExpr>,
        otherwise: Box<RExpr>,
        loc: SrcLoc,
    },
    Let {
        ident: Ident,
        value: Box<RExpr>,
        body: Box<RExpr>,
        loc: SrcLoc,
    },
    Match {
        scrutinee: Box<RExpr>,
        rules: Vec<(RPattern, RExpr)>,
        loc: SrcLoc,
    },
    /// A tag with its declaring enum attributed. A nullary case carries a
    /// synthesized unit payload.
    Tag {
        enum_sym: EnumSym,
        tag: Ident,
        payload: Box<RExpr>,
        loc: SrcLoc,
    },
    Tuple {
        elms: Vec<RExpr>,
        loc: SrcLoc,
    },
    SetLit {
        elms: Vec<RExpr>,
        loc: SrcLoc,
    },
    Ascribe {
        expr: Box<RExpr>,
        ty: Type,
        loc: SrcLoc,
    },
}

/// A resolved pattern.
#[derive(Clone, Debug)]
pub enum RPattern {
    Wild(SrcLoc),
    Var(Ident, SrcLoc),
    Lit(Literal, SrcLoc),
    Tag {
        enum_sym: EnumSym,
        tag: Ident,
        payload: Option<Box<RPattern>>,
        loc: SrcLoc,
    },
    Tuple(Vec<RPattern>, SrcLoc),
}
