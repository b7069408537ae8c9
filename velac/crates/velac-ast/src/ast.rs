//! The named program: declarations and expressions as parsed.
//!
//! The program is a multi-map keyed by namespace. Each namespace carries
//! its definitions, enums, lattices, tables, indices, constraints,
//! properties, and anonymous named expressions; the program additionally
//! carries a table of hooks (externally provided definitions registered by
//! the embedding host, which have a signature but no source body).
//!
//! Declaration maps are `IndexMap`s so iteration order is the order the
//! parser inserted things; diagnostics stay deterministic without sorting
//! everywhere.

use indexmap::IndexMap;

use velac_util::{Ident, SrcLoc};

use crate::name::{NsPath, QName};
use crate::types::SurfaceType;

// ============================================================================
// PROGRAM
// ============================================================================

/// A whole parsed program, keyed by namespace.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub namespaces: IndexMap<NsPath, Namespace>,
    /// Externally provided definitions, keyed by fully-qualified name.
    pub hooks: IndexMap<(NsPath, Ident), HookDecl>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// The namespace at `path`, creating it if absent.
    pub fn namespace_mut(&mut self, path: NsPath) -> &mut Namespace {
        self.namespaces.entry(path).or_default()
    }

    pub fn namespace(&self, path: &NsPath) -> Option<&Namespace> {
        self.namespaces.get(path)
    }

    pub fn add_def(&mut self, ns: &str, def: DefDecl) {
        self.namespace_mut(NsPath::parse(ns))
            .defs
            .insert(def.ident, def);
    }

    pub fn add_enum(&mut self, ns: &str, decl: EnumDecl) {
        self.namespace_mut(NsPath::parse(ns))
            .enums
            .insert(decl.ident, decl);
    }

    pub fn add_table(&mut self, ns: &str, decl: TableDecl) {
        self.namespace_mut(NsPath::parse(ns))
            .tables
            .insert(decl.ident(), decl);
    }

    pub fn add_hook(&mut self, ns: &str, ident: Ident, hook: HookDecl) {
        self.hooks.insert((NsPath::parse(ns), ident), hook);
    }
}

/// Everything declared inside one namespace.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    pub defs: IndexMap<Ident, DefDecl>,
    pub enums: IndexMap<Ident, EnumDecl>,
    pub lattices: Vec<LatticeDecl>,
    pub tables: IndexMap<Ident, TableDecl>,
    pub indices: Vec<IndexDecl>,
    pub constraints: Vec<ConstraintDecl>,
    pub properties: Vec<PropertyDecl>,
    /// Top-level expressions bound to a bare name, with no `def` syntax.
    pub named_exprs: IndexMap<Ident, NamedExpr>,
}

// ============================================================================
// DECLARATIONS
// ============================================================================

/// A function or constant definition.
#[derive(Clone, Debug)]
pub struct DefDecl {
    pub ident: Ident,
    pub public: bool,
    pub params: Vec<FormalParam>,
    /// Declared result type, if written.
    pub ret: Option<SurfaceType>,
    pub body: Expr,
    pub loc: SrcLoc,
}

/// A formal parameter, optionally annotated.
#[derive(Clone, Debug)]
pub struct FormalParam {
    pub ident: Ident,
    pub ty: Option<SurfaceType>,
    pub loc: SrcLoc,
}

/// An enum declaration with its cases.
#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub ident: Ident,
    pub public: bool,
    /// Type parameters, e.g. the `T` of `Option[T]`.
    pub type_params: Vec<Ident>,
    pub cases: IndexMap<Ident, CaseDecl>,
    pub loc: SrcLoc,
}

/// One case of an enum. A nullary case has payload type `Unit`.
#[derive(Clone, Debug)]
pub struct CaseDecl {
    pub tag: Ident,
    pub payload: SurfaceType,
    pub loc: SrcLoc,
}

/// A bounded lattice declaration: the component expressions giving the
/// lattice structure of a type.
#[derive(Clone, Debug)]
pub struct LatticeDecl {
    pub ty: SurfaceType,
    pub bot: Expr,
    pub top: Expr,
    pub leq: Expr,
    pub lub: Expr,
    pub glb: Expr,
    pub loc: SrcLoc,
}

/// A table declaration: a relation or a lattice-valued table.
#[derive(Clone, Debug)]
pub enum TableDecl {
    Relation {
        ident: Ident,
        attributes: Vec<Attribute>,
        loc: SrcLoc,
    },
    Lattice {
        ident: Ident,
        keys: Vec<Attribute>,
        value: Attribute,
        loc: SrcLoc,
    },
}

impl TableDecl {
    pub fn ident(&self) -> Ident {
        match self {
            TableDecl::Relation { ident, .. } | TableDecl::Lattice { ident, .. } => *ident,
        }
    }

    pub fn loc(&self) -> SrcLoc {
        match self {
            TableDecl::Relation { loc, .. } | TableDecl::Lattice { loc, .. } => *loc,
        }
    }
}

/// A typed table attribute.
#[derive(Clone, Debug)]
pub struct Attribute {
    pub ident: Ident,
    pub ty: SurfaceType,
    pub loc: SrcLoc,
}

/// An index hint on a table: each inner list is one covering attribute set.
#[derive(Clone, Debug)]
pub struct IndexDecl {
    pub table: QName,
    pub attribute_sets: Vec<Vec<Ident>>,
    pub loc: SrcLoc,
}

/// A rule `head :- body.`; a fact is a rule with an empty body.
#[derive(Clone, Debug)]
pub struct ConstraintDecl {
    pub head: Predicate,
    pub body: Vec<Predicate>,
    pub loc: SrcLoc,
}

/// A predicate occurrence in a constraint. At this stage a name may refer
/// to a table or to a filter function; resolution decides which.
#[derive(Clone, Debug)]
pub enum Predicate {
    Named {
        name: QName,
        terms: Vec<Term>,
        loc: SrcLoc,
    },
    NotEqual {
        x: Ident,
        y: Ident,
        loc: SrcLoc,
    },
}

/// A term inside a predicate.
#[derive(Clone, Debug)]
pub enum Term {
    Wild(SrcLoc),
    Var(Ident, SrcLoc),
    Lit(Literal, SrcLoc),
    Tag {
        enum_name: Option<QName>,
        tag: Ident,
        payload: Option<Box<Term>>,
        loc: SrcLoc,
    },
    Tuple(Vec<Term>, SrcLoc),
    /// A function applied to terms, e.g. `f(x, 1)`.
    App {
        name: QName,
        args: Vec<Term>,
        loc: SrcLoc,
    },
}

/// A property: a law applied to an expression, checked by the verifier.
#[derive(Clone, Debug)]
pub struct PropertyDecl {
    pub law: QName,
    pub exp: Expr,
    pub loc: SrcLoc,
}

/// A top-level expression bound to a name with no surrounding `def`.
#[derive(Clone, Debug)]
pub struct NamedExpr {
    pub ident: Ident,
    pub exp: Expr,
    pub loc: SrcLoc,
}

/// An externally provided definition. Resolves like a def; has no body.
#[derive(Clone, Debug)]
pub struct HookDecl {
    pub ty: SurfaceType,
    pub loc: SrcLoc,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// Literal values.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Unit,
    True,
    False,
    Char(char),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// Arbitrary-precision integer, kept as its digit string until a later
    /// phase needs its value.
    BigInt(String),
    Str(String),
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    LogicalNot,
    Plus,
    Minus,
    BitwiseNegate,
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    LogicalAnd,
    LogicalOr,
    Implication,
    Biconditional,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseLeftShift,
    BitwiseRightShift,
}

impl BinaryOp {
    /// Whether reordering the operands preserves meaning. Short-circuiting
    /// operators are excluded: their right operand may not be reached.
    pub fn is_commutative(&self) -> bool {
        matches!(
            self,
            BinaryOp::Plus
                | BinaryOp::Times
                | BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::BitwiseAnd
                | BinaryOp::BitwiseOr
                | BinaryOp::BitwiseXor
        )
    }
}

/// A named expression tree.
#[derive(Clone, Debug)]
pub enum Expr {
    /// The wildcard `_`.
    Wild { loc: SrcLoc },
    /// A local variable occurrence.
    Var { ident: Ident, loc: SrcLoc },
    /// A reference to a top-level definition or hook.
    Ref { name: QName, loc: SrcLoc },
    /// A hole `?name` (or anonymous `?`).
    Hole { name: Option<Ident>, loc: SrcLoc },
    Lit {
        lit: Literal,
        loc: SrcLoc,
    },
    Lambda {
        params: Vec<FormalParam>,
        body: Box<Expr>,
        loc: SrcLoc,
    },
    Apply {
        callee: Box<Expr>,
        args: Vec<Expr>,
        loc: SrcLoc,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        loc: SrcLoc,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        loc: SrcLoc,
    },
    IfThenElse {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
        loc: SrcLoc,
    },
    Let {
        ident: Ident,
        value: Box<Expr>,
        body: Box<Expr>,
        loc: SrcLoc,
    },
    Match {
        scrutinee: Box<Expr>,
        rules: Vec<(Pattern, Expr)>,
        loc: SrcLoc,
    },
    /// A tag application, e.g. `Some(x)`, `Option.Some(x)`, or the bare
    /// constructor `Some`.
    Tag {
        enum_name: Option<QName>,
        tag: Ident,
        payload: Option<Box<Expr>>,
        loc: SrcLoc,
    },
    Tuple {
        elms: Vec<Expr>,
        loc: SrcLoc,
    },
    SetLit {
        elms: Vec<Expr>,
        loc: SrcLoc,
    },
    Ascribe {
        expr: Box<Expr>,
        ty: SurfaceType,
        loc: SrcLoc,
    },
}

impl Expr {
    pub fn loc(&self) -> SrcLoc {
        match self {
            Expr::Wild { loc }
            | Expr::Var { loc, .. }
            | Expr::Ref { loc, .. }
            | Expr::Hole { loc, .. }
            | Expr::Lit { loc, .. }
            | Expr::Lambda { loc, .. }
            | Expr::Apply { loc, .. }
            | Expr::Unary { loc, .. }
            | Expr::Binary { loc, .. }
            | Expr::IfThenElse { loc, .. }
            | Expr::Let { loc, .. }
            | Expr::Match { loc, .. }
            | Expr::Tag { loc, .. }
            | Expr::Tuple { loc, .. }
            | Expr::SetLit { loc, .. }
            | Expr::Ascribe { loc, .. } => *loc,
        }
    }
}

/// A pattern in a match rule.
#[derive(Clone, Debug)]
pub enum Pattern {
    Wild(SrcLoc),
    Var(Ident, SrcLoc),
    Lit(Literal, SrcLoc),
    Tag {
        enum_name: Option<QName>,
        tag: Ident,
        payload: Option<Box<Pattern>>,
        loc: SrcLoc,
    },
    Tuple(Vec<Pattern>, SrcLoc),
}
