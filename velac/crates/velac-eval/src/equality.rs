//! Syntactic equality and canonicalization.
//!
//! [`syntactic_equal`] is a conservative three-valued decision procedure:
//! it answers `Equal` or `NotEq` only when the structure of the two trees
//! proves it, and `Unknown` otherwise. The partial evaluator folds `==`
//! through it.
//!
//! [`canonicalize`] reorders the operands of commutative operators into a
//! deterministic form so that equivalent residuals hash identically. It
//! is pure and idempotent; it never changes meaning (short-circuiting
//! operators are left alone).

use std::cmp::Ordering;

use crate::env::Env;
use crate::ir::SExpr;

/// The verdict of the syntactic equality oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Equality {
    /// The two expressions must evaluate to equal values.
    Equal,
    /// The two expressions must evaluate to unequal values.
    NotEq,
    /// Neither is provable from structure alone.
    Unknown,
}

/// Decide whether two reduced expressions must, must not, or may be equal.
///
/// Both expressions are compared under the same environment, so two
/// occurrences of one variable name denote the same immutable binding.
pub fn syntactic_equal(e1: &SExpr, e2: &SExpr, env: &Env) -> Equality {
    match (e1, e2) {
        // Matching literals.
        (SExpr::Unit, SExpr::Unit) => Equality::Equal,
        (SExpr::True, SExpr::True) | (SExpr::False, SExpr::False) => Equality::Equal,
        (SExpr::True, SExpr::False) | (SExpr::False, SExpr::True) => Equality::NotEq,
        (SExpr::Int8(a), SExpr::Int8(b)) if a == b => Equality::Equal,
        (SExpr::Int16(a), SExpr::Int16(b)) if a == b => Equality::Equal,
        (SExpr::Int32(a), SExpr::Int32(b)) if a == b => Equality::Equal,
        (SExpr::Int64(a), SExpr::Int64(b)) if a == b => Equality::Equal,
        (SExpr::Str(a), SExpr::Str(b)) if a == b => Equality::Equal,

        // One immutable binding, two occurrences.
        (SExpr::Var { name: a, .. }, SExpr::Var { name: b, .. }) if a == b => Equality::Equal,

        (
            SExpr::Tag {
                tag: t1,
                payload: p1,
                ..
            },
            SExpr::Tag {
                tag: t2,
                payload: p2,
                ..
            },
        ) => {
            if t1 != t2 {
                Equality::NotEq
            } else {
                syntactic_equal(p1, p2, env)
            }
        }

        (SExpr::Tuple { elms: a, .. }, SExpr::Tuple { elms: b, .. }) if a.len() == b.len() => {
            let mut verdict = Equality::Equal;
            for (x, y) in a.iter().zip(b.iter()) {
                match syntactic_equal(x, y, env) {
                    Equality::NotEq => return Equality::NotEq,
                    Equality::Unknown => verdict = Equality::Unknown,
                    Equality::Equal => {}
                }
            }
            verdict
        }

        _ => Equality::Unknown,
    }
}

/// Rewrite an expression into its canonical form.
///
/// Bottom-up: children first, then the operands of a commutative operator
/// are put into a deterministic order, and set literal elements are
/// sorted. Idempotent by construction (operands are swapped only when
/// strictly out of order).
pub fn canonicalize(expr: &SExpr) -> SExpr {
    match expr {
        SExpr::Unit
        | SExpr::True
        | SExpr::False
        | SExpr::Int8(_)
        | SExpr::Int16(_)
        | SExpr::Int32(_)
        | SExpr::Int64(_)
        | SExpr::Str(_)
        | SExpr::Var { .. }
        | SExpr::Ref { .. }
        | SExpr::Closure { .. }
        | SExpr::Error { .. }
        | SExpr::MatchError { .. } => expr.clone(),

        SExpr::Lambda {
            ann,
            formals,
            body,
            ty,
            loc,
        } => SExpr::Lambda {
            ann: ann.clone(),
            formals: formals.clone(),
            body: Box::new(canonicalize(body)),
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::Apply {
            callee,
            args,
            ty,
            loc,
        } => SExpr::Apply {
            callee: Box::new(canonicalize(callee)),
            args: args.iter().map(canonicalize).collect(),
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::Unary { op, expr, ty, loc } => SExpr::Unary {
            op: *op,
            expr: Box::new(canonicalize(expr)),
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::Binary {
            op,
            lhs,
            rhs,
            ty,
            loc,
        } => {
            let mut l = canonicalize(lhs);
            let mut r = canonicalize(rhs);
            if op.is_commutative() && cmp_expr(&l, &r) == Ordering::Greater {
                std::mem::swap(&mut l, &mut r);
            }
            SExpr::Binary {
                op: *op,
                lhs: Box::new(l),
                rhs: Box::new(r),
                ty: ty.clone(),
                loc: *loc,
            }
        }

        SExpr::Let {
            name,
            offset,
            value,
            body,
            ty,
            loc,
        } => SExpr::Let {
            name: *name,
            offset: *offset,
            value: Box::new(canonicalize(value)),
            body: Box::new(canonicalize(body)),
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::IfThenElse {
            cond,
            then,
            otherwise,
            ty,
            loc,
        } => SExpr::IfThenElse {
            cond: Box::new(canonicalize(cond)),
            then: Box::new(canonicalize(then)),
            otherwise: Box::new(canonicalize(otherwise)),
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::Tag {
            enum_sym,
            tag,
            payload,
            ty,
            loc,
        } => SExpr::Tag {
            enum_sym: enum_sym.clone(),
            tag: *tag,
            payload: Box::new(canonicalize(payload)),
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::CheckTag { tag, expr, loc } => SExpr::CheckTag {
            tag: *tag,
            expr: Box::new(canonicalize(expr)),
            loc: *loc,
        },

        SExpr::GetTagValue { expr, ty, loc } => SExpr::GetTagValue {
            expr: Box::new(canonicalize(expr)),
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::Tuple { elms, ty, loc } => SExpr::Tuple {
            elms: elms.iter().map(canonicalize).collect(),
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::GetTupleIndex {
            expr,
            offset,
            ty,
            loc,
        } => SExpr::GetTupleIndex {
            expr: Box::new(canonicalize(expr)),
            offset: *offset,
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::SetLit { elms, ty, loc } => {
            // Set elements are unordered; sort them for a stable spelling.
            let mut elms: Vec<SExpr> = elms.iter().map(canonicalize).collect();
            elms.sort_by(cmp_expr);
            SExpr::SetLit {
                elms,
                ty: ty.clone(),
                loc: *loc,
            }
        }

        SExpr::Load {
            expr,
            offset,
            ty,
            loc,
        } => SExpr::Load {
            expr: Box::new(canonicalize(expr)),
            offset: *offset,
            ty: ty.clone(),
            loc: *loc,
        },

        SExpr::Store {
            expr,
            offset,
            value,
            ty,
            loc,
        } => SExpr::Store {
            expr: Box::new(canonicalize(expr)),
            offset: *offset,
            value: Box::new(canonicalize(value)),
            ty: ty.clone(),
            loc: *loc,
        },
    }
}

/// A deterministic total order on expressions, used only to pick canonical
/// operand order. Distinct expressions may compare `Equal`; that just
/// means no swap, which keeps the rewrite idempotent.
pub fn cmp_expr(a: &SExpr, b: &SExpr) -> Ordering {
    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (SExpr::Int8(x), SExpr::Int8(y)) => x.cmp(y),
        (SExpr::Int16(x), SExpr::Int16(y)) => x.cmp(y),
        (SExpr::Int32(x), SExpr::Int32(y)) => x.cmp(y),
        (SExpr::Int64(x), SExpr::Int64(y)) => x.cmp(y),
        (SExpr::Str(x), SExpr::Str(y)) => x.cmp(y),
        (SExpr::Var { name: x, .. }, SExpr::Var { name: y, .. }) => x.cmp(y),
        (SExpr::Ref { sym: x, .. }, SExpr::Ref { sym: y, .. }) => {
            x.ns.cmp(&y.ns).then(x.name.cmp(&y.name))
        }
        (
            SExpr::Unary { op: o1, expr: x, .. },
            SExpr::Unary { op: o2, expr: y, .. },
        ) => (*o1 as u8).cmp(&(*o2 as u8)).then_with(|| cmp_expr(x, y)),
        (
            SExpr::Binary {
                op: o1,
                lhs: l1,
                rhs: r1,
                ..
            },
            SExpr::Binary {
                op: o2,
                lhs: l2,
                rhs: r2,
                ..
            },
        ) => (*o1 as u8)
            .cmp(&(*o2 as u8))
            .then_with(|| cmp_expr(l1, l2))
            .then_with(|| cmp_expr(r1, r2)),
        (
            SExpr::Tag {
                tag: t1,
                payload: p1,
                ..
            },
            SExpr::Tag {
                tag: t2,
                payload: p2,
                ..
            },
        ) => t1.cmp(t2).then_with(|| cmp_expr(p1, p2)),
        (SExpr::Tuple { elms: x, .. }, SExpr::Tuple { elms: y, .. }) => cmp_exprs(x, y),
        (SExpr::SetLit { elms: x, .. }, SExpr::SetLit { elms: y, .. }) => cmp_exprs(x, y),
        _ => Ordering::Equal,
    })
}

fn cmp_exprs(a: &[SExpr], b: &[SExpr]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        for (x, y) in a.iter().zip(b.iter()) {
            match cmp_expr(x, y) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    })
}

fn rank(e: &SExpr) -> u8 {
    match e {
        SExpr::Unit => 0,
        SExpr::True => 1,
        SExpr::False => 2,
        SExpr::Int8(_) => 3,
        SExpr::Int16(_) => 4,
        SExpr::Int32(_) => 5,
        SExpr::Int64(_) => 6,
        SExpr::Str(_) => 7,
        SExpr::Var { .. } => 8,
        SExpr::Ref { .. } => 9,
        SExpr::Lambda { .. } => 10,
        SExpr::Closure { .. } => 11,
        SExpr::Apply { .. } => 12,
        SExpr::Unary { .. } => 13,
        SExpr::Binary { .. } => 14,
        SExpr::Let { .. } => 15,
        SExpr::IfThenElse { .. } => 16,
        SExpr::Tag { .. } => 17,
        SExpr::CheckTag { .. } => 18,
        SExpr::GetTagValue { .. } => 19,
        SExpr::Tuple { .. } => 20,
        SExpr::GetTupleIndex { .. } => 21,
        SExpr::SetLit { .. } => 22,
        SExpr::Error { .. } => 23,
        SExpr::MatchError { .. } => 24,
        SExpr::Load { .. } => 25,
        SExpr::Store { .. } => 26,
    }
}
