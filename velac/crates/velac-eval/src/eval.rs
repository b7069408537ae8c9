//! The partial evaluator core.
//!
//! Direct-style recursion over the simplified tree: every node either
//! reduces to a value, or is rebuilt around its reduced children as a
//! residual. Evaluation order is strict and left-to-right except for the
//! short-circuiting logical operators.
//!
//! Division and modulo by a literal zero are never folded and never
//! rewritten; the node is residualized and the runtime traps. A missing
//! variable or reference here is an internal compiler error, not a user
//! error.

use indexmap::IndexMap;

use velac_ast::{BinaryOp, UnaryOp};
use velac_res::symbol::DefnSym;
use velac_res::types::Type;
use velac_util::SrcLoc;

use crate::env::Env;
use crate::equality::{syntactic_equal, Equality};
use crate::error::EvalError;
use crate::ir::SExpr;

/// Matching-width integer literal operands.
enum IntPair {
    I8(i8, i8),
    I16(i16, i16),
    I32(i32, i32),
    I64(i64, i64),
}

fn int_pair(l: &SExpr, r: &SExpr) -> Option<IntPair> {
    match (l, r) {
        (SExpr::Int8(a), SExpr::Int8(b)) => Some(IntPair::I8(*a, *b)),
        (SExpr::Int16(a), SExpr::Int16(b)) => Some(IntPair::I16(*a, *b)),
        (SExpr::Int32(a), SExpr::Int32(b)) => Some(IntPair::I32(*a, *b)),
        (SExpr::Int64(a), SExpr::Int64(b)) => Some(IntPair::I64(*a, *b)),
        _ => None,
    }
}

/// Apply a wrapping arithmetic method across every width.
macro_rules! each_width {
    ($pair:expr, $f:ident) => {
        match $pair {
            IntPair::I8(a, b) => SExpr::Int8(a.$f(b)),
            IntPair::I16(a, b) => SExpr::Int16(a.$f(b)),
            IntPair::I32(a, b) => SExpr::Int32(a.$f(b)),
            IntPair::I64(a, b) => SExpr::Int64(a.$f(b)),
        }
    };
}

/// Apply a comparison across every width, yielding a boolean literal.
macro_rules! each_width_cmp {
    ($pair:expr, $op:tt) => {
        bool_lit(match $pair {
            IntPair::I8(a, b) => a $op b,
            IntPair::I16(a, b) => a $op b,
            IntPair::I32(a, b) => a $op b,
            IntPair::I64(a, b) => a $op b,
        })
    };
}

/// Apply a bitwise operator across every width.
macro_rules! each_width_bit {
    ($pair:expr, $op:tt) => {
        match $pair {
            IntPair::I8(a, b) => SExpr::Int8(a $op b),
            IntPair::I16(a, b) => SExpr::Int16(a $op b),
            IntPair::I32(a, b) => SExpr::Int32(a $op b),
            IntPair::I64(a, b) => SExpr::Int64(a $op b),
        }
    };
}

fn bool_lit(b: bool) -> SExpr {
    if b {
        SExpr::True
    } else {
        SExpr::False
    }
}

/// The zero literal of an integer type, if `ty` is one.
fn zero_of(ty: &Type) -> Option<SExpr> {
    match ty {
        Type::Int8 => Some(SExpr::Int8(0)),
        Type::Int16 => Some(SExpr::Int16(0)),
        Type::Int32 => Some(SExpr::Int32(0)),
        Type::Int64 => Some(SExpr::Int64(0)),
        _ => None,
    }
}

fn is_int_zero(e: &SExpr) -> bool {
    matches!(
        e,
        SExpr::Int8(0) | SExpr::Int16(0) | SExpr::Int32(0) | SExpr::Int64(0)
    )
}

fn is_int_one(e: &SExpr) -> bool {
    matches!(
        e,
        SExpr::Int8(1) | SExpr::Int16(1) | SExpr::Int32(1) | SExpr::Int64(1)
    )
}

/// The online specializer.
///
/// Holds the program's top-level definitions so that `Ref` nodes can be
/// looked up; a referenced body is handed on as-is, already reduced at its
/// own tier.
pub struct PartialEvaluator<'a> {
    defs: &'a IndexMap<DefnSym, SExpr>,
}

impl<'a> PartialEvaluator<'a> {
    pub fn new(defs: &'a IndexMap<DefnSym, SExpr>) -> Self {
        Self { defs }
    }

    /// Reduce every top-level definition under the empty environment.
    pub fn reduce_all(&self) -> Result<IndexMap<DefnSym, SExpr>, EvalError> {
        let empty = Env::empty();
        let mut out = IndexMap::with_capacity(self.defs.len());
        for (sym, body) in self.defs {
            let reduced = self.eval(body, &empty)?;
            log::trace!("reduced `{sym}` to a {}", if reduced.is_value() { "value" } else { "residual" });
            out.insert(sym.clone(), reduced);
        }
        Ok(out)
    }

    /// Reduce one expression under `env`.
    pub fn eval(&self, expr: &SExpr, env: &Env) -> Result<SExpr, EvalError> {
        match expr {
            // Literals reduce to themselves.
            SExpr::Unit
            | SExpr::True
            | SExpr::False
            | SExpr::Int8(_)
            | SExpr::Int16(_)
            | SExpr::Int32(_)
            | SExpr::Int64(_)
            | SExpr::Str(_)
            | SExpr::Closure { .. }
            | SExpr::Error { .. }
            | SExpr::MatchError { .. } => Ok(expr.clone()),

            SExpr::Var { name, loc, .. } => match env.lookup(*name) {
                None => Err(EvalError::UnresolvedVariable {
                    name: *name,
                    loc: *loc,
                }),
                Some(bound) => {
                    // A variable bound to its own occurrence is the marker a
                    // residual `Let` leaves behind; it stands for itself.
                    if let SExpr::Var { name: bound_name, .. } = bound {
                        if bound_name == name {
                            return Ok(bound.clone());
                        }
                    }
                    let bound = bound.clone();
                    self.eval(&bound, env)
                }
            },

            SExpr::Ref { sym, loc, .. } => match self.defs.get(sym) {
                Some(body) => Ok(body.clone()),
                None => Err(EvalError::UnresolvedReference {
                    sym: sym.clone(),
                    loc: *loc,
                }),
            },

            // A lambda closes over the current environment.
            SExpr::Lambda {
                formals,
                body,
                ty,
                loc,
                ..
            } => Ok(SExpr::Closure {
                formals: formals.clone(),
                body: body.clone(),
                env: env.clone(),
                ty: ty.clone(),
                loc: *loc,
            }),

            SExpr::Unary {
                op,
                expr: operand,
                ty,
                loc,
            } => {
                let e = self.eval(operand, env)?;
                Ok(self.reduce_unary(*op, e, ty, *loc))
            }

            SExpr::Binary {
                op,
                lhs,
                rhs,
                ty,
                loc,
            } => self.reduce_binary(*op, lhs, rhs, env, ty, *loc),

            SExpr::Let {
                name,
                offset,
                value,
                body,
                ty,
                loc,
            } => {
                let v = self.eval(value, env)?;
                if v.is_value() {
                    self.eval(body, &env.bind(*name, v))
                } else {
                    // The binding survives with the reduced-but-residual
                    // bound form. Inside the body the name stands for
                    // itself, so occurrences stay residual references to
                    // the kept binding.
                    let marker = SExpr::Var {
                        name: *name,
                        offset: *offset,
                        ty: v.ty(),
                        loc: *loc,
                    };
                    let b = self.eval(body, &env.bind(*name, marker))?;
                    Ok(SExpr::Let {
                        name: *name,
                        offset: *offset,
                        value: Box::new(v),
                        body: Box::new(b),
                        ty: ty.clone(),
                        loc: *loc,
                    })
                }
            }

            SExpr::IfThenElse {
                cond,
                then,
                otherwise,
                ty,
                loc,
            } => {
                let c = self.eval(cond, env)?;
                match c {
                    SExpr::True => self.eval(then, env),
                    SExpr::False => self.eval(otherwise, env),
                    residual => Ok(SExpr::IfThenElse {
                        cond: Box::new(residual),
                        then: Box::new(self.eval(then, env)?),
                        otherwise: Box::new(self.eval(otherwise, env)?),
                        ty: ty.clone(),
                        loc: *loc,
                    }),
                }
            }

            SExpr::Apply {
                callee,
                args,
                ty,
                loc,
            } => {
                let f = self.eval(callee, env)?;
                match f {
                    SExpr::Lambda { formals, body, .. } => {
                        // Actuals bind as-is; substitution happens lazily
                        // when the body forces a variable.
                        let env2 = self.bind_formals(&formals, args, env, *loc)?;
                        self.eval(&body, &env2)
                    }
                    SExpr::Closure {
                        formals,
                        body,
                        env: captured,
                        ..
                    } => {
                        let env2 = self.bind_formals(&formals, args, &captured, *loc)?;
                        self.eval(&body, &env2)
                    }
                    residual => {
                        let args = args
                            .iter()
                            .map(|a| self.eval(a, env))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(SExpr::Apply {
                            callee: Box::new(residual),
                            args,
                            ty: ty.clone(),
                            loc: *loc,
                        })
                    }
                }
            }

            SExpr::Tag {
                enum_sym,
                tag,
                payload,
                ty,
                loc,
            } => Ok(SExpr::Tag {
                enum_sym: enum_sym.clone(),
                tag: *tag,
                payload: Box::new(self.eval(payload, env)?),
                ty: ty.clone(),
                loc: *loc,
            }),

            SExpr::CheckTag { tag, expr: e, loc } => {
                let scrutinee = self.eval(e, env)?;
                match &scrutinee {
                    SExpr::Tag { tag: actual, .. } => Ok(bool_lit(actual == tag)),
                    _ => Ok(SExpr::CheckTag {
                        tag: *tag,
                        expr: Box::new(scrutinee),
                        loc: *loc,
                    }),
                }
            }

            SExpr::GetTagValue { expr: e, ty, loc } => {
                let scrutinee = self.eval(e, env)?;
                match scrutinee {
                    SExpr::Tag { payload, .. } => Ok(*payload),
                    residual => Ok(SExpr::GetTagValue {
                        expr: Box::new(residual),
                        ty: ty.clone(),
                        loc: *loc,
                    }),
                }
            }

            SExpr::Tuple { elms, ty, loc } => Ok(SExpr::Tuple {
                elms: elms
                    .iter()
                    .map(|e| self.eval(e, env))
                    .collect::<Result<Vec<_>, _>>()?,
                ty: ty.clone(),
                loc: *loc,
            }),

            SExpr::GetTupleIndex {
                expr: e,
                offset,
                ty,
                loc,
            } => {
                let tuple = self.eval(e, env)?;
                if tuple.is_value() {
                    if let SExpr::Tuple { elms, .. } = &tuple {
                        return elms.get(*offset).cloned().ok_or(EvalError::IllegalType {
                            construct: "tuple index out of bounds",
                            loc: *loc,
                        });
                    }
                }
                Ok(SExpr::GetTupleIndex {
                    expr: Box::new(tuple),
                    offset: *offset,
                    ty: ty.clone(),
                    loc: *loc,
                })
            }

            SExpr::SetLit { elms, ty, loc } => Ok(SExpr::SetLit {
                elms: elms
                    .iter()
                    .map(|e| self.eval(e, env))
                    .collect::<Result<Vec<_>, _>>()?,
                ty: ty.clone(),
                loc: *loc,
            }),

            SExpr::Load { loc, .. } => Err(EvalError::IllegalType {
                construct: "load node before the boxing phase",
                loc: *loc,
            }),
            SExpr::Store { loc, .. } => Err(EvalError::IllegalType {
                construct: "store node before the boxing phase",
                loc: *loc,
            }),
        }
    }

    fn bind_formals(
        &self,
        formals: &[crate::ir::SFormal],
        args: &[SExpr],
        base: &Env,
        loc: SrcLoc,
    ) -> Result<Env, EvalError> {
        if formals.len() != args.len() {
            return Err(EvalError::IllegalType {
                construct: "unsaturated call",
                loc,
            });
        }
        Ok(base.bind_all(
            formals
                .iter()
                .map(|f| f.name)
                .zip(args.iter().cloned()),
        ))
    }

    fn reduce_unary(&self, op: UnaryOp, e: SExpr, ty: &Type, loc: SrcLoc) -> SExpr {
        match (op, &e) {
            (UnaryOp::LogicalNot, SExpr::True) => SExpr::False,
            (UnaryOp::LogicalNot, SExpr::False) => SExpr::True,
            (UnaryOp::Plus, _) => e,
            (UnaryOp::Minus, SExpr::Int8(b)) => SExpr::Int8(b.wrapping_neg()),
            (UnaryOp::Minus, SExpr::Int16(s)) => SExpr::Int16(s.wrapping_neg()),
            (UnaryOp::Minus, SExpr::Int32(i)) => SExpr::Int32(i.wrapping_neg()),
            (UnaryOp::Minus, SExpr::Int64(l)) => SExpr::Int64(l.wrapping_neg()),
            (UnaryOp::BitwiseNegate, SExpr::Int8(b)) => SExpr::Int8(!b),
            (UnaryOp::BitwiseNegate, SExpr::Int16(s)) => SExpr::Int16(!s),
            (UnaryOp::BitwiseNegate, SExpr::Int32(i)) => SExpr::Int32(!i),
            (UnaryOp::BitwiseNegate, SExpr::Int64(l)) => SExpr::Int64(!l),
            _ => SExpr::Unary {
                op,
                expr: Box::new(e),
                ty: ty.clone(),
                loc,
            },
        }
    }

    fn reduce_binary(
        &self,
        op: BinaryOp,
        lhs: &SExpr,
        rhs: &SExpr,
        env: &Env,
        ty: &Type,
        loc: SrcLoc,
    ) -> Result<SExpr, EvalError> {
        match op {
            BinaryOp::LogicalAnd => self.reduce_and(lhs, rhs, env, ty, loc),
            BinaryOp::LogicalOr => self.reduce_or(lhs, rhs, env, ty, loc),

            // p => q  is  !p or q.
            BinaryOp::Implication => {
                let desugared = SExpr::Binary {
                    op: BinaryOp::LogicalOr,
                    lhs: Box::new(SExpr::Unary {
                        op: UnaryOp::LogicalNot,
                        expr: Box::new(lhs.clone()),
                        ty: Type::Bool,
                        loc,
                    }),
                    rhs: Box::new(rhs.clone()),
                    ty: ty.clone(),
                    loc,
                };
                self.eval(&desugared, env)
            }

            // p <=> q  is  (p => q) and (q => p).
            BinaryOp::Biconditional => {
                let forwards = SExpr::Binary {
                    op: BinaryOp::Implication,
                    lhs: Box::new(lhs.clone()),
                    rhs: Box::new(rhs.clone()),
                    ty: Type::Bool,
                    loc,
                };
                let backwards = SExpr::Binary {
                    op: BinaryOp::Implication,
                    lhs: Box::new(rhs.clone()),
                    rhs: Box::new(lhs.clone()),
                    ty: Type::Bool,
                    loc,
                };
                let desugared = SExpr::Binary {
                    op: BinaryOp::LogicalAnd,
                    lhs: Box::new(forwards),
                    rhs: Box::new(backwards),
                    ty: ty.clone(),
                    loc,
                };
                self.eval(&desugared, env)
            }

            // x != y  is  !(x == y).
            BinaryOp::NotEqual => {
                let desugared = SExpr::Unary {
                    op: UnaryOp::LogicalNot,
                    expr: Box::new(SExpr::Binary {
                        op: BinaryOp::Equal,
                        lhs: Box::new(lhs.clone()),
                        rhs: Box::new(rhs.clone()),
                        ty: Type::Bool,
                        loc,
                    }),
                    ty: ty.clone(),
                    loc,
                };
                self.eval(&desugared, env)
            }

            BinaryOp::Equal => {
                let l = self.eval(lhs, env)?;
                let r = self.eval(rhs, env)?;
                match syntactic_equal(&l, &r, env) {
                    Equality::Equal => Ok(SExpr::True),
                    Equality::NotEq => Ok(SExpr::False),
                    Equality::Unknown => Ok(SExpr::Binary {
                        op,
                        lhs: Box::new(l),
                        rhs: Box::new(r),
                        ty: ty.clone(),
                        loc,
                    }),
                }
            }

            _ => {
                // Strict operators: both operands first, left to right.
                let l = self.eval(lhs, env)?;
                let r = self.eval(rhs, env)?;
                if let Some(folded) = fold_binary(op, &l, &r) {
                    return Ok(folded);
                }
                if let Some(rewritten) = self.simplify_binary(op, &l, &r, env) {
                    return Ok(rewritten);
                }
                Ok(SExpr::Binary {
                    op,
                    lhs: Box::new(l),
                    rhs: Box::new(r),
                    ty: ty.clone(),
                    loc,
                })
            }
        }
    }

    fn reduce_and(
        &self,
        lhs: &SExpr,
        rhs: &SExpr,
        env: &Env,
        ty: &Type,
        loc: SrcLoc,
    ) -> Result<SExpr, EvalError> {
        let l = self.eval(lhs, env)?;
        match l {
            SExpr::True => self.eval(rhs, env),
            SExpr::False => Ok(SExpr::False),
            residual => {
                let r = self.eval(rhs, env)?;
                match r {
                    SExpr::True => Ok(residual),
                    SExpr::False => Ok(SExpr::False),
                    r => Ok(SExpr::Binary {
                        op: BinaryOp::LogicalAnd,
                        lhs: Box::new(residual),
                        rhs: Box::new(r),
                        ty: ty.clone(),
                        loc,
                    }),
                }
            }
        }
    }

    fn reduce_or(
        &self,
        lhs: &SExpr,
        rhs: &SExpr,
        env: &Env,
        ty: &Type,
        loc: SrcLoc,
    ) -> Result<SExpr, EvalError> {
        let l = self.eval(lhs, env)?;
        match l {
            SExpr::True => Ok(SExpr::True),
            SExpr::False => self.eval(rhs, env),
            residual => {
                let r = self.eval(rhs, env)?;
                match r {
                    SExpr::True => Ok(SExpr::True),
                    SExpr::False => Ok(residual),
                    r => Ok(SExpr::Binary {
                        op: BinaryOp::LogicalOr,
                        lhs: Box::new(residual),
                        rhs: Box::new(r),
                        ty: ty.clone(),
                        loc,
                    }),
                }
            }
        }
    }

    /// Algebraic identities over reduced operands. Applied after concrete
    /// folding has declined.
    fn simplify_binary(&self, op: BinaryOp, l: &SExpr, r: &SExpr, env: &Env) -> Option<SExpr> {
        match op {
            BinaryOp::Plus => {
                if is_int_zero(l) {
                    return Some(r.clone());
                }
                if is_int_zero(r) {
                    return Some(l.clone());
                }
                None
            }
            BinaryOp::Minus => {
                if is_int_zero(r) {
                    return Some(l.clone());
                }
                if syntactic_equal(l, r, env) == Equality::Equal {
                    return zero_of(&l.ty());
                }
                None
            }
            BinaryOp::Times => {
                if is_int_zero(l) {
                    return Some(l.clone());
                }
                if is_int_zero(r) {
                    return Some(r.clone());
                }
                if is_int_one(l) {
                    return Some(r.clone());
                }
                if is_int_one(r) {
                    return Some(l.clone());
                }
                None
            }
            BinaryOp::Divide => {
                if is_int_one(r) {
                    return Some(l.clone());
                }
                None
            }
            BinaryOp::Modulo => {
                if is_int_one(r) {
                    return zero_of(&l.ty());
                }
                None
            }
            _ => None,
        }
    }
}

/// Concrete folding over matching-width integer literals. Division and
/// modulo decline when the divisor is the literal zero.
fn fold_binary(op: BinaryOp, l: &SExpr, r: &SExpr) -> Option<SExpr> {
    let pair = int_pair(l, r)?;
    let folded = match op {
        BinaryOp::Plus => each_width!(pair, wrapping_add),
        BinaryOp::Minus => each_width!(pair, wrapping_sub),
        BinaryOp::Times => each_width!(pair, wrapping_mul),
        BinaryOp::Divide => {
            if is_int_zero(r) {
                return None;
            }
            each_width!(pair, wrapping_div)
        }
        BinaryOp::Modulo => {
            if is_int_zero(r) {
                return None;
            }
            each_width!(pair, wrapping_rem)
        }
        BinaryOp::Less => each_width_cmp!(pair, <),
        BinaryOp::LessEqual => each_width_cmp!(pair, <=),
        BinaryOp::Greater => each_width_cmp!(pair, >),
        BinaryOp::GreaterEqual => each_width_cmp!(pair, >=),
        BinaryOp::BitwiseAnd => each_width_bit!(pair, &),
        BinaryOp::BitwiseOr => each_width_bit!(pair, |),
        BinaryOp::BitwiseXor => each_width_bit!(pair, ^),
        BinaryOp::BitwiseLeftShift => match pair {
            IntPair::I8(a, b) => SExpr::Int8(a.wrapping_shl(b as u32)),
            IntPair::I16(a, b) => SExpr::Int16(a.wrapping_shl(b as u32)),
            IntPair::I32(a, b) => SExpr::Int32(a.wrapping_shl(b as u32)),
            IntPair::I64(a, b) => SExpr::Int64(a.wrapping_shl(b as u32)),
        },
        BinaryOp::BitwiseRightShift => match pair {
            IntPair::I8(a, b) => SExpr::Int8(a.wrapping_shr(b as u32)),
            IntPair::I16(a, b) => SExpr::Int16(a.wrapping_shr(b as u32)),
            IntPair::I32(a, b) => SExpr::Int32(a.wrapping_shr(b as u32)),
            IntPair::I64(a, b) => SExpr::Int64(a.wrapping_shr(b as u32)),
        },
        _ => return None,
    };
    Some(folded)
}
