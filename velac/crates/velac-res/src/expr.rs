//! The expression resolver.
//!
//! Walks the named AST variant by variant, replacing every name occurrence
//! with a symbol. Local variables and wildcards pass through; `Ref`s go
//! through definition lookup (defs and hooks, current namespace then
//! root); tags go through the enum/tag disambiguator. A bare constructor
//! for a case with a non-unit payload is eta-expanded into a lambda with a
//! freshly minted formal.

use velac_ast::{Expr, FormalParam, NsPath, Pattern, Program, QName, SurfaceType};
use velac_util::{Ident, SrcLoc};

use crate::ast::{RExpr, RFormalParam, RPattern};
use crate::error::ResolutionError;
use crate::symbol::{DefnSym, SymbolFactory};
use crate::types::{lookup_type, Type};
use crate::{access, tags};

/// What a definition reference resolved to.
pub enum RefTarget {
    Def(DefnSym),
    Hook(DefnSym),
}

/// Resolves expressions within one namespace.
pub struct ExprResolver<'a> {
    pub program: &'a Program,
    pub factory: &'a SymbolFactory,
    pub ns: &'a NsPath,
}

impl<'a> ExprResolver<'a> {
    pub fn new(program: &'a Program, factory: &'a SymbolFactory, ns: &'a NsPath) -> Self {
        Self {
            program,
            factory,
            ns,
        }
    }

    pub fn resolve(&self, expr: &Expr) -> Result<RExpr, ResolutionError> {
        match expr {
            Expr::Wild { loc } => Ok(RExpr::Wild { loc: *loc }),

            Expr::Var { ident, loc } => Ok(RExpr::Var {
                ident: *ident,
                loc: *loc,
            }),

            Expr::Ref { name, loc } => match self.lookup_ref(name)? {
                RefTarget::Def(sym) => Ok(RExpr::Ref { sym, loc: *loc }),
                RefTarget::Hook(sym) => Ok(RExpr::HookRef { sym, loc: *loc }),
            },

            Expr::Hole { name, loc } => {
                let ident = match name {
                    Some(ident) => *ident,
                    None => self.factory.fresh_var_sym("hole").ident(),
                };
                Ok(RExpr::Hole {
                    sym: self.factory.mk_hole_sym(self.ns, ident, *loc),
                    loc: *loc,
                })
            }

            Expr::Lit { lit, loc } => Ok(RExpr::Lit {
                lit: lit.clone(),
                loc: *loc,
            }),

            Expr::Lambda { params, body, loc } => Ok(RExpr::Lambda {
                params: self.resolve_params(params)?,
                body: Box::new(self.resolve(body)?),
                loc: *loc,
            }),

            Expr::Apply { callee, args, loc } => Ok(RExpr::Apply {
                callee: Box::new(self.resolve(callee)?),
                args: args
                    .iter()
                    .map(|a| self.resolve(a))
                    .collect::<Result<_, _>>()?,
                loc: *loc,
            }),

            Expr::Unary { op, expr, loc } => Ok(RExpr::Unary {
                op: *op,
                expr: Box::new(self.resolve(expr)?),
                loc: *loc,
            }),

            Expr::Binary { op, lhs, rhs, loc } => Ok(RExpr::Binary {
                op: *op,
                lhs: Box::new(self.resolve(lhs)?),
                rhs: Box::new(self.resolve(rhs)?),
                loc: *loc,
            }),

            Expr::IfThenElse {
                cond,
                then,
                otherwise,
                loc,
            } => Ok(RExpr::IfThenElse {
                cond: Box::new(self.resolve(cond)?),
                then: Box::new(self.resolve(then)?),
                otherwise: Box::new(self.resolve(otherwise)?),
                loc: *loc,
            }),

            Expr::Let {
                ident,
                value,
                body,
                loc,
            } => Ok(RExpr::Let {
                ident: *ident,
                value: Box::new(self.resolve(value)?),
                body: Box::new(self.resolve(body)?),
                loc: *loc,
            }),

            Expr::Match {
                scrutinee,
                rules,
                loc,
            } => Ok(RExpr::Match {
                scrutinee: Box::new(self.resolve(scrutinee)?),
                rules: rules
                    .iter()
                    .map(|(pat, exp)| Ok((self.resolve_pattern(pat)?, self.resolve(exp)?)))
                    .collect::<Result<_, ResolutionError>>()?,
                loc: *loc,
            }),

            Expr::Tag {
                enum_name,
                tag,
                payload,
                loc,
            } => self.resolve_tag(enum_name.as_ref(), *tag, payload.as_deref(), *loc),

            Expr::Tuple { elms, loc } => Ok(RExpr::Tuple {
                elms: elms
                    .iter()
                    .map(|e| self.resolve(e))
                    .collect::<Result<_, _>>()?,
                loc: *loc,
            }),

            Expr::SetLit { elms, loc } => Ok(RExpr::SetLit {
                elms: elms
                    .iter()
                    .map(|e| self.resolve(e))
                    .collect::<Result<_, _>>()?,
                loc: *loc,
            }),

            Expr::Ascribe { expr, ty, loc } => Ok(RExpr::Ascribe {
                expr: Box::new(self.resolve(expr)?),
                ty: lookup_type(ty, self.ns, self.program, self.factory)?,
                loc: *loc,
            }),
        }
    }

    /// Resolve a tag occurrence, synthesizing the unit payload for nullary
    /// cases and eta-expanding bare constructors of payload-carrying ones.
    fn resolve_tag(
        &self,
        enum_name: Option<&QName>,
        tag: Ident,
        payload: Option<&Expr>,
        loc: SrcLoc,
    ) -> Result<RExpr, ResolutionError> {
        let (enum_sym, decl) =
            tags::lookup_enum_by_tag(self.program, self.factory, enum_name, tag, self.ns, loc)?;
        let case = &decl.cases[&tag];

        match payload {
            Some(exp) => Ok(RExpr::Tag {
                enum_sym,
                tag,
                payload: Box::new(self.resolve(exp)?),
                loc,
            }),
            None if case.payload == SurfaceType::Unit => Ok(RExpr::Tag {
                enum_sym,
                tag,
                payload: Box::new(RExpr::Lit {
                    lit: velac_ast::Literal::Unit,
                    loc,
                }),
                loc,
            }),
            None => {
                // Bare constructor of a payload-carrying case: expand to
                // `x -> Tag(x)` with a fresh formal. Its type is a fresh
                // variable for inference to pin down.
                let formal = self.factory.fresh_var_sym("x").ident();
                Ok(RExpr::Lambda {
                    params: vec![RFormalParam {
                        ident: formal,
                        ty: Type::Var(self.factory.fresh_type_var()),
                        loc,
                    }],
                    body: Box::new(RExpr::Tag {
                        enum_sym,
                        tag,
                        payload: Box::new(RExpr::Var { ident: formal, loc }),
                        loc,
                    }),
                    loc,
                })
            }
        }
    }

    pub fn resolve_pattern(&self, pat: &Pattern) -> Result<RPattern, ResolutionError> {
        match pat {
            Pattern::Wild(loc) => Ok(RPattern::Wild(*loc)),
            Pattern::Var(ident, loc) => Ok(RPattern::Var(*ident, *loc)),
            Pattern::Lit(lit, loc) => Ok(RPattern::Lit(lit.clone(), *loc)),
            Pattern::Tag {
                enum_name,
                tag,
                payload,
                loc,
            } => {
                let (enum_sym, _) = tags::lookup_enum_by_tag(
                    self.program,
                    self.factory,
                    enum_name.as_ref(),
                    *tag,
                    self.ns,
                    *loc,
                )?;
                let payload = match payload {
                    Some(p) => Some(Box::new(self.resolve_pattern(p)?)),
                    None => None,
                };
                Ok(RPattern::Tag {
                    enum_sym,
                    tag: *tag,
                    payload,
                    loc: *loc,
                })
            }
            Pattern::Tuple(pats, loc) => Ok(RPattern::Tuple(
                pats.iter()
                    .map(|p| self.resolve_pattern(p))
                    .collect::<Result<_, _>>()?,
                *loc,
            )),
        }
    }

    pub fn resolve_params(
        &self,
        params: &[FormalParam],
    ) -> Result<Vec<RFormalParam>, ResolutionError> {
        params
            .iter()
            .map(|p| {
                let ty = match &p.ty {
                    Some(surface) => lookup_type(surface, self.ns, self.program, self.factory)?,
                    None => Type::Var(self.factory.fresh_type_var()),
                };
                Ok(RFormalParam {
                    ident: p.ident,
                    ty,
                    loc: p.loc,
                })
            })
            .collect()
    }

    /// Look up a definition reference among defs and hooks.
    ///
    /// Unqualified: the current namespace's defs and hooks together; a hit
    /// in both is ambiguous; a miss falls back to the root namespace.
    /// Qualified: only the named namespace, subject to accessibility.
    pub fn lookup_ref(&self, name: &QName) -> Result<RefTarget, ResolutionError> {
        if !name.is_qualified() {
            for candidate_ns in [self.ns, &NsPath::root()] {
                let hits = self.hits_in(candidate_ns, name.ident);
                match hits.len() {
                    0 => continue,
                    1 => return Ok(hits.into_iter().next().unwrap()),
                    _ => {
                        return Err(ResolutionError::AmbiguousRef {
                            name: name.clone(),
                            ns: self.ns.clone(),
                            loc: name.loc,
                        })
                    }
                }
            }
            return Err(ResolutionError::UndefinedDef {
                name: name.clone(),
                ns: self.ns.clone(),
                loc: name.loc,
            });
        }

        let hits = self.hits_in(&name.namespace, name.ident);
        match hits.len() {
            0 => Err(ResolutionError::UndefinedDef {
                name: name.clone(),
                ns: self.ns.clone(),
                loc: name.loc,
            }),
            1 => {
                if let Some(decl) = self
                    .program
                    .namespace(&name.namespace)
                    .and_then(|n| n.defs.get(&name.ident))
                {
                    if !access::is_def_accessible(decl, &name.namespace, self.ns) {
                        return Err(ResolutionError::InaccessibleDef {
                            name: name.clone(),
                            ns: self.ns.clone(),
                            loc: name.loc,
                        });
                    }
                }
                Ok(hits.into_iter().next().unwrap())
            }
            _ => Err(ResolutionError::AmbiguousRef {
                name: name.clone(),
                ns: self.ns.clone(),
                loc: name.loc,
            }),
        }
    }

    /// Collect the def and hook hits for `ident` in one namespace.
    fn hits_in(&self, ns: &NsPath, ident: Ident) -> Vec<RefTarget> {
        let mut hits = Vec::new();
        if let Some(decl) = self.program.namespace(ns).and_then(|n| n.defs.get(&ident)) {
            hits.push(RefTarget::Def(self.factory.mk_defn_sym(
                ns,
                decl.ident,
                decl.loc,
            )));
        }
        if let Some(hook) = self.program.hooks.get(&(ns.clone(), ident)) {
            hits.push(RefTarget::Hook(self.factory.mk_defn_sym(
                ns,
                ident,
                hook.loc,
            )));
        }
        hits
    }
}
