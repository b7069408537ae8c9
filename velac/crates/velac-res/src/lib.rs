//! velac-res - Name resolution.
//!
//! Resolution turns the parser's named program into a program of symbols:
//! every definition reference becomes a [`symbol::DefnSym`], every tag is
//! attributed to the enum that declares it, and every type annotation is
//! elaborated to a semantic [`types::Type`] term.
//!
//! The pass is validation-shaped: declarations are independent subtrees,
//! and an error inside one does not stop the others from being resolved.
//! All collected errors are returned together; the pass fails iff there is
//! at least one.
//!
//! The pre-resolution program is consumed by value; nothing downstream
//! ever sees it again.

pub mod access;
pub mod ast;
pub mod error;
pub mod expr;
pub mod symbol;
pub mod tags;
pub mod types;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use velac_ast::{
    ConstraintDecl, DefDecl, EnumDecl, IndexDecl, LatticeDecl, NsPath, Predicate, Program, QName,
    Term,
};
use velac_util::Ident;

use ast::{
    RAttribute, RCase, RConstraint, RDef, REnum, RHook, RIndex, RLattice, RPredicate, RProperty,
    RTable, RTerm, ResolvedProgram,
};
use error::ResolutionError;
use expr::{ExprResolver, RefTarget};
use symbol::{SymbolFactory, TableSym};
use types::{Effect, Scheme, Type};

/// Resolve a whole program.
///
/// Consumes the named program (its lifecycle ends here) and produces the
/// resolved program, or every resolution error found in one pass.
pub fn resolve(
    mut program: Program,
    factory: &SymbolFactory,
) -> Result<ResolvedProgram, Vec<ResolutionError>> {
    // Named top-level expressions become synthetic definitions so that
    // references find them like any other def. Their schemes are minted
    // fresh below.
    let mut synthetic: FxHashSet<(NsPath, Ident)> = FxHashSet::default();
    for (ns, decls) in program.namespaces.iter_mut() {
        for (ident, named) in std::mem::take(&mut decls.named_exprs) {
            synthetic.insert((ns.clone(), ident));
            decls.defs.insert(
                ident,
                DefDecl {
                    ident,
                    public: false,
                    params: Vec::new(),
                    ret: None,
                    body: named.exp,
                    loc: named.loc,
                },
            );
        }
    }

    let mut out = ResolvedProgram::default();
    let mut errors: Vec<ResolutionError> = Vec::new();

    for (ns, decls) in &program.namespaces {
        let resolver = ExprResolver::new(&program, factory, ns);

        for decl in decls.defs.values() {
            let is_synthetic = synthetic.contains(&(ns.clone(), decl.ident));
            match resolve_def(&resolver, factory, ns, decl, is_synthetic) {
                Ok(def) => {
                    out.defs.insert(def.sym.clone(), def);
                }
                Err(e) => errors.push(e),
            }
        }

        for decl in decls.enums.values() {
            match resolve_enum(&resolver, factory, ns, decl) {
                Ok(en) => {
                    out.enums.insert(en.sym.clone(), en);
                }
                Err(e) => errors.push(e),
            }
        }

        for decl in &decls.lattices {
            match resolve_lattice(&resolver, factory, ns, decl) {
                Ok(lat) => out.lattices.push(lat),
                Err(e) => errors.push(e),
            }
        }

        for decl in decls.tables.values() {
            match resolve_table(factory, ns, decl, &program) {
                Ok(table) => {
                    out.tables.insert(table.sym().clone(), table);
                }
                Err(e) => errors.push(e),
            }
        }

        for decl in &decls.indices {
            match resolve_index(&program, factory, ns, decl) {
                Ok(index) => {
                    out.indices.insert(index.table.clone(), index);
                }
                Err(e) => errors.push(e),
            }
        }

        for decl in &decls.constraints {
            match resolve_constraint(&resolver, &program, factory, ns, decl) {
                Ok(c) => out.constraints.push(c),
                Err(e) => errors.push(e),
            }
        }

        for decl in &decls.properties {
            match resolve_property(&resolver, decl) {
                Ok(p) => out.properties.push(p),
                Err(e) => errors.push(e),
            }
        }
    }

    for ((ns, ident), hook) in &program.hooks {
        match types::lookup_type(&hook.ty, ns, &program, factory) {
            Ok(ty) => {
                let sym = factory.mk_defn_sym(ns, *ident, hook.loc);
                out.hooks.insert(
                    sym.clone(),
                    RHook {
                        sym,
                        ty,
                        loc: hook.loc,
                    },
                );
            }
            Err(e) => errors.push(e),
        }
    }

    log::debug!(
        "resolved {} defs, {} enums, {} tables, {} constraints ({} errors)",
        out.defs.len(),
        out.enums.len(),
        out.tables.len(),
        out.constraints.len(),
        errors.len()
    );

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

fn resolve_def(
    resolver: &ExprResolver<'_>,
    factory: &SymbolFactory,
    ns: &NsPath,
    decl: &DefDecl,
    is_synthetic: bool,
) -> Result<RDef, ResolutionError> {
    let params = resolver.resolve_params(&decl.params)?;
    let ret = match &decl.ret {
        Some(surface) => types::lookup_type(surface, ns, resolver.program, factory)?,
        None => Type::Var(factory.fresh_type_var()),
    };

    let scheme = if is_synthetic {
        // A named expression gets a fresh polymorphic scheme; inference
        // instantiates it per use.
        let var = factory.fresh_type_var();
        Scheme {
            quantifiers: vec![var],
            base: Type::Var(var),
        }
    } else if params.is_empty() {
        Scheme::mono(ret)
    } else {
        Scheme::mono(Type::Arrow(
            params.iter().map(|p| p.ty.clone()).collect(),
            Box::new(ret),
        ))
    };

    Ok(RDef {
        sym: factory.mk_defn_sym(ns, decl.ident, decl.loc),
        public: decl.public,
        params,
        scheme,
        eff: Effect::pure(),
        body: resolver.resolve(&decl.body)?,
        loc: decl.loc,
    })
}

fn resolve_enum(
    resolver: &ExprResolver<'_>,
    factory: &SymbolFactory,
    ns: &NsPath,
    decl: &EnumDecl,
) -> Result<REnum, ResolutionError> {
    let type_params: Vec<(Ident, u64)> = decl
        .type_params
        .iter()
        .map(|p| (*p, factory.fresh_type_var()))
        .collect();
    let scope: FxHashMap<Ident, Type> = type_params
        .iter()
        .map(|(ident, var)| (*ident, Type::Var(*var)))
        .collect();

    let mut cases = IndexMap::new();
    for case in decl.cases.values() {
        let payload =
            types::lookup_type_in(&case.payload, ns, resolver.program, factory, &scope)?;
        cases.insert(
            case.tag,
            RCase {
                tag: case.tag,
                payload,
                loc: case.loc,
            },
        );
    }

    Ok(REnum {
        sym: factory.mk_enum_sym(ns, decl.ident, decl.loc),
        public: decl.public,
        type_params,
        cases,
        loc: decl.loc,
    })
}

fn resolve_lattice(
    resolver: &ExprResolver<'_>,
    factory: &SymbolFactory,
    ns: &NsPath,
    decl: &LatticeDecl,
) -> Result<RLattice, ResolutionError> {
    Ok(RLattice {
        ty: types::lookup_type(&decl.ty, ns, resolver.program, factory)?,
        bot: resolver.resolve(&decl.bot)?,
        top: resolver.resolve(&decl.top)?,
        leq: resolver.resolve(&decl.leq)?,
        lub: resolver.resolve(&decl.lub)?,
        glb: resolver.resolve(&decl.glb)?,
        loc: decl.loc,
    })
}

fn resolve_table(
    factory: &SymbolFactory,
    ns: &NsPath,
    decl: &velac_ast::TableDecl,
    program: &Program,
) -> Result<RTable, ResolutionError> {
    let attr = |a: &velac_ast::Attribute| -> Result<RAttribute, ResolutionError> {
        Ok(RAttribute {
            ident: a.ident,
            ty: types::lookup_type(&a.ty, ns, program, factory)?,
            loc: a.loc,
        })
    };

    match decl {
        velac_ast::TableDecl::Relation {
            ident,
            attributes,
            loc,
        } => Ok(RTable::Relation {
            sym: factory.mk_table_sym(ns, *ident, *loc),
            attributes: attributes.iter().map(attr).collect::<Result<_, _>>()?,
            loc: *loc,
        }),
        velac_ast::TableDecl::Lattice {
            ident,
            keys,
            value,
            loc,
        } => Ok(RTable::Lattice {
            sym: factory.mk_table_sym(ns, *ident, *loc),
            keys: keys.iter().map(attr).collect::<Result<_, _>>()?,
            value: attr(value)?,
            loc: *loc,
        }),
    }
}

fn resolve_index(
    program: &Program,
    factory: &SymbolFactory,
    ns: &NsPath,
    decl: &IndexDecl,
) -> Result<RIndex, ResolutionError> {
    let table = lookup_table(program, factory, &decl.table, ns)?;
    Ok(RIndex {
        table,
        attribute_sets: decl.attribute_sets.clone(),
        loc: decl.loc,
    })
}

fn resolve_constraint(
    resolver: &ExprResolver<'_>,
    program: &Program,
    factory: &SymbolFactory,
    ns: &NsPath,
    decl: &ConstraintDecl,
) -> Result<RConstraint, ResolutionError> {
    // The head must be a table atom.
    let head = match &decl.head {
        Predicate::Named { name, terms, loc } => RPredicate::Table {
            sym: lookup_table(program, factory, name, ns)?,
            terms: terms
                .iter()
                .map(|t| resolve_term(resolver, t))
                .collect::<Result<_, _>>()?,
            loc: *loc,
        },
        Predicate::NotEqual { x, y, loc } => RPredicate::NotEqual {
            x: *x,
            y: *y,
            loc: *loc,
        },
    };

    let mut body = Vec::with_capacity(decl.body.len());
    for pred in &decl.body {
        body.push(resolve_body_predicate(resolver, program, factory, ns, pred)?);
    }

    Ok(RConstraint {
        head,
        body,
        loc: decl.loc,
    })
}

/// A body predicate is a table atom if its name denotes a table, otherwise
/// a filter over a definition.
fn resolve_body_predicate(
    resolver: &ExprResolver<'_>,
    program: &Program,
    factory: &SymbolFactory,
    ns: &NsPath,
    pred: &Predicate,
) -> Result<RPredicate, ResolutionError> {
    match pred {
        Predicate::NotEqual { x, y, loc } => Ok(RPredicate::NotEqual {
            x: *x,
            y: *y,
            loc: *loc,
        }),
        Predicate::Named { name, terms, loc } => {
            let terms: Vec<RTerm> = terms
                .iter()
                .map(|t| resolve_term(resolver, t))
                .collect::<Result<_, _>>()?;
            if let Ok(sym) = lookup_table(program, factory, name, ns) {
                return Ok(RPredicate::Table {
                    sym,
                    terms,
                    loc: *loc,
                });
            }
            match resolver.lookup_ref(name) {
                Ok(RefTarget::Def(sym)) | Ok(RefTarget::Hook(sym)) => Ok(RPredicate::Filter {
                    sym,
                    terms,
                    loc: *loc,
                }),
                Err(_) => Err(ResolutionError::UndefinedTable {
                    name: name.clone(),
                    ns: ns.clone(),
                    loc: *loc,
                }),
            }
        }
    }
}

fn resolve_term(resolver: &ExprResolver<'_>, term: &Term) -> Result<RTerm, ResolutionError> {
    match term {
        Term::Wild(loc) => Ok(RTerm::Wild(*loc)),
        Term::Var(ident, loc) => Ok(RTerm::Var(*ident, *loc)),
        Term::Lit(lit, loc) => Ok(RTerm::Lit(lit.clone(), *loc)),
        Term::Tag {
            enum_name,
            tag,
            payload,
            loc,
        } => {
            let (enum_sym, _) = tags::lookup_enum_by_tag(
                resolver.program,
                resolver.factory,
                enum_name.as_ref(),
                *tag,
                resolver.ns,
                *loc,
            )?;
            let payload = match payload {
                Some(p) => Some(Box::new(resolve_term(resolver, p)?)),
                None => None,
            };
            Ok(RTerm::Tag {
                enum_sym,
                tag: *tag,
                payload,
                loc: *loc,
            })
        }
        Term::Tuple(terms, loc) => Ok(RTerm::Tuple(
            terms
                .iter()
                .map(|t| resolve_term(resolver, t))
                .collect::<Result<_, _>>()?,
            *loc,
        )),
        Term::App { name, args, loc } => {
            let sym = match resolver.lookup_ref(name)? {
                RefTarget::Def(sym) | RefTarget::Hook(sym) => sym,
            };
            Ok(RTerm::App {
                sym,
                args: args
                    .iter()
                    .map(|t| resolve_term(resolver, t))
                    .collect::<Result<_, _>>()?,
                loc: *loc,
            })
        }
    }
}

fn resolve_property(
    resolver: &ExprResolver<'_>,
    decl: &velac_ast::PropertyDecl,
) -> Result<RProperty, ResolutionError> {
    let law = match resolver.lookup_ref(&decl.law)? {
        RefTarget::Def(sym) | RefTarget::Hook(sym) => sym,
    };
    Ok(RProperty {
        law,
        exp: resolver.resolve(&decl.exp)?,
        loc: decl.loc,
    })
}

/// Look up a table name: the named namespace if qualified, otherwise the
/// current namespace with a fallback to the root.
fn lookup_table(
    program: &Program,
    factory: &SymbolFactory,
    name: &QName,
    ns: &NsPath,
) -> Result<TableSym, ResolutionError> {
    let root = NsPath::root();
    let candidates: Vec<&NsPath> = if name.is_qualified() {
        vec![&name.namespace]
    } else {
        vec![ns, &root]
    };
    for candidate_ns in candidates {
        if let Some(decl) = program
            .namespace(candidate_ns)
            .and_then(|n| n.tables.get(&name.ident))
        {
            return Ok(factory.mk_table_sym(candidate_ns, decl.ident(), decl.loc()));
        }
    }
    Err(ResolutionError::UndefinedTable {
        name: name.clone(),
        ns: ns.clone(),
        loc: name.loc,
    })
}
