//! Semantic type terms and the type elaborator.
//!
//! [`Type`] is the internal, structurally-compared representation every
//! phase after resolution works with. [`lookup_type`] maps surface type
//! syntax onto it: built-in names go to fixed primitives (`Int` aliases
//! `Int32`, `Float` aliases `Float64`), everything else is resolved
//! against the program's enums.

use rustc_hash::FxHashMap;

use velac_ast::{NsPath, Program, QName, SurfaceType};
use velac_util::ident::{
    TY_ARRAY, TY_BIGINT, TY_BOOL, TY_CHAR, TY_FLOAT, TY_FLOAT32, TY_FLOAT64, TY_INT, TY_INT16,
    TY_INT32, TY_INT64, TY_INT8, TY_NATIVE, TY_REF, TY_STR, TY_UNIT,
};
use velac_util::Ident;

use crate::access;
use crate::error::ResolutionError;
use crate::symbol::{EnumSym, SymbolFactory};

/// The kind of a type constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Star,
    Arrow(Box<Kind>, Box<Kind>),
}

impl Kind {
    /// The kind of a constructor taking `arity` type arguments:
    /// `* -> ... -> *`.
    pub fn for_arity(arity: usize) -> Kind {
        (0..arity).fold(Kind::Star, |acc, _| {
            Kind::Arrow(Box::new(Kind::Star), Box::new(acc))
        })
    }
}

/// A semantic type term. Compared structurally.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Unit,
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    BigInt,
    Str,
    /// The array type constructor.
    Array,
    /// An opaque host type.
    Native,
    /// The reference cell type constructor.
    Ref,
    /// A type variable.
    Var(u64),
    /// A reference to a user enum.
    Enum(EnumSym, Kind),
    Tuple(Vec<Type>),
    /// A function type: parameter list to result.
    Arrow(Vec<Type>, Box<Type>),
    /// A type constructor applied to a type argument.
    Apply(Box<Type>, Box<Type>),
}

impl Type {
    /// Whether this is one of the fixed-width integer types.
    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int8 | Type::Int16 | Type::Int32 | Type::Int64)
    }
}

/// A type scheme: a base type under a list of quantified variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    pub quantifiers: Vec<u64>,
    pub base: Type,
}

impl Scheme {
    /// A monomorphic scheme.
    pub fn mono(base: Type) -> Self {
        Self {
            quantifiers: Vec::new(),
            base,
        }
    }
}

/// The effect row of a definition. Effect checking runs after resolution;
/// resolution only ever produces the empty row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effect {
    pub effects: Vec<Ident>,
}

impl Effect {
    pub fn pure() -> Self {
        Self::default()
    }

    pub fn is_pure(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Elaborate a surface type in namespace `ns`, with no type parameters in
/// scope.
pub fn lookup_type(
    ty: &SurfaceType,
    ns: &NsPath,
    program: &Program,
    factory: &SymbolFactory,
) -> Result<Type, ResolutionError> {
    lookup_type_in(ty, ns, program, factory, &FxHashMap::default())
}

/// Elaborate a surface type with the given type parameters in scope
/// (used for enum case payloads, where the enum's parameters are visible).
pub fn lookup_type_in(
    ty: &SurfaceType,
    ns: &NsPath,
    program: &Program,
    factory: &SymbolFactory,
    params: &FxHashMap<Ident, Type>,
) -> Result<Type, ResolutionError> {
    match ty {
        SurfaceType::Unit => Ok(Type::Unit),
        SurfaceType::Name(name) => lookup_named_type(name, ns, program, factory, params),
        SurfaceType::Tuple(elms) => {
            let elms = elms
                .iter()
                .map(|t| lookup_type_in(t, ns, program, factory, params))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Type::Tuple(elms))
        }
        SurfaceType::Arrow(args, ret) => {
            let args = args
                .iter()
                .map(|t| lookup_type_in(t, ns, program, factory, params))
                .collect::<Result<Vec<_>, _>>()?;
            let ret = lookup_type_in(ret, ns, program, factory, params)?;
            Ok(Type::Arrow(args, Box::new(ret)))
        }
        SurfaceType::Apply(base, arg) => {
            let base = lookup_type_in(base, ns, program, factory, params)?;
            let arg = lookup_type_in(arg, ns, program, factory, params)?;
            Ok(Type::Apply(Box::new(base), Box::new(arg)))
        }
    }
}

fn lookup_named_type(
    name: &QName,
    ns: &NsPath,
    program: &Program,
    factory: &SymbolFactory,
    params: &FxHashMap<Ident, Type>,
) -> Result<Type, ResolutionError> {
    if !name.is_qualified() {
        // Type parameters shadow everything.
        if let Some(ty) = params.get(&name.ident) {
            return Ok(ty.clone());
        }
        if let Some(prim) = builtin_type(name.ident) {
            return Ok(prim);
        }
        // Current namespace, then the root namespace.
        for candidate_ns in [ns, &NsPath::root()] {
            if let Some(decl) = program
                .namespace(candidate_ns)
                .and_then(|n| n.enums.get(&name.ident))
            {
                let sym = factory.mk_enum_sym(candidate_ns, decl.ident, decl.loc);
                return Ok(Type::Enum(sym, Kind::for_arity(decl.type_params.len())));
            }
        }
        return Err(ResolutionError::UndefinedType {
            name: name.clone(),
            ns: ns.clone(),
            loc: name.loc,
        });
    }

    // Qualified names resolve only in the named namespace.
    match program
        .namespace(&name.namespace)
        .and_then(|n| n.enums.get(&name.ident))
    {
        Some(decl) => {
            if !access::is_enum_accessible(decl, &name.namespace, ns) {
                return Err(ResolutionError::InaccessibleEnum {
                    name: name.clone(),
                    ns: ns.clone(),
                    loc: name.loc,
                });
            }
            let sym = factory.mk_enum_sym(&name.namespace, decl.ident, decl.loc);
            Ok(Type::Enum(sym, Kind::for_arity(decl.type_params.len())))
        }
        None => Err(ResolutionError::UndefinedType {
            name: name.clone(),
            ns: ns.clone(),
            loc: name.loc,
        }),
    }
}

/// The fixed primitive for a built-in type name, if `ident` is one.
fn builtin_type(ident: Ident) -> Option<Type> {
    match ident {
        i if i == TY_UNIT => Some(Type::Unit),
        i if i == TY_BOOL => Some(Type::Bool),
        i if i == TY_CHAR => Some(Type::Char),
        i if i == TY_INT8 => Some(Type::Int8),
        i if i == TY_INT16 => Some(Type::Int16),
        i if i == TY_INT32 || i == TY_INT => Some(Type::Int32),
        i if i == TY_INT64 => Some(Type::Int64),
        i if i == TY_FLOAT32 => Some(Type::Float32),
        i if i == TY_FLOAT64 || i == TY_FLOAT => Some(Type::Float64),
        i if i == TY_BIGINT => Some(Type::BigInt),
        i if i == TY_STR => Some(Type::Str),
        i if i == TY_ARRAY => Some(Type::Array),
        i if i == TY_NATIVE => Some(Type::Native),
        i if i == TY_REF => Some(Type::Ref),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use velac_ast::{CaseDecl, EnumDecl};
    use velac_util::SrcLoc;

    fn enum_decl(name: &str, public: bool) -> EnumDecl {
        let tag = Ident::intern("Mk");
        let mut cases = IndexMap::new();
        cases.insert(
            tag,
            CaseDecl {
                tag,
                payload: SurfaceType::Unit,
                loc: SrcLoc::UNKNOWN,
            },
        );
        EnumDecl {
            ident: Ident::intern(name),
            public,
            type_params: vec![],
            cases,
            loc: SrcLoc::UNKNOWN,
        }
    }

    #[test]
    fn builtins_resolve_to_primitives() {
        let program = Program::new();
        let factory = SymbolFactory::new();
        let ns = NsPath::root();
        let cases = [
            ("Unit", Type::Unit),
            ("Bool", Type::Bool),
            ("Int8", Type::Int8),
            ("Int16", Type::Int16),
            ("Int32", Type::Int32),
            ("Int64", Type::Int64),
            ("BigInt", Type::BigInt),
            ("Str", Type::Str),
        ];
        for (name, expected) in cases {
            let got = lookup_type(&SurfaceType::name(name), &ns, &program, &factory).unwrap();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn int_and_float_are_aliases() {
        let program = Program::new();
        let factory = SymbolFactory::new();
        let ns = NsPath::root();
        assert_eq!(
            lookup_type(&SurfaceType::name("Int"), &ns, &program, &factory).unwrap(),
            Type::Int32
        );
        assert_eq!(
            lookup_type(&SurfaceType::name("Float"), &ns, &program, &factory).unwrap(),
            Type::Float64
        );
    }

    #[test]
    fn unqualified_enum_found_in_current_then_root() {
        let mut program = Program::new();
        program.add_enum("A", enum_decl("Color", true));
        program.add_enum("", enum_decl("Shape", true));
        let factory = SymbolFactory::new();
        let ns = NsPath::parse("A");

        // Current namespace.
        let got = lookup_type(&SurfaceType::name("Color"), &ns, &program, &factory).unwrap();
        assert!(matches!(got, Type::Enum(ref sym, _) if sym.ns == ns));

        // Falls back to the root.
        let got = lookup_type(&SurfaceType::name("Shape"), &ns, &program, &factory).unwrap();
        assert!(matches!(got, Type::Enum(ref sym, _) if sym.ns.is_root()));

        // Neither: undefined.
        let err = lookup_type(&SurfaceType::name("Nope"), &ns, &program, &factory).unwrap_err();
        assert_eq!(err.code(), "UndefinedType");
    }

    #[test]
    fn qualified_lookup_ignores_other_namespaces() {
        let mut program = Program::new();
        program.add_enum("A", enum_decl("Color", true));
        let factory = SymbolFactory::new();
        let ns = NsPath::parse("B");

        assert!(lookup_type(&SurfaceType::name("A.Color"), &ns, &program, &factory).is_ok());
        let err = lookup_type(&SurfaceType::name("B.Color"), &ns, &program, &factory).unwrap_err();
        assert_eq!(err.code(), "UndefinedType");
    }

    #[test]
    fn private_enum_is_inaccessible_from_disjoint_namespace() {
        let mut program = Program::new();
        program.add_enum("A", enum_decl("Secret", false));
        let factory = SymbolFactory::new();

        let err = lookup_type(
            &SurfaceType::name("A.Secret"),
            &NsPath::parse("B"),
            &program,
            &factory,
        )
        .unwrap_err();
        assert_eq!(err.code(), "InaccessibleEnum");

        // Accessible from a descendant of the declaring namespace.
        assert!(lookup_type(
            &SurfaceType::name("A.Secret"),
            &NsPath::parse("A.C"),
            &program,
            &factory,
        )
        .is_ok());
    }

    #[test]
    fn composite_types_recurse() {
        let program = Program::new();
        let factory = SymbolFactory::new();
        let ns = NsPath::root();

        let surface = SurfaceType::Arrow(
            vec![SurfaceType::name("Int32"), SurfaceType::name("Bool")],
            Box::new(SurfaceType::Tuple(vec![
                SurfaceType::name("Str"),
                SurfaceType::Unit,
            ])),
        );
        let got = lookup_type(&surface, &ns, &program, &factory).unwrap();
        assert_eq!(
            got,
            Type::Arrow(
                vec![Type::Int32, Type::Bool],
                Box::new(Type::Tuple(vec![Type::Str, Type::Unit]))
            )
        );
    }

    #[test]
    fn type_application_builds_apply_nodes() {
        let program = Program::new();
        let factory = SymbolFactory::new();
        let surface = SurfaceType::Apply(
            Box::new(SurfaceType::name("Array")),
            Box::new(SurfaceType::name("Int32")),
        );
        let got = lookup_type(&surface, &NsPath::root(), &program, &factory).unwrap();
        assert_eq!(
            got,
            Type::Apply(Box::new(Type::Array), Box::new(Type::Int32))
        );
    }

    #[test]
    fn kind_for_arity() {
        assert_eq!(Kind::for_arity(0), Kind::Star);
        assert_eq!(
            Kind::for_arity(2),
            Kind::Arrow(
                Box::new(Kind::Star),
                Box::new(Kind::Arrow(Box::new(Kind::Star), Box::new(Kind::Star)))
            )
        );
    }
}
