//! End-to-end scenarios through the driver.
//!
//! Resolution consumes named programs; partial evaluation consumes
//! simplified roots (type inference and simplification run outside this
//! workspace, so the simplified trees here are built by hand).

use indexmap::IndexMap;

use velac_ast::{
    BinaryOp, CaseDecl, DefDecl, EnumDecl, Expr, Literal, NsPath, Program, QName, SurfaceType,
};
use velac_drv::{compile, reduce, CompileError, Options};
use velac_eval::{Annotations, SExpr};
use velac_res::ast::RExpr;
use velac_res::error::ResolutionError;
use velac_res::symbol::SymbolFactory;
use velac_res::types::Type;
use velac_util::{FileId, Handler, Ident, SrcLoc};

fn lit(l: Literal) -> Expr {
    Expr::Lit {
        lit: l,
        loc: SrcLoc::UNKNOWN,
    }
}

fn def(name: &str, public: bool, body: Expr) -> DefDecl {
    DefDecl {
        ident: Ident::intern(name),
        public,
        params: Vec::new(),
        ret: None,
        body,
        loc: SrcLoc::UNKNOWN,
    }
}

fn enum_with_unit_tags(name: &str, tags: &[&str], loc: SrcLoc) -> EnumDecl {
    let mut cases = IndexMap::new();
    for t in tags {
        let tag = Ident::intern(t);
        cases.insert(
            tag,
            CaseDecl {
                tag,
                payload: SurfaceType::Unit,
                loc,
            },
        );
    }
    EnumDecl {
        ident: Ident::intern(name),
        public: true,
        type_params: vec![],
        cases,
        loc,
    }
}

fn sbin(op: BinaryOp, lhs: SExpr, rhs: SExpr, ty: Type) -> SExpr {
    SExpr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        ty,
        loc: SrcLoc::UNKNOWN,
    }
}

// ----------------------------------------------------------------------------
// Scenario: namespace traversal
// ----------------------------------------------------------------------------

#[test]
fn namespace_traversal_resolves_and_reduces_to_false() {
    // namespace A.B { def f() = false };  namespace A { def g() = A.B.f() }
    let mut program = Program::new();
    program.add_def("A.B", def("f", true, lit(Literal::False)));
    program.add_def(
        "A",
        def(
            "g",
            true,
            Expr::Apply {
                callee: Box::new(Expr::Ref {
                    name: QName::parse("A.B.f", SrcLoc::UNKNOWN),
                    loc: SrcLoc::UNKNOWN,
                }),
                args: vec![],
                loc: SrcLoc::UNKNOWN,
            },
        ),
    );

    let factory = SymbolFactory::new();
    let resolution = compile(program, &factory).unwrap();

    let f_sym = factory.mk_defn_sym(&NsPath::parse("A.B"), Ident::intern("f"), SrcLoc::UNKNOWN);
    let g_sym = factory.mk_defn_sym(&NsPath::parse("A"), Ident::intern("g"), SrcLoc::UNKNOWN);

    // g's body carries f's defining symbol.
    match &resolution.program.defs[&g_sym].body {
        RExpr::Apply { callee, .. } => match callee.as_ref() {
            RExpr::Ref { sym, .. } => assert_eq!(*sym, f_sym),
            other => panic!("expected Ref, got {other:?}"),
        },
        other => panic!("expected Apply, got {other:?}"),
    }

    // After (external) simplification, f is a nullary lambda and g calls it.
    let f_ty = Type::Arrow(vec![], Box::new(Type::Bool));
    let mut defs = IndexMap::new();
    defs.insert(
        f_sym.clone(),
        SExpr::Lambda {
            ann: Annotations::default(),
            formals: vec![],
            body: Box::new(SExpr::False),
            ty: f_ty.clone(),
            loc: SrcLoc::UNKNOWN,
        },
    );
    defs.insert(
        g_sym.clone(),
        SExpr::Apply {
            callee: Box::new(SExpr::Ref {
                sym: f_sym,
                ty: f_ty,
                loc: SrcLoc::UNKNOWN,
            }),
            args: vec![],
            ty: Type::Bool,
            loc: SrcLoc::UNKNOWN,
        },
    );

    let reduction = reduce(defs, &Options::default()).unwrap();
    assert_eq!(reduction.defs[&g_sym], SExpr::False);
}

// ----------------------------------------------------------------------------
// Scenario: constant folding
// ----------------------------------------------------------------------------

#[test]
fn int16_arithmetic_folds_through_the_driver() {
    let factory = SymbolFactory::new();
    let sym = factory.mk_defn_sym(&NsPath::root(), Ident::intern("c"), SrcLoc::UNKNOWN);

    let sum = sbin(
        BinaryOp::Plus,
        sbin(BinaryOp::Plus, SExpr::Int16(3), SExpr::Int16(1), Type::Int16),
        SExpr::Int16(10),
        Type::Int16,
    );
    let square = sbin(BinaryOp::Times, sum.clone(), sum, Type::Int16);

    let mut defs = IndexMap::new();
    defs.insert(sym.clone(), square);
    let reduction = reduce(defs, &Options::default()).unwrap();
    assert_eq!(reduction.defs[&sym], SExpr::Int16(196));
}

// ----------------------------------------------------------------------------
// Scenario: short-circuit OR
// ----------------------------------------------------------------------------

#[test]
fn true_or_divergent_residual_is_true() {
    let factory = SymbolFactory::new();
    let sym = factory.mk_defn_sym(&NsPath::root(), Ident::intern("sc"), SrcLoc::UNKNOWN);

    // The right operand is an unbound variable: evaluating it would be a
    // fatal internal error, so the result proves it was never touched.
    let divergent = SExpr::Var {
        name: Ident::intern("diverges"),
        offset: 0,
        ty: Type::Bool,
        loc: SrcLoc::UNKNOWN,
    };
    let body = sbin(BinaryOp::LogicalOr, SExpr::True, divergent, Type::Bool);

    let mut defs = IndexMap::new();
    defs.insert(sym.clone(), body);
    let reduction = reduce(defs, &Options::default()).unwrap();
    assert_eq!(reduction.defs[&sym], SExpr::True);
}

// ----------------------------------------------------------------------------
// Scenario: tag eta-expansion
// ----------------------------------------------------------------------------

#[test]
fn bare_some_elaborates_to_a_lambda() {
    // enum Option[T] { case None, case Some(T) }; def mk = Some
    let none = Ident::intern("None");
    let some = Ident::intern("Some");
    let mut cases = IndexMap::new();
    cases.insert(
        none,
        CaseDecl {
            tag: none,
            payload: SurfaceType::Unit,
            loc: SrcLoc::UNKNOWN,
        },
    );
    cases.insert(
        some,
        CaseDecl {
            tag: some,
            payload: SurfaceType::name("T"),
            loc: SrcLoc::UNKNOWN,
        },
    );
    let mut program = Program::new();
    program.add_enum(
        "",
        EnumDecl {
            ident: Ident::intern("Option"),
            public: true,
            type_params: vec![Ident::intern("T")],
            cases,
            loc: SrcLoc::UNKNOWN,
        },
    );
    program.add_def(
        "",
        def(
            "mk",
            true,
            Expr::Tag {
                enum_name: None,
                tag: some,
                payload: None,
                loc: SrcLoc::UNKNOWN,
            },
        ),
    );

    let factory = SymbolFactory::new();
    let resolution = compile(program, &factory).unwrap();
    let mk_sym = factory.mk_defn_sym(&NsPath::root(), Ident::intern("mk"), SrcLoc::UNKNOWN);

    match &resolution.program.defs[&mk_sym].body {
        RExpr::Lambda { params, body, .. } => {
            assert_eq!(params.len(), 1);
            match body.as_ref() {
                RExpr::Tag { tag, payload, .. } => {
                    assert_eq!(*tag, some);
                    match payload.as_ref() {
                        RExpr::Var { ident, .. } => assert_eq!(*ident, params[0].ident),
                        other => panic!("expected the fresh formal, got {other:?}"),
                    }
                }
                other => panic!("expected Tag body, got {other:?}"),
            }
        }
        other => panic!("expected Lambda, got {other:?}"),
    }
}

// ----------------------------------------------------------------------------
// Scenario: ambiguous tag
// ----------------------------------------------------------------------------

#[test]
fn unqualified_tag_with_two_declarers_is_ambiguous_with_sorted_candidates() {
    let later = SrcLoc::point(FileId(0), 20, 1);
    let earlier = SrcLoc::point(FileId(0), 5, 1);
    let mut program = Program::new();
    program.add_enum("P", enum_with_unit_tags("Color", &["Red"], later));
    program.add_enum("Q", enum_with_unit_tags("Fruit", &["Red"], earlier));
    program.add_def(
        "R",
        def(
            "use",
            true,
            Expr::Tag {
                enum_name: None,
                tag: Ident::intern("Red"),
                payload: None,
                loc: SrcLoc::UNKNOWN,
            },
        ),
    );

    let factory = SymbolFactory::new();
    let err = compile(program, &factory).unwrap_err();
    match err {
        CompileError::Resolution(errors) => {
            assert_eq!(errors.len(), 1);
            match &errors[0] {
                ResolutionError::AmbiguousTag { candidates, .. } => {
                    assert_eq!(candidates, &vec![earlier, later]);
                }
                other => panic!("expected AmbiguousTag, got {other:?}"),
            }
        }
        other => panic!("expected Resolution failure, got {other:?}"),
    }
}

// ----------------------------------------------------------------------------
// Scenario: inaccessible definition
// ----------------------------------------------------------------------------

#[test]
fn private_def_reference_fails_with_inaccessible_def() {
    let mut program = Program::new();
    program.add_def("X", def("h", false, lit(Literal::True)));
    program.add_def(
        "Y",
        def(
            "g",
            true,
            Expr::Ref {
                name: QName::parse("X.h", SrcLoc::UNKNOWN),
                loc: SrcLoc::UNKNOWN,
            },
        ),
    );

    let factory = SymbolFactory::new();
    let err = compile(program, &factory).unwrap_err();
    match err {
        CompileError::Resolution(errors) => match &errors[0] {
            ResolutionError::InaccessibleDef { name, ns, .. } => {
                assert_eq!(name.ident.as_str(), "h");
                assert_eq!(*ns, NsPath::parse("Y"));
            }
            other => panic!("expected InaccessibleDef, got {other:?}"),
        },
        other => panic!("expected Resolution failure, got {other:?}"),
    }
}

// ----------------------------------------------------------------------------
// Driver surface
// ----------------------------------------------------------------------------

#[test]
fn phase_times_are_recorded() {
    let mut program = Program::new();
    program.add_def("A", def("f", true, lit(Literal::Unit)));
    let factory = SymbolFactory::new();
    let resolution = compile(program, &factory).unwrap();
    assert!(resolution.times.resolver_ns > 0);

    let sym = factory.mk_defn_sym(&NsPath::root(), Ident::intern("c"), SrcLoc::UNKNOWN);
    let mut defs = IndexMap::new();
    defs.insert(
        sym,
        sbin(BinaryOp::Plus, SExpr::Int32(1), SExpr::Int32(2), Type::Int32),
    );
    let reduction = reduce(defs, &Options::default()).unwrap();
    assert!(reduction.times.evaluator_ns > 0);
}

#[test]
fn resolution_errors_report_as_diagnostics() {
    let mut program = Program::new();
    program.add_def(
        "A",
        def(
            "g",
            true,
            Expr::Ref {
                name: QName::parse("missing", SrcLoc::UNKNOWN),
                loc: SrcLoc::UNKNOWN,
            },
        ),
    );

    let factory = SymbolFactory::new();
    let err = compile(program, &factory).unwrap_err();
    let handler = Handler::new();
    err.report(&handler);
    assert!(handler.has_errors());
    assert_eq!(handler.diagnostics()[0].code, "UndefinedDef");
}

#[test]
fn reduction_synthesizes_continuation_interfaces() {
    let factory = SymbolFactory::new();
    let sym = factory.mk_defn_sym(&NsPath::root(), Ident::intern("f"), SrcLoc::UNKNOWN);
    let mut defs = IndexMap::new();
    defs.insert(
        sym,
        SExpr::Lambda {
            ann: Annotations::default(),
            formals: vec![],
            body: Box::new(SExpr::Int32(1)),
            ty: Type::Arrow(vec![], Box::new(Type::Int32)),
            loc: SrcLoc::UNKNOWN,
        },
    );
    let reduction = reduce(defs, &Options::default()).unwrap();
    let names: Vec<&str> = reduction
        .interfaces
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    assert!(names.contains(&"Cont$Int32"));
}

#[test]
fn boxing_nodes_abort_with_an_internal_error() {
    let factory = SymbolFactory::new();
    let sym = factory.mk_defn_sym(&NsPath::root(), Ident::intern("bad"), SrcLoc::UNKNOWN);
    let mut defs = IndexMap::new();
    defs.insert(
        sym,
        SExpr::Load {
            expr: Box::new(SExpr::Int64(0)),
            offset: 0,
            ty: Type::Int8,
            loc: SrcLoc::UNKNOWN,
        },
    );
    let err = reduce(defs, &Options::default()).unwrap_err();
    assert!(matches!(err, CompileError::Internal(_)));
}

#[test]
fn canonicalization_can_be_disabled() {
    let factory = SymbolFactory::new();
    let sym = factory.mk_defn_sym(&NsPath::root(), Ident::intern("r"), SrcLoc::UNKNOWN);
    let x = Ident::intern("x");

    // let x = <residual>; x + (2 + 1)  -- the trailing sum folds, the
    // leading residual keeps the whole body residual.
    let residual_value = sbin(
        BinaryOp::Divide,
        SExpr::Int32(1),
        SExpr::Int32(0),
        Type::Int32,
    );
    let body = SExpr::Let {
        name: x,
        offset: 0,
        value: Box::new(residual_value),
        body: Box::new(sbin(
            BinaryOp::Plus,
            SExpr::Var {
                name: x,
                offset: 0,
                ty: Type::Int32,
                loc: SrcLoc::UNKNOWN,
            },
            SExpr::Int32(0),
            Type::Int32,
        )),
        ty: Type::Int32,
        loc: SrcLoc::UNKNOWN,
    };

    let mut defs = IndexMap::new();
    defs.insert(sym.clone(), body);
    let with = reduce(defs.clone(), &Options::default()).unwrap();
    let without = reduce(defs, &Options { canonicalize: false }).unwrap();

    // Both keep the Let; canonicalization does not change meaning here.
    assert!(matches!(with.defs[&sym], SExpr::Let { .. }));
    assert!(matches!(without.defs[&sym], SExpr::Let { .. }));
}
