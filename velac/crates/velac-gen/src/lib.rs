//! velac-gen - Continuation interface synthesis.
//!
//! Later phases call function values uniformly regardless of return type:
//! each call site hands the callee a typed continuation object, runs it,
//! and reads the completed result back out of a typed slot. This crate
//! produces the *descriptors* for those continuation interfaces, one per
//! distinct erased result type appearing under an arrow type in the
//! program. Actual body synthesis belongs to the emission phase; this is
//! purely a name and shape producer.

use indexmap::IndexMap;
use std::fmt;

use velac_eval::SExpr;
use velac_res::symbol::DefnSym;
use velac_res::types::Type;

/// A type as the runtime representation sees it: primitives survive,
/// every composite collapses to a generic object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErasedType {
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
    Obj,
}

impl fmt::Display for ErasedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErasedType::Unit => "Unit",
            ErasedType::Bool => "Bool",
            ErasedType::Char => "Char",
            ErasedType::Int8 => "Int8",
            ErasedType::Int16 => "Int16",
            ErasedType::Int32 => "Int32",
            ErasedType::Int64 => "Int64",
            ErasedType::Float32 => "Float32",
            ErasedType::Float64 => "Float64",
            ErasedType::BigInt => "BigInt",
            ErasedType::Str => "Str",
            ErasedType::Obj => "Obj",
        };
        write!(f, "{name}")
    }
}

/// Erase a type to its runtime representation.
pub fn erase(ty: &Type) -> ErasedType {
    match ty {
        Type::Unit => ErasedType::Unit,
        Type::Bool => ErasedType::Bool,
        Type::Char => ErasedType::Char,
        Type::Int8 => ErasedType::Int8,
        Type::Int16 => ErasedType::Int16,
        Type::Int32 => ErasedType::Int32,
        Type::Int64 => ErasedType::Int64,
        Type::Float32 => ErasedType::Float32,
        Type::Float64 => ErasedType::Float64,
        Type::BigInt => ErasedType::BigInt,
        Type::Str => ErasedType::Str,
        _ => ErasedType::Obj,
    }
}

/// The shape of one interface operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodShape {
    pub name: &'static str,
    /// Whether the single parameter is the ambient context.
    pub takes_context: bool,
    pub result: ErasedType,
}

/// A continuation interface descriptor.
///
/// Exposes exactly two operations: a zero-argument accessor for the
/// completed result, and a single-argument entry point taking the
/// program's ambient context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContinuationInterface {
    /// Canonical name, derived from the erased result type.
    pub name: String,
    pub result: ErasedType,
    pub getter: MethodShape,
    pub entry: MethodShape,
}

impl ContinuationInterface {
    /// The descriptor for an arrow type with the given result.
    pub fn for_result(result: &Type) -> Self {
        let erased = erase(result);
        Self {
            name: format!("Cont${erased}"),
            result: erased,
            getter: MethodShape {
                name: "getResult",
                takes_context: false,
                result: erased,
            },
            entry: MethodShape {
                name: "invoke",
                takes_context: true,
                result: ErasedType::Unit,
            },
        }
    }
}

/// Produce the descriptors for every distinct arrow type among `types`,
/// deduplicated by canonical name, in first-seen order.
pub fn emit_interfaces<'a, I>(types: I) -> Vec<ContinuationInterface>
where
    I: IntoIterator<Item = &'a Type>,
{
    let mut out: IndexMap<String, ContinuationInterface> = IndexMap::new();
    for ty in types {
        let mut arrows = Vec::new();
        collect_arrows(ty, &mut arrows);
        for arrow in arrows {
            if let Type::Arrow(_, result) = arrow {
                let descriptor = ContinuationInterface::for_result(result);
                out.entry(descriptor.name.clone()).or_insert(descriptor);
            }
        }
    }
    out.into_values().collect()
}

/// The descriptors for a reduced program: one per distinct erased arrow
/// result appearing anywhere in its expressions.
pub fn interfaces_for_program(defs: &IndexMap<DefnSym, SExpr>) -> Vec<ContinuationInterface> {
    let mut types = Vec::new();
    for body in defs.values() {
        collect_expr_types(body, &mut types);
    }
    emit_interfaces(types.iter())
}

/// Collect every arrow type nested anywhere inside `ty`.
fn collect_arrows<'a>(ty: &'a Type, out: &mut Vec<&'a Type>) {
    match ty {
        Type::Arrow(params, result) => {
            out.push(ty);
            for p in params {
                collect_arrows(p, out);
            }
            collect_arrows(result, out);
        }
        Type::Tuple(elms) => {
            for e in elms {
                collect_arrows(e, out);
            }
        }
        Type::Apply(base, arg) => {
            collect_arrows(base, out);
            collect_arrows(arg, out);
        }
        _ => {}
    }
}

/// Collect the types of every node in an expression tree.
fn collect_expr_types(expr: &SExpr, out: &mut Vec<Type>) {
    out.push(expr.ty());
    match expr {
        SExpr::Lambda { formals, body, .. } | SExpr::Closure { formals, body, .. } => {
            for f in formals {
                out.push(f.ty.clone());
            }
            collect_expr_types(body, out);
        }
        SExpr::Apply { callee, args, .. } => {
            collect_expr_types(callee, out);
            for a in args {
                collect_expr_types(a, out);
            }
        }
        SExpr::Unary { expr, .. } => collect_expr_types(expr, out),
        SExpr::Binary { lhs, rhs, .. } => {
            collect_expr_types(lhs, out);
            collect_expr_types(rhs, out);
        }
        SExpr::Let { value, body, .. } => {
            collect_expr_types(value, out);
            collect_expr_types(body, out);
        }
        SExpr::IfThenElse {
            cond,
            then,
            otherwise,
            ..
        } => {
            collect_expr_types(cond, out);
            collect_expr_types(then, out);
            collect_expr_types(otherwise, out);
        }
        SExpr::Tag { payload, .. } => collect_expr_types(payload, out),
        SExpr::CheckTag { expr, .. } => collect_expr_types(expr, out),
        SExpr::GetTagValue { expr, .. } => collect_expr_types(expr, out),
        SExpr::Tuple { elms, .. } | SExpr::SetLit { elms, .. } => {
            for e in elms {
                collect_expr_types(e, out);
            }
        }
        SExpr::GetTupleIndex { expr, .. } => collect_expr_types(expr, out),
        SExpr::Load { expr, .. } => collect_expr_types(expr, out),
        SExpr::Store { expr, value, .. } => {
            collect_expr_types(expr, out);
            collect_expr_types(value, out);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_erase_to_themselves() {
        assert_eq!(erase(&Type::Int32), ErasedType::Int32);
        assert_eq!(erase(&Type::Bool), ErasedType::Bool);
        assert_eq!(erase(&Type::Str), ErasedType::Str);
    }

    #[test]
    fn composites_erase_to_obj() {
        assert_eq!(erase(&Type::Tuple(vec![Type::Int32])), ErasedType::Obj);
        assert_eq!(
            erase(&Type::Arrow(vec![Type::Int32], Box::new(Type::Bool))),
            ErasedType::Obj
        );
        assert_eq!(erase(&Type::Var(0)), ErasedType::Obj);
    }

    #[test]
    fn descriptor_is_named_by_erased_result() {
        let iface = ContinuationInterface::for_result(&Type::Int32);
        assert_eq!(iface.name, "Cont$Int32");
        assert_eq!(iface.result, ErasedType::Int32);
        assert_eq!(iface.getter.name, "getResult");
        assert!(!iface.getter.takes_context);
        assert_eq!(iface.getter.result, ErasedType::Int32);
        assert_eq!(iface.entry.name, "invoke");
        assert!(iface.entry.takes_context);
    }

    #[test]
    fn interfaces_deduplicate_by_erased_result() {
        let arrows = [
            Type::Arrow(vec![Type::Int32], Box::new(Type::Int32)),
            Type::Arrow(vec![Type::Bool, Type::Str], Box::new(Type::Int32)),
            Type::Arrow(vec![], Box::new(Type::Bool)),
        ];
        let interfaces = emit_interfaces(arrows.iter());
        let names: Vec<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Cont$Int32", "Cont$Bool"]);
    }

    #[test]
    fn nested_arrows_are_found() {
        let ty = Type::Tuple(vec![
            Type::Int32,
            Type::Arrow(
                vec![Type::Arrow(vec![Type::Unit], Box::new(Type::Str))],
                Box::new(Type::Int64),
            ),
        ]);
        let interfaces = emit_interfaces(std::iter::once(&ty));
        let names: Vec<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Cont$Int64", "Cont$Str"]);
    }

    #[test]
    fn composite_results_share_one_descriptor() {
        let arrows = [
            Type::Arrow(vec![], Box::new(Type::Tuple(vec![Type::Int32]))),
            Type::Arrow(vec![], Box::new(Type::Var(3))),
        ];
        let interfaces = emit_interfaces(arrows.iter());
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].name, "Cont$Obj");
    }
}
