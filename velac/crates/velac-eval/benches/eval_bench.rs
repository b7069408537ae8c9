//! Benchmark for the partial evaluator over deep constant trees.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use indexmap::IndexMap;

use velac_ast::BinaryOp;
use velac_eval::{Env, PartialEvaluator, SExpr};
use velac_res::types::Type;
use velac_util::SrcLoc;

/// A complete binary tree of additions, `depth` levels deep.
fn addition_tree(depth: u32) -> SExpr {
    if depth == 0 {
        return SExpr::Int64(1);
    }
    SExpr::Binary {
        op: BinaryOp::Plus,
        lhs: Box::new(addition_tree(depth - 1)),
        rhs: Box::new(addition_tree(depth - 1)),
        ty: Type::Int64,
        loc: SrcLoc::UNKNOWN,
    }
}

fn bench_constant_folding(c: &mut Criterion) {
    let defs = IndexMap::new();
    let evaluator = PartialEvaluator::new(&defs);
    let env = Env::empty();

    let shallow = addition_tree(8);
    let deep = addition_tree(14);

    c.bench_function("fold_tree_depth_8", |b| {
        b.iter(|| evaluator.eval(black_box(&shallow), &env).unwrap())
    });

    c.bench_function("fold_tree_depth_14", |b| {
        b.iter(|| evaluator.eval(black_box(&deep), &env).unwrap())
    });
}

fn bench_canonicalize(c: &mut Criterion) {
    let tree = addition_tree(12);
    c.bench_function("canonicalize_depth_12", |b| {
        b.iter(|| velac_eval::canonicalize(black_box(&tree)))
    });
}

criterion_group!(benches, bench_constant_folding, bench_canonicalize);
criterion_main!(benches);
