use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use spendlens::{Condition, OrderTerm, Scalar, Statement, build_transactional_query};

/// SELECT col0, col1, ... FROM `ds.t` WHERE col0 = "v0" AND col1 = "v1" ... ORDER BY col0 ASC
fn select_statement(n: usize) -> Statement {
    let mut stmt = Statement::select("ds", "t");
    for i in 0..n {
        stmt = stmt
            .field(format!("col{i}"))
            .and_where(Condition::eq(format!("col{i}"), format!("v{i}")));
    }
    stmt.order_by(OrderTerm::asc("col0"))
}

fn insert_statement(n: usize) -> Statement {
    Statement::insert("ds", "t")
        .fields((0..n).map(|i| format!("col{i}")))
        .values((0..n).map(|i| {
            if i % 2 == 0 {
                Scalar::from(i as i64)
            } else {
                Scalar::from(format!("value {i}"))
            }
        }))
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/select");

    for n in [1, 5, 10, 50, 100] {
        let stmt = select_statement(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.build()));
        });
    }

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/insert");

    for n in [1, 5, 10, 50, 100] {
        let stmt = insert_statement(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.build()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/delete_in_list");

    for n in [5, 20, 100, 500] {
        let ids: Vec<String> = (0..n).map(|i| format!("id{i}")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &ids, |b, ids| {
            b.iter(|| {
                let sql = Statement::delete("ds", "t")
                    .and_where(Condition::in_list("id", ids.iter().map(String::as_str)))
                    .build();
                black_box(sql)
            });
        });
    }

    group.finish();
}

fn bench_transaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/transaction");

    for n in [2, 10, 50] {
        let statements: Vec<String> = (0..n)
            .filter_map(|_| insert_statement(7).build().ok())
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &statements, |b, statements| {
            b.iter(|| black_box(build_transactional_query(statements)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select, bench_insert, bench_in_list, bench_transaction);
criterion_main!(benches);
