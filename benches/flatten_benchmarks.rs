// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Flatten Stage Benchmarks
//! © 2026 Bountyy Oy
//!
//! Cost of turning source results into output rows, and of name dedup

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sdfinder::executor::{flatten_result, FlattenState};
use sdfinder::{dedup_lowercase, InputKind, QueryResult, RelationType};

fn result_with(names: usize) -> QueryResult {
    QueryResult {
        domain: "abc.com".to_string(),
        ip: None,
        outcome: Ok((0..names)
            .map(|i| {
                if i % 10 == 0 {
                    format!("host{}.abc.com.cn", i)
                } else {
                    format!("host{}.abc.com", i)
                }
            })
            .collect()),
        relation_method: "api/hackertarget".to_string(),
        relation_type: RelationType::Subdomain,
        input_kind: InputKind::Domain,
    }
}

/// Benchmark flatten with reclassification over growing result sizes
fn benchmark_flatten_result(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_result");

    for size in [10usize, 100, 1000].iter() {
        let result = result_with(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("names", size), &result, |b, result| {
            b.iter(|| {
                let mut state = FlattenState::new();
                black_box(flatten_result(&mut state, result.clone()))
            });
        });
    }

    group.finish();
}

/// Benchmark case-insensitive dedup with half the names duplicated
fn benchmark_dedup_lowercase(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup_lowercase");

    for size in [100usize, 1000, 10000].iter() {
        let names: Vec<String> = (0..*size)
            .map(|i| {
                if i % 2 == 0 {
                    format!("HOST{}.abc.com", i / 2)
                } else {
                    format!("host{}.abc.com", i / 2)
                }
            })
            .collect();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("names", size), &names, |b, names| {
            b.iter(|| black_box(dedup_lowercase(names)));
        });
    }

    group.finish();
}

criterion_group!(flatten_benches, benchmark_flatten_result, benchmark_dedup_lowercase);

criterion_main!(flatten_benches);
