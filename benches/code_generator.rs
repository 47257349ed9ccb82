//! 短码生成与 MemoryStore 热路径基准测试

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use linklens::services::{AnalyticsService, EnrichmentSettings};
use linklens::storage::{KeySpace, MemoryStore};
use linklens::utils::{generate_short_code, is_valid_short_code};

// ============== generate_short_code 基准测试 ==============

fn bench_generate_short_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("code/generate_short_code");

    for len in [16usize, 256, 4096] {
        let url = format!("https://example.com/{}", "p".repeat(len));
        group.bench_with_input(BenchmarkId::new("url_len", len), &url, |b, url| {
            b.iter(|| generate_short_code(black_box(url), 6));
        });
    }

    group.finish();
}

fn bench_is_valid_short_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("code/is_valid_short_code");

    group.bench_function("valid", |b| {
        b.iter(|| assert!(is_valid_short_code(black_box("c984d0"))));
    });

    group.bench_function("invalid", |b| {
        b.iter(|| assert!(!is_valid_short_code(black_box("../etc/passwd"))));
    });

    group.finish();
}

// ============== redirect 热路径（MemoryStore） ==============

fn bench_memory_redirect(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = Arc::new(AnalyticsService::from_store(
        Arc::new(MemoryStore::new()),
        KeySpace::default(),
        6,
        None,
        None,
        EnrichmentSettings::default(),
    ));
    let code = rt
        .block_on(service.shorten_without_enrichment("https://example.com"))
        .unwrap()
        .code;

    c.bench_function("service/redirect_target_memory", |b| {
        b.to_async(&rt)
            .iter(|| async { service.redirect_target(black_box(&code)).await.unwrap() });
    });
}

criterion_group!(
    benches,
    bench_generate_short_code,
    bench_is_valid_short_code,
    bench_memory_redirect
);
criterion_main!(benches);
