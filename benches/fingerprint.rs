//! Benchmarks for cache key derivation
//!
//! This benchmark measures:
//! - Fingerprinting typed conversations of increasing length
//! - Fingerprinting raw request bodies (canonicalization included)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use llm_api_interface::cache::Fingerprint;
use llm_api_interface::types::{Message, MessageRole};

fn conversation(len: usize) -> Vec<Message> {
    (0..len)
        .map(|i| {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            let filler = "lorem ipsum ".repeat(20);
            Message::new(role, format!("Message content number {} {}", i, filler))
        })
        .collect()
}

fn bench_typed_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint_typed");

    for len in [1usize, 10, 100] {
        let messages = conversation(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &messages, |b, messages| {
            b.iter(|| Fingerprint::of(black_box("gpt-4o"), messages))
        });
    }

    group.finish();
}

fn bench_raw_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint_raw");

    let body = serde_json::json!({
        "temperature": 0.7,
        "model": "claude-3-5-sonnet-20241022",
        "messages": conversation(10),
        "max_tokens": 1024,
    });

    group.bench_function("request_body", |b| {
        b.iter(|| Fingerprint::from_json(black_box(&body)))
    });

    group.finish();
}

criterion_group!(benches, bench_typed_fingerprint, bench_raw_fingerprint);
criterion_main!(benches);
