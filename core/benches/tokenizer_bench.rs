use criterion::{criterion_group, criterion_main, Criterion};
use lookback_core::tokenizer::tokenize;
use lookback_core::{Document, SearchConfig, SearchSystem};

const TEXT: &str = "<p>I have a <code>HashMap&lt;String, Vec&lt;u32&gt;&gt;</code> and want to merge \
two of them without cloning every value. Is there an idiomatic way to do this in Rust 2021?</p>";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_post", |b| b.iter(|| tokenize(TEXT)));
}

fn bench_search(c: &mut Criterion) {
    let corpus = (0..5_000).map(|i| Document::new(format!("{TEXT} post {i}"), i));
    let system = SearchSystem::build(corpus, SearchConfig::default()).expect("build");
    c.bench_function("search_terms", |b| b.iter(|| system.search("merge hashmap value")));
    c.bench_function("search_leading_wildcard", |b| b.iter(|| system.search("*ing")));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
