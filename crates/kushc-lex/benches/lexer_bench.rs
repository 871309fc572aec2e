use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use kushc_lex::Lexer;
use kushc_util::Handler;

fn lex_token_count(source: &str) -> usize {
    let handler = Handler::new();
    Lexer::new(source, &handler).count()
}

fn bench_identifiers(c: &mut Criterion) {
    let source = "identifier_name ".repeat(2000);
    let mut group = c.benchmark_group("lex_identifiers");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("identifiers", |b| {
        b.iter(|| lex_token_count(black_box(&source)))
    });
    group.finish();
}

fn bench_struct_declarations(c: &mut Criterion) {
    let source = "struct Point { i32 x; i32 y; }\n".repeat(500);
    let mut group = c.benchmark_group("lex_structs");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("structs", |b| {
        b.iter(|| lex_token_count(black_box(&source)))
    });
    group.finish();
}

criterion_group!(benches, bench_identifiers, bench_struct_declarations);
criterion_main!(benches);
