use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use kushc_lex::TokenStream;
use kushc_par::Parser;
use kushc_util::Handler;

fn parse_module(source: &str) {
    let handler = Handler::new();
    let tokens = TokenStream::new(source, &handler);
    let mut parser = Parser::new(tokens, &handler);
    black_box(parser.parse_module());
}

fn bench_function_declarations(c: &mut Criterion) {
    let source = "i32 identity(i32 x) { return x; }\n".repeat(500);
    let mut group = c.benchmark_group("parse_functions");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("functions", |b| b.iter(|| parse_module(black_box(&source))));
    group.finish();
}

fn bench_expression_heavy_body(c: &mut Criterion) {
    let mut body = String::from("i32 f(i32 a, i32 b, i32 c) {\n");
    for _ in 0..200 {
        body.push_str("    a = (a + b * c - (a / b)) % c;\n");
    }
    body.push_str("    return a;\n}\n");
    let mut group = c.benchmark_group("parse_expressions");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("expressions", |b| b.iter(|| parse_module(black_box(&body))));
    group.finish();
}

criterion_group!(benches, bench_function_declarations, bench_expression_heavy_body);
criterion_main!(benches);
