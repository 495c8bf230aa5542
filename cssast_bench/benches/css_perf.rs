use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use cssast::{tokenize, Config, Parser};

const SAMPLE: &[u8] = include_bytes!("../../cssast/testdata/sample.css");

fn sample_x(times: usize) -> Vec<u8> {
    let mut input = Vec::with_capacity(SAMPLE.len() * times);
    for _ in 0..times {
        input.extend_from_slice(SAMPLE);
        input.push(b'\n');
    }
    input
}

pub fn bench_tokenize(c: &mut Criterion) {
    let input = sample_x(20);
    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("sample x20", |b| b.iter(|| tokenize(black_box(&input))));
    group.finish();
}

pub fn bench_parse(c: &mut Criterion) {
    let input = sample_x(20);
    let config = Config::default();
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("sample x20", |b| {
        b.iter(|| cssast::parse_with_config(black_box(&input), &config))
    });
    group.bench_function("sample x20, pre-tokenized", |b| {
        b.iter_batched(
            || tokenize(&input),
            |tokens| Parser::with_config(tokens, &config).parse(),
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_parse);
criterion_main!(benches);
