use criterion::{Criterion, criterion_group, criterion_main};
use pandocify_engine::{Dialect, Pipeline, PipelineConfig, split};
mod common;

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");
    group.sample_size(10);

    let pipeline = Pipeline::new(PipelineConfig::new(std::env::temp_dir()));
    let markua = common::generate_markua_chapter(100);
    let lfm = common::generate_lfm_chapter(100);

    group.bench_function("markua_chapter", |b| {
        b.iter(|| pipeline.convert_as(std::hint::black_box(&markua), Dialect::Markua));
    });
    group.bench_function("lfm_chapter", |b| {
        b.iter(|| pipeline.convert_as(std::hint::black_box(&lfm), Dialect::Lfm));
    });
    group.bench_function("detect", |b| {
        b.iter(|| Dialect::detect(std::hint::black_box(&lfm)));
    });

    group.finish();
}

fn bench_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("splitting");
    group.sample_size(10);

    let book = common::generate_annotated_book(20, 10);
    group.bench_function("split_200_lectures", |b| {
        b.iter(|| split(std::hint::black_box(&book)));
    });

    group.finish();
}

criterion_group!(benches, bench_conversion, bench_splitting);
criterion_main!(benches);
