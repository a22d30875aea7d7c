//! Benchmark – `csvmodem::CsvParser`
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use csvmodem::{Callbacks, CsvParser, ParserOptions};

/// Deterministic document of roughly `target_len` bytes mixing plain,
/// quoted, and escaped fields.
fn make_csv_payload(target_len: usize) -> String {
    let mut s = String::with_capacity(target_len + 64);
    s.push_str("id,name,comment,price\n");
    let mut row = 0usize;
    while s.len() < target_len {
        match row % 4 {
            0 => s.push_str(&format!("{row},widget,plain text,{}.99\n", row % 100)),
            1 => s.push_str(&format!("{row},\"gadget, large\",\"says \"\"hi\"\"\",{}\n", row % 7)),
            2 => s.push_str(&format!("{row},gizmo,\"multi\nline\",0\n")),
            _ => s.push_str(&format!("{row},dohickey,\"tab\\\tescaped\",1\n")),
        }
        row += 1;
    }
    s
}

fn run_parser(payload: &str, options: ParserOptions) -> usize {
    let mut fields = 0usize;
    CsvParser::from_str(payload, options)
        .expect("valid options")
        .parse(Callbacks::new().on_field(|_, _| fields += 1))
        .expect("payload parses");
    fields
}

fn bench_window_sizes(c: &mut Criterion) {
    let payload = make_csv_payload(256 * 1024);

    let mut group = c.benchmark_group("csv_window_size");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    for &buffer_size in &[16usize, 1_024, 8_192, 65_536] {
        group.bench_with_input(BenchmarkId::from_parameter(buffer_size), &buffer_size, |b, &size| {
            b.iter(|| {
                let count = run_parser(
                    black_box(&payload),
                    ParserOptions {
                        buffer_size: size,
                        ..Default::default()
                    },
                );
                black_box(count);
            });
        });
    }
    group.finish();
}

fn bench_post_processing(c: &mut Criterion) {
    let payload = make_csv_payload(256 * 1024);

    let mut group = c.benchmark_group("csv_post_processing");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    let variants = [
        ("none", ParserOptions::default()),
        (
            "all",
            ParserOptions {
                has_header: true,
                sanitize_fields: true,
                trim_field_whitespaces: true,
                nullify_empty_fields: true,
                ..Default::default()
            },
        ),
    ];
    for (name, options) in variants {
        group.bench_with_input(BenchmarkId::from_parameter(name), &options, |b, &options| {
            b.iter(|| black_box(run_parser(black_box(&payload), options)));
        });
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(8));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_window_sizes, bench_post_processing }
criterion_main!(benches);
