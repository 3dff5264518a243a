//! Benchmarks for the ingest and render hot paths
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use linevis::config::ParserConfig;
use linevis::protocol::{LineFramer, LineParser};
use linevis::render::{downsample, ChannelSeries, DownsampleMethod};

fn sine_points(n: usize) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let x = i as f64 * 0.001;
            [x, (x * 7.0).sin()]
        })
        .collect()
}

fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");

    // 100 lines of typical 3-channel telemetry per chunk
    let chunk: Vec<u8> = (0..100)
        .flat_map(|i| format!("{}.5,{}.25,{}.125\n", i, i * 2, i * 3).into_bytes())
        .collect();

    group.throughput(Throughput::Bytes(chunk.len() as u64));
    group.bench_function("feed_100_lines", |b| {
        let mut framer = LineFramer::new(&ParserConfig::default());
        b.iter(|| black_box(framer.feed(black_box(&chunk))));
    });

    group.finish();
}

fn bench_line_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_parsing");

    let plain = "1.5,2.25,3.125";
    let labeled = "temp:23.5,hum:48.2,pres:1013.25";
    let with_id = "7,1.5,2.25,3.125";

    let mut plain_config = ParserConfig::default();
    plain_config.channel_names = vec!["a".into(), "b".into(), "c".into()];

    let mut labeled_config = ParserConfig::default();
    labeled_config.strip_labels = true;

    let mut id_config = ParserConfig::default();
    id_config.id_field_index = Some(0);
    id_config.accept_sensor_id = "7".to_string();

    for (name, line, config) in [
        ("plain", plain, plain_config),
        ("labeled", labeled, labeled_config),
        ("id_filtered", with_id, id_config),
    ] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("process_line", name), line, |b, line| {
            let mut parser = LineParser::with_config(config.clone());
            b.iter(|| black_box(parser.process_line(black_box(line))));
        });
    }

    group.finish();
}

fn bench_series_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_push");

    for size in [1000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("push_at_capacity", size), size, |b, &size| {
            let mut series = ChannelSeries::new(size);
            for i in 0..size as u64 {
                series.push(i as f64, i as f64);
            }
            let mut i = size as u64;
            b.iter(|| {
                series.push(black_box(i as f64), black_box(i as f64));
                i = i.wrapping_add(1);
            });
        });
    }

    group.finish();
}

fn bench_downsampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsampling");

    for size in [10_000, 50_000, 200_000].iter() {
        let points = sine_points(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("lttb_2000", size), &points, |b, points| {
            b.iter(|| black_box(downsample(points, 2000, DownsampleMethod::Lttb)));
        });

        group.bench_with_input(
            BenchmarkId::new("min_max_2000", size),
            &points,
            |b, points| {
                b.iter(|| black_box(downsample(points, 2000, DownsampleMethod::MinMax)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_framing,
    bench_line_parsing,
    bench_series_push,
    bench_downsampling
);
criterion_main!(benches);
