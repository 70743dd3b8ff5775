//! Benchmarks for frame conversion.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use camfilter::{lut, process_frame, ColorCube, Resolution, YuvFrame, YuvLayout};

fn gradient_frame(res: Resolution, layout: YuvLayout) -> Vec<u8> {
    let size = layout.frame_size(res.width, res.height);
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Benchmark full-frame conversion with and without a color table.
fn bench_process_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_frame");
    let cube = ColorCube::from_fn(|[r, g, b]| [g, b, r]);

    for res in [Resolution::VGA, Resolution::HD_720P, Resolution::FHD_1080P] {
        let data = gradient_frame(res, YuvLayout::Nv21);
        group.throughput(Throughput::Elements(res.pixels()));

        group.bench_with_input(BenchmarkId::new("no_filter", res), &data, |b, data| {
            b.iter(|| {
                let frame = YuvFrame::from_packed(data, YuvLayout::Nv21, res.width, res.height)
                    .unwrap();
                process_frame(black_box(&frame), None).unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("cube", res), &data, |b, data| {
            b.iter(|| {
                let frame = YuvFrame::from_packed(data, YuvLayout::Nv21, res.width, res.height)
                    .unwrap();
                process_frame(black_box(&frame), Some(&cube)).unwrap()
            })
        });
    }

    group.finish();
}

/// Benchmark single trilinear lookups.
fn bench_trilinear(c: &mut Criterion) {
    let mut group = c.benchmark_group("trilinear");
    let cube = ColorCube::identity();

    let values: Vec<[f32; 3]> = (0..10000)
        .map(|i| {
            let t = i as f32 / 10000.0;
            [t, 1.0 - t, (t * 7.0).fract()]
        })
        .collect();
    group.throughput(Throughput::Elements(values.len() as u64));

    group.bench_function("lookup_10000", |b| {
        b.iter(|| {
            values
                .iter()
                .map(|&rgb| lut::trilinear(&cube, black_box(rgb)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_process_frame, bench_trilinear);
criterion_main!(benches);
