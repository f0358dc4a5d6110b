// Frame Benchmarks
// Performance benchmarks for the per-frame presentation path and config parsing

use criterion::{criterion_group, criterion_main, Criterion};
use snes_frontend::config::{AspectRatio, ConfFile, ConfigStore, DisplaySettings, Settings};
use snes_frontend::display::{
    apply_aspect, FrameBuffer, VideoStandard, MAX_SNES_HEIGHT, MAX_SNES_WIDTH,
};
use std::hint::black_box;

/// Benchmark RGB565 to RGBA8 expansion
/// Every frame goes through this before upload
fn bench_frame_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_conversion");

    group.bench_function("rgba_256x224", |b| {
        let mut buffer = FrameBuffer::new(256, 224);
        buffer.test_pattern(0);
        let mut rgba = vec![0u8; 256 * 224 * 4];

        b.iter(|| {
            buffer.frame().to_rgba(&mut rgba);
            black_box(&rgba);
        });
    });

    // Hi-res interlaced frames are four times larger
    group.bench_function("rgba_512x478", |b| {
        let mut buffer = FrameBuffer::new(MAX_SNES_WIDTH, MAX_SNES_HEIGHT);
        buffer.test_pattern(0);
        let mut rgba = vec![0u8; MAX_SNES_WIDTH * MAX_SNES_HEIGHT * 4];

        b.iter(|| {
            buffer.frame().to_rgba(&mut rgba);
            black_box(&rgba);
        });
    });

    group.finish();
}

/// Benchmark viewport computation for each aspect mode
fn bench_aspect(c: &mut Criterion) {
    let mut group = c.benchmark_group("aspect");

    for index in 0..=AspectRatio::MAX_INDEX {
        let settings = DisplaySettings {
            aspect_ratio: AspectRatio::from_index(index),
            ..DisplaySettings::default()
        };
        group.bench_function(format!("mode_{}", index), |b| {
            b.iter(|| {
                black_box(apply_aspect(
                    black_box(256),
                    black_box(224),
                    1920,
                    1080,
                    &settings,
                    VideoStandard::Ntsc,
                ))
            });
        });
    }

    group.finish();
}

/// Benchmark reading a complete configuration file
fn bench_config(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = ConfigStore::with_dir(dir.path());
    store
        .save_config_file(&Settings::default())
        .expect("Failed to write config");
    let text = std::fs::read_to_string(store.config_file()).expect("Failed to read config");

    group.bench_function("parse", |b| {
        b.iter(|| black_box(ConfFile::parse(black_box(&text))));
    });

    group.bench_function("load", |b| {
        let mut settings = Settings::default();
        b.iter(|| {
            store
                .load_config_file(&mut settings)
                .expect("Failed to load config");
            black_box(&settings);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_frame_conversion, bench_aspect, bench_config);
criterion_main!(benches);
