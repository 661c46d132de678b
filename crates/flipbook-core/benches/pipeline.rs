//! Benchmarks for the flipbook rescale and encode stages.
//!
//! Run with: cargo bench -p flipbook-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flipbook_core::{
    AnimationEncoder, Frame, FrameRescaler, FrameSequence, PlaybackConfig, ResizePolicy,
    SourceImage, TargetSize,
};
use image::{DynamicImage, Rgb, RgbImage};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn benchmark_rescale_exact(c: &mut Criterion) {
    let rescaler = FrameRescaler::new(ResizePolicy::Exact);
    let image = DynamicImage::ImageRgb8(gradient(1920, 1080));

    c.bench_function("rescale_exact_1080p_to_480", |b| {
        b.iter(|| {
            let source = SourceImage::from_image("bench.png", image.clone());
            let _ = rescaler.rescale(black_box(source), TargetSize::new(854, 480));
        })
    });
}

fn benchmark_rescale_thumbnail(c: &mut Criterion) {
    let rescaler = FrameRescaler::new(ResizePolicy::Thumbnail);
    let image = DynamicImage::ImageRgb8(gradient(1920, 1080));

    c.bench_function("rescale_thumbnail_1080p_to_480", |b| {
        b.iter(|| {
            let source = SourceImage::from_image("bench.png", image.clone());
            let _ = rescaler.rescale(black_box(source), TargetSize::new(480, 480));
        })
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let encoder = AnimationEncoder::new("bench.gif", 100);
    let playback = PlaybackConfig::default();
    let frame = Frame::full("bench.png", gradient(320, 240));

    c.bench_function("encode_10_frames_320x240", |b| {
        b.iter(|| {
            let frames: FrameSequence = std::iter::repeat(frame.clone()).take(10).collect();
            let _ = encoder.encode(black_box(frames), &playback);
        })
    });
}

criterion_group!(
    benches,
    benchmark_rescale_exact,
    benchmark_rescale_thumbnail,
    benchmark_encode,
);
criterion_main!(benches);
