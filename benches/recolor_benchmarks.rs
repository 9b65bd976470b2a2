use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use recolorize::{
    pipeline::{blend_recolor, fallback_mask, recolor, refine_mask, resize_for_processing},
    Color, ColorizerConfig, ColorizerProcessor, NoMatteProvider, RecolorParams, SegmentationMask,
};

const SIZES: [(u32, u32); 3] = [(256, 256), (512, 384), (1920, 1080)];

fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    }))
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_for_processing");
    for (w, h) in SIZES {
        let image = test_image(w, h);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &image, |b, image| {
            b.iter(|| resize_for_processing(black_box(image), 512));
        });
    }
    group.finish();
}

fn bench_refine(c: &mut Criterion) {
    let mut group = c.benchmark_group("refine_mask");
    let mask = fallback_mask(512, 384);
    for edge_smooth in [0, 2, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(edge_smooth), &edge_smooth, |b, &radius| {
            b.iter(|| refine_mask(black_box(&mask), radius, 1));
        });
    }
    group.finish();
}

fn bench_blend(c: &mut Criterion) {
    let image = test_image(512, 384);
    let weights = SegmentationMask::filled(512, 384, 200);
    let color = Color::new(255, 51, 51);
    c.bench_function("blend_recolor_512x384", |b| {
        b.iter(|| blend_recolor(black_box(&image), color, 0.7, black_box(&weights)));
    });
}

fn bench_recolor(c: &mut Criterion) {
    let mut group = c.benchmark_group("recolor");
    group.sample_size(20);
    for (w, h) in SIZES {
        let image = test_image(w, h);
        let mask = fallback_mask(w, h);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &image, |b, image| {
            b.iter(|| recolor(black_box(image), Color::new(0, 102, 204), 0.7, Some(&mask), 2, 512));
        });
    }
    group.finish();
}

fn bench_cached_session_tweaks(c: &mut Criterion) {
    let processor = match ColorizerProcessor::with_provider(ColorizerConfig::default(), NoMatteProvider) {
        Ok(processor) => processor,
        Err(e) => {
            eprintln!("Skipping processor benchmark: {e}");
            return;
        },
    };
    let image = test_image(1024, 768);
    let mask = processor.extract_mask(&image).mask;

    c.bench_function("processor_recolor_cached_mask_1024x768", |b| {
        b.iter(|| {
            processor.recolor(
                black_box(&image),
                "#FFD700",
                &RecolorParams::default(),
                Some(&mask),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_resize,
    bench_refine,
    bench_blend,
    bench_recolor,
    bench_cached_session_tweaks
);
criterion_main!(benches);
