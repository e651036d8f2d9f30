use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use photo_segmenter::cutout::{background_reference_color, cutout};
use photo_segmenter::{ImageIOService, SegmentationProcessor, SegmenterConfig};

fn test_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let cx = width / 2;
        let cy = height / 2;
        if x.abs_diff(cx) < width / 4 && y.abs_diff(cy) < height / 4 {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
        } else {
            Rgba([235, 235, 235, 255])
        }
    })
}

fn bench_cutout(c: &mut Criterion) {
    let mut group = c.benchmark_group("cutout");
    for (w, h) in [(256, 256), (1024, 768), (1920, 1080)] {
        let image = DynamicImage::ImageRgba8(test_image(w, h));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{w}x{h}")),
            &image,
            |b, image| b.iter(|| cutout(black_box(image), 30.0)),
        );
    }
    group.finish();
}

fn bench_reference_color(c: &mut Criterion) {
    let image = test_image(1920, 1080);
    c.bench_function("background_reference_color", |b| {
        b.iter(|| background_reference_color(black_box(&image), 10));
    });
}

fn bench_processor_png(c: &mut Criterion) {
    let bytes = ImageIOService::encode_png(&test_image(1024, 768)).unwrap();
    let processor = SegmentationProcessor::new(SegmenterConfig::default()).unwrap();
    c.bench_function("process_bytes_to_png_1024x768", |b| {
        b.iter(|| {
            let result = processor.process_bytes(black_box(&bytes)).unwrap();
            result.to_png_bytes().unwrap()
        });
    });
}

criterion_group!(benches, bench_cutout, bench_reference_color, bench_processor_png);
criterion_main!(benches);
