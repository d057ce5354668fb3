//! Benchmarks for the renderer crate - classification, compositing, PNG
//! encoding and full render passes.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks
//! Or: cargo bench --package renderer -- full_render

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use map_common::{Color, ColorPair};
use renderer::catalog::{CategoryCatalog, CodeRange};
use renderer::classify::partition;
use renderer::compositor::{Compositor, DisplayList};
use renderer::icons::MemoryIcons;
use renderer::painter::GeometryPainter;
use renderer::pipeline::{MapRenderer, MapRequest, RenderConfig};
use renderer::png;
use renderer::projection::Projector;
use renderer::source::MemoryFeatureSource;
use renderer::text::BoxShaper;
use renderer::themes::{RuleGroup, StreetSpec, ThemeSpec};
use test_utils::{bbox, bbox_from, point_grid, square_grid, street_rows};
use tiny_skia::Pixmap;

const CODES: &[i64] = &[31000001, 31100001, 32000001, 39000001];

fn style(r: u8, g: u8, b: u8) -> ColorPair {
    ColorPair::new(Color::rgb(r, g, b), Color::rgb(r / 2, g / 2, b / 2))
}

/// Catalog and themes shaped like the open area pass.
fn bench_renderer() -> MapRenderer {
    let catalog = CategoryCatalog::default()
        .with_category("OPENAREA", CodeRange::new(30000000, 39999999), None)
        .with_category("PARK", CodeRange::new(31000000, 31099999), Some(style(34, 139, 34)))
        .with_category("GARTEN", CodeRange::new(31100000, 31199999), Some(style(120, 200, 90)))
        .with_category("STRASSEN_WEGE", CodeRange::new(35000000, 35999999), Some(style(90, 90, 90)))
        .with_category("LANDSTRASSE", CodeRange::new(35100000, 35199999), Some(style(240, 240, 240)))
        .with_icon("poi", true, vec![CodeRange::new(32000000, 32099999)]);

    let theme = ThemeSpec {
        streets: Some(StreetSpec {
            category: "STRASSEN_WEGE".to_string(),
            classes: vec!["LANDSTRASSE".to_string()],
            style_category: "STRASSEN_WEGE".to_string(),
            inflate: 0.000026,
            remainder_inflate: 0.00003,
        }),
        rules: vec![RuleGroup {
            categories: vec!["PARK".to_string(), "GARTEN".to_string()],
            inflate: 0.00002,
            style: None,
        }],
        ..ThemeSpec::new("openarea", "OPENAREA")
    };
    let config = RenderConfig {
        themes: vec![theme],
        ..RenderConfig::default()
    };
    MapRenderer::new(catalog, config)
}

fn bench_source(count: usize) -> MemoryFeatureSource {
    let target = bbox_from(bbox::NUREMBERG);
    let mut features = square_grid(count, &target, CODES);
    features.extend(street_rows(count / 20 + 1, &target, 35100001));
    features.extend(point_grid(count / 10 + 1, &target, 32000001));
    MemoryFeatureSource::new(features)
}

// =============================================================================
// CLASSIFICATION BENCHMARKS
// =============================================================================

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    let ranges: Vec<CodeRange> = CODES.iter().map(|&c| CodeRange::single(c)).collect();

    for count in [1_000, 10_000, 50_000] {
        let pool = square_grid(count, &bbox_from(bbox::NUREMBERG), CODES);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &pool, |b, pool| {
            b.iter(|| partition(black_box(pool.clone()), &ranges))
        });
    }
    group.finish();
}

// =============================================================================
// COMPOSITING BENCHMARKS
// =============================================================================

fn bench_compositor(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositor");
    let target = bbox_from(bbox::NUREMBERG);
    let catalog = CategoryCatalog::default();

    for count in [500, 5_000] {
        let pool = square_grid(count, &target, CODES);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function(format!("sort_{}", count), |b| {
            b.iter(|| {
                let mut list = DisplayList::new();
                list.extend_styled(pool.clone(), style(10, 20, 30), 0.0);
                black_box(list.into_paint_order())
            })
        });

        group.bench_function(format!("paint_{}", count), |b| {
            let projector = Projector::new(target, 1024, 512).unwrap();
            let painter = GeometryPainter::new(projector, 1.0, 0.000001);
            let compositor = Compositor::new(&painter, &catalog, 22);
            b.iter(|| {
                let mut list = DisplayList::new();
                list.extend_styled(pool.clone(), style(10, 20, 30), 0.00002);
                let mut pixmap = Pixmap::new(1024, 512).unwrap();
                compositor.paint(&mut pixmap, list);
                black_box(pixmap)
            })
        });
    }
    group.finish();
}

// =============================================================================
// PNG ENCODING BENCHMARKS
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");
    let renderer = bench_renderer();
    let source = bench_source(2_000);

    for (width, height) in [(256, 256), (1024, 512), (2048, 1024)] {
        let request = MapRequest {
            center_lat: 49.4455,
            center_lon: 11.0825,
            width_px: width,
            height_px: height,
            width_m: 1234.5,
            target: bbox_from(bbox::NUREMBERG),
        };
        let map = renderer
            .render(&request, &source, &MemoryIcons::new(), &BoxShaper)
            .unwrap();
        let mut flat = Pixmap::new(width, height).unwrap();
        flat.fill(tiny_skia::Color::from_rgba8(66, 76, 71, 181));

        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_function(format!("rendered_{}x{}", width, height), |b| {
            b.iter(|| png::encode_pixmap(black_box(&map.pixmap)))
        });
        group.bench_function(format!("flat_{}x{}", width, height), |b| {
            b.iter(|| png::encode_pixmap(black_box(&flat)))
        });
    }
    group.finish();
}

// =============================================================================
// FULL PIPELINE BENCHMARKS
// =============================================================================

fn bench_full_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_render");
    group.sample_size(20);
    let renderer = bench_renderer();
    let icons = MemoryIcons::new().with_solid("poi", 16, [220, 40, 40, 255]);

    for count in [200, 2_000, 10_000] {
        let source = bench_source(count);
        let request = MapRequest {
            center_lat: 49.4455,
            center_lon: 11.0825,
            width_px: 1024,
            height_px: 512,
            width_m: 1234.5,
            target: bbox_from(bbox::NUREMBERG),
        };
        group.bench_with_input(BenchmarkId::from_parameter(count), &source, |b, source| {
            b.iter(|| {
                renderer
                    .render(black_box(&request), source, &icons, &BoxShaper)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_partition,
    bench_compositor,
    bench_png_encoding,
    bench_full_render,
);
criterion_main!(benches);
