use comic_bubbles::app::{InMemorySurface, SurfaceId};
use comic_bubbles::codec::{decode_bubble_spec, encode_bubble_spec};
use comic_bubbles::core::{default_midpoint, tail_outline};
use comic_bubbles::{BubbleSpec, EditorOptions, EditorRegistry, Rect, TailSpec};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use std::hint::black_box;

fn bench_tail_outline(c: &mut Criterion) {
    let root = Vec2::new(130.0, 120.0);
    let tip = Vec2::new(300.0, 300.0);
    let mid = default_midpoint(root, tip);

    c.bench_function("tail_outline_path", |b| {
        b.iter(|| {
            let outline = tail_outline(black_box(root), black_box(tip), black_box(mid), 25.0);
            black_box(outline.to_path().flatten(16).len())
        })
    });
}

fn bench_spec_codec(c: &mut Criterion) {
    let tails = (0..4)
        .map(|i| {
            let tip = Vec2::new(50.0 * i as f32, 300.0);
            TailSpec::new(tip, default_midpoint(Vec2::ZERO, tip), i > 0)
        })
        .collect();
    let spec = BubbleSpec::new("shout", 2, tails).with_order(3);
    let encoded = encode_bubble_spec(&spec).expect("Spec kodierbar");

    c.bench_function("spec_decode", |b| {
        b.iter(|| decode_bubble_spec(black_box(&encoded)).expect("gültige Spec"))
    });
}

/// Oberfläche mit `count` Blasen im Raster, jede mit einem Schwanz.
fn build_surface(count: usize) -> InMemorySurface {
    let mut surface = InMemorySurface::new(Vec2::new(2000.0, 2000.0));
    for index in 0..count {
        let column = (index % 20) as f32;
        let row = (index / 20) as f32;
        let content = Rect::new(column * 100.0, row * 80.0, 60.0, 40.0);
        let tip = content.center() + Vec2::new(20.0, 60.0);
        let spec = BubbleSpec::new(
            if index % 2 == 0 { "speech" } else { "shout" },
            (index % 3) as i32,
            vec![TailSpec::new(tip, default_midpoint(content.center(), tip), false)],
        );
        surface.add_bubble(content, &spec).expect("Spec kodierbar");
    }
    surface
}

fn bench_hit_testing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_testing");

    for &count in &[20usize, 200usize] {
        let mut registry =
            EditorRegistry::new(EditorOptions::default()).expect("Eingebaute Vorlagen");
        registry
            .start_editing(SurfaceId(0), build_surface(count))
            .expect("Bearbeitung startet");
        let query_points: Vec<Vec2> = (0..256)
            .map(|i| Vec2::new((i * 37 % 2000) as f32 + 0.5, (i * 53 % 1000) as f32 + 0.5))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("bubble_hit_by_point", count),
            &registry,
            |b, registry| {
                b.iter(|| {
                    let mut hits = 0usize;
                    for point in &query_points {
                        if registry
                            .bubble_hit_by_point(SurfaceId(0), black_box(*point))
                            .is_some()
                        {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(core_benches, bench_tail_outline, bench_spec_codec, bench_hit_testing);
criterion_main!(core_benches);
