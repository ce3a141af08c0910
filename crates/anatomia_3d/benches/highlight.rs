//! Criterion benchmarks for model highlighting.
//!
//! Compares a cached highlight pass against measuring every part's bounds on
//! every frame.
//!
//! Run with:
//!   cargo bench -p anatomia_3d

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use anatomia_3d::{
    HighlightStyle, HotspotCatalog, HotspotEntry, MeshModel, MeshPart, SceneModel,
    SpatialHighlightIndex, Tint,
};
use anatomia_animation::MotionSnapshot;
use anatomia_core::Vec3;

const VERTICES_PER_PART: usize = 512;

fn make_model(parts: usize) -> MeshModel {
    let mut model = MeshModel::new();
    for i in 0..parts {
        let base = (i % 180) as f32;
        let vertices = (0..VERTICES_PER_PART)
            .map(|v| {
                let t = v as f32 / VERTICES_PER_PART as f32;
                Vec3::new(t.sin(), base + t * 4.0, t.cos())
            })
            .collect();
        model.add_part(MeshPart::new(format!("part-{i}"), vertices));
    }
    model
}

fn catalog() -> HotspotCatalog {
    HotspotCatalog::new(vec![HotspotEntry::new(
        "thorax",
        "Thorax",
        Vec3::new(0.0, 120.0, 0.0),
        100.0,
        140.0,
    )])
    .expect("static catalog is valid")
}

/// Per-frame recomputation the cache replaces
fn uncached_pass(model: &mut MeshModel, y_min: f32, y_max: f32, tint: Tint) -> usize {
    let mut writes = Vec::new();
    model.for_each_part(&mut |part| {
        let center = model
            .compute_bounds(part)
            .and_then(|b| b.vertical_center());
        let wanted = match center {
            Some(y) if y >= y_min && y <= y_max => tint,
            _ => Tint::NEUTRAL,
        };
        if model.tint(part) != Some(wanted) {
            writes.push((part, wanted));
        }
    });
    let count = writes.len();
    for (part, tint) in writes {
        model.set_tint(part, tint);
    }
    count
}

fn bench_highlight_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight_pass");
    let catalog = catalog();
    let style = HighlightStyle::default();

    for parts in [64, 256, 1024].iter() {
        group.throughput(Throughput::Elements(*parts as u64));

        group.bench_with_input(BenchmarkId::new("cached", parts), parts, |b, &parts| {
            let mut model = make_model(parts);
            let index = SpatialHighlightIndex::build(&model);
            let mut t = 0.0f32;
            b.iter(|| {
                t += 1.0 / 60.0;
                let motion = MotionSnapshot::at(t);
                black_box(index.apply(&mut model, &catalog, Some("thorax"), &style, &motion))
            });
        });

        group.bench_with_input(BenchmarkId::new("recompute", parts), parts, |b, &parts| {
            let mut model = make_model(parts);
            let mut t = 0.0f32;
            b.iter(|| {
                t += 1.0 / 60.0;
                let tint = style.tint(&MotionSnapshot::at(t));
                black_box(uncached_pass(&mut model, 100.0, 140.0, tint))
            });
        });
    }

    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let model = make_model(1024);
    c.bench_function("index_build_1024", |b| {
        b.iter(|| black_box(SpatialHighlightIndex::build(&model).len()))
    });
}

criterion_group!(benches, bench_highlight_pass, bench_index_build);
criterion_main!(benches);
