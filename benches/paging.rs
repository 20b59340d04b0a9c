use criterion::{black_box, criterion_group, criterion_main, Criterion};

use trinity::render::{BrickLayout, BrickMetadata, BrickPool, MetadataTexture, VisibilityParams};

fn synthetic_layout(lod_count: u32) -> BrickLayout {
    let layout = (0..lod_count)
        .map(|lod| {
            let side = 1u32 << (lod_count - 1 - lod);
            [side, side, side]
        })
        .collect();
    BrickLayout::new(layout)
}

fn synthetic_metadata(layout: &BrickLayout) -> MetadataTexture {
    let total = layout.total_bricks;
    let metadata = (0..total)
        .map(|id| {
            // Alternate bricks in and out of a fixed isosurface threshold so
            // the `ChildEmpty` closure actually has mixed verdicts to climb.
            if id % 3 == 0 {
                BrickMetadata { min_scalar: 0.0, max_scalar: 50.0, min_grad: 0.0, max_grad: 1.0 }
            } else {
                BrickMetadata { min_scalar: 400.0, max_scalar: 900.0, min_grad: 0.0, max_grad: 1.0 }
            }
        })
        .collect();
    MetadataTexture::new(total, metadata)
}

fn bench_recompute_hierarchy(c: &mut Criterion) {
    let layout = synthetic_layout(6);
    let mut metadata = synthetic_metadata(&layout);
    let params = VisibilityParams::Isosurface { iso: 500.0 };

    c.bench_function("recompute_hierarchy_lod6", |b| {
        b.iter(|| {
            trinity::render::visibility::recompute_hierarchy(
                black_box(&layout),
                black_box(&mut metadata),
                black_box(params),
            );
        });
    });
}

fn bench_paging_pass(c: &mut Criterion) {
    c.bench_function("paging_pass_working_set_256_of_1024", |b| {
        b.iter(|| {
            let mut pool = BrickPool::new(black_box([16, 16, 4]));
            pool.install_reserved(0);
            for round in 0..4u32 {
                pool.begin_paging_pass();
                for brick_id in (round * 64)..(round * 64 + 256) {
                    if pool.claim_next_slot(black_box(brick_id)).is_none() {
                        break;
                    }
                }
            }
        });
    });
}

criterion_group!(benches, bench_recompute_hierarchy, bench_paging_pass);
criterion_main!(benches);
