//! Empty-space skipping: per-render-mode visibility predicates and the
//! `ChildEmpty` closure over the brick hierarchy.
//!
//! Grounded on spec.md §4.8.4 and `GLVolumePool.cpp::recomputeVisibility`.
//! The finest-level sweep is the one genuinely data-parallel piece (one
//! independent predicate evaluation per brick), so it runs through rayon;
//! the per-level closure pass is inherently sequential (level `ℓ` depends
//! on level `ℓ-1`'s verdicts) and stays a plain loop.

use rayon::prelude::*;

use crate::render::brick_key::BrickLayout;
use crate::render::metadata::{BrickMetadata, BrickStatus, MetadataTexture};
use crate::render::pool::BrickPool;

/// Mode-specific visibility thresholds, per the table in spec.md §4.8.4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisibilityParams {
    Transfer1d { tf_min: f32, tf_max: f32 },
    Transfer2d { tf_min: f32, tf_max: f32, grad_min: f32, grad_max: f32 },
    Isosurface { iso: f32 },
    ClearView { iso_a: f32, iso_b: f32 },
}

/// Whether `meta` can contribute any fragments under `params`.
pub fn contains_data(params: VisibilityParams, meta: BrickMetadata) -> bool {
    match params {
        VisibilityParams::Transfer1d { tf_min, tf_max } => {
            tf_max >= meta.min_scalar && tf_min <= meta.max_scalar
        }
        VisibilityParams::Transfer2d { tf_min, tf_max, grad_min, grad_max } => {
            tf_max >= meta.min_scalar
                && tf_min <= meta.max_scalar
                && grad_max >= meta.min_grad
                && grad_min <= meta.max_grad
        }
        VisibilityParams::Isosurface { iso } => iso <= meta.max_scalar,
        VisibilityParams::ClearView { iso_a, iso_b } => {
            iso_a <= meta.max_scalar && iso_b <= meta.max_scalar
        }
    }
}

/// Re-evaluates every resident slot's predicate, flipping its status
/// between `Resident`/`Empty` as the verdict changes (spec.md §4.8.4,
/// "for resident slots").
pub fn recompute_resident(metadata: &mut MetadataTexture, pool: &BrickPool, params: VisibilityParams) {
    for (slot_index, slot) in pool.slots().iter().enumerate() {
        let Some(brick_id) = slot.brick_id else { continue };
        let visible = contains_data(params, metadata.metadata(brick_id));
        let status = if visible { BrickStatus::Resident(slot_index as u32) } else { BrickStatus::Empty };
        metadata.set_status(brick_id, status);
    }
}

/// Sweeps the non-resident hierarchy bottom-up, marking `ChildEmpty`/
/// `Empty` so the shader can skip whole subvolumes (spec.md §4.8.4, "for
/// the rest of the hierarchy").
pub fn recompute_hierarchy(layout: &BrickLayout, metadata: &mut MetadataTexture, params: VisibilityParams) {
    // Finest level: independent per-brick predicate, safe to parallelize.
    let finest_dims = layout.layout[0];
    let finest_count = finest_dims[0] * finest_dims[1] * finest_dims[2];
    let verdicts: Vec<(u32, bool)> = (0..finest_count)
        .into_par_iter()
        .filter_map(|id| {
            if matches!(metadata.status(id), BrickStatus::Resident(_)) {
                return None;
            }
            let visible = contains_data(params, metadata.metadata(id));
            Some((id, visible))
        })
        .collect();
    for (id, visible) in verdicts {
        if !visible {
            metadata.set_status(id, BrickStatus::ChildEmpty);
        }
    }

    // Coarser levels depend on the level below, so walk sequentially.
    for lod in 1..layout.lod_count() {
        let dims = layout.layout[lod as usize];
        let count = dims[0] * dims[1] * dims[2];
        let base = layout.offset[lod as usize];
        for local in 0..count {
            let brick_id = base + local;
            if matches!(metadata.status(brick_id), BrickStatus::Resident(_)) {
                continue;
            }
            if contains_data(params, metadata.metadata(brick_id)) {
                continue;
            }
            let children = layout.children_of(brick_id);
            let all_children_empty = children.iter().all(|&c| metadata.status(c) == BrickStatus::ChildEmpty);
            let status = if all_children_empty { BrickStatus::ChildEmpty } else { BrickStatus::Empty };
            metadata.set_status(brick_id, status);
        }
    }
}
