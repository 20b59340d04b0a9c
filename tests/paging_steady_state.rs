//! (S5) Driving a `GridLeaper` with a pool smaller than its working set
//! settles into LRU steady state, and the metadata texture never drifts
//! out of sync with what actually landed in the pool slots.

use std::sync::Arc;

use trinity::io::{BrickKey, BrickPayload};
use trinity::render::{
    BrickLayout, BrickMetadata, BrickPool, BrickRequest, BrickStatus, CompletedBrick, GridLeaper,
    MemoryPoolTarget, MetadataTexture, RequestQueue, VisibilityParams,
};

const MODALITY: u32 = 0;
const TIMESTEP: u32 = 0;

/// One layout, one LOD level, 8 bricks — so every brick id is already a
/// leaf and `recompute_hierarchy`'s child-closure pass never enters into
/// it. All eight start, and stay, visible under `PARAMS`, so nothing but
/// the paging pass itself ever changes a brick's status away from
/// `Missing`/`Resident`.
fn working_set_layout() -> BrickLayout {
    BrickLayout::new(vec![[8, 1, 1]])
}

const PARAMS: VisibilityParams = VisibilityParams::Isosurface { iso: 0.0 };

fn visible_metadata(total_bricks: u32) -> MetadataTexture {
    let meta = vec![BrickMetadata { min_scalar: 0.0, max_scalar: 1000.0, min_grad: 0.0, max_grad: 1.0 }; total_bricks as usize];
    MetadataTexture::new(total_bricks, meta)
}

/// Marks `brick_id` as touched this frame and, if that causes a fetch to
/// be enqueued, completes it immediately and runs the follow-up frame
/// that installs it into the pool — standing in for the brick-getter
/// task's round trip happening between two real frames.
fn touch(leaper: &mut GridLeaper, queue: &Arc<RequestQueue>, brick_id: u32) {
    leaper.step_frame(PARAMS, &[brick_id]);
    if let Some(request) = queue.pop_todo() {
        let BrickRequest { brick_key, .. } = request;
        queue.push_done(CompletedBrick {
            request: BrickRequest { vector_id: MODALITY, brick_key },
            payload: BrickPayload { bytes: vec![brick_id as u8], success: true },
        });
        leaper.step_frame(PARAMS, &[]);
    }
}

/// Property 4: every `Resident(slot)` status names a slot whose uploaded
/// bytes are this brick's own, and no two bricks claim the same slot.
fn assert_metadata_consistent(leaper: &GridLeaper, sink: &MemoryPoolTarget, total_bricks: u32) {
    let mut slots_seen = std::collections::HashSet::new();
    for id in 0..total_bricks {
        if let BrickStatus::Resident(slot) = leaper.status_of(id) {
            assert!(slots_seen.insert(slot), "slot {slot} claimed by more than one resident brick");
            assert_eq!(sink.slot_bytes(slot), vec![id as u8], "slot {slot}'s bytes don't match brick {id}");
        }
    }
}

#[test]
fn working_set_larger_than_the_pool_settles_into_lru_steady_state() {
    let layout = working_set_layout();
    let total_bricks = layout.total_bricks;
    let metadata = visible_metadata(total_bricks);
    // 5 slots: 4 claimable (indices 0..3) plus the permanently reserved
    // last one, which this working set never touches.
    let pool = BrickPool::new([5, 1, 1]);
    let queue = Arc::new(RequestQueue::new());
    let sink = Arc::new(MemoryPoolTarget::new(pool.capacity(), total_bricks as usize));
    let mut leaper = GridLeaper::new(layout, metadata, pool, queue.clone(), sink.clone(), MODALITY, TIMESTEP);

    // 8 distinct bricks touched across 10 frames, cycling back to the
    // first two once the working set has been fully visited once.
    let touches = [0u32, 1, 2, 3, 4, 5, 6, 7, 0, 1];
    for &brick_id in &touches {
        touch(&mut leaper, &queue, brick_id);
        assert_metadata_consistent(&leaper, &sink, total_bricks);
    }

    // The last four distinct bricks touched (frames 7..10: 6, 7, 0, 1)
    // are the ones a capacity-4 LRU pool should still be holding.
    for &resident_id in &[6u32, 7, 0, 1] {
        assert!(
            matches!(leaper.status_of(resident_id), BrickStatus::Resident(_)),
            "brick {resident_id} should still be resident"
        );
    }
    for &evicted_id in &[2u32, 3, 4, 5] {
        assert!(
            !matches!(leaper.status_of(evicted_id), BrickStatus::Resident(_)),
            "brick {evicted_id} should have been evicted"
        );
    }
}

#[test]
fn a_working_set_that_fits_the_pool_never_evicts_anything() {
    let layout = working_set_layout();
    let total_bricks = layout.total_bricks;
    let metadata = visible_metadata(total_bricks);
    let pool = BrickPool::new([5, 1, 1]);
    let queue = Arc::new(RequestQueue::new());
    let sink = Arc::new(MemoryPoolTarget::new(pool.capacity(), total_bricks as usize));
    let mut leaper = GridLeaper::new(layout, metadata, pool, queue.clone(), sink.clone(), MODALITY, TIMESTEP);

    // Only 4 distinct bricks, touched repeatedly: the pool has exactly
    // enough claimable slots (0..3) to hold all of them at once.
    let touches = [0u32, 1, 2, 3, 0, 1, 2, 3, 0, 1];
    for &brick_id in &touches {
        touch(&mut leaper, &queue, brick_id);
        assert_metadata_consistent(&leaper, &sink, total_bricks);
    }

    for brick_id in 0..4u32 {
        assert!(matches!(leaper.status_of(brick_id), BrickStatus::Resident(_)));
    }
}
