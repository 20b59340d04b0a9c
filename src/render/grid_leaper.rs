//! The per-frame paging orchestrator tying the pool, metadata texture,
//! visibility sweep, and request queue together.
//!
//! Grounded on `GLVolumePool.cpp`'s per-frame paging pass and spec.md
//! §4.8.3; named after the algorithm family ("GigaVoxels"-style paging,
//! a.k.a. "grid leaping") the original implementation itself uses as a
//! module name.

use std::sync::Arc;

use crate::io::dataset::BrickKey;
use crate::render::brick_key::BrickLayout;
use crate::render::gpu_sink::GpuUploadSink;
use crate::render::metadata::{BrickStatus, MetadataTexture};
use crate::render::pool::BrickPool;
use crate::render::request_queue::{BrickRequest, RequestQueue};
use crate::render::visibility::{recompute_hierarchy, recompute_resident, VisibilityParams};

pub struct GridLeaper {
    layout: BrickLayout,
    metadata: MetadataTexture,
    pool: BrickPool,
    queue: Arc<RequestQueue>,
    sink: Arc<dyn GpuUploadSink>,
    modality: u32,
    timestep: u32,
    visibility_stale: bool,
}

impl GridLeaper {
    pub fn new(
        layout: BrickLayout,
        metadata: MetadataTexture,
        pool: BrickPool,
        queue: Arc<RequestQueue>,
        sink: Arc<dyn GpuUploadSink>,
        modality: u32,
        timestep: u32,
    ) -> Self {
        Self { layout, metadata, pool, queue, sink, modality, timestep, visibility_stale: true }
    }

    /// Call when the render mode, transfer function, or iso value changes
    /// (spec.md §4.8.3 step 1's trigger).
    pub fn mark_visibility_stale(&mut self) {
        self.visibility_stale = true;
    }

    pub fn status_of(&self, brick_id: u32) -> BrickStatus {
        self.metadata.status(brick_id)
    }

    /// Runs one frame's paging pass against the shader's reported
    /// `missing_feedback` brick ids (spec.md §4.8.3).
    pub fn step_frame(&mut self, params: VisibilityParams, missing_feedback: &[u32]) {
        if self.visibility_stale {
            recompute_resident(&mut self.metadata, &self.pool, params);
            recompute_hierarchy(&self.layout, &mut self.metadata, params);
            for id in 0..self.metadata.total_bricks() {
                let status = self.metadata.status(id);
                let _ = self.sink.upload_metadata_texel(id, status.encode());
                // A brick the new visibility verdict no longer wants may still
                // have a fetch in flight from before the recompute; abandon it
                // so the getter discards it instead of paging in stale data.
                if status.is_empty_like() {
                    if let Some(key) = self.layout.key_for(self.modality, self.timestep, id) {
                        self.queue.abandon(&BrickRequest { vector_id: self.modality, brick_key: key });
                    }
                }
            }
            self.visibility_stale = false;
        }

        self.pool.begin_paging_pass();

        for &id in missing_feedback {
            match self.metadata.status(id) {
                BrickStatus::Missing => {
                    if let Some(key) = self.layout.key_for(self.modality, self.timestep, id) {
                        self.queue.enqueue(BrickRequest { vector_id: self.modality, brick_key: key });
                    }
                }
                status if status.is_empty_like() => {
                    let _ = self.sink.upload_metadata_texel(id, status.encode());
                }
                _ => {}
            }
        }

        for completed in self.queue.drain_done() {
            if !completed.payload.success {
                continue;
            }
            let BrickRequest { brick_key, .. } = completed.request;
            let Some(brick_id) = self.linear_id_of(brick_key) else { continue };

            let Some((slot_index, evicted)) = self.pool.claim_next_slot(brick_id) else {
                // Pool exhausted for this frame; the renderer re-issues the
                // miss next frame (spec.md §4.8.3's thrash bound).
                break;
            };

            if let Some(evicted_id) = evicted {
                self.metadata.set_status(evicted_id, BrickStatus::Missing);
                let _ = self.sink.upload_metadata_texel(evicted_id, BrickStatus::Missing.encode());
            }

            let _ = self.sink.upload_brick(slot_index as u32, &completed.payload.bytes);
            let status = BrickStatus::Resident(slot_index as u32);
            self.metadata.set_status(brick_id, status);
            let _ = self.sink.upload_metadata_texel(brick_id, status.encode());
        }
    }

    fn linear_id_of(&self, key: BrickKey) -> Option<u32> {
        let dims = *self.layout.layout.get(key.lod as usize)?;
        let count = dims[0] * dims[1] * dims[2];
        if key.brick >= count {
            return None;
        }
        Some(self.layout.offset[key.lod as usize] + key.brick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gpu_sink::MemoryPoolTarget;
    use crate::render::metadata::BrickMetadata;
    use crate::render::request_queue::CompletedBrick;
    use crate::io::dataset::BrickPayload;

    fn tiny_leaper() -> (GridLeaper, Arc<MemoryPoolTarget>) {
        let layout = BrickLayout::new(vec![[2, 1, 1], [1, 1, 1]]);
        let meta = vec![BrickMetadata { min_scalar: 0.0, max_scalar: 1.0, min_grad: 0.0, max_grad: 1.0 }; layout.total_bricks as usize];
        let metadata = MetadataTexture::new(layout.total_bricks, meta);
        let pool = BrickPool::new([2, 1, 1]);
        let queue = Arc::new(RequestQueue::new());
        let sink = Arc::new(MemoryPoolTarget::new(pool.capacity(), layout.total_bricks as usize));
        let leaper = GridLeaper::new(layout, metadata, pool, queue, sink.clone(), 0, 0);
        (leaper, sink)
    }

    #[test]
    fn missing_brick_in_feedback_gets_enqueued() {
        let (mut leaper, _sink) = tiny_leaper();
        let params = VisibilityParams::Isosurface { iso: 0.5 };
        leaper.step_frame(params, &[0]);
        assert_eq!(leaper.queue.todo_len(), 1);
    }

    #[test]
    fn visibility_recompute_abandons_requests_for_now_invisible_bricks() {
        let (mut leaper, _sink) = tiny_leaper();
        let request = BrickRequest {
            vector_id: 0,
            brick_key: BrickKey { modality: 0, timestep: 0, lod: 0, brick: 0 },
        };
        leaper.queue.enqueue(request);
        assert!(leaper.queue.is_wanted(&request));

        // iso above every brick's max_scalar (1.0) makes it empty-like.
        let params = VisibilityParams::Isosurface { iso: 5.0 };
        leaper.step_frame(params, &[]);

        assert!(!leaper.queue.is_wanted(&request));
    }

    #[test]
    fn completed_fetch_uploads_and_marks_resident() {
        let (mut leaper, sink) = tiny_leaper();
        let params = VisibilityParams::Isosurface { iso: 0.5 };
        leaper.step_frame(params, &[]);
        leaper.queue.push_done(CompletedBrick {
            request: BrickRequest { vector_id: 0, brick_key: BrickKey { modality: 0, timestep: 0, lod: 0, brick: 0 } },
            payload: BrickPayload { bytes: vec![9, 9, 9], success: true },
        });
        leaper.step_frame(params, &[]);
        assert_eq!(leaper.status_of(0), BrickStatus::Resident(0));
        assert_eq!(sink.slot_bytes(0), vec![9, 9, 9]);
    }
}
