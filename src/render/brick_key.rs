//! Brick id math: per-LOD layout, prefix-sum offsets, and the linear
//! brick id that everything else in [`render`](crate::render) indexes by.
//!
//! Grounded on `GLVolumePool.cpp`'s layout/offset bookkeeping, generalized
//! from its single-modality assumption to the multi-modality domain this
//! system serves.

use crate::io::dataset::BrickKey;

/// Per-LOD brick-grid dimensions and the running total used to flatten
/// `(x,y,z,lod)` into one id, for a single modality+timestep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrickLayout {
    /// `layout[lod] = (x,y,z)` brick counts at that level, finest first.
    pub layout: Vec<[u32; 3]>,
    /// `offset[lod]` = prefix sum of brick counts over levels `0..lod`.
    pub offset: Vec<u32>,
    pub total_bricks: u32,
}

impl BrickLayout {
    pub fn new(layout: Vec<[u32; 3]>) -> Self {
        let mut offset = Vec::with_capacity(layout.len());
        let mut running = 0u32;
        for dims in &layout {
            offset.push(running);
            running += dims[0] * dims[1] * dims[2];
        }
        Self { layout, offset, total_bricks: running }
    }

    pub fn lod_count(&self) -> u32 {
        self.layout.len() as u32
    }

    /// Flattens `(x,y,z)` at `lod` into the linear brick id used to index
    /// `brickStatus`/`brickMetadata`.
    pub fn linear_id(&self, lod: u32, x: u32, y: u32, z: u32) -> Option<u32> {
        let dims = *self.layout.get(lod as usize)?;
        if x >= dims[0] || y >= dims[1] || z >= dims[2] {
            return None;
        }
        Some(self.offset[lod as usize] + x + y * dims[0] + z * dims[0] * dims[1])
    }

    /// Inverse of [`linear_id`](Self::linear_id): which LOD a brick id
    /// belongs to, via binary search on `offset`.
    pub fn lod_of(&self, brick_id: u32) -> Option<u32> {
        if brick_id >= self.total_bricks {
            return None;
        }
        match self.offset.binary_search(&brick_id) {
            Ok(lod) => Some(lod as u32),
            Err(insert_at) => Some((insert_at - 1) as u32),
        }
    }

    pub fn key_for(&self, modality: u32, timestep: u32, brick_id: u32) -> Option<BrickKey> {
        let lod = self.lod_of(brick_id)?;
        Some(BrickKey { modality, timestep, lod, brick: brick_id - self.offset[lod as usize] })
    }

    /// The eight (or fewer, at odd boundaries) children of `brick_id` at
    /// the next-finer level, for the `ChildEmpty` closure (spec.md
    /// §4.8.4).
    pub fn children_of(&self, brick_id: u32) -> Vec<u32> {
        let Some(lod) = self.lod_of(brick_id) else { return Vec::new() };
        if lod == 0 {
            return Vec::new();
        }
        let parent_dims = self.layout[lod as usize];
        let local = brick_id - self.offset[lod as usize];
        let pz = local / (parent_dims[0] * parent_dims[1]);
        let py = (local % (parent_dims[0] * parent_dims[1])) / parent_dims[0];
        let px = local % parent_dims[0];

        let child_lod = lod - 1;
        let child_dims = self.layout[child_lod as usize];
        let mut children = Vec::with_capacity(8);
        for dz in 0..2u32 {
            for dy in 0..2u32 {
                for dx in 0..2u32 {
                    let cx = px * 2 + dx;
                    let cy = py * 2 + dy;
                    let cz = pz * 2 + dz;
                    if cx < child_dims[0] && cy < child_dims[1] && cz < child_dims[2] {
                        if let Some(id) = self.linear_id(child_lod, cx, cy, cz) {
                            children.push(id);
                        }
                    }
                }
            }
        }
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> BrickLayout {
        // 3 levels: 4x4x4 (finest), 2x2x2, 1x1x1 (coarsest).
        BrickLayout::new(vec![[4, 4, 4], [2, 2, 2], [1, 1, 1]])
    }

    #[test]
    fn offsets_are_prefix_sums_of_brick_counts() {
        let layout = sample_layout();
        assert_eq!(layout.offset, vec![0, 64, 72]);
        assert_eq!(layout.total_bricks, 73);
    }

    #[test]
    fn linear_id_and_lod_of_are_inverses() {
        let layout = sample_layout();
        for lod in 0..layout.lod_count() {
            let dims = layout.layout[lod as usize];
            for z in 0..dims[2] {
                for y in 0..dims[1] {
                    for x in 0..dims[0] {
                        let id = layout.linear_id(lod, x, y, z).unwrap();
                        assert_eq!(layout.lod_of(id), Some(lod));
                    }
                }
            }
        }
    }

    #[test]
    fn coarsest_level_brick_has_eight_children_away_from_boundary() {
        let layout = sample_layout();
        let parent_id = layout.linear_id(1, 0, 0, 0).unwrap();
        let children = layout.children_of(parent_id);
        assert_eq!(children.len(), 8);
        for child in children {
            assert_eq!(layout.lod_of(child), Some(0));
        }
    }

    #[test]
    fn odd_boundary_clips_children_that_fall_outside_the_finer_grid() {
        // Finest level is 1 wide on x, so a parent's two x-children collapse
        // into one (the "face" case from spec.md §4.8.4).
        let layout = BrickLayout::new(vec![[1, 3, 3], [1, 2, 2]]);
        let parent = layout.linear_id(1, 0, 0, 0).unwrap();
        let children = layout.children_of(parent);
        assert_eq!(children.len(), 4);
    }

    #[test]
    fn finest_level_has_no_children() {
        let layout = sample_layout();
        let leaf = layout.linear_id(0, 1, 1, 1).unwrap();
        assert!(layout.children_of(leaf).is_empty());
    }
}
