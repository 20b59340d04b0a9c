//! The brick pool: fixed-capacity GPU-texture slots paged with an
//! insertion-order (oldest-`tCreated`-first) policy.
//!
//! Grounded on spec.md §4.8.2/§4.8.3 and `GLVolumePool.cpp`'s
//! `UploadBricksToBrickPoolT`/`PotentiallyUploadBricksToBrickPoolT` pair.
//! The slot at the last index is reserved for the single coarsest brick
//! and is never evicted, per spec.md §4.8.2.

use crate::core::clock::LogicalClock;

/// One slot in the pool data texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSlot {
    pub position_in_pool: [u32; 3],
    pub brick_id: Option<u32>,
    pub t_created: u64,
    pub empty: bool,
}

impl PoolSlot {
    fn new(position_in_pool: [u32; 3]) -> Self {
        Self { position_in_pool, brick_id: None, t_created: 0, empty: true }
    }
}

pub struct BrickPool {
    slots: Vec<PoolSlot>,
    clock: LogicalClock,
    /// The non-reserved slot indices, re-sorted by ascending `tCreated` at
    /// the start of each pass. `slots` itself never moves — each entry's
    /// array position is its stable address in the pool data texture —
    /// only this claim order is rebuilt per pass (spec.md §4.8.3 step 2).
    order: Vec<usize>,
    /// Cursor into `order` during one paging pass.
    insert_pos: usize,
}

/// How much a memory budget shrinks per allocation retry (spec.md §4.8.6).
pub const BUDGET_RETRY_DECREMENT_BYTES: u64 = 10 * 1024 * 1024;

impl BrickPool {
    /// The near-cubic slot-grid dimensions that fit `budget_bytes` at
    /// `element_bytes` per voxel, per spec.md §4.8.6: the largest edge
    /// length `n` (in whole bricks) such that an `n`x`n`x`n` box of
    /// `brick_size`-shaped bricks stays within the budget and within
    /// `max_texture_edge` voxels on every axis.
    pub fn dims_for_budget(budget_bytes: u64, element_bytes: u64, brick_size: [u32; 3], max_texture_edge: u32) -> [u32; 3] {
        if element_bytes == 0 || brick_size.iter().any(|&b| b == 0) {
            return [0, 0, 0];
        }
        let max_voxels = budget_bytes / element_bytes;
        let brick_voxels = brick_size[0] as u64 * brick_size[1] as u64 * brick_size[2] as u64;
        let mut n = brick_size.iter().map(|&b| max_texture_edge / b.max(1)).min().unwrap_or(0) as u64;
        while n > 0 && n.pow(3) * brick_voxels > max_voxels {
            n -= 1;
        }
        [n as u32; 3]
    }

    /// Sizes and builds a pool under a GPU memory budget, retrying with
    /// the budget reduced by [`BUDGET_RETRY_DECREMENT_BYTES`] each time
    /// `try_allocate` rejects the chosen dims (e.g. the driver refused the
    /// 3-D texture), per spec.md §4.8.6. Returns `None` once no budget
    /// left over yields a pool with room for even one slot.
    pub fn new_within_budget(
        mut budget_bytes: u64,
        element_bytes: u64,
        brick_size: [u32; 3],
        max_texture_edge: u32,
        mut try_allocate: impl FnMut([u32; 3]) -> bool,
    ) -> Option<(BrickPool, [u32; 3])> {
        loop {
            let dims = Self::dims_for_budget(budget_bytes, element_bytes, brick_size, max_texture_edge);
            if dims.iter().any(|&d| d == 0) {
                return None;
            }
            if try_allocate(dims) {
                return Some((BrickPool::new(dims), dims));
            }
            budget_bytes = budget_bytes.saturating_sub(BUDGET_RETRY_DECREMENT_BYTES);
            if budget_bytes == 0 {
                return None;
            }
        }
    }

    /// Builds a pool over a `dims`-shaped grid of slots (the integer
    /// quotient of the pool data texture's size by the brick size, per
    /// spec.md §4.8.1).
    pub fn new(dims: [u32; 3]) -> Self {
        let mut slots = Vec::with_capacity((dims[0] * dims[1] * dims[2]) as usize);
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    slots.push(PoolSlot::new([x, y, z]));
                }
            }
        }
        let order = (0..slots.len().saturating_sub(1)).collect();
        Self { slots, clock: LogicalClock::new(), order, insert_pos: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[PoolSlot] {
        &self.slots
    }

    /// Index of the slot permanently reserved for the coarsest brick.
    pub fn reserved_slot_index(&self) -> usize {
        self.slots.len() - 1
    }

    /// Begins a new paging pass: re-sorts the non-reserved slot indices by
    /// ascending `tCreated` and resets the insertion cursor. The slots
    /// themselves stay put; only the order they're claimed in changes.
    pub fn begin_paging_pass(&mut self) {
        let slots = &self.slots;
        self.order.sort_by_key(|&i| slots[i].t_created);
        self.insert_pos = 0;
    }

    /// Claims the next slot for a newly completed brick, per spec.md
    /// §4.8.3 step 4. Returns `None` once the pass has used every
    /// non-reserved slot; the caller should stop uploading for this frame.
    /// On success, returns the claimed slot index and the brick id it
    /// previously held (if any), which the caller must flip to `Missing`.
    pub fn claim_next_slot(&mut self, new_brick_id: u32) -> Option<(usize, Option<u32>)> {
        if self.insert_pos >= self.order.len() {
            return None;
        }
        let index = self.order[self.insert_pos];
        self.insert_pos += 1;
        let evicted = self.slots[index].brick_id;
        self.slots[index].brick_id = Some(new_brick_id);
        self.slots[index].t_created = self.clock.tick();
        self.slots[index].empty = false;
        Some((index, evicted))
    }

    /// Installs the permanent coarsest-brick slot at startup.
    pub fn install_reserved(&mut self, brick_id: u32) {
        let index = self.reserved_slot_index();
        self.slots[index].brick_id = Some(brick_id);
        self.slots[index].t_created = self.clock.tick();
        self.slots[index].empty = false;
    }

    pub fn slot_holding(&self, brick_id: u32) -> Option<usize> {
        self.slots.iter().position(|s| s.brick_id == Some(brick_id))
    }
}
