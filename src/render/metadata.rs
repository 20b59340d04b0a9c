//! `BrickStatus` and the CPU mirror of the metadata texture.
//!
//! Grounded on spec.md §3's `BrickStatus` encoding and §4.8.2's
//! `brickStatus`/`brickMetadata` arrays; `GLVolumePool.cpp` keeps the same
//! "status code doubles as slot index once >= 3" trick.

/// One metadata-texture texel, decoded from its raw `u32` encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrickStatus {
    Missing,
    ChildEmpty,
    Empty,
    Resident(u32),
}

impl BrickStatus {
    pub fn encode(self) -> u32 {
        match self {
            BrickStatus::Missing => 0,
            BrickStatus::ChildEmpty => 1,
            BrickStatus::Empty => 2,
            BrickStatus::Resident(slot) => slot + 3,
        }
    }

    pub fn decode(raw: u32) -> Self {
        match raw {
            0 => BrickStatus::Missing,
            1 => BrickStatus::ChildEmpty,
            2 => BrickStatus::Empty,
            slot => BrickStatus::Resident(slot - 3),
        }
    }

    pub fn is_empty_like(self) -> bool {
        matches!(self, BrickStatus::Empty | BrickStatus::ChildEmpty)
    }

    pub fn resident_slot(self) -> Option<u32> {
        match self {
            BrickStatus::Resident(slot) => Some(slot),
            _ => None,
        }
    }
}

/// Per-(modality,timestep) min/max scalar and gradient range, the
/// acceleration structure pulled once from the I/O side and consulted by
/// [`crate::render::visibility`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickMetadata {
    pub min_scalar: f32,
    pub max_scalar: f32,
    pub min_grad: f32,
    pub max_grad: f32,
}

/// CPU mirror of the GPU metadata texture: one [`BrickStatus`] per brick
/// id, plus the acceleration structure it was derived from.
pub struct MetadataTexture {
    status: Vec<u32>,
    metadata: Vec<BrickMetadata>,
}

impl MetadataTexture {
    pub fn new(total_bricks: u32, metadata: Vec<BrickMetadata>) -> Self {
        assert_eq!(metadata.len(), total_bricks as usize);
        Self { status: vec![0; total_bricks as usize], metadata }
    }

    pub fn status(&self, brick_id: u32) -> BrickStatus {
        BrickStatus::decode(self.status[brick_id as usize])
    }

    pub fn set_status(&mut self, brick_id: u32, status: BrickStatus) {
        self.status[brick_id as usize] = status.encode();
    }

    pub fn metadata(&self, brick_id: u32) -> BrickMetadata {
        self.metadata[brick_id as usize]
    }

    pub fn total_bricks(&self) -> u32 {
        self.status.len() as u32
    }

    /// Resets every entry to `Missing` except ones already resident and
    /// still visible, matching the `(modality,timestep)` change handling
    /// in spec.md §4.8.4's closing paragraph. `still_visible` is the
    /// visibility recompute's own verdict for the brick's resident slot.
    pub fn reset_for_dataset_change(&mut self, still_visible: impl Fn(u32) -> bool) {
        for id in 0..self.status.len() as u32 {
            if let BrickStatus::Resident(_) = self.status(id) {
                if !still_visible(id) {
                    self.set_status(id, BrickStatus::Missing);
                }
            } else {
                self.set_status(id, BrickStatus::Missing);
            }
        }
    }
}
