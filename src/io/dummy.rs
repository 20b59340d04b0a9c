//! `DummyDataset` — a fixed, synthetic dataset for tests and the headless
//! demo client.
//!
//! Grounded on `original_source/src/io-base/DummyIO.h`, whose own comment
//! calls it out as existing "for testing purpose". One modality, one
//! timestep, a handful of LODs, every brick reporting a flat synthetic
//! value range.

use crate::core::error::Error;
use crate::io::dataset::{BrickKey, BrickPayload, IoDataset, MinMaxBlock};
use crate::wire::commands::{Semantic, ValueType};

pub struct DummyDataset {
    lod_count: u32,
    brick_dim: u32,
}

impl DummyDataset {
    pub fn new() -> Self {
        Self { lod_count: 4, brick_dim: 32 }
    }

    fn layout_for_lod(&self, lod: u32) -> [u32; 3] {
        let side = (1u32 << (self.lod_count - 1 - lod.min(self.lod_count - 1))).max(1);
        [side, side, side]
    }
}

impl Default for DummyDataset {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDataset for DummyDataset {
    fn max_brick_size(&self) -> [u32; 3] {
        [self.brick_dim; 3]
    }

    fn max_used_brick_sizes(&self) -> [u32; 3] {
        [self.brick_dim; 3]
    }

    fn max_min_for_key(&self, _key: BrickKey) -> Result<MinMaxBlock, Error> {
        Ok(MinMaxBlock { min: 0.0, max: 1.0 })
    }

    fn lod_level_count(&self) -> u32 {
        self.lod_count
    }

    fn number_of_timesteps(&self) -> u32 {
        1
    }

    fn domain_size(&self, _modality: u32, lod: u32) -> Result<[u32; 3], Error> {
        let layout = self.layout_for_lod(lod);
        Ok([layout[0] * self.brick_dim, layout[1] * self.brick_dim, layout[2] * self.brick_dim])
    }

    fn transformation(&self, _modality: u32) -> Result<[[f32; 4]; 4], Error> {
        Ok([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    fn brick_overlap_size(&self) -> [u32; 3] {
        [1, 1, 1]
    }

    fn largest_single_brick_lod(&self, _modality: u32) -> Result<u32, Error> {
        Ok(self.lod_count - 1)
    }

    fn brick_voxel_counts(&self, _key: BrickKey) -> Result<[u32; 3], Error> {
        Ok([self.brick_dim; 3])
    }

    fn brick_extents(&self, _key: BrickKey) -> Result<[f32; 3], Error> {
        Ok([1.0, 1.0, 1.0])
    }

    fn brick_layout(&self, _modality: u32, lod: u32) -> Result<[u32; 3], Error> {
        if lod >= self.lod_count {
            return Err(Error::InvalidArgument(format!("lod {lod} out of range")));
        }
        Ok(self.layout_for_lod(lod))
    }

    fn modality_count(&self) -> u32 {
        1
    }

    fn component_count(&self, _modality: u32) -> Result<u32, Error> {
        Ok(1)
    }

    fn range(&self, _modality: u32) -> Result<(f32, f32), Error> {
        Ok((0.0, 1.0))
    }

    fn value_type(&self, _modality: u32) -> Result<ValueType, Error> {
        Ok(ValueType::U8)
    }

    fn semantic(&self, _modality: u32) -> Result<Semantic, Error> {
        Ok(Semantic::Scalar)
    }

    fn get_brick(&self, key: BrickKey) -> Result<BrickPayload, Error> {
        let layout = self.layout_for_lod(key.lod);
        let count = layout[0] * layout[1] * layout[2];
        if key.brick >= count {
            return Ok(BrickPayload { bytes: Vec::new(), success: false });
        }
        let voxel_count = (self.brick_dim as usize).pow(3);
        let fill = ((key.brick % 251) + 1) as u8;
        Ok(BrickPayload { bytes: vec![fill; voxel_count], success: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brick_layout_shrinks_as_lod_increases() {
        let ds = DummyDataset::new();
        let finest = ds.brick_layout(0, 0).unwrap();
        let coarsest = ds.brick_layout(0, ds.lod_level_count() - 1).unwrap();
        assert!(coarsest[0] <= finest[0]);
    }

    #[test]
    fn out_of_range_brick_reports_unsuccessful() {
        let ds = DummyDataset::new();
        let payload = ds.get_brick(BrickKey { modality: 0, timestep: 0, lod: 0, brick: 999_999 }).unwrap();
        assert!(!payload.success);
        assert!(payload.bytes.is_empty());
    }

    #[test]
    fn in_range_brick_has_full_voxel_payload() {
        let ds = DummyDataset::new();
        let payload = ds.get_brick(BrickKey { modality: 0, timestep: 0, lod: 3, brick: 0 }).unwrap();
        assert!(payload.success);
        assert_eq!(payload.bytes.len(), (ds.brick_dim as usize).pow(3));
    }
}
