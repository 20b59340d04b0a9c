//! `IoDataset` — the dataset-metadata contract an I/O node serves.
//!
//! Grounded on `original_source/src/common/IIO.h`'s `IIO` interface. The
//! "mysterious flag" `getBrick` returns alongside its bytes (spec.md §9,
//! open question (c)) is kept as an explicit, named `success: bool` on
//! [`BrickPayload`] rather than dropped or left unexplained.

use crate::core::error::Error;
use crate::wire::commands::{BrickKeyWire, Semantic, ValueType};

/// A brick's address within one dataset: modality, timestep, LOD, and
/// linear brick index within that LOD's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrickKey {
    pub modality: u32,
    pub timestep: u32,
    pub lod: u32,
    pub brick: u32,
}

impl From<BrickKeyWire> for BrickKey {
    fn from(w: BrickKeyWire) -> Self {
        BrickKey { modality: w.modality, timestep: w.timestep, lod: w.lod, brick: w.brick }
    }
}

impl From<BrickKey> for BrickKeyWire {
    fn from(k: BrickKey) -> Self {
        BrickKeyWire { modality: k.modality, timestep: k.timestep, lod: k.lod, brick: k.brick }
    }
}

/// The bytes `getBrick` returns, plus whether the read actually hit data
/// (`false` covers padding bricks at the domain edge, per the original's
/// unexplained flag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrickPayload {
    pub bytes: Vec<u8>,
    pub success: bool,
}

/// Per-(modality,lod) min/max, used for early empty-space rejection
/// (spec.md §4.8.4's `ChildEmpty` closure).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxBlock {
    pub min: f32,
    pub max: f32,
}

/// The dataset-metadata contract an I/O session serves to a processing
/// session. One implementor per supported dataset format; [`DummyDataset`]
/// is the fixture used by tests and the headless demo client.
pub trait IoDataset: Send + Sync {
    fn max_brick_size(&self) -> [u32; 3];
    fn max_used_brick_sizes(&self) -> [u32; 3];
    fn max_min_for_key(&self, key: BrickKey) -> Result<MinMaxBlock, Error>;
    fn lod_level_count(&self) -> u32;
    fn number_of_timesteps(&self) -> u32;
    fn domain_size(&self, modality: u32, lod: u32) -> Result<[u32; 3], Error>;
    fn transformation(&self, modality: u32) -> Result<[[f32; 4]; 4], Error>;
    fn brick_overlap_size(&self) -> [u32; 3];
    fn largest_single_brick_lod(&self, modality: u32) -> Result<u32, Error>;
    fn brick_voxel_counts(&self, key: BrickKey) -> Result<[u32; 3], Error>;
    fn brick_extents(&self, key: BrickKey) -> Result<[f32; 3], Error>;
    fn brick_layout(&self, modality: u32, lod: u32) -> Result<[u32; 3], Error>;
    fn modality_count(&self) -> u32;
    fn component_count(&self, modality: u32) -> Result<u32, Error>;
    fn range(&self, modality: u32) -> Result<(f32, f32), Error>;
    fn value_type(&self, modality: u32) -> Result<ValueType, Error>;
    fn semantic(&self, modality: u32) -> Result<Semantic, Error>;
    fn get_brick(&self, key: BrickKey) -> Result<BrickPayload, Error>;
}
