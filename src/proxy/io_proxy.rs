//! `IoProxy` — a client-side stub for the I/O node's dataset-metadata
//! commands, one method per remote command (spec.md §4.7).
//!
//! Implements [`IoDataset`] so the processing side's brick-getter and
//! `GridLeaper` can treat a remote I/O session exactly like a local
//! dataset, per the "back-reference from renderer to IO is a composed
//! proxy" design note (spec.md §9).

use crate::core::error::Error;
use crate::io::dataset::{BrickKey, BrickPayload, IoDataset, MinMaxBlock};
use crate::proxy::base::{expect_reply, Proxy};
use crate::wire::commands::*;
use crate::wire::request::RequestParams;
use crate::wire::serial::decode_bin;

pub struct IoProxy {
    proxy: Proxy,
    /// Bridges the synchronous [`IoDataset`] contract to the async
    /// channel, matching the thread/task split in spec.md §5: the
    /// brick-getter is a plain OS thread, so remote calls it makes must
    /// block on this node's tokio runtime rather than requiring one of
    /// their own.
    runtime: tokio::runtime::Handle,
}

impl IoProxy {
    pub fn new(proxy: Proxy, runtime: tokio::runtime::Handle) -> Self {
        Self { proxy, runtime }
    }

    fn call(&self, params: RequestParams) -> Result<crate::wire::reply::ReplyParams, Error> {
        self.runtime.block_on(self.proxy.call(params))
    }
}

impl IoDataset for IoProxy {
    fn max_brick_size(&self) -> [u32; 3] {
        self.call(RequestParams::GetMaxBrickSize(NoArgsReq))
            .and_then(|r| expect_reply!(r, GetMaxBrickSize))
            .map(|r| r.size)
            .unwrap_or([0; 3])
    }

    fn max_used_brick_sizes(&self) -> [u32; 3] {
        self.call(RequestParams::GetMaxUsedBrickSizes(NoArgsReq))
            .and_then(|r| expect_reply!(r, GetMaxUsedBrickSizes))
            .map(|r| r.size)
            .unwrap_or([0; 3])
    }

    fn max_min_for_key(&self, key: BrickKey) -> Result<MinMaxBlock, Error> {
        let reply = self.call(RequestParams::MaxMinForKey(BrickKeyReq { key: key.into() }))?;
        let r = expect_reply!(reply, MinMax)?;
        Ok(MinMaxBlock { min: r.min, max: r.max })
    }

    fn lod_level_count(&self) -> u32 {
        self.call(RequestParams::GetLodLevelCount(ModalityReq { modality: 0 }))
            .and_then(|r| expect_reply!(r, Count))
            .map(|r| r.count)
            .unwrap_or(0)
    }

    fn number_of_timesteps(&self) -> u32 {
        self.call(RequestParams::GetNumberOfTimesteps(NoArgsReq))
            .and_then(|r| expect_reply!(r, Count))
            .map(|r| r.count)
            .unwrap_or(0)
    }

    fn domain_size(&self, modality: u32, lod: u32) -> Result<[u32; 3], Error> {
        let reply = self.call(RequestParams::GetDomainSize(GetDomainSizeReq { modality, lod }))?;
        Ok(expect_reply!(reply, GetDomainSize)?.size)
    }

    fn transformation(&self, modality: u32) -> Result<[[f32; 4]; 4], Error> {
        let reply = self.call(RequestParams::GetTransformation(ModalityReq { modality }))?;
        Ok(expect_reply!(reply, GetTransformation)?.matrix)
    }

    fn brick_overlap_size(&self) -> [u32; 3] {
        self.call(RequestParams::GetBrickOverlapSize(NoArgsReq))
            .and_then(|r| expect_reply!(r, GetBrickOverlapSize))
            .map(|r| r.size)
            .unwrap_or([0; 3])
    }

    fn largest_single_brick_lod(&self, modality: u32) -> Result<u32, Error> {
        let reply = self.call(RequestParams::GetLargestSingleBrickLod(ModalityReq { modality }))?;
        Ok(expect_reply!(reply, GetLargestSingleBrickLod)?.lod)
    }

    fn brick_voxel_counts(&self, key: BrickKey) -> Result<[u32; 3], Error> {
        let reply = self.call(RequestParams::GetBrickVoxelCounts(BrickKeyReq { key: key.into() }))?;
        Ok(expect_reply!(reply, GetBrickVoxelCounts)?.counts)
    }

    fn brick_extents(&self, key: BrickKey) -> Result<[f32; 3], Error> {
        let reply = self.call(RequestParams::GetBrickExtents(BrickKeyReq { key: key.into() }))?;
        Ok(expect_reply!(reply, GetBrickExtents)?.extents)
    }

    fn brick_layout(&self, modality: u32, lod: u32) -> Result<[u32; 3], Error> {
        let reply = self.call(RequestParams::GetBrickLayout(GetBrickLayoutReq { modality, lod }))?;
        Ok(expect_reply!(reply, GetBrickLayout)?.layout)
    }

    fn modality_count(&self) -> u32 {
        self.call(RequestParams::GetModalityCount(NoArgsReq))
            .and_then(|r| expect_reply!(r, Count))
            .map(|r| r.count)
            .unwrap_or(0)
    }

    fn component_count(&self, modality: u32) -> Result<u32, Error> {
        let reply = self.call(RequestParams::GetComponentCount(ModalityReq { modality }))?;
        Ok(expect_reply!(reply, Count)?.count)
    }

    fn range(&self, modality: u32) -> Result<(f32, f32), Error> {
        let reply = self.call(RequestParams::GetRange(GetRangeReq { modality, timestep: 0 }))?;
        let r = expect_reply!(reply, MinMax)?;
        Ok((r.min, r.max))
    }

    fn value_type(&self, modality: u32) -> Result<ValueType, Error> {
        let reply = self.call(RequestParams::GetValueType(ModalityReq { modality }))?;
        Ok(expect_reply!(reply, GetValueType)?.value_type)
    }

    fn semantic(&self, modality: u32) -> Result<Semantic, Error> {
        let reply = self.call(RequestParams::GetSemantic(ModalityReq { modality }))?;
        Ok(expect_reply!(reply, GetSemantic)?.semantic)
    }

    fn get_brick(&self, key: BrickKey) -> Result<BrickPayload, Error> {
        let reply = self.call(RequestParams::GetBrick(BrickKeyReq { key: key.into() }))?;
        let r = expect_reply!(reply, GetBrick)?;
        let bytes = decode_bin(&r.data_base64)?;
        Ok(BrickPayload { success: bytes.len() == r.byte_len, bytes })
    }
}
