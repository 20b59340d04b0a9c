//! `IoSession` — dispatches dataset-metadata requests to an [`IoDataset`].
//!
//! Grounded on the per-command handler dispatch `AbstractSession::run`
//! delegates to via `createHandler`, specialized to the I/O node's command
//! subset from `original_source/src/common/IIO.h`.

use std::sync::Arc;

use crate::core::error::Error;
use crate::io::dataset::IoDataset;
use crate::io::list_data::IListData;
use crate::net::Endpoint;
use crate::session::SessionHandler;
use crate::wire::commands::*;
use crate::wire::reply::ReplyParams;
use crate::wire::request::RequestParams;

pub struct IoSession {
    pub dataset: Arc<dyn IoDataset>,
    pub listing: Arc<dyn IListData>,
    /// Where this session's own control listener is bound, so a colocated
    /// processing session can dial it through a real [`crate::proxy::IoProxy`]
    /// rather than reaching into the dataset directly.
    pub endpoint: Endpoint,
}

impl IoSession {
    pub fn new(dataset: Arc<dyn IoDataset>, listing: Arc<dyn IListData>, endpoint: Endpoint) -> Self {
        Self { dataset, listing, endpoint }
    }
}

impl SessionHandler for IoSession {
    fn handle(&self, _sid: u32, request: &crate::wire::request::Request) -> Result<ReplyParams, Error> {
        let ds = &self.dataset;
        match &request.params {
            RequestParams::ListFiles(r) => {
                let entries = self
                    .listing
                    .list_data(&r.dir_id)?
                    .into_iter()
                    .map(|e| ListFilesEntry { name: e.name, file_id: e.file_id, datatype: e.kind })
                    .collect();
                Ok(ReplyParams::ListFiles(ListFilesRep { entries }))
            }
            RequestParams::GetLodLevelCount(_) => Ok(ReplyParams::Count(CountRep { count: ds.lod_level_count() })),
            RequestParams::GetModalityCount(_) => Ok(ReplyParams::Count(CountRep { count: ds.modality_count() })),
            RequestParams::GetComponentCount(r) => {
                Ok(ReplyParams::Count(CountRep { count: ds.component_count(r.modality)? }))
            }
            RequestParams::GetNumberOfTimesteps(_) => {
                Ok(ReplyParams::Count(CountRep { count: ds.number_of_timesteps() }))
            }
            RequestParams::GetDomainSize(r) => {
                Ok(ReplyParams::GetDomainSize(Size3Rep { size: ds.domain_size(r.modality, r.lod)? }))
            }
            RequestParams::GetTransformation(r) => {
                Ok(ReplyParams::GetTransformation(GetTransformationRep { matrix: ds.transformation(r.modality)? }))
            }
            RequestParams::GetBrickOverlapSize(_) => {
                Ok(ReplyParams::GetBrickOverlapSize(Size3Rep { size: ds.brick_overlap_size() }))
            }
            RequestParams::GetBrickLayout(r) => Ok(ReplyParams::GetBrickLayout(GetBrickLayoutRep {
                layout: ds.brick_layout(r.modality, r.lod)?,
            })),
            RequestParams::GetBrickExtents(r) => Ok(ReplyParams::GetBrickExtents(GetBrickExtentsRep {
                extents: ds.brick_extents(r.key.into())?,
            })),
            RequestParams::GetBrickVoxelCounts(r) => Ok(ReplyParams::GetBrickVoxelCounts(GetBrickVoxelCountsRep {
                counts: ds.brick_voxel_counts(r.key.into())?,
            })),
            RequestParams::MaxMinForKey(r) => {
                let block = ds.max_min_for_key(r.key.into())?;
                Ok(ReplyParams::MinMax(MinMaxRep { min: block.min, max: block.max }))
            }
            RequestParams::GetMaxBrickSize(_) => {
                Ok(ReplyParams::GetMaxBrickSize(Size3Rep { size: ds.max_brick_size() }))
            }
            RequestParams::GetMaxUsedBrickSizes(_) => {
                Ok(ReplyParams::GetMaxUsedBrickSizes(Size3Rep { size: ds.max_used_brick_sizes() }))
            }
            RequestParams::GetLargestSingleBrickLod(r) => {
                Ok(ReplyParams::GetLargestSingleBrickLod(GetLargestSingleBrickLodRep {
                    lod: ds.largest_single_brick_lod(r.modality)?,
                }))
            }
            RequestParams::GetValueType(r) => {
                Ok(ReplyParams::GetValueType(GetValueTypeRep { value_type: ds.value_type(r.modality)? }))
            }
            RequestParams::GetSemantic(r) => {
                Ok(ReplyParams::GetSemantic(GetSemanticRep { semantic: ds.semantic(r.modality)? }))
            }
            RequestParams::GetRange(r) => {
                let (min, max) = ds.range(r.modality)?;
                Ok(ReplyParams::MinMax(MinMaxRep { min, max }))
            }
            RequestParams::GetBrick(r) => {
                let payload = ds.get_brick(r.key.into())?;
                if !payload.success {
                    return Err(Error::InvalidArgument(format!("no data for brick {:?}", r.key)));
                }
                Ok(ReplyParams::GetBrick(GetBrickRep {
                    byte_len: payload.bytes.len(),
                    data_base64: crate::wire::serial::encode_bin(&payload.bytes),
                }))
            }
            other => Err(Error::Protocol(format!("{:?} is not an I/O session command", other.vcl_type()))),
        }
    }
}
