//! Per-command request/reply payloads.
//!
//! Field shapes follow `original_source/src/commands/*.cpp` and the IO/
//! processing interfaces in `original_source/src/common/{ISession,IIO}.h`;
//! naming favors plain Rust structs over the codegen'd C++ wrappers (spec.md
//! §9, open question (a)). Every payload is a plain `#[derive(Serialize,
//! Deserialize)]` struct — the wire contract only needs a self-describing
//! key/value encoding, which `serde_json`'s object representation already
//! is, so there is nothing an envelope-level writer/reader would add here.

use serde::{Deserialize, Serialize};

/// A single brick's address: which modality/timestep/LOD/linear index.
/// Mirrors the brick-key tuple used throughout
/// `GLVolumePool.cpp::recomputeVisibility`/`requestBricks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickKeyWire {
    pub modality: u32,
    pub timestep: u32,
    pub lod: u32,
    pub brick: u32,
}

/// Per-voxel value type, grounded on `IIO.h`'s `ValueType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    U8,
    U16,
    U32,
    F32,
}

impl ValueType {
    /// Bytes one component of this type occupies, for the pool's
    /// per-voxel element size (`component_count * byte_width`, spec.md
    /// §4.8.6).
    pub fn byte_width(self) -> u32 {
        match self {
            ValueType::U8 => 1,
            ValueType::U16 => 2,
            ValueType::U32 => 4,
            ValueType::F32 => 4,
        }
    }
}

/// A directory entry's kind, grounded on `IIO.h`'s dataset/directory
/// distinction (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetKind {
    Directory,
    Dataset,
}

/// What a modality's values represent, grounded on `IIO.h`'s `Semantic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semantic {
    Scalar,
    Vector,
    Color,
}

/// Render mode, grounded on the renderer mode switch in
/// `GLVolumePool.cpp`/the processing-base rendering commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    Isosurface,
    DirectVolumeRendering1d,
    DirectVolumeRendering2d,
}

macro_rules! unit_struct {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        pub struct $name;
    };
}

// ---- session lifecycle ----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitIoSessionReq {
    pub file_id: String,
    pub dir_id: String,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitIoSessionRep {
    pub sid: u32,
}
unit_struct!(CloseIoSessionReq);
unit_struct!(CloseIoSessionRep);

/// Which renderer implementation a processing session should instantiate,
/// grounded on the `renderType` wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RendererKind {
    Simple,
    Dummy,
    GridLeaper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitProcessingSessionReq {
    pub io_sid: u32,
    pub renderer: RendererKind,
    pub width: u32,
    pub height: u32,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitProcessingSessionRep {
    pub sid: u32,
    pub control_port: u16,
    pub vis_port: u16,
}
unit_struct!(CloseProcessingSessionReq);
unit_struct!(CloseProcessingSessionRep);

// ---- dataset metadata ----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilesReq {
    pub dir_id: String,
}
/// One `ListFiles` reply entry: a name, the id `InitIoSession` expects
/// back as `fileId` to open it, and whether it's a sub-directory or a
/// dataset (spec.md §6, §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilesEntry {
    pub name: String,
    pub file_id: String,
    pub datatype: DatasetKind,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilesRep {
    pub entries: Vec<ListFilesEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityReq {
    pub modality: u32,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRep {
    pub count: u32,
}

unit_struct!(NoArgsReq);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDomainSizeReq {
    pub modality: u32,
    pub lod: u32,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size3Rep {
    pub size: [u32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GetTransformationRep {
    pub matrix: [[f32; 4]; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBrickLayoutReq {
    pub modality: u32,
    pub lod: u32,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBrickLayoutRep {
    pub layout: [u32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickKeyReq {
    pub key: BrickKeyWire,
}
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GetBrickExtentsRep {
    pub extents: [f32; 3],
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBrickVoxelCountsRep {
    pub counts: [u32; 3],
}
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxRep {
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLargestSingleBrickLodRep {
    pub lod: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetValueTypeRep {
    pub value_type: ValueType,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSemanticRep {
    pub semantic: Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRangeReq {
    pub modality: u32,
    pub timestep: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction1dRep {
    pub rgba: Vec<[f32; 4]>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction2dRep {
    pub rgba: Vec<[f32; 4]>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetHistogramReq {
    pub modality: u32,
    pub timestep: u32,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetHistogramRep {
    pub bins: Vec<u64>,
}

/// `GetBrick`'s reply carries raw voxel bytes. The bytes are base64-encoded
/// into the JSON document rather than sent out of band, following the
/// `png_base64` pattern `trinity-transport`'s debug channel already uses
/// for screenshot bytes (spec.md §9, open question (b)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBrickRep {
    pub data_base64: String,
    pub byte_len: usize,
}

// ---- rendering ----

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetIsoValueReq {
    pub value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderModeReq {
    pub mode: RenderMode,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportsRenderModeRep {
    pub supported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomCameraReq {
    pub delta: f32,
}
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveCameraReq {
    pub delta: [f32; 3],
}
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotateCameraReq {
    pub axis: [f32; 3],
    pub radians: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetActiveModalityReq {
    pub modality: u32,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetActiveTimestepReq {
    pub timestep: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRenderContextReq {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProceedRenderingRep {
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTransferFunction1dReq {
    pub rgba: Vec<[f32; 4]>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTransferFunction2dReq {
    pub rgba: Vec<[f32; 4]>,
    pub width: u32,
    pub height: u32,
}

unit_struct!(EmptyRep);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brick_key_round_trips_through_json() {
        let key = BrickKeyWire { modality: 1, timestep: 2, lod: 3, brick: 4 };
        let json = serde_json::to_string(&key).unwrap();
        let back: BrickKeyWire = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }

    #[test]
    fn get_brick_rep_carries_base64_payload() {
        let bytes = [1u8, 2, 3, 4, 5];
        let rep = GetBrickRep {
            data_base64: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes),
            byte_len: bytes.len(),
        };
        let json = serde_json::to_string(&rep).unwrap();
        let back: GetBrickRep = serde_json::from_str(&json).unwrap();
        let decoded = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &back.data_base64).unwrap();
        assert_eq!(decoded, bytes);
    }
}
