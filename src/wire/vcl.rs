//! `VclType` — the closed enumeration of command kinds, and the `Vcl`
//! registry mapping each to/from its wire token.
//!
//! Grounded on `original_source/src/common/Commands.h`'s `VclType` and the
//! `Vcl` singleton, minus the `PYTHON_MAGIC_*` codegen markers (spec.md
//! §9, open question (a)): a derive or macro would save little at this
//! size, so `Vcl::to_string`/`to_type` are plain exhaustive matches, same
//! as the tagged-enum command set in `trinity-transport`'s sibling debug
//! protocol.

use std::fmt;

/// Every command kind the wire protocol knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VclType {
    // Session lifecycle
    InitIoSession,
    CloseIoSession,
    InitProcessingSession,
    CloseProcessingSession,

    // I/O node / dataset metadata
    ListFiles,
    GetLodLevelCount,
    GetModalityCount,
    GetComponentCount,
    GetNumberOfTimesteps,
    GetDomainSize,
    GetTransformation,
    GetBrickOverlapSize,
    GetBrickLayout,
    GetBrickExtents,
    GetBrickVoxelCounts,
    MaxMinForKey,
    GetMaxBrickSize,
    GetMaxUsedBrickSizes,
    GetLargestSingleBrickLod,
    GetValueType,
    GetSemantic,
    GetRange,
    GetDefaultTransferFunction1d,
    GetDefaultTransferFunction2d,
    GetHistogram,
    GetBrick,

    // Rendering commands
    SetIsoValue,
    SetRenderMode,
    SupportsRenderMode,
    ZoomCamera,
    MoveCamera,
    RotateCamera,
    SetActiveModality,
    SetActiveTimestep,
    InitRenderContext,
    StartRendering,
    StopRendering,
    ProceedRendering,
    SetTransferFunction1d,
    SetTransferFunction2d,

    // Error
    Error,
}

impl VclType {
    /// The exact wire token for this type, per `Vcl::toString`.
    pub const fn as_str(self) -> &'static str {
        match self {
            VclType::InitIoSession => "InitIOSession",
            VclType::CloseIoSession => "CloseIOSession",
            VclType::InitProcessingSession => "InitProcessingSession",
            VclType::CloseProcessingSession => "CloseProcessingSession",
            VclType::ListFiles => "ListFiles",
            VclType::GetLodLevelCount => "GetLODLevelCount",
            VclType::GetModalityCount => "GetModalityCount",
            VclType::GetComponentCount => "GetComponentCount",
            VclType::GetNumberOfTimesteps => "GetNumberOfTimesteps",
            VclType::GetDomainSize => "GetDomainSize",
            VclType::GetTransformation => "GetTransformation",
            VclType::GetBrickOverlapSize => "GetBrickOverlapSize",
            VclType::GetBrickLayout => "GetBrickLayout",
            VclType::GetBrickExtents => "GetBrickExtents",
            VclType::GetBrickVoxelCounts => "GetBrickVoxelCounts",
            VclType::MaxMinForKey => "MaxMinForKey",
            VclType::GetMaxBrickSize => "GetMaxBrickSize",
            VclType::GetMaxUsedBrickSizes => "GetMaxUsedBrickSizes",
            VclType::GetLargestSingleBrickLod => "GetLargestSingleBrickLOD",
            VclType::GetValueType => "GetValueType",
            VclType::GetSemantic => "GetSemantic",
            VclType::GetRange => "GetRange",
            VclType::GetDefaultTransferFunction1d => "GetDefaultTransferFunction1D",
            VclType::GetDefaultTransferFunction2d => "GetDefaultTransferFunction2D",
            VclType::GetHistogram => "GetHistogram",
            VclType::GetBrick => "GetBrick",
            VclType::SetIsoValue => "SetIsoValue",
            VclType::SetRenderMode => "SetRenderMode",
            VclType::SupportsRenderMode => "SupportsRenderMode",
            VclType::ZoomCamera => "ZoomCamera",
            VclType::MoveCamera => "MoveCamera",
            VclType::RotateCamera => "RotateCamera",
            VclType::SetActiveModality => "SetActiveModality",
            VclType::SetActiveTimestep => "SetActiveTimestep",
            VclType::InitRenderContext => "InitRenderContext",
            VclType::StartRendering => "StartRendering",
            VclType::StopRendering => "StopRendering",
            VclType::ProceedRendering => "ProceedRendering",
            VclType::SetTransferFunction1d => "SetTransferFunction1D",
            VclType::SetTransferFunction2d => "SetTransferFunction2D",
            VclType::Error => "Error",
        }
    }

    /// All variants, for exhaustive round-trip testing.
    pub const ALL: &'static [VclType] = &[
        VclType::InitIoSession,
        VclType::CloseIoSession,
        VclType::InitProcessingSession,
        VclType::CloseProcessingSession,
        VclType::ListFiles,
        VclType::GetLodLevelCount,
        VclType::GetModalityCount,
        VclType::GetComponentCount,
        VclType::GetNumberOfTimesteps,
        VclType::GetDomainSize,
        VclType::GetTransformation,
        VclType::GetBrickOverlapSize,
        VclType::GetBrickLayout,
        VclType::GetBrickExtents,
        VclType::GetBrickVoxelCounts,
        VclType::MaxMinForKey,
        VclType::GetMaxBrickSize,
        VclType::GetMaxUsedBrickSizes,
        VclType::GetLargestSingleBrickLod,
        VclType::GetValueType,
        VclType::GetSemantic,
        VclType::GetRange,
        VclType::GetDefaultTransferFunction1d,
        VclType::GetDefaultTransferFunction2d,
        VclType::GetHistogram,
        VclType::GetBrick,
        VclType::SetIsoValue,
        VclType::SetRenderMode,
        VclType::SupportsRenderMode,
        VclType::ZoomCamera,
        VclType::MoveCamera,
        VclType::RotateCamera,
        VclType::SetActiveModality,
        VclType::SetActiveTimestep,
        VclType::InitRenderContext,
        VclType::StartRendering,
        VclType::StopRendering,
        VclType::ProceedRendering,
        VclType::SetTransferFunction1d,
        VclType::SetTransferFunction2d,
        VclType::Error,
    ];
}

impl fmt::Display for VclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `Vcl` registry: wire-token <-> `VclType` in both directions.
pub struct Vcl;

impl Vcl {
    pub fn to_string(t: VclType) -> &'static str {
        t.as_str()
    }

    /// Looks up a wire token. Unknown tokens are protocol-fatal per
    /// spec.md §4.1 ("an unknown type ... raises an `InvalidMessage`
    /// error"); the caller maps `None` to that error.
    pub fn to_type(token: &str) -> Option<VclType> {
        VclType::ALL.iter().copied().find(|t| t.as_str() == token)
    }
}
