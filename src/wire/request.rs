//! The `Request` envelope: `{"type", "rid", "sid", "req"}`.
//!
//! `Request::to_value`/`from_value` mirror `original_source/src/commands/
//! Request.cpp`'s `toBytes`/dispatcher pair: the discriminator is written
//! explicitly and the inverse direction is a single exhaustive match over
//! `VclType`, not serde's adjacently-tagged-enum machinery, so that an
//! unrecognized `type` token surfaces the same `Protocol` error the
//! original raises instead of a generic deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::commands::*;
use super::vcl::{Vcl, VclType};
use crate::core::error::Error;

/// The command-specific payload of a request, one variant per `VclType`
/// (excluding `Error`, which only ever appears on the reply side).
#[derive(Debug, Clone, PartialEq)]
pub enum RequestParams {
    InitIoSession(InitIoSessionReq),
    CloseIoSession(CloseIoSessionReq),
    InitProcessingSession(InitProcessingSessionReq),
    CloseProcessingSession(CloseProcessingSessionReq),
    ListFiles(ListFilesReq),
    GetLodLevelCount(ModalityReq),
    GetModalityCount(NoArgsReq),
    GetComponentCount(ModalityReq),
    GetNumberOfTimesteps(NoArgsReq),
    GetDomainSize(GetDomainSizeReq),
    GetTransformation(ModalityReq),
    GetBrickOverlapSize(NoArgsReq),
    GetBrickLayout(GetBrickLayoutReq),
    GetBrickExtents(BrickKeyReq),
    GetBrickVoxelCounts(BrickKeyReq),
    MaxMinForKey(BrickKeyReq),
    GetMaxBrickSize(NoArgsReq),
    GetMaxUsedBrickSizes(NoArgsReq),
    GetLargestSingleBrickLod(ModalityReq),
    GetValueType(ModalityReq),
    GetSemantic(ModalityReq),
    GetRange(GetRangeReq),
    GetDefaultTransferFunction1d(ModalityReq),
    GetDefaultTransferFunction2d(ModalityReq),
    GetHistogram(GetHistogramReq),
    GetBrick(BrickKeyReq),
    SetIsoValue(SetIsoValueReq),
    SetRenderMode(RenderModeReq),
    SupportsRenderMode(RenderModeReq),
    ZoomCamera(ZoomCameraReq),
    MoveCamera(MoveCameraReq),
    RotateCamera(RotateCameraReq),
    SetActiveModality(SetActiveModalityReq),
    SetActiveTimestep(SetActiveTimestepReq),
    InitRenderContext(InitRenderContextReq),
    StartRendering(NoArgsReq),
    StopRendering(NoArgsReq),
    ProceedRendering(NoArgsReq),
    SetTransferFunction1d(SetTransferFunction1dReq),
    SetTransferFunction2d(SetTransferFunction2dReq),
}

impl RequestParams {
    pub fn vcl_type(&self) -> VclType {
        match self {
            RequestParams::InitIoSession(_) => VclType::InitIoSession,
            RequestParams::CloseIoSession(_) => VclType::CloseIoSession,
            RequestParams::InitProcessingSession(_) => VclType::InitProcessingSession,
            RequestParams::CloseProcessingSession(_) => VclType::CloseProcessingSession,
            RequestParams::ListFiles(_) => VclType::ListFiles,
            RequestParams::GetLodLevelCount(_) => VclType::GetLodLevelCount,
            RequestParams::GetModalityCount(_) => VclType::GetModalityCount,
            RequestParams::GetComponentCount(_) => VclType::GetComponentCount,
            RequestParams::GetNumberOfTimesteps(_) => VclType::GetNumberOfTimesteps,
            RequestParams::GetDomainSize(_) => VclType::GetDomainSize,
            RequestParams::GetTransformation(_) => VclType::GetTransformation,
            RequestParams::GetBrickOverlapSize(_) => VclType::GetBrickOverlapSize,
            RequestParams::GetBrickLayout(_) => VclType::GetBrickLayout,
            RequestParams::GetBrickExtents(_) => VclType::GetBrickExtents,
            RequestParams::GetBrickVoxelCounts(_) => VclType::GetBrickVoxelCounts,
            RequestParams::MaxMinForKey(_) => VclType::MaxMinForKey,
            RequestParams::GetMaxBrickSize(_) => VclType::GetMaxBrickSize,
            RequestParams::GetMaxUsedBrickSizes(_) => VclType::GetMaxUsedBrickSizes,
            RequestParams::GetLargestSingleBrickLod(_) => VclType::GetLargestSingleBrickLod,
            RequestParams::GetValueType(_) => VclType::GetValueType,
            RequestParams::GetSemantic(_) => VclType::GetSemantic,
            RequestParams::GetRange(_) => VclType::GetRange,
            RequestParams::GetDefaultTransferFunction1d(_) => VclType::GetDefaultTransferFunction1d,
            RequestParams::GetDefaultTransferFunction2d(_) => VclType::GetDefaultTransferFunction2d,
            RequestParams::GetHistogram(_) => VclType::GetHistogram,
            RequestParams::GetBrick(_) => VclType::GetBrick,
            RequestParams::SetIsoValue(_) => VclType::SetIsoValue,
            RequestParams::SetRenderMode(_) => VclType::SetRenderMode,
            RequestParams::SupportsRenderMode(_) => VclType::SupportsRenderMode,
            RequestParams::ZoomCamera(_) => VclType::ZoomCamera,
            RequestParams::MoveCamera(_) => VclType::MoveCamera,
            RequestParams::RotateCamera(_) => VclType::RotateCamera,
            RequestParams::SetActiveModality(_) => VclType::SetActiveModality,
            RequestParams::SetActiveTimestep(_) => VclType::SetActiveTimestep,
            RequestParams::InitRenderContext(_) => VclType::InitRenderContext,
            RequestParams::StartRendering(_) => VclType::StartRendering,
            RequestParams::StopRendering(_) => VclType::StopRendering,
            RequestParams::ProceedRendering(_) => VclType::ProceedRendering,
            RequestParams::SetTransferFunction1d(_) => VclType::SetTransferFunction1d,
            RequestParams::SetTransferFunction2d(_) => VclType::SetTransferFunction2d,
        }
    }

    fn body_value(&self) -> Value {
        macro_rules! v {
            ($inner:expr) => {
                serde_json::to_value($inner).expect("request payload always serializes")
            };
        }
        match self {
            RequestParams::InitIoSession(r) => v!(r),
            RequestParams::CloseIoSession(r) => v!(r),
            RequestParams::InitProcessingSession(r) => v!(r),
            RequestParams::CloseProcessingSession(r) => v!(r),
            RequestParams::ListFiles(r) => v!(r),
            RequestParams::GetLodLevelCount(r) => v!(r),
            RequestParams::GetModalityCount(r) => v!(r),
            RequestParams::GetComponentCount(r) => v!(r),
            RequestParams::GetNumberOfTimesteps(r) => v!(r),
            RequestParams::GetDomainSize(r) => v!(r),
            RequestParams::GetTransformation(r) => v!(r),
            RequestParams::GetBrickOverlapSize(r) => v!(r),
            RequestParams::GetBrickLayout(r) => v!(r),
            RequestParams::GetBrickExtents(r) => v!(r),
            RequestParams::GetBrickVoxelCounts(r) => v!(r),
            RequestParams::MaxMinForKey(r) => v!(r),
            RequestParams::GetMaxBrickSize(r) => v!(r),
            RequestParams::GetMaxUsedBrickSizes(r) => v!(r),
            RequestParams::GetLargestSingleBrickLod(r) => v!(r),
            RequestParams::GetValueType(r) => v!(r),
            RequestParams::GetSemantic(r) => v!(r),
            RequestParams::GetRange(r) => v!(r),
            RequestParams::GetDefaultTransferFunction1d(r) => v!(r),
            RequestParams::GetDefaultTransferFunction2d(r) => v!(r),
            RequestParams::GetHistogram(r) => v!(r),
            RequestParams::GetBrick(r) => v!(r),
            RequestParams::SetIsoValue(r) => v!(r),
            RequestParams::SetRenderMode(r) => v!(r),
            RequestParams::SupportsRenderMode(r) => v!(r),
            RequestParams::ZoomCamera(r) => v!(r),
            RequestParams::MoveCamera(r) => v!(r),
            RequestParams::RotateCamera(r) => v!(r),
            RequestParams::SetActiveModality(r) => v!(r),
            RequestParams::SetActiveTimestep(r) => v!(r),
            RequestParams::InitRenderContext(r) => v!(r),
            RequestParams::StartRendering(r) => v!(r),
            RequestParams::StopRendering(r) => v!(r),
            RequestParams::ProceedRendering(r) => v!(r),
            RequestParams::SetTransferFunction1d(r) => v!(r),
            RequestParams::SetTransferFunction2d(r) => v!(r),
        }
    }

    fn from_type_and_body(t: VclType, body: Value) -> Result<Self, Error> {
        macro_rules! d {
            ($variant:ident) => {
                serde_json::from_value(body)
                    .map(RequestParams::$variant)
                    .map_err(|e| Error::Protocol(format!("bad {t} payload: {e}")))
            };
        }
        match t {
            VclType::InitIoSession => d!(InitIoSession),
            VclType::CloseIoSession => d!(CloseIoSession),
            VclType::InitProcessingSession => d!(InitProcessingSession),
            VclType::CloseProcessingSession => d!(CloseProcessingSession),
            VclType::ListFiles => d!(ListFiles),
            VclType::GetLodLevelCount => d!(GetLodLevelCount),
            VclType::GetModalityCount => d!(GetModalityCount),
            VclType::GetComponentCount => d!(GetComponentCount),
            VclType::GetNumberOfTimesteps => d!(GetNumberOfTimesteps),
            VclType::GetDomainSize => d!(GetDomainSize),
            VclType::GetTransformation => d!(GetTransformation),
            VclType::GetBrickOverlapSize => d!(GetBrickOverlapSize),
            VclType::GetBrickLayout => d!(GetBrickLayout),
            VclType::GetBrickExtents => d!(GetBrickExtents),
            VclType::GetBrickVoxelCounts => d!(GetBrickVoxelCounts),
            VclType::MaxMinForKey => d!(MaxMinForKey),
            VclType::GetMaxBrickSize => d!(GetMaxBrickSize),
            VclType::GetMaxUsedBrickSizes => d!(GetMaxUsedBrickSizes),
            VclType::GetLargestSingleBrickLod => d!(GetLargestSingleBrickLod),
            VclType::GetValueType => d!(GetValueType),
            VclType::GetSemantic => d!(GetSemantic),
            VclType::GetRange => d!(GetRange),
            VclType::GetDefaultTransferFunction1d => d!(GetDefaultTransferFunction1d),
            VclType::GetDefaultTransferFunction2d => d!(GetDefaultTransferFunction2d),
            VclType::GetHistogram => d!(GetHistogram),
            VclType::GetBrick => d!(GetBrick),
            VclType::SetIsoValue => d!(SetIsoValue),
            VclType::SetRenderMode => d!(SetRenderMode),
            VclType::SupportsRenderMode => d!(SupportsRenderMode),
            VclType::ZoomCamera => d!(ZoomCamera),
            VclType::MoveCamera => d!(MoveCamera),
            VclType::RotateCamera => d!(RotateCamera),
            VclType::SetActiveModality => d!(SetActiveModality),
            VclType::SetActiveTimestep => d!(SetActiveTimestep),
            VclType::InitRenderContext => d!(InitRenderContext),
            VclType::StartRendering => d!(StartRendering),
            VclType::StopRendering => d!(StopRendering),
            VclType::ProceedRendering => d!(ProceedRendering),
            VclType::SetTransferFunction1d => d!(SetTransferFunction1d),
            VclType::SetTransferFunction2d => d!(SetTransferFunction2d),
            VclType::Error => Err(Error::Protocol("Error is not a valid request type".into())),
        }
    }
}

/// A fully addressed request: which client (implicit in the connection),
/// which in-flight call (`rid`), which session it targets (`sid`), and
/// what it asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub rid: u32,
    pub sid: u32,
    pub params: RequestParams,
}

impl Request {
    pub fn new(rid: u32, sid: u32, params: RequestParams) -> Self {
        Self { rid, sid, params }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": Vcl::to_string(self.params.vcl_type()),
            "rid": self.rid,
            "sid": self.sid,
            "req": self.params.body_value(),
        })
    }

    pub fn from_value(value: Value) -> Result<Self, Error> {
        let obj = value.as_object().ok_or_else(|| Error::Protocol("request is not an object".into()))?;
        let type_tok = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Protocol("request missing 'type'".into()))?;
        let t = Vcl::to_type(type_tok)
            .ok_or_else(|| Error::Protocol(format!("unknown request type '{type_tok}'")))?;
        let rid = obj.get("rid").and_then(Value::as_u64).ok_or_else(|| Error::Protocol("request missing 'rid'".into()))? as u32;
        let sid = obj.get("sid").and_then(Value::as_u64).ok_or_else(|| Error::Protocol("request missing 'sid'".into()))? as u32;
        let body = obj.get("req").cloned().unwrap_or(Value::Null);
        let params = RequestParams::from_type_and_body(t, body)?;
        Ok(Request { rid, sid, params })
    }
}

impl Serialize for Request {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Request::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json_bytes() {
        let req = Request::new(1, 7, RequestParams::GetModalityCount(NoArgsReq));
        let bytes = serde_json::to_vec(&req).unwrap();
        let back: Request = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn unknown_type_is_a_protocol_error() {
        let value = serde_json::json!({"type": "Bogus", "rid": 1, "sid": 0, "req": {}});
        let err = Request::from_value(value).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn carries_the_right_discriminator_on_the_wire() {
        let req = Request::new(2, 0, RequestParams::GetBrick(BrickKeyReq {
            key: BrickKeyWire { modality: 0, timestep: 0, lod: 2, brick: 9 },
        }));
        let value = req.to_value();
        assert_eq!(value["type"], "GetBrick");
    }
}
