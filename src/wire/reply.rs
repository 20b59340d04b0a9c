//! The `Reply` envelope: `{"type", "rid", "rep"}`, plus the `ErrorReply`
//! shape a failed call takes instead.
//!
//! Mirrors `original_source/src/commands/Reply.cpp` the same way
//! `request.rs` mirrors `Request.cpp`: an explicit discriminator write and
//! an exhaustive match back, rather than serde's tagged-enum derive.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::commands::*;
use super::vcl::{Vcl, VclType};
use crate::core::error::Error;

/// The command-specific payload of a successful reply, one variant per
/// `VclType` that produces a body (several are empty acknowledgements).
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyParams {
    InitIoSession(InitIoSessionRep),
    CloseIoSession(CloseIoSessionRep),
    InitProcessingSession(InitProcessingSessionRep),
    CloseProcessingSession(CloseProcessingSessionRep),
    ListFiles(ListFilesRep),
    Count(CountRep),
    GetDomainSize(Size3Rep),
    GetTransformation(GetTransformationRep),
    GetBrickOverlapSize(Size3Rep),
    GetBrickLayout(GetBrickLayoutRep),
    GetBrickExtents(GetBrickExtentsRep),
    GetBrickVoxelCounts(GetBrickVoxelCountsRep),
    MinMax(MinMaxRep),
    GetMaxBrickSize(Size3Rep),
    GetMaxUsedBrickSizes(Size3Rep),
    GetLargestSingleBrickLod(GetLargestSingleBrickLodRep),
    GetValueType(GetValueTypeRep),
    GetSemantic(GetSemanticRep),
    TransferFunction1d(TransferFunction1dRep),
    TransferFunction2d(TransferFunction2dRep),
    GetHistogram(GetHistogramRep),
    GetBrick(GetBrickRep),
    SupportsRenderMode(SupportsRenderModeRep),
    ProceedRendering(ProceedRenderingRep),
    Empty(EmptyRep),
}

impl ReplyParams {
    fn body_value(&self) -> Value {
        macro_rules! v {
            ($inner:expr) => {
                serde_json::to_value($inner).expect("reply payload always serializes")
            };
        }
        match self {
            ReplyParams::InitIoSession(r) => v!(r),
            ReplyParams::CloseIoSession(r) => v!(r),
            ReplyParams::InitProcessingSession(r) => v!(r),
            ReplyParams::CloseProcessingSession(r) => v!(r),
            ReplyParams::ListFiles(r) => v!(r),
            ReplyParams::Count(r) => v!(r),
            ReplyParams::GetDomainSize(r) => v!(r),
            ReplyParams::GetTransformation(r) => v!(r),
            ReplyParams::GetBrickOverlapSize(r) => v!(r),
            ReplyParams::GetBrickLayout(r) => v!(r),
            ReplyParams::GetBrickExtents(r) => v!(r),
            ReplyParams::GetBrickVoxelCounts(r) => v!(r),
            ReplyParams::MinMax(r) => v!(r),
            ReplyParams::GetMaxBrickSize(r) => v!(r),
            ReplyParams::GetMaxUsedBrickSizes(r) => v!(r),
            ReplyParams::GetLargestSingleBrickLod(r) => v!(r),
            ReplyParams::GetValueType(r) => v!(r),
            ReplyParams::GetSemantic(r) => v!(r),
            ReplyParams::TransferFunction1d(r) => v!(r),
            ReplyParams::TransferFunction2d(r) => v!(r),
            ReplyParams::GetHistogram(r) => v!(r),
            ReplyParams::GetBrick(r) => v!(r),
            ReplyParams::SupportsRenderMode(r) => v!(r),
            ReplyParams::ProceedRendering(r) => v!(r),
            ReplyParams::Empty(r) => v!(r),
        }
    }

    fn from_type_and_body(t: VclType, body: Value) -> Result<Self, Error> {
        macro_rules! d {
            ($variant:ident) => {
                serde_json::from_value(body)
                    .map(ReplyParams::$variant)
                    .map_err(|e| Error::Protocol(format!("bad {t} reply payload: {e}")))
            };
        }
        match t {
            VclType::InitIoSession => d!(InitIoSession),
            VclType::CloseIoSession => d!(CloseIoSession),
            VclType::InitProcessingSession => d!(InitProcessingSession),
            VclType::CloseProcessingSession => d!(CloseProcessingSession),
            VclType::ListFiles => d!(ListFiles),
            VclType::GetLodLevelCount
            | VclType::GetModalityCount
            | VclType::GetComponentCount
            | VclType::GetNumberOfTimesteps => d!(Count),
            VclType::GetDomainSize => d!(GetDomainSize),
            VclType::GetTransformation => d!(GetTransformation),
            VclType::GetBrickOverlapSize => d!(GetBrickOverlapSize),
            VclType::GetBrickLayout => d!(GetBrickLayout),
            VclType::GetBrickExtents => d!(GetBrickExtents),
            VclType::GetBrickVoxelCounts => d!(GetBrickVoxelCounts),
            VclType::MaxMinForKey | VclType::GetRange => d!(MinMax),
            VclType::GetMaxBrickSize => d!(GetMaxBrickSize),
            VclType::GetMaxUsedBrickSizes => d!(GetMaxUsedBrickSizes),
            VclType::GetLargestSingleBrickLod => d!(GetLargestSingleBrickLod),
            VclType::GetValueType => d!(GetValueType),
            VclType::GetSemantic => d!(GetSemantic),
            VclType::GetDefaultTransferFunction1d => d!(TransferFunction1d),
            VclType::GetDefaultTransferFunction2d => d!(TransferFunction2d),
            VclType::GetHistogram => d!(GetHistogram),
            VclType::GetBrick => d!(GetBrick),
            VclType::SupportsRenderMode => d!(SupportsRenderMode),
            VclType::ProceedRendering => d!(ProceedRendering),
            VclType::SetIsoValue
            | VclType::SetRenderMode
            | VclType::ZoomCamera
            | VclType::MoveCamera
            | VclType::RotateCamera
            | VclType::SetActiveModality
            | VclType::SetActiveTimestep
            | VclType::InitRenderContext
            | VclType::StartRendering
            | VclType::StopRendering
            | VclType::SetTransferFunction1d
            | VclType::SetTransferFunction2d => d!(Empty),
            VclType::Error => Err(Error::Protocol("Error is carried by ErrorReply, not Reply".into())),
        }
    }
}

/// A successful reply, echoing the `rid` it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub rid: u32,
    pub vcl_type: VclType,
    pub params: ReplyParams,
}

impl Reply {
    pub fn new(rid: u32, vcl_type: VclType, params: ReplyParams) -> Self {
        Self { rid, vcl_type, params }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": Vcl::to_string(self.vcl_type),
            "rid": self.rid,
            "rep": self.params.body_value(),
        })
    }

    pub fn from_value(value: Value) -> Result<Self, Error> {
        let obj = value.as_object().ok_or_else(|| Error::Protocol("reply is not an object".into()))?;
        let type_tok = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Protocol("reply missing 'type'".into()))?;
        let t = Vcl::to_type(type_tok)
            .ok_or_else(|| Error::Protocol(format!("unknown reply type '{type_tok}'")))?;
        let rid = obj.get("rid").and_then(Value::as_u64).ok_or_else(|| Error::Protocol("reply missing 'rid'".into()))? as u32;
        let body = obj.get("rep").cloned().unwrap_or(Value::Null);
        let params = ReplyParams::from_type_and_body(t, body)?;
        Ok(Reply { rid, vcl_type: t, params })
    }
}

/// What a failed call receives instead of a `Reply`. Carries the same
/// `code()` values as [`crate::core::error::Error`] so a client can branch
/// on error kind without string matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub rid: u32,
    pub code: i32,
    pub message: String,
}

impl ErrorReply {
    pub fn from_error(rid: u32, err: &Error) -> Self {
        Self { rid, code: err.code(), message: err.to_string() }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": Vcl::to_string(VclType::Error),
            "rid": self.rid,
            "rep": { "code": self.code, "message": self.message },
        })
    }
}

/// Either side of what a session sends back for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyReply {
    Ok(Reply),
    Err(ErrorReply),
}

impl AnyReply {
    pub fn rid(&self) -> u32 {
        match self {
            AnyReply::Ok(r) => r.rid,
            AnyReply::Err(e) => e.rid,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            AnyReply::Ok(r) => r.to_value(),
            AnyReply::Err(e) => e.to_value(),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, Error> {
        let type_tok = value
            .as_object()
            .and_then(|o| o.get("type"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Protocol("reply missing 'type'".into()))?;
        if type_tok == VclType::Error.as_str() {
            let rid = value["rid"].as_u64().ok_or_else(|| Error::Protocol("error reply missing 'rid'".into()))? as u32;
            let rep = &value["rep"];
            let code = rep["code"].as_i64().ok_or_else(|| Error::Protocol("error reply missing 'code'".into()))? as i32;
            let message = rep["message"].as_str().unwrap_or_default().to_string();
            Ok(AnyReply::Err(ErrorReply { rid, code, message }))
        } else {
            Reply::from_value(value).map(AnyReply::Ok)
        }
    }
}

impl Serialize for AnyReply {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnyReply {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        AnyReply::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_reply_round_trips() {
        let reply = Reply::new(3, VclType::GetModalityCount, ReplyParams::Count(CountRep { count: 2 }));
        let any = AnyReply::Ok(reply.clone());
        let bytes = serde_json::to_vec(&any).unwrap();
        let back: AnyReply = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(any, back);
    }

    #[test]
    fn error_reply_round_trips_and_is_recognized_by_type_token() {
        let err = Error::InvalidArgument("bad modality".into());
        let reply = AnyReply::Err(ErrorReply::from_error(5, &err));
        let value = reply.to_value();
        assert_eq!(value["type"], "Error");
        let back = AnyReply::from_value(value).unwrap();
        assert_eq!(reply, back);
    }
}
