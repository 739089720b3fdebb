//! Wire codec (C1) and status taxonomy (C8).
//!
//! ```text
//! Request:  [ version:u8 ][ op_code:u8 ]  [ payload:bytes ]
//! Response: [ status:u8 ]                 [ payload:bytes ]
//! ```
//!
//! The header is single bytes only today, but is written as if it could grow
//! multi-byte fields: any such field would be big-endian, matching every
//! other integer on this wire.

use crate::errors::WireError;

/// The only wire version this crate speaks.
pub const WIRE_VERSION: u8 = 1;

const RESPONSE_HEADER_LEN: usize = 1;

/// Version-1 op codes (§6). Dense and stable — a new RPC gets the next value,
/// never a reused one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    GetSupportedRpcVersions = 0,
    OpenSession = 1,
    GetConfiguration = 2,
    SetConfiguration = 3,
    ReadOnlyTree = 4,
    ReadWriteTree = 5,
}

impl OpCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The canonical status codes (§3). Exhaustive by design: a byte outside
/// this set is a fatal protocol violation, not a variant to add silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 0,
    InvalidVersion = 1,
    InvalidRequest = 2,
    NotLeader = 3,
    SessionExpired = 4,
}

impl Status {
    /// Round-trips a wire byte to a known status, or `None` if the byte is
    /// outside the defined set. Callers must treat `None` as fatal — never
    /// coerce it to a nearby variant.
    pub fn from_u8(b: u8) -> Option<Status> {
        match b {
            0 => Some(Status::Ok),
            1 => Some(Status::InvalidVersion),
            2 => Some(Status::InvalidRequest),
            3 => Some(Status::NotLeader),
            4 => Some(Status::SessionExpired),
            _ => None,
        }
    }
}

/// Encodes a request frame: two header bytes (`version`, `op_code`) followed
/// by the caller's already-serialized payload.
pub fn encode_request(version: u8, op_code: OpCode, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(2 + payload.len());
    buf.push(version);
    buf.push(op_code.as_u8());
    buf.extend_from_slice(payload);
    buf
}

/// Decodes a response frame's header, returning the raw status byte (not yet
/// checked against [`Status`]'s closed set — that's the caller's job, so it
/// can distinguish "known status" from "fatal: unknown status") and the
/// payload that follows it.
pub fn decode_response(bytes: &[u8]) -> Result<(u8, &[u8]), WireError> {
    if bytes.len() < RESPONSE_HEADER_LEN {
        return Err(WireError::MalformedFrame(RESPONSE_HEADER_LEN));
    }
    Ok((bytes[0], &bytes[RESPONSE_HEADER_LEN..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_request_lays_out_header_then_payload() {
        let frame = encode_request(WIRE_VERSION, OpCode::OpenSession, b"hello");
        assert_eq!(frame, vec![1, OpCode::OpenSession.as_u8(), b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn decode_response_splits_status_and_payload() {
        let (status, payload) = decode_response(&[0, 1, 2, 3]).unwrap();
        assert_eq!(status, 0);
        assert_eq!(payload, &[1, 2, 3]);
    }

    #[test]
    fn decode_response_on_empty_payload_still_succeeds() {
        let (status, payload) = decode_response(&[3]).unwrap();
        assert_eq!(status, 3);
        assert!(payload.is_empty());
    }

    #[test]
    fn decode_response_rejects_undersized_buffer() {
        assert_eq!(
            decode_response(&[]),
            Err(WireError::MalformedFrame(RESPONSE_HEADER_LEN))
        );
    }

    #[test]
    fn status_round_trips_for_defined_values() {
        for (b, expected) in [
            (0u8, Status::Ok),
            (1, Status::InvalidVersion),
            (2, Status::InvalidRequest),
            (3, Status::NotLeader),
            (4, Status::SessionExpired),
        ] {
            assert_eq!(Status::from_u8(b), Some(expected));
        }
    }

    #[test]
    fn status_rejects_unknown_byte() {
        assert_eq!(Status::from_u8(255), None);
    }

    #[test]
    fn op_codes_are_dense_and_stable() {
        assert_eq!(OpCode::GetSupportedRpcVersions.as_u8(), 0);
        assert_eq!(OpCode::OpenSession.as_u8(), 1);
        assert_eq!(OpCode::GetConfiguration.as_u8(), 2);
        assert_eq!(OpCode::SetConfiguration.as_u8(), 3);
        assert_eq!(OpCode::ReadOnlyTree.as_u8(), 4);
        assert_eq!(OpCode::ReadWriteTree.as_u8(), 5);
    }
}
