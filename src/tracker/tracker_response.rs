use std::time::Duration;

use crate::peer::{decode_peers, PeerAddress, PeerListError};
use crate::utils::bencode::{BencodedValue, BencodeError, DictExt, FromBencode};

use super::{Rejection, TrackerError};

/// A successful announce reply. `peers` holds the raw compact peer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerResponse {
    pub interval: u64,
    pub peers: Vec<u8>,
    pub min_interval: Option<u64>,
    pub complete: Option<u64>,
    pub incomplete: Option<u64>,
    pub tracker_id: Option<String>,
    pub warning_message: Option<String>,
}

impl TrackerResponse {
    pub fn peers(&self) -> Result<Vec<PeerAddress>, PeerListError> {
        decode_peers(&self.peers)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

impl FromBencode for TrackerResponse {
    type Error = TrackerError;

    fn from_bencode(value: &BencodedValue) -> Result<Self, Self::Error> {
        let response_dict = value.try_into_dict()?;

        if let Some(reason) = response_dict.get(b"failure reason".as_slice()) {
            return Err(TrackerError::Rejected(Rejection::Reason(failure_reason(reason))));
        }

        let interval = non_negative(response_dict.required_integer(b"interval")?, b"interval")?;

        let peers = match response_dict.required(b"peers")? {
            BencodedValue::ByteString(peers) => peers.clone(),
            _ => return Err(BencodeError::type_mismatch(b"peers", "compact byte string").into()),
        };

        let optional_count = |key: &[u8]| -> Result<Option<u64>, BencodeError> {
            response_dict
                .optional_integer(key)?
                .map(|value| non_negative(value, key))
                .transpose()
        };

        Ok(TrackerResponse {
            interval,
            peers,
            min_interval: optional_count(b"min interval")?,
            complete: optional_count(b"complete")?,
            incomplete: optional_count(b"incomplete")?,
            tracker_id: response_dict.optional_string(b"tracker id")?,
            warning_message: response_dict.optional_string(b"warning message")?,
        })
    }
}

// Any value under `failure reason` is a refusal, whatever its type.
fn failure_reason(value: &BencodedValue) -> String {
    match value {
        BencodedValue::ByteString(reason) => String::from_utf8_lossy(reason).into_owned(),
        BencodedValue::Integer(code) => code.to_string(),
        other => String::from_utf8_lossy(&other.as_bytes()).into_owned(),
    }
}

fn non_negative(value: i64, field: &[u8]) -> Result<u64, BencodeError> {
    u64::try_from(value).map_err(|_| BencodeError::type_mismatch(field, "non-negative integer"))
}
