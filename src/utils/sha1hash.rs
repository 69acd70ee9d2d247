use std::fmt::Display;

use percent_encoding::percent_encode;
use serde::{Serialize, Deserialize};
use sha1::Digest;
use thiserror::Error;

use crate::utils::UrlEncodable;

#[derive(Debug, Error)]
pub enum Sha1HashError {
    #[error("invalid sha1 hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid sha1 hash length: {0}")]
    InvalidLength(usize),
}

/// Represents a SHA-1 hash as an array of 20 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha1Hash(pub [u8; 20]);

impl UrlEncodable for Sha1Hash {
    fn as_url_encoded(&self) -> String {
        percent_encode(&self.0, percent_encoding::NON_ALPHANUMERIC).to_string()
    }
}

impl Display for Sha1Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Sha1Hash {
    pub fn new(hash: &[u8; 20]) -> Sha1Hash {
        Sha1Hash(*hash)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Sha1Hash, Sha1HashError> {
        let hash: [u8; 20] = bytes.try_into().map_err(|_| Sha1HashError::InvalidLength(bytes.len()))?;
        Ok(Sha1Hash(hash))
    }

    pub fn from_hex(hex: &str) -> Result<Sha1Hash, Sha1HashError> {
        let bytes = hex::decode(hex)?;
        Sha1Hash::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

pub fn sha1_hash(value: &[u8]) -> Sha1Hash {
    let digest = sha1::Sha1::digest(value);

    let mut hash = [0u8; 20];
    hash.copy_from_slice(digest.as_slice());

    Sha1Hash(hash)
}
