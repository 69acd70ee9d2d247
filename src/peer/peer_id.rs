use std::fmt;

use thiserror::Error;

use crate::utils::UrlEncodable;

pub const PEER_ID_LENGTH: usize = 20;
pub const DEFAULT_PEER_ID_PREFIX: &str = "-TT0100-";

const PEER_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Error)]
pub enum PeerIdError {
    #[error("peer id prefix is {0} bytes, at most 20 are allowed")]
    PrefixTooLong(usize),

    #[error("couldn't gather random bytes for the peer id: {0}")]
    Random(#[from] getrandom::Error),
}

/// The 20-byte client identifier sent to trackers, fixed for a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub [u8; PEER_ID_LENGTH]);

impl PeerId {
    /// Azureus-style id: `prefix` padded with random alphanumerics.
    pub fn generate(prefix: &str) -> Result<PeerId, PeerIdError> {
        let prefix = prefix.as_bytes();
        if prefix.len() > PEER_ID_LENGTH {
            return Err(PeerIdError::PrefixTooLong(prefix.len()));
        }

        let mut random = [0u8; PEER_ID_LENGTH];
        getrandom::getrandom(&mut random)?;

        let mut peer_id = [0u8; PEER_ID_LENGTH];
        peer_id[..prefix.len()].copy_from_slice(prefix);
        for (byte, random) in peer_id[prefix.len()..].iter_mut().zip(random) {
            *byte = PEER_ID_ALPHABET[random as usize % PEER_ID_ALPHABET.len()];
        }

        Ok(PeerId(peer_id))
    }

    pub fn as_bytes(&self) -> &[u8; PEER_ID_LENGTH] {
        &self.0
    }
}

impl From<[u8; PEER_ID_LENGTH]> for PeerId {
    fn from(peer_id: [u8; PEER_ID_LENGTH]) -> Self {
        PeerId(peer_id)
    }
}

impl UrlEncodable for PeerId {
    fn as_url_encoded(&self) -> String {
        self.0.as_url_encoded()
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod peer_id_tests {
    use super::*;

    #[test]
    fn test_generate_keeps_prefix() {
        let peer_id = PeerId::generate(DEFAULT_PEER_ID_PREFIX).unwrap();

        assert!(peer_id.as_bytes().starts_with(DEFAULT_PEER_ID_PREFIX.as_bytes()));
        assert!(peer_id.as_bytes()[DEFAULT_PEER_ID_PREFIX.len()..].iter().all(u8::is_ascii_alphanumeric));
    }

    #[test]
    fn test_generate_full_length_prefix() {
        let peer_id = PeerId::generate("TtT-1-0-0-TESTCLIENT").unwrap();

        assert_eq!(peer_id.to_string(), "TtT-1-0-0-TESTCLIENT");
    }

    #[test]
    fn test_generate_rejects_long_prefix() {
        assert!(matches!(PeerId::generate("-TT0100-0123456789abcdef"), Err(PeerIdError::PrefixTooLong(24))));
    }

    #[test]
    fn test_random_error_keeps_its_source() {
        let error = PeerIdError::from(getrandom::Error::UNSUPPORTED);

        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("couldn't gather random bytes"));
    }

    #[test]
    fn test_url_encoded_is_alphanumeric_or_escaped() {
        let peer_id = PeerId::from(*b"-TT0100-abcdefghijkl");

        assert_eq!(peer_id.as_url_encoded(), "%2DTT0100%2Dabcdefghijkl");
    }
}
