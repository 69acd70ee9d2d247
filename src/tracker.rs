use std::fmt::Display;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::peer::PeerListError;
use crate::torrent::TorrentFile;
use crate::utils::bencode::{BencodeError, FromBencode};

pub mod tracker_event;
pub use tracker_event::TrackerEvent;

pub mod tracker_request;
pub use tracker_request::{SessionParams, TrackerRequest};

pub mod tracker_response;
pub use tracker_response::TrackerResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Status(u16),
    Reason(String),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Status(status) => write!(f, "HTTP status {status}"),
            Rejection::Reason(reason) => write!(f, "{reason}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid announce url '{url}': {reason}")]
    InvalidAnnounceUrl { url: String, reason: String },

    #[error("couldn't set up the HTTP client: {cause}")]
    ClientSetup {
        #[source]
        cause: reqwest::Error,
    },

    #[error("tracker unreachable: {cause}")]
    Unreachable {
        #[source]
        cause: reqwest::Error,
    },

    #[error("tracker rejected the announce: {0}")]
    Rejected(Rejection),

    #[error("malformed tracker response: {0}")]
    MalformedResponse(#[from] BencodeError),

    #[error(transparent)]
    MalformedPeerList(#[from] PeerListError),
}

/// Builds the fully parameterized announce URL for `torrent_file`.
pub fn build_announce_url(torrent_file: &TorrentFile, session: &SessionParams) -> Result<Url, TrackerError> {
    let tracker_request = TrackerRequest::new(torrent_file, session)?;
    let url = tracker_request.as_url();

    tracing::debug!("built announce url for info hash {}: {}", tracker_request.info_hash(), url);

    Ok(url)
}

/// Blocking HTTP(S) tracker client. One request per announce, never retried.
pub struct Tracker {
    client: reqwest::blocking::Client,
}

impl Tracker {
    pub fn new(timeout: Option<Duration>) -> Result<Tracker, TrackerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|cause| TrackerError::ClientSetup { cause })?;

        Ok(Tracker { client })
    }

    pub fn announce(&self, url: &Url) -> Result<TrackerResponse, TrackerError> {
        tracing::info!("announcing to {}://{}{}", url.scheme(), url.host_str().unwrap_or_default(), url.path());

        let response = self.client
            .get(url.clone())
            .send()
            .map_err(|cause| TrackerError::Unreachable { cause })?;

        let status = response.status();
        let body = response.bytes().map_err(|cause| TrackerError::Unreachable { cause })?;

        tracing::debug!("tracker responded with {} ({} bytes)", status, body.len());

        if !status.is_success() {
            let rejection = match TrackerResponse::from_bencode_bytes(&body) {
                Err(TrackerError::Rejected(rejection)) => rejection,
                _ => Rejection::Status(status.as_u16()),
            };

            tracing::warn!("tracker rejected the announce: {}", rejection);
            return Err(TrackerError::Rejected(rejection));
        }

        let tracker_response = match TrackerResponse::from_bencode_bytes(&body) {
            Ok(tracker_response) => tracker_response,
            Err(e) => {
                tracing::warn!("couldn't use tracker response: {}", e);
                return Err(e);
            }
        };

        if let Some(warning_message) = &tracker_response.warning_message {
            tracing::warn!("tracker warning: {}", warning_message);
        }

        let peer_count = match tracker_response.peers() {
            Ok(peers) => peers.len(),
            Err(e) => {
                tracing::warn!("couldn't decode tracker peer list: {}", e);
                return Err(e.into());
            }
        };

        tracing::info!("tracker returned {} peers, next announce in {}s", peer_count, tracker_response.interval);

        Ok(tracker_response)
    }
}
