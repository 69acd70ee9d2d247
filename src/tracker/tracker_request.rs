use reqwest::Url;

use crate::peer::PeerId;
use crate::torrent::TorrentFile;
use crate::utils::sha1hash::Sha1Hash;
use crate::utils::UrlEncodable;

use super::{TrackerError, TrackerEvent};

/// Per-session identity and progress reported to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub peer_id: PeerId,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub event: TrackerEvent,
    pub numwant: Option<u32>,
    pub tracker_id: Option<String>,
}

impl SessionParams {
    pub fn new(peer_id: PeerId, port: u16) -> SessionParams {
        SessionParams {
            peer_id,
            port,
            uploaded: 0,
            downloaded: 0,
            event: TrackerEvent::None,
            numwant: None,
            tracker_id: None,
        }
    }

    pub fn with_event(mut self, event: TrackerEvent) -> SessionParams {
        self.event = event;
        self
    }

    pub fn with_numwant(mut self, numwant: Option<u32>) -> SessionParams {
        self.numwant = numwant;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TrackerRequest {
    announce: Url,
    info_hash: Sha1Hash,
    peer_id: PeerId,
    port: u16,
    uploaded: u64,
    downloaded: u64,
    left: u64,
    compact: u8,
    event: TrackerEvent,
    numwant: Option<u32>,
    tracker_id: Option<String>,
}

impl TrackerRequest {
    pub fn new(torrent_file: &TorrentFile, session: &SessionParams) -> Result<TrackerRequest, TrackerError> {
        let announce = parse_announce_url(&torrent_file.announce)?;

        Ok(TrackerRequest {
            announce,
            info_hash: torrent_file.info_hash(),
            peer_id: session.peer_id,
            port: session.port,
            uploaded: session.uploaded,
            downloaded: session.downloaded,
            left: torrent_file.info.length().saturating_sub(session.downloaded),
            compact: 1,
            event: session.event,
            numwant: session.numwant,
            tracker_id: session.tracker_id.clone(),
        })
    }

    pub fn info_hash(&self) -> &Sha1Hash {
        &self.info_hash
    }

    /// The announce URL with the request appended to any query it already had.
    pub fn as_url(&self) -> Url {
        let mut params = format!{
            "info_hash={info_hash}\
            &peer_id={peer_id}\
            &port={port}\
            &uploaded={uploaded}\
            &downloaded={downloaded}\
            &left={left}\
            &compact={compact}",
            info_hash = self.info_hash.as_url_encoded(),
            peer_id = self.peer_id.as_url_encoded(),
            port = self.port,
            uploaded = self.uploaded,
            downloaded = self.downloaded,
            left = self.left,
            compact = self.compact,
        };

        if self.event != TrackerEvent::None {
            params.push_str(&format!("&event={}", self.event.as_url_encoded()));
        }

        if let Some(numwant) = self.numwant {
            params.push_str(&format!("&numwant={}", numwant));
        }

        if let Some(tracker_id) = &self.tracker_id {
            params.push_str(&format!("&trackerid={}", tracker_id.as_str().as_url_encoded()));
        }

        let mut url = self.announce.clone();
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{params}"),
            _ => params,
        };
        url.set_query(Some(&query));

        url
    }
}

fn parse_announce_url(announce: &str) -> Result<Url, TrackerError> {
    let url = Url::parse(announce).map_err(|e| TrackerError::InvalidAnnounceUrl {
        url: announce.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(TrackerError::InvalidAnnounceUrl {
            url: announce.to_string(),
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}
