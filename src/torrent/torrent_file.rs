use crate::utils::bencode::{BencodedValue, DictExt, FromBencode};

use super::{InfoHash, TorrentError, TorrentInfo};

/// A parsed `.torrent` descriptor. Read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFile {
    pub announce: String,
    pub announce_list: Option<Vec<Vec<String>>>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub creation_date: Option<i64>,
    pub info: TorrentInfo,
}

impl TorrentFile {
    pub fn from_bytes(torrent_file: &[u8]) -> Result<TorrentFile, TorrentError> {
        let torrent_file = TorrentFile::from_bencode_bytes(torrent_file)?;

        tracing::debug!(
            "parsed torrent '{}': {} pieces of {} bytes, {} bytes total",
            torrent_file.info.name(),
            torrent_file.info.pieces_count(),
            torrent_file.info.piece_length(),
            torrent_file.info.length()
        );

        Ok(torrent_file)
    }

    pub fn info_hash(&self) -> InfoHash {
        self.info.info_hash()
    }

    /// The announce URL followed by every `announce-list` entry not equal to it.
    pub fn trackers(&self) -> Vec<&str> {
        let mut trackers = vec![self.announce.as_str()];

        for tracker in self.announce_list.iter().flatten().flatten() {
            if !trackers.contains(&tracker.as_str()) {
                trackers.push(tracker);
            }
        }

        trackers
    }
}

impl FromBencode for TorrentFile {
    type Error = TorrentError;

    fn from_bencode(value: &BencodedValue) -> Result<Self, Self::Error> {
        let torrent_dict = value.try_into_dict()?;

        let announce = torrent_dict.required_string(b"announce")?;
        let comment = torrent_dict.optional_string(b"comment")?;
        let created_by = torrent_dict.optional_string(b"created by")?;
        let creation_date = torrent_dict.optional_integer(b"creation date")?;

        let announce_list = match torrent_dict.get(b"announce-list".as_slice()) {
            Some(_) => Some(parse_announce_list(torrent_dict.required_list(b"announce-list")?)?),
            None => None,
        };

        let info = match torrent_dict.get(b"info".as_slice()) {
            Some(info) => TorrentInfo::from_bencode(info)?,
            None => return Err(TorrentError::InvalidDescriptor("missing 'info' dictionary".to_string())),
        };

        Ok(TorrentFile {
            announce,
            announce_list,
            comment,
            created_by,
            creation_date,
            info,
        })
    }
}

fn parse_announce_list(tiers: &[BencodedValue]) -> Result<Vec<Vec<String>>, TorrentError> {
    tiers
        .iter()
        .map(|tier| -> Result<Vec<String>, TorrentError> {
            tier.try_into_list()?
                .iter()
                .map(|tracker| -> Result<String, TorrentError> {
                    let tracker = tracker.try_into_byte_string()?;
                    Ok(String::from_utf8_lossy(tracker).into_owned())
                })
                .collect()
        })
        .collect()
}
