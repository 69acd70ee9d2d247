use thiserror::Error;

use crate::utils::bencode::BencodeError;

pub mod torrent_file;
pub use torrent_file::TorrentFile;

pub mod torrent_info;
pub use torrent_info::{FileEntry, InfoHash, TorrentInfo};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TorrentError {
    #[error(transparent)]
    Bencode(#[from] BencodeError),

    #[error("invalid torrent descriptor: {0}")]
    InvalidDescriptor(String),
}
