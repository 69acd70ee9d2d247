use std::collections::BTreeMap;

use serde::Serialize;

use crate::utils::bencode::{self, BencodedDict, BencodedValue, BencodeError, DictExt, FromBencode};
use crate::utils::sha1hash::{sha1_hash, Sha1Hash};

use super::TorrentError;

pub type InfoHash = Sha1Hash;

const PIECE_HASH_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub length: u64,
    pub path: Vec<String>,
}

/// Typed view over the `info` dictionary of a torrent descriptor.
///
/// The decoded dictionary is kept alongside the typed fields so the info hash
/// covers every key the file carried, not only the ones projected here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentInfo {
    pieces: Vec<Sha1Hash>,
    piece_length: u64,
    name: String,
    length: u64,
    files: Option<Vec<FileEntry>>,

    bencoded_dict: BencodedDict,
}

impl TorrentInfo {
    /// Builds a single-file info dictionary from its four fields.
    ///
    /// Sizes must fit a bencode integer, otherwise the hash would cover a
    /// different value than the one stored.
    pub fn new(pieces: Vec<Sha1Hash>, piece_length: u64, name: impl Into<String>, length: u64) -> Result<TorrentInfo, TorrentError> {
        let name = name.into();

        if piece_length == 0 {
            return Err(invalid("'piece length' must be positive, got 0".to_string()));
        }

        let mut bencoded_dict = BTreeMap::new();
        bencoded_dict.insert(b"pieces".to_vec(), BencodedValue::ByteString(concat_piece_hashes(&pieces)));
        bencoded_dict.insert(b"piece length".to_vec(), BencodedValue::Integer(to_bencode_integer(piece_length, "piece length")?));
        bencoded_dict.insert(b"name".to_vec(), BencodedValue::ByteString(name.as_bytes().to_vec()));
        bencoded_dict.insert(b"length".to_vec(), BencodedValue::Integer(to_bencode_integer(length, "length")?));

        Ok(TorrentInfo {
            pieces,
            piece_length,
            name,
            length,
            files: None,
            bencoded_dict,
        })
    }

    /// SHA-1 over the canonical (sorted-key) encoding of the info dictionary.
    pub fn info_hash(&self) -> InfoHash {
        sha1_hash(&bencode::encode_dict(&self.bencoded_dict))
    }

    pub fn to_bencoded_value(&self) -> BencodedValue {
        BencodedValue::Dict(self.bencoded_dict.clone())
    }

    pub fn pieces(&self) -> &[Sha1Hash] {
        &self.pieces
    }

    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total content size in bytes, summed over `files` for multi-file torrents.
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn files(&self) -> Option<&[FileEntry]> {
        self.files.as_deref()
    }

    pub fn pieces_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece_hash(&self, piece_index: usize) -> Option<&Sha1Hash> {
        self.pieces.get(piece_index)
    }

    /// Size of the piece at `piece_index`; the last piece may be shorter.
    pub fn piece_size(&self, piece_index: usize) -> Option<u64> {
        if piece_index >= self.pieces_count() {
            return None;
        }

        if piece_index + 1 < self.pieces_count() {
            return Some(self.piece_length);
        }

        let size = self.length % self.piece_length;
        if size == 0 { Some(self.piece_length) } else { Some(size) }
    }
}

impl FromBencode for TorrentInfo {
    type Error = TorrentError;

    fn from_bencode(value: &BencodedValue) -> Result<Self, Self::Error> {
        let info = match value {
            BencodedValue::Dict(info) => info,
            _ => return Err(invalid(format!("'info' is a {}, expected a dictionary", value.kind()))),
        };

        let pieces = info.required_bytes(b"pieces").map_err(invalid_info)?;
        if pieces.len() % PIECE_HASH_LENGTH != 0 {
            return Err(invalid(format!("'pieces' length {} is not a multiple of {}", pieces.len(), PIECE_HASH_LENGTH)));
        }

        let pieces = pieces
            .chunks_exact(PIECE_HASH_LENGTH)
            .map(|chunk| {
                let mut sha1_chunk = [0u8; PIECE_HASH_LENGTH];
                sha1_chunk.copy_from_slice(chunk);

                Sha1Hash(sha1_chunk)
            })
            .collect::<Vec<Sha1Hash>>();

        let piece_length = info.required_integer(b"piece length").map_err(invalid_info)?;
        let piece_length = u64::try_from(piece_length)
            .ok()
            .filter(|&piece_length| piece_length > 0)
            .ok_or_else(|| invalid(format!("'piece length' must be positive, got {piece_length}")))?;

        let name = info.required_string(b"name").map_err(invalid_info)?;

        let (length, files) = match (info.contains_key(b"length".as_slice()), info.contains_key(b"files".as_slice())) {
            (true, false) => {
                let length = non_negative(info.required_integer(b"length").map_err(invalid_info)?, "length")?;
                (length, None)
            }
            (false, true) => {
                let files = parse_files(info.required_list(b"files").map_err(invalid_info)?)?;
                let length = files.iter().map(|file| file.length).sum();
                (length, Some(files))
            }
            (true, true) => return Err(invalid("both 'length' and 'files' are present".to_string())),
            (false, false) => return Err(invalid_info(BencodeError::MissingField("length".to_string()))),
        };

        Ok(TorrentInfo {
            pieces,
            piece_length,
            name,
            length,
            files,
            bencoded_dict: info.clone(),
        })
    }
}

fn parse_files(files: &[BencodedValue]) -> Result<Vec<FileEntry>, TorrentError> {
    files
        .iter()
        .map(|file| -> Result<FileEntry, TorrentError> {
            let file = file.try_into_dict().map_err(|_| invalid("'files' entry is not a dictionary".to_string()))?;

            let length = non_negative(file.required_integer(b"length").map_err(invalid_info)?, "files.length")?;
            let path = file
                .required_list(b"path")
                .map_err(invalid_info)?
                .iter()
                .map(|component| {
                    component
                        .try_into_byte_string()
                        .map(|component| String::from_utf8_lossy(component).into_owned())
                        .map_err(|_| invalid("'files.path' component is not a byte string".to_string()))
                })
                .collect::<Result<Vec<String>, TorrentError>>()?;

            Ok(FileEntry { length, path })
        })
        .collect()
}

fn concat_piece_hashes(pieces: &[Sha1Hash]) -> Vec<u8> {
    pieces
        .iter()
        .flat_map(|sha1hash| sha1hash.0)
        .collect()
}

fn non_negative(value: i64, field: &str) -> Result<u64, TorrentError> {
    u64::try_from(value).map_err(|_| invalid(format!("'{field}' must not be negative, got {value}")))
}

fn to_bencode_integer(value: u64, field: &str) -> Result<i64, TorrentError> {
    i64::try_from(value).map_err(|_| invalid(format!("'{field}' {value} does not fit a bencode integer")))
}

fn invalid(reason: String) -> TorrentError {
    TorrentError::InvalidDescriptor(reason)
}

fn invalid_info(error: BencodeError) -> TorrentError {
    TorrentError::InvalidDescriptor(format!("info: {error}"))
}
