use anyhow::{Context, Result};
use percent_encoding::percent_encode;

pub mod bencode;
pub mod sha1hash;

/// Byte-level percent-encoding for query parameters carrying raw binary.
pub trait UrlEncodable {
    fn as_url_encoded(&self) -> String;
}

impl UrlEncodable for [u8] {
    fn as_url_encoded(&self) -> String {
        percent_encode(self, percent_encoding::NON_ALPHANUMERIC).to_string()
    }
}

impl UrlEncodable for [u8; 20] {
    fn as_url_encoded(&self) -> String {
        self.as_slice().as_url_encoded()
    }
}

impl UrlEncodable for str {
    fn as_url_encoded(&self) -> String {
        self.as_bytes().as_url_encoded()
    }
}

pub fn read_file_as_bytes(path: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("couldn't read file '{path}'"))
}
