use serde::{Serialize, Deserialize};
use thiserror::Error;

use std::collections::BTreeMap;

mod parsing;

pub type BencodedDict = BTreeMap<Vec<u8>, BencodedValue>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BencodeError {
    #[error("malformed bencode at offset {offset}: {reason}")]
    MalformedEncoding { offset: usize, reason: &'static str },

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("field '{field}' is not a bencoded {expected}")]
    TypeMismatch { field: String, expected: &'static str },
}

impl BencodeError {
    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        BencodeError::MalformedEncoding { offset, reason }
    }

    pub(crate) fn type_mismatch(field: &[u8], expected: &'static str) -> Self {
        BencodeError::TypeMismatch {
            field: String::from_utf8_lossy(field).into_owned(),
            expected,
        }
    }
}

/// Represents a value in the Bencode format.
///
/// Dictionaries are kept in a `BTreeMap` keyed by the raw key bytes, so
/// encoding always emits keys in lexicographic byte order no matter how the
/// source ordered them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BencodedValue {
    /// Represents a Bencoded byte string.
    ByteString(Vec<u8>),

    /// Represents a Bencoded integer.
    Integer(i64),

    /// Represents a Bencoded list of values.
    List(Vec<BencodedValue>),

    /// Represents a Bencoded dictionary (key-value pairs).
    Dict(BencodedDict),
}

impl BencodedValue {
    pub fn from_bytes(bytes: &[u8]) -> Result<BencodedValue, BencodeError> {
        parsing::decode(bytes)
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        parsing::encode(self)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BencodedValue::ByteString(_) => "byte string",
            BencodedValue::Integer(_) => "integer",
            BencodedValue::List(_) => "list",
            BencodedValue::Dict(_) => "dictionary",
        }
    }

    pub fn try_into_dict(&self) -> Result<&BencodedDict, BencodeError> {
        match self {
            BencodedValue::Dict(d) => Ok(d),
            _ => Err(BencodeError::type_mismatch(b"<value>", "dictionary"))
        }
    }

    pub fn try_into_integer(&self) -> Result<i64, BencodeError> {
        match self {
            BencodedValue::Integer(i) => Ok(*i),
            _ => Err(BencodeError::type_mismatch(b"<value>", "integer"))
        }
    }

    pub fn try_into_list(&self) -> Result<&Vec<BencodedValue>, BencodeError> {
        match self {
            BencodedValue::List(l) => Ok(l),
            _ => Err(BencodeError::type_mismatch(b"<value>", "list"))
        }
    }

    pub fn try_into_byte_string(&self) -> Result<&Vec<u8>, BencodeError> {
        match self {
            BencodedValue::ByteString(b) => Ok(b),
            _ => Err(BencodeError::type_mismatch(b"<value>", "byte string"))
        }
    }

    pub fn insert_into_dict(&mut self, key: Vec<u8>, value: BencodedValue) {
        if let BencodedValue::Dict(d) = self {
            d.insert(key, value);
        }
    }

    pub fn insert_into_list(&mut self, value: BencodedValue) {
        if let BencodedValue::List(l) = self {
            l.push(value);
        }
    }

    pub fn get_from_dict(&self, key: &[u8]) -> Result<&BencodedValue, BencodeError> {
        let dict = self.try_into_dict()?;

        dict.get(key).ok_or_else(|| BencodeError::MissingField(String::from_utf8_lossy(key).into_owned()))
    }

    pub fn get_from_list(&self, index: usize) -> Option<&BencodedValue> {
        self.try_into_list().ok()?.get(index)
    }
}

impl From<&[u8]> for BencodedValue {
    fn from(bytes: &[u8]) -> Self {
        BencodedValue::ByteString(bytes.to_vec())
    }
}

impl From<&str> for BencodedValue {
    fn from(s: &str) -> Self {
        BencodedValue::ByteString(s.as_bytes().to_vec())
    }
}

impl From<i64> for BencodedValue {
    fn from(i: i64) -> Self {
        BencodedValue::Integer(i)
    }
}

/// Typed projection of a decoded bencode value into a fixed-shape record.
///
/// Known keys are mapped to fields; unknown keys are ignored.
pub trait FromBencode: Sized {
    type Error: From<BencodeError>;

    fn from_bencode(value: &BencodedValue) -> Result<Self, Self::Error>;

    fn from_bencode_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        let value = BencodedValue::from_bytes(bytes)?;
        Self::from_bencode(&value)
    }
}

/// Field lookups over a decoded dictionary that report the offending key.
pub trait DictExt {
    fn required(&self, key: &[u8]) -> Result<&BencodedValue, BencodeError>;

    fn required_bytes(&self, key: &[u8]) -> Result<&[u8], BencodeError>;

    fn required_string(&self, key: &[u8]) -> Result<String, BencodeError>;

    fn required_integer(&self, key: &[u8]) -> Result<i64, BencodeError>;

    fn required_list(&self, key: &[u8]) -> Result<&[BencodedValue], BencodeError>;

    fn required_dict(&self, key: &[u8]) -> Result<&BencodedDict, BencodeError>;

    fn optional_string(&self, key: &[u8]) -> Result<Option<String>, BencodeError>;

    fn optional_integer(&self, key: &[u8]) -> Result<Option<i64>, BencodeError>;
}

impl DictExt for BencodedDict {
    fn required(&self, key: &[u8]) -> Result<&BencodedValue, BencodeError> {
        self.get(key).ok_or_else(|| BencodeError::MissingField(String::from_utf8_lossy(key).into_owned()))
    }

    fn required_bytes(&self, key: &[u8]) -> Result<&[u8], BencodeError> {
        match self.required(key)? {
            BencodedValue::ByteString(b) => Ok(b),
            _ => Err(BencodeError::type_mismatch(key, "byte string"))
        }
    }

    fn required_string(&self, key: &[u8]) -> Result<String, BencodeError> {
        let bytes = self.required_bytes(key)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn required_integer(&self, key: &[u8]) -> Result<i64, BencodeError> {
        match self.required(key)? {
            BencodedValue::Integer(i) => Ok(*i),
            _ => Err(BencodeError::type_mismatch(key, "integer"))
        }
    }

    fn required_list(&self, key: &[u8]) -> Result<&[BencodedValue], BencodeError> {
        match self.required(key)? {
            BencodedValue::List(l) => Ok(l),
            _ => Err(BencodeError::type_mismatch(key, "list"))
        }
    }

    fn required_dict(&self, key: &[u8]) -> Result<&BencodedDict, BencodeError> {
        match self.required(key)? {
            BencodedValue::Dict(d) => Ok(d),
            _ => Err(BencodeError::type_mismatch(key, "dictionary"))
        }
    }

    fn optional_string(&self, key: &[u8]) -> Result<Option<String>, BencodeError> {
        match self.get(key) {
            None => Ok(None),
            Some(_) => self.required_string(key).map(Some),
        }
    }

    fn optional_integer(&self, key: &[u8]) -> Result<Option<i64>, BencodeError> {
        match self.get(key) {
            None => Ok(None),
            Some(_) => self.required_integer(key).map(Some),
        }
    }
}

/// Decodes a single bencoded value spanning the whole input.
pub fn decode(bytes: &[u8]) -> Result<BencodedValue, BencodeError> {
    parsing::decode(bytes)
}

/// Encodes a value canonically (dictionary keys sorted by raw bytes).
pub fn encode(value: &BencodedValue) -> Vec<u8> {
    parsing::encode(value)
}

pub fn encode_dict(dict: &BencodedDict) -> Vec<u8> {
    parsing::encode_dict(dict)
}

#[cfg(test)]
mod bencoded_value_tests {
    use super::*;

    fn dict_with(key: &str, value: BencodedValue) -> BencodedDict {
        let mut dict = BTreeMap::new();
        dict.insert(key.as_bytes().to_vec(), value);
        dict
    }

    #[test]
    fn test_get_from_dict() {
        let bencoded_dict = BencodedValue::Dict(dict_with("key", BencodedValue::Integer(1)));

        assert_eq!(&BencodedValue::Integer(1), bencoded_dict.get_from_dict(b"key").unwrap());
    }

    #[test]
    fn test_get_from_dict_invalid_key() {
        let bencoded_dict = BencodedValue::Dict(dict_with("key", BencodedValue::Integer(1)));

        assert_eq!(
            bencoded_dict.get_from_dict(b"da"),
            Err(BencodeError::MissingField("da".to_string()))
        );
    }

    #[test]
    fn test_get_from_dict_non_dict() {
        let bencoded_value = BencodedValue::Integer(1);

        assert!(matches!(bencoded_value.get_from_dict(b"key"), Err(BencodeError::TypeMismatch { .. })));
    }

    #[test]
    fn test_insert_into_dict_and_list() {
        let mut bencoded_dict = BencodedValue::Dict(BTreeMap::new());
        bencoded_dict.insert_into_dict(b"key".to_vec(), BencodedValue::Integer(1));
        assert_eq!(&BencodedValue::Integer(1), bencoded_dict.get_from_dict(b"key").unwrap());

        let mut bencoded_list = BencodedValue::List(Vec::new());
        bencoded_list.insert_into_list(BencodedValue::from("spam"));
        assert_eq!(Some(&BencodedValue::from("spam")), bencoded_list.get_from_list(0));
        assert_eq!(None, bencoded_list.get_from_list(1));
    }

    #[test]
    fn test_required_fields_report_key() {
        let dict = dict_with("interval", BencodedValue::from("soon"));

        assert_eq!(
            dict.required_integer(b"interval"),
            Err(BencodeError::TypeMismatch { field: "interval".to_string(), expected: "integer" })
        );
        assert_eq!(dict.required_bytes(b"peers"), Err(BencodeError::MissingField("peers".to_string())));
        assert_eq!(dict.optional_integer(b"complete"), Ok(None));
        assert_eq!(dict.optional_string(b"interval"), Ok(Some("soon".to_string())));
    }
}
