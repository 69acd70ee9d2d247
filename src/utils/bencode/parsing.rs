use super::{BencodedDict, BencodedValue, BencodeError};

mod parsing_utils;

pub fn decode(bytes: &[u8]) -> Result<BencodedValue, BencodeError> {
    parsing_utils::parse_to_bencoded_value(bytes)
}

pub fn encode(bencoded_value: &BencodedValue) -> Vec<u8> {
    parsing_utils::parse_from_bencoded_value(bencoded_value)
}

pub fn encode_dict(dict: &BencodedDict) -> Vec<u8> {
    let mut bencoded_string = Vec::new();
    parsing_utils::to_bencoded_dict(dict, &mut bencoded_string);
    bencoded_string
}
