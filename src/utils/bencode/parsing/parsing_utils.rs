use std::collections::BTreeMap;

use super::super::{BencodedDict, BencodedValue, BencodeError};

// deeper nesting than this is rejected instead of recursing further
const MAX_NESTING_DEPTH: usize = 512;

pub fn parse_from_bencoded_value(bencoded_value: &BencodedValue) -> Vec<u8> {
    let mut bencoded_string = Vec::new();
    append_bencoded_value(bencoded_value, &mut bencoded_string);
    bencoded_string
}

pub fn parse_to_bencoded_value(input: &[u8]) -> Result<BencodedValue, BencodeError> {
    let mut cur_index = 0;
    let value = create_value(input, &mut cur_index, 0)?;

    if cur_index != input.len() {
        return Err(BencodeError::malformed(cur_index, "trailing data after value"));
    }

    Ok(value)
}

fn append_bencoded_value(value: &BencodedValue, bencoded_string: &mut Vec<u8>) {
    match value {
        BencodedValue::Dict(dict) => to_bencoded_dict(dict, bencoded_string),
        BencodedValue::List(list) => to_bencoded_list(list, bencoded_string),
        BencodedValue::Integer(integer) => {
            bencoded_string.push(b'i');
            bencoded_string.extend_from_slice(integer.to_string().as_bytes());
            bencoded_string.push(b'e');
        }
        BencodedValue::ByteString(bytes) => append_byte_string(bytes, bencoded_string),
    }
}

fn append_byte_string(bytes: &[u8], bencoded_string: &mut Vec<u8>) {
    // <len>:<bytes>
    bencoded_string.extend_from_slice(bytes.len().to_string().as_bytes());
    bencoded_string.push(b':');
    bencoded_string.extend_from_slice(bytes);
}

/// Emits the dictionary with keys in ascending raw byte order.
pub fn to_bencoded_dict(dict: &BencodedDict, bencoded_string: &mut Vec<u8>) {
    bencoded_string.push(b'd');

    // BTreeMap<Vec<u8>, _> iterates in lexicographic byte order
    for (key, value) in dict {
        append_byte_string(key, bencoded_string);
        append_bencoded_value(value, bencoded_string);
    }

    bencoded_string.push(b'e');
}

pub fn to_bencoded_list(list: &[BencodedValue], bencoded_string: &mut Vec<u8>) {
    bencoded_string.push(b'l');

    for value in list {
        append_bencoded_value(value, bencoded_string);
    }

    bencoded_string.push(b'e');
}

/// Parses the ASCII decimal digits of an integer token or a length prefix.
pub fn parse_integer(input: &[u8]) -> Result<i64, &'static str> {
    if input.is_empty() {
        return Err("invalid integer: empty input");
    }

    let (negative, digits) = match input.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, input),
    };

    if digits.is_empty() {
        return Err("invalid integer: parsing an empty number");
    }

    if !digits.iter().all(u8::is_ascii_digit) {
        return Err("invalid integer: parsing a non-number");
    }

    if digits[0] == b'0' && digits.len() > 1 {
        return Err("invalid integer: leading zeros");
    }

    if negative && digits == b"0" {
        return Err("invalid integer: negative zero");
    }

    let mut number: i64 = 0;
    for digit in digits {
        let digit = i64::from(digit - b'0');
        number = number
            .checked_mul(10)
            .and_then(|n| if negative { n.checked_sub(digit) } else { n.checked_add(digit) })
            .ok_or("invalid integer: out of range")?;
    }

    Ok(number)
}

pub fn create_value(input: &[u8], cur_index: &mut usize, depth: usize) -> Result<BencodedValue, BencodeError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(BencodeError::malformed(*cur_index, "nesting too deep"));
    }

    match input.get(*cur_index) {
        None => Err(BencodeError::malformed(*cur_index, "unexpected end of input")),
        Some(b'd') => create_dict(input, cur_index, depth),
        Some(b'l') => create_list(input, cur_index, depth),
        Some(b'i') => create_int(input, cur_index),
        Some(b'0'..=b'9') => create_byte_string(input, cur_index),
        Some(b'-') => Err(BencodeError::malformed(*cur_index, "negative byte string length")),
        Some(_) => Err(BencodeError::malformed(*cur_index, "unexpected token")),
    }
}

pub fn create_dict(input: &[u8], cur_index: &mut usize, depth: usize) -> Result<BencodedValue, BencodeError> {
    if input.get(*cur_index) != Some(&b'd') {
        return Err(BencodeError::malformed(*cur_index, "missing 'd' prefix"));
    }
    *cur_index += 1;

    let mut dict = BTreeMap::new();
    loop {
        match input.get(*cur_index) {
            None => return Err(BencodeError::malformed(*cur_index, "unterminated dictionary")),
            Some(b'e') => break,
            Some(b'0'..=b'9') => {
                let key_index = *cur_index;
                let key = parse_byte_string(input, cur_index)?;

                let value = create_value(input, cur_index, depth + 1)?;

                if dict.insert(key, value).is_some() {
                    return Err(BencodeError::malformed(key_index, "duplicate dictionary key"));
                }
            }
            Some(_) => return Err(BencodeError::malformed(*cur_index, "dictionary key is not a byte string")),
        }
    }
    *cur_index += 1;

    Ok(BencodedValue::Dict(dict))
}

pub fn create_list(input: &[u8], cur_index: &mut usize, depth: usize) -> Result<BencodedValue, BencodeError> {
    if input.get(*cur_index) != Some(&b'l') {
        return Err(BencodeError::malformed(*cur_index, "missing 'l' prefix"));
    }
    *cur_index += 1;

    let mut list = Vec::new();
    loop {
        match input.get(*cur_index) {
            None => return Err(BencodeError::malformed(*cur_index, "unterminated list")),
            Some(b'e') => break,
            Some(_) => list.push(create_value(input, cur_index, depth + 1)?),
        }
    }
    *cur_index += 1;

    Ok(BencodedValue::List(list))
}

pub fn create_int(input: &[u8], cur_index: &mut usize) -> Result<BencodedValue, BencodeError> {
    if input.get(*cur_index) != Some(&b'i') {
        return Err(BencodeError::malformed(*cur_index, "missing 'i' prefix"));
    }

    let start = *cur_index + 1;
    let end = input[start..]
        .iter()
        .position(|&byte| byte == b'e')
        .map(|len| start + len)
        .ok_or_else(|| BencodeError::malformed(input.len(), "missing 'e' suffix"))?;

    let number = parse_integer(&input[start..end]).map_err(|reason| BencodeError::malformed(start, reason))?;
    *cur_index = end + 1;

    Ok(BencodedValue::Integer(number))
}

pub fn create_byte_string(input: &[u8], cur_index: &mut usize) -> Result<BencodedValue, BencodeError> {
    parse_byte_string(input, cur_index).map(BencodedValue::ByteString)
}

fn parse_byte_string(input: &[u8], cur_index: &mut usize) -> Result<Vec<u8>, BencodeError> {
    let start = *cur_index;
    let colon = input[start..]
        .iter()
        .position(|&byte| byte == b':')
        .map(|len| start + len)
        .ok_or_else(|| BencodeError::malformed(input.len(), "missing ':' after byte string length"))?;

    let length = parse_integer(&input[start..colon]).map_err(|reason| BencodeError::malformed(start, reason))?;
    let length = usize::try_from(length).map_err(|_| BencodeError::malformed(start, "negative byte string length"))?;

    let word_start = colon + 1;
    let word_end = word_start
        .checked_add(length)
        .filter(|&end| end <= input.len())
        .ok_or_else(|| BencodeError::malformed(input.len(), "truncated byte string"))?;

    *cur_index = word_end;

    Ok(input[word_start..word_end].to_vec())
}
