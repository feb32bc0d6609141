//! ABI-style structured encoding of ordered field lists.
//!
//! Standard head/tail layout: one 32-byte head word per field, with dynamic
//! fields (string, bytes) storing an offset into a shared tail region that
//! holds a length word followed by zero-padded data.
//!
//! Decoding is strict. Non-zero padding, out-of-range offsets, and truncated
//! tails are decoding errors, never silently tolerated.

use alloy_primitives::{Address, B256, U256};

use crate::error::{CodecError, Result};
use crate::value::{FieldType, Value};

const WORD: usize = 32;

/// Encode an ordered list of typed values.
///
/// Values must already be checked against their declared types; an
/// out-of-range value is an encoding error here.
pub fn encode(fields: &[(FieldType, Value)]) -> Result<Vec<u8>> {
    let head_len = fields.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for (ty, value) in fields {
        if !value.matches(ty) {
            return Err(CodecError::Encoding(format!(
                "value of type {} cannot encode as {}",
                value.type_name(),
                ty
            )));
        }
        match value {
            Value::Uint(v) => head.extend_from_slice(&v.to_be_bytes::<WORD>()),
            Value::Bool(b) => {
                let mut word = [0u8; WORD];
                word[WORD - 1] = u8::from(*b);
                head.extend_from_slice(&word);
            }
            Value::Address(a) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(a.as_slice());
                head.extend_from_slice(&word);
            }
            Value::Bytes32(b) => head.extend_from_slice(b.as_slice()),
            Value::String(s) => {
                push_offset_word(&mut head, head_len + tail.len())?;
                push_tail(&mut tail, s.as_bytes());
            }
            Value::Bytes(b) => {
                push_offset_word(&mut head, head_len + tail.len())?;
                push_tail(&mut tail, b);
            }
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

/// Decode bytes back into the ordered value list declared by `types`.
pub fn decode(types: &[FieldType], data: &[u8]) -> Result<Vec<Value>> {
    let head_len = types.len() * WORD;
    if data.len() < head_len {
        return Err(CodecError::Decoding(format!(
            "data too short: {} bytes for {} fields",
            data.len(),
            types.len()
        )));
    }

    let mut values = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        let word = &data[i * WORD..(i + 1) * WORD];
        let value = match ty {
            FieldType::Uint(bits) => {
                let zero_bytes = (256 - bits) / 8;
                if word[..zero_bytes].iter().any(|b| *b != 0) {
                    return Err(CodecError::Decoding(format!(
                        "value out of range for uint{bits}"
                    )));
                }
                Value::Uint(U256::from_be_slice(word))
            }
            FieldType::Bool => {
                if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
                    return Err(CodecError::Decoding("invalid bool word".to_string()));
                }
                Value::Bool(word[WORD - 1] == 1)
            }
            FieldType::Address => {
                if word[..12].iter().any(|b| *b != 0) {
                    return Err(CodecError::Decoding(
                        "non-zero padding in address word".to_string(),
                    ));
                }
                Value::Address(Address::from_slice(&word[12..]))
            }
            FieldType::Bytes32 => Value::Bytes32(B256::from_slice(word)),
            FieldType::String => {
                let bytes = read_tail(data, word)?;
                let s = String::from_utf8(bytes)
                    .map_err(|_| CodecError::Decoding("string is not valid UTF-8".to_string()))?;
                Value::String(s)
            }
            FieldType::Bytes => Value::Bytes(read_tail(data, word)?),
        };
        values.push(value);
    }
    Ok(values)
}

fn push_offset_word(head: &mut Vec<u8>, offset: usize) -> Result<()> {
    head.extend_from_slice(&U256::from(offset).to_be_bytes::<WORD>());
    Ok(())
}

fn push_tail(tail: &mut Vec<u8>, data: &[u8]) {
    tail.extend_from_slice(&U256::from(data.len()).to_be_bytes::<WORD>());
    tail.extend_from_slice(data);
    let rem = data.len() % WORD;
    if rem != 0 {
        tail.extend(std::iter::repeat(0u8).take(WORD - rem));
    }
}

fn read_tail(data: &[u8], offset_word: &[u8]) -> Result<Vec<u8>> {
    let offset = word_to_usize(offset_word, "offset")?;
    if offset % WORD != 0 {
        return Err(CodecError::Decoding(format!(
            "tail offset {offset} is not word-aligned"
        )));
    }
    let len_end = offset
        .checked_add(WORD)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| CodecError::Decoding(format!("tail offset {offset} out of range")))?;
    let len = word_to_usize(&data[offset..len_end], "length")?;

    let data_end = len_end
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| CodecError::Decoding(format!("tail length {len} out of range")))?;
    let bytes = data[len_end..data_end].to_vec();

    // Padding after the tail data must be zero up to the next word boundary.
    let rem = len % WORD;
    if rem != 0 {
        let pad_end = data_end + (WORD - rem);
        if pad_end > data.len() || data[data_end..pad_end].iter().any(|b| *b != 0) {
            return Err(CodecError::Decoding("non-zero tail padding".to_string()));
        }
    }
    Ok(bytes)
}

fn word_to_usize(word: &[u8], what: &str) -> Result<usize> {
    let value = U256::from_be_slice(word);
    usize::try_from(value)
        .map_err(|_| CodecError::Decoding(format!("{what} word does not fit in usize")))
}
