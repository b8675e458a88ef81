//! Integer base58 codec over the Flickr alphabet.
//!
//! An id is encoded as a plain number: the minimal big-endian bytes go
//! through `bs58`, so there is no padding and no leading-zero marker. `0`
//! encodes as `"1"` and the full `u64` range fits in at most 11 characters.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Digit value to character. Excludes `0`, `O`, `I` and `l`.
pub const ALPHABET: &[u8; 58] = b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// Longest encoding of a `u64`.
pub const MAX_ENCODED_LEN: usize = 11;

const ID_BYTES: usize = std::mem::size_of::<u64>();

/// Encodes `id` most significant digit first.
pub fn encode(id: u64) -> String {
    let bytes = id.to_be_bytes();
    // bs58 emits one '1' per leading zero byte; strip them so only the number remains.
    match bytes.iter().position(|&b| b != 0) {
        Some(first) => bs58::encode(&bytes[first..])
            .with_alphabet(bs58::Alphabet::FLICKR)
            .into_string(),
        None => char::from(ALPHABET[0]).to_string(),
    }
}

/// Decodes a string produced by [`encode`].
///
/// Rejects empty input, characters outside [`ALPHABET`], and values that do
/// not fit in 64 bits. A valid encoding of zero (`"1"`) is never confused
/// with a failure.
pub fn decode(s: &str) -> Result<u64, DecodeError> {
    if s.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = bs58::decode(s)
        .with_alphabet(bs58::Alphabet::FLICKR)
        .into_vec()
        .map_err(|e| decode_error(s, e))?;

    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let digits = &bytes[first..];
    if digits.len() > ID_BYTES {
        return Err(DecodeError::Overflow);
    }

    let mut buf = [0_u8; ID_BYTES];
    buf[ID_BYTES - digits.len()..].copy_from_slice(digits);
    Ok(u64::from_be_bytes(buf))
}

fn decode_error(s: &str, err: bs58::decode::Error) -> DecodeError {
    match err {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            DecodeError::InvalidCharacter { character, index }
        }
        // `index` is a byte offset at the start of the offending character.
        bs58::decode::Error::NonAsciiCharacter { index } => DecodeError::InvalidCharacter {
            character: s
                .get(index..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            index,
        },
        other => DecodeError::Malformed(other.to_string()),
    }
}

/// An id paired with its base58 text form.
///
/// Serializes as the base58 string; deserialization validates the string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Base58Id(u64);

impl Base58Id {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn encode(&self) -> String {
        encode(self.0)
    }
}

impl From<u64> for Base58Id {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<Base58Id> for u64 {
    fn from(id: Base58Id) -> Self {
        id.0
    }
}

impl FromStr for Base58Id {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).map(Self)
    }
}

impl std::fmt::Debug for Base58Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Base58Id").field(&self.encode()).finish()
    }
}

impl Display for Base58Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for Base58Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Base58Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
