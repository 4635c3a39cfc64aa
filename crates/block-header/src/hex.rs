use std::fmt;

use ethereum_types::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value reported by a JSON-RPC endpoint, either as a hex string or as a
/// native JSON integer.
///
/// Nodes report quantities as `"0x…"` strings, while tooling that re-serializes
/// blocks (fixture dumps, web3 libraries) often writes them as plain numbers.
/// The `0x` prefix is optional on the string form. Negative and fractional
/// numbers are rejected when deserializing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HexQuantity {
    Int(U256),
    Hex(String),
}

impl HexQuantity {
    pub fn from_hex(value: impl Into<String>) -> Self {
        HexQuantity::Hex(value.into())
    }

    pub fn from_int(value: impl Into<U256>) -> Self {
        HexQuantity::Int(value.into())
    }

    /// Canonical integer encoding: minimal big-endian bytes, with zero encoded
    /// as the empty byte string.
    pub fn canonicalize(&self) -> Result<Vec<u8>, hex::FromHexError> {
        match self {
            HexQuantity::Int(value) => int_to_minimal_bytes(value),
            HexQuantity::Hex(value) => decode_hex(value).map(trim_leading_zeros),
        }
    }

    /// Raw byte decoding, keeping leading zero bytes. Used for hashes,
    /// addresses and other fixed-width data.
    ///
    /// An integer has no width of its own and falls back to the minimal form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        match self {
            HexQuantity::Int(value) => int_to_minimal_bytes(value),
            HexQuantity::Hex(value) => decode_hex(value),
        }
    }
}

impl From<u64> for HexQuantity {
    fn from(value: u64) -> Self {
        HexQuantity::Int(U256::from(value))
    }
}

impl From<U256> for HexQuantity {
    fn from(value: U256) -> Self {
        HexQuantity::Int(value)
    }
}

impl From<&str> for HexQuantity {
    fn from(value: &str) -> Self {
        HexQuantity::Hex(value.to_string())
    }
}

/// Integers that fit in a JSON number are written as numbers, larger ones as
/// `0x` hex strings.
impl Serialize for HexQuantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HexQuantity::Int(value) if value.bits() <= 64 => {
                serializer.serialize_u64(value.low_u64())
            }
            HexQuantity::Int(value) => serializer.serialize_str(&format!("0x{:x}", value)),
            HexQuantity::Hex(value) => serializer.serialize_str(value),
        }
    }
}

struct HexQuantityVisitor;

impl<'de> Visitor<'de> for HexQuantityVisitor {
    type Value = HexQuantity;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a hex string or a non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(HexQuantity::from(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Self::Value, E> {
        Ok(HexQuantity::Int(U256::from(value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(HexQuantity::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Err(E::invalid_type(de::Unexpected::Float(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(HexQuantity::Hex(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(HexQuantity::Hex(value))
    }
}

impl<'de> Deserialize<'de> for HexQuantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(HexQuantityVisitor)
    }
}

/// Decodes a hex string with an optional `0x` prefix. An odd number of
/// digits is left-padded with a single zero nibble.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    }
}

/// Formats bytes as a `0x`-prefixed lower-case hex string.
pub fn to_0x_string(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn int_to_minimal_bytes(value: &U256) -> Result<Vec<u8>, hex::FromHexError> {
    decode_hex(&format!("{:x}", value)).map(trim_leading_zeros)
}

fn trim_leading_zeros(mut bytes: Vec<u8>) -> Vec<u8> {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes.drain(..first);
    bytes
}
