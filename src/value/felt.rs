use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A StarkNet field element: a 252-bit integer, serialized on the wire as a
/// fixed 32-byte big-endian buffer. Storage and API ids use its `0x`-prefixed
/// lowercase hex form with no leading-zero padding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldElement(BigUint);

impl FieldElement {
    pub fn zero() -> Self {
        FieldElement(BigUint::zero())
    }

    pub fn from_u64(n: u64) -> Self {
        FieldElement(BigUint::from(n))
    }

    /// Decode a fixed 32-byte big-endian buffer.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        FieldElement(BigUint::from_bytes_be(bytes))
    }

    /// Encode as a fixed 32-byte big-endian buffer (zero-padded on the left).
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let be = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        let start = 32 - be.len();
        out[start..].copy_from_slice(&be);
        out
    }

    /// `u256(lo, hi) = lo + (hi << 128)`, composing a 256-bit integer from
    /// two 128-bit limbs as returned by a StarkNet `Uint256` call result.
    pub fn from_u256_limbs(lo: u128, hi: u128) -> Self {
        let value = BigUint::from(lo) + (BigUint::from(hi) << 128u32);
        FieldElement(value)
    }

    /// Parse a `0x`-prefixed (or bare) hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let s = if s.is_empty() { "0" } else { s };
        BigUint::parse_bytes(s.as_bytes(), 16).map(FieldElement)
    }

    /// Canonical storage/API id: `0x`-prefixed lowercase hex, no leading
    /// zero padding (`0x0` for zero).
    pub fn as_hex(&self) -> String {
        if self.0.is_zero() {
            return "0x0".to_string();
        }
        format!("0x{}", self.0.to_str_radix(16))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Decode a Cairo short-string felt: interpret the minimal big-endian
    /// byte representation as ASCII, trimming trailing NUL bytes.
    pub fn decode_shortstring(&self) -> String {
        let bytes = self.0.to_bytes_be();
        let s: String = bytes.iter().map(|b| *b as char).collect();
        s.trim_end_matches('\0').to_string()
    }

    pub fn to_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl FromStr for FieldElement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldElement::from_hex(s).ok_or_else(|| format!("invalid field element hex: {s}"))
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FieldElement::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid field element hex: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let original = FieldElement::from_hex("0x1234abcd").unwrap();
        let bytes = original.to_be_bytes();
        let decoded = FieldElement::from_be_bytes(&bytes);
        assert_eq!(original, decoded);
    }

    #[test]
    fn hex_has_no_leading_zero_padding() {
        let felt = FieldElement::from_hex("0x00da114221cb83fa859dbdb4c44beeaa0bb37c7537ad5ae66fe5e0efd20e6eb3").unwrap();
        assert_eq!(felt.as_hex(), "0xda114221cb83fa859dbdb4c44beeaa0bb37c7537ad5ae66fe5e0efd20e6eb3");
    }

    #[test]
    fn zero_is_0x0() {
        assert_eq!(FieldElement::zero().as_hex(), "0x0");
    }

    #[test]
    fn composes_u256_from_limbs() {
        let lo = 10_u128;
        let hi = 0_u128;
        let felt = FieldElement::from_u256_limbs(lo, hi);
        assert_eq!(felt.as_hex(), "0xa");
    }

    #[test]
    fn decodes_short_string() {
        let bytes_ascii = b"USDC";
        let mut buf = [0u8; 32];
        buf[28..].copy_from_slice(bytes_ascii);
        let felt = FieldElement::from_be_bytes(&buf);
        assert_eq!(felt.decode_shortstring(), "USDC");
    }
}
