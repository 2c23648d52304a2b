// crates/neon-core/src/address.rs
//
// Account identity for the NEON economy.
//
// An address is a 20-byte account identifier rendered as 0x-prefixed lowercase
// hex. The zero address doubles as the "unset" marker for configurable
// collaborators (reward pool, staking asset, dev fee receiver).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::NeonError;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The zero address. Used as "not configured".
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Derive a deterministic address from a human-readable label.
    ///
    /// The address is the first 20 bytes of `sha256(label)`. The daemon uses
    /// this for named genesis accounts ("presale", "vault", ...) so that a
    /// config file can refer to them without hardcoding hex.
    pub fn derive(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(bytes)
    }

    /// Build an address whose bytes are all `byte`. Handy in tests.
    pub const fn repeat(byte: u8) -> Self {
        Self([byte; ADDRESS_LEN])
    }

    /// Whether this is the zero (unset) address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Lowercase hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = NeonError;

    /// Parse `0x`-prefixed (or bare) 40-character hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits)
            .map_err(|e| NeonError::InvalidAddress(format!("{}: {}", s, e)))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(NeonError::InvalidAddress(format!(
                "{}: expected {} bytes, got {}",
                s,
                ADDRESS_LEN,
                bytes.len()
            )));
        }
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}
