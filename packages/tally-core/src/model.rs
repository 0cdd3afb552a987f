//! # Core Data Model
//!
//! Identifier newtypes shared by the wallet, the chain clients, and the
//! session, plus the session's local view of a list.
//!
//! Both [`Address`] and [`ObjectId`] are opaque 32-byte values rendered as
//! `0x`-prefixed lowercase hex. They are validated on parse and never
//! interpreted locally — the chain is the only party that assigns meaning
//! to them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of hex characters in a rendered 32-byte identifier.
const ID_HEX_LEN: usize = 64;

fn is_canonical_hex(s: &str) -> bool {
    let Some(body) = s.strip_prefix("0x") else {
        return false;
    };
    body.len() == ID_HEX_LEN && body.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

// ============================================================================
// ADDRESS
// ============================================================================

/// An account address on the chain, derived from a wallet's public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse an address string, validating the `0x` + 64-hex-char form.
    pub fn parse(s: &str) -> Result<Self> {
        if is_canonical_hex(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidAddress(s.to_string()))
        }
    }

    /// Build an address from raw 32 bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// The full `0x...` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display: `0x1234..abcd`.
    pub fn short(&self) -> String {
        format!("{}..{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// OBJECT ID
// ============================================================================

/// Identifier of an object held by the chain. Assigned by the chain on
/// creation; opaque to this client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse an object id string, validating the `0x` + 64-hex-char form.
    pub fn parse(s: &str) -> Result<Self> {
        if is_canonical_hex(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidObjectId(s.to_string()))
        }
    }

    /// Build an object id from raw 32 bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// The full `0x...` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// TRANSACTION DIGEST
// ============================================================================

/// Digest returned by the chain for an executed transaction.
/// Only surfaced for display and logging; never dereferenced locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxDigest(pub String);

impl std::fmt::Display for TxDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// LIST SUMMARY
// ============================================================================

/// A list as the session's overview knows it: id, name, and the item count
/// observed at the last owned-objects read. The count is display metadata,
/// not authoritative state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    /// The list's object id on the chain.
    pub id: ObjectId,
    /// The list's immutable name.
    pub name: String,
    /// Item count at the last read.
    pub item_count: usize,
}

// ============================================================================
// TESTS
// ============================================================================
