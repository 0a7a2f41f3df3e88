//! Shared value objects used by search criteria and listener events.
//!
//! These are deliberately thin: address/key encoding rules and transaction
//! body decoding belong to the signing codec, not to the data-access core.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An account address in its plain (base32) textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(plain: impl Into<String>) -> Self {
        Self(plain.into())
    }

    /// The plain textual form, as used in channel topics and query params.
    pub fn plain(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 32-byte public key in hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(String);

impl PublicKey {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire code of a transaction kind, used as a search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionType(pub u16);

impl TransactionType {
    pub const TRANSFER: Self = Self(0x4154);
    pub const NAMESPACE_REGISTRATION: Self = Self(0x414E);
    pub const MOSAIC_DEFINITION: Self = Self(0x414D);
    pub const MOSAIC_SUPPLY_CHANGE: Self = Self(0x424D);
    pub const AGGREGATE_COMPLETE: Self = Self(0x4141);
    pub const AGGREGATE_BONDED: Self = Self(0x4241);
    pub const HASH_LOCK: Self = Self(0x4148);
}

/// Confirmation stage a transaction search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionGroup {
    Unconfirmed,
    Confirmed,
    Partial,
}

impl TransactionGroup {
    /// The REST path fragment selecting this group.
    pub fn as_path(self) -> &'static str {
        match self {
            Self::Unconfirmed => "unconfirmed",
            Self::Confirmed => "confirmed",
            Self::Partial => "partial",
        }
    }
}
