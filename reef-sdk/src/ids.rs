//! # Deterministic Identifier Derivation
//!
//! Mosaics and namespaces are addressed network-wide by 64-bit identifiers
//! that every client derives locally: two independent clients hashing the
//! same inputs must always arrive at the same id, because the network
//! validates them on submission.
//!
//! The two identifier spaces share the same 64 bits and are told apart by
//! bit 63 alone: cleared for mosaics, set for namespaces. Everything that
//! mixes the two spaces (metadata target ids, unresolved recipients) relies
//! on that single bit, see [`UnresolvedId`].
//!
//! The byte order in the hashed material is a wire-format requirement, not a
//! style choice: the mosaic nonce and the parent namespace id both enter the
//! digest little-endian, and the first eight digest bytes are read back
//! little-endian. Any deviation produces ids the network rejects.

use lazy_static::lazy_static;
use regex::Regex;
use sha3::{Digest, Sha3_256};

use crate::error::IdentifierError;

/// Bit 63, set on namespace ids and cleared on mosaic ids.
const NAMESPACE_FLAG: u64 = 1 << 63;

/// Namespace trees are capped at three levels (`root.child.grandchild`).
const MAX_NAMESPACE_DEPTH: usize = 3;

lazy_static! {
    static ref NAME_PATTERN: Regex =
        Regex::new("^[a-z0-9][a-z0-9_-]*$").expect("name pattern is valid");
}

/// Reads the first eight digest bytes as a little-endian u64.
fn digest_prefix_u64(digest: &[u8]) -> u64 {
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(prefix)
}

/// The caller-chosen 32-bit nonce that makes mosaic ids unique per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MosaicNonce(pub u32);

impl MosaicNonce {
    /// The nonce as it enters the digest.
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

/// Identifier of a mosaic. Bit 63 is always cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MosaicId(u64);

impl MosaicId {
    /// Wraps a raw id, e.g. one received from the REST API. The namespace
    /// flag is cleared to keep the invariant; use [`UnresolvedId::from_raw`]
    /// when the space of a raw value is not known up front.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw & !NAMESPACE_FLAG)
    }

    /// Derives the id a mosaic definition with this `nonce` and owner will
    /// receive: SHA3-256 over the little-endian nonce followed by the owner
    /// bytes, first eight digest bytes little-endian, bit 63 cleared.
    pub fn from_nonce_and_owner(nonce: MosaicNonce, owner: &[u8]) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(nonce.to_le_bytes());
        hasher.update(owner);
        let digest = hasher.finalize();
        Self(digest_prefix_u64(&digest) & !NAMESPACE_FLAG)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// 16 uppercase hex characters, the canonical rendering.
    pub fn to_hex(self) -> String {
        format!("{:016X}", self.0)
    }
}

/// Identifier of a namespace level. Bit 63 is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u64);

impl NamespaceId {
    /// Wraps a raw id, forcing the namespace flag on.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw | NAMESPACE_FLAG)
    }

    /// Derives the id of `name` registered under `parent` (`None` for a
    /// root namespace). The name is validated before anything is hashed.
    pub fn from_name(
        name: &str,
        parent: Option<NamespaceId>,
    ) -> Result<Self, IdentifierError> {
        if !NAME_PATTERN.is_match(name) {
            return Err(IdentifierError::InvalidName {
                name: name.to_owned(),
            });
        }
        let parent_raw = parent.map_or(0, |p| p.0);
        let mut hasher = Sha3_256::new();
        hasher.update(parent_raw.to_le_bytes());
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();
        Ok(Self(digest_prefix_u64(&digest) | NAMESPACE_FLAG))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn to_hex(self) -> String {
        format!("{:016X}", self.0)
    }
}

/// Resolves a dotted namespace path (`"corp.token.gold"`) into the ids of
/// every level, root first. The last element is the id of the full path.
pub fn namespace_path(path: &str) -> Result<Vec<NamespaceId>, IdentifierError> {
    if path.is_empty() {
        return Err(IdentifierError::InvalidName {
            name: path.to_owned(),
        });
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() > MAX_NAMESPACE_DEPTH {
        return Err(IdentifierError::TooManySegments {
            path: path.to_owned(),
            count: segments.len(),
        });
    }

    let mut ids = Vec::with_capacity(segments.len());
    let mut parent = None;
    for segment in segments {
        let id = NamespaceId::from_name(segment, parent)?;
        ids.push(id);
        parent = Some(id);
    }
    Ok(ids)
}

/// An identifier whose space is only known from bit 63, as found wherever
/// the API mixes the two spaces (metadata targets, unresolved recipients).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnresolvedId {
    Mosaic(MosaicId),
    Namespace(NamespaceId),
}

impl UnresolvedId {
    pub const fn from_raw(raw: u64) -> Self {
        if raw & NAMESPACE_FLAG != 0 {
            Self::Namespace(NamespaceId::from_raw(raw))
        } else {
            Self::Mosaic(MosaicId::from_raw(raw))
        }
    }

    pub const fn raw(self) -> u64 {
        match self {
            Self::Mosaic(id) => id.raw(),
            Self::Namespace(id) => id.raw(),
        }
    }

    pub fn to_hex(self) -> String {
        format!("{:016X}", self.raw())
    }
}
