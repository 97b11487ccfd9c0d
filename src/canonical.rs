//! Canonical serialization for slice fingerprints.
//!
//! Everything fed through here must serialize deterministically: struct
//! fields in declaration order, `Vec`s in index order, and no `HashMap`s.
//! The emitter sorts communities, edges and merge records before building
//! a report, so the JSON bytes of a report are stable across runs.

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes.
///
/// Panics only if `value`'s `Serialize` impl fails, which cannot happen for
/// the plain data types of this crate.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("canonical serialization of plain data failed")
}

/// xxh64 of the canonical bytes of `value`.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), 0)
}

/// [`canonical_hash`] as a 16-digit lowercase hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
