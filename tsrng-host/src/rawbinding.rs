//! Raw-payload binding (§4.9 step 7): the *optional* external contract
//! that a committed leaf is `SHA3-512(raw)[0:leaf_size]` for some raw
//! payload the producer chose not to discard. The core never requires
//! this — `commit` accepts opaque leaf bytes regardless of provenance —
//! but when a round's artifact carries `raw/summary.json`, the verifier
//! checks every selected leaf against its raw payload.
//!
//! This module is the writer side: given a raw payload, derive the leaf
//! bytes that `commit` should be called with, and persist the raw
//! payload and its metadata alongside the round so [`crate::verify`] can
//! exercise that check. There is no production entropy-collector behind
//! it; that pipeline is out of scope (§1).

use std::fs;

use tsrng_core::hash::h512;
use tsrng_types::RawLeafMeta;

use crate::error::ProtocolError;
use crate::store::ManifestStore;

/// `leaf_from_raw(raw, leaf_size) := SHA3-512(raw)[0:leaf_size]`.
///
/// Preconditions: `leaf_size <= 64` (SHA3-512 digest length).
pub fn leaf_from_raw(raw: &[u8], leaf_size: usize) -> Result<Vec<u8>, ProtocolError> {
    if leaf_size > 64 {
        return Err(ProtocolError::MalformedArtifact(format!(
            "raw-binding leaf_size {leaf_size} exceeds SHA3-512 digest length"
        )));
    }
    Ok(h512(raw)[..leaf_size].to_vec())
}

fn raw_dir(store: &ManifestStore, round_id: &str) -> std::path::PathBuf {
    store.round_dir(round_id).join("raw")
}

/// Writes `raw/<stream>/<i>.raw` and `raw/<stream>/<i>.meta.json` for a
/// leaf derived from `raw` via [`leaf_from_raw`]. Returns the derived
/// leaf bytes so the caller can feed them into `commit`.
pub fn write_raw_leaf(
    store: &ManifestStore,
    round_id: &str,
    stream: &str,
    index: usize,
    raw: &[u8],
    leaf_size: usize,
    source: Option<String>,
) -> Result<Vec<u8>, ProtocolError> {
    let leaf = leaf_from_raw(raw, leaf_size)?;

    let raw_path = raw_dir(store, round_id)
        .join(stream)
        .join(format!("{index}.raw"));
    if let Some(parent) = raw_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&raw_path, raw)?;

    let meta = RawLeafMeta {
        leaf_hash_hex: Some(hex::encode(&leaf)),
        source,
    };
    let meta_path = raw_dir(store, round_id)
        .join(stream)
        .join(format!("{index}.meta.json"));
    fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)?;

    Ok(leaf)
}

/// Writes `raw/summary.json`, the presence marker that tells the
/// verifier a raw binding was recorded for this round at all.
pub fn write_summary(
    store: &ManifestStore,
    round_id: &str,
    captured: bool,
    note: Option<String>,
) -> Result<(), ProtocolError> {
    let dir = raw_dir(store, round_id);
    fs::create_dir_all(&dir)?;
    let summary = tsrng_types::RawSummary { captured, note };
    fs::write(dir.join("summary.json"), serde_json::to_string_pretty(&summary)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile_path::temp_store;

    mod tempfile_path {
        use std::sync::atomic::{AtomicU64, Ordering};

        static COUNTER: AtomicU64 = AtomicU64::new(0);

        pub fn temp_store() -> crate::store::ManifestStore {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let dir = std::env::temp_dir().join(format!("tsrng-rawbinding-test-{n}"));
            crate::store::ManifestStore::new(dir)
        }
    }

    #[test]
    fn leaf_from_raw_matches_truncated_sha3_512() {
        let raw = b"some external entropy payload";
        let leaf = leaf_from_raw(raw, 32).unwrap();
        assert_eq!(leaf, h512(raw)[..32].to_vec());
    }

    #[test]
    fn oversized_leaf_size_is_rejected() {
        assert!(leaf_from_raw(b"x", 65).is_err());
    }

    #[test]
    fn write_raw_leaf_persists_raw_and_meta() {
        let store = temp_store();
        let (round_id, _) = store.new_round().unwrap();
        let leaf = write_raw_leaf(&store, &round_id, "a", 0, b"payload", 32, Some("test".into()))
            .unwrap();
        assert_eq!(leaf, h512(b"payload")[..32].to_vec());

        let raw_back = std::fs::read(store.round_dir(&round_id).join("raw/a/0.raw")).unwrap();
        assert_eq!(raw_back, b"payload");

        let meta_text =
            std::fs::read_to_string(store.round_dir(&round_id).join("raw/a/0.meta.json")).unwrap();
        let meta: RawLeafMeta = serde_json::from_str(&meta_text).unwrap();
        assert_eq!(meta.leaf_hash_hex, Some(hex::encode(&leaf)));
    }
}
