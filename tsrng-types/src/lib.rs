#![cfg_attr(not(feature = "std"), no_std)]

//! Wire and on-disk data model for the time-sandwich randomness protocol.
//!
//! These types carry no protocol logic; they are the shapes that flow
//! between the round state machine, the manifest store, and the artifact
//! verifier. Kept in their own crate (no_std-capable, `serde`-only) so the
//! data model can be depended on without pulling in the arbitrary-precision
//! arithmetic or the filesystem store.

use serde::{Deserialize, Serialize};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap as Map, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap as Map;

/// The three stages a round passes through. Never rewound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStage {
    Committed,
    Beaconed,
    Finalized,
}

/// Per-stream leaf counts, fixed at commit and never mutated afterward.
pub type StreamCounts = Map<String, usize>;

/// Per-stream contiguous global index ranges, assigned in submission order.
pub type IndexMap = Map<String, Vec<usize>>;

/// Per-stream selected local indices, in draw order.
pub type SelectedIndices = Map<String, Vec<usize>>;

/// The durable manifest for a round. Fields accumulate monotonically as the
/// round advances commit -> beacon -> finalize; nothing here is ever
/// rewritten once a later-stage field is present for the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub round_id: String,
    pub round_label: String,
    pub leaf_size_bytes: usize,
    pub streams: StreamCounts,
    pub index_map: IndexMap,
    pub merkle_root_hex: String,
    pub t0_iso: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub s_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s_canonical_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t1_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vdf_t: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulus_bits: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub t2_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_indices: Option<SelectedIndices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_bits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_bytes: Option<usize>,
}

impl Manifest {
    /// The stage implied by which fields are present. Mirrors the
    /// producer's own bookkeeping, so a reader never needs extra state to
    /// classify a manifest.
    pub fn stage(&self) -> RoundStage {
        if self.t2_iso.is_some() {
            RoundStage::Finalized
        } else if self.s_hex.is_some() || self.s_canonical_hex.is_some() {
            RoundStage::Beaconed
        } else {
            RoundStage::Committed
        }
    }
}

/// The sealed VDF record written at beacon time (`vdf/proof.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VdfRecord {
    pub s_hex: String,
    #[serde(rename = "T")]
    pub t: u64,
    pub p_hex: String,
    pub y_hex: String,
    pub t1_iso: String,
}

/// `selected.json`: the chosen local indices per stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedFile {
    pub indices: SelectedIndices,
}

/// A single sibling step in a Merkle inclusion proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofSide {
    L,
    R,
}

/// `raw/summary.json`: presence marker plus optional free-form summary
/// fields describing how raw payloads were captured. The core only cares
/// that the file exists; fields beyond `captured` are opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSummary {
    pub captured: bool,
    #[serde(default)]
    pub note: Option<String>,
}

/// `raw/<stream>/<i>.meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLeafMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_hash_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// ---------------------------------------------------------------------
// Logical request/response shapes (§6), transport-agnostic.
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    pub round_label: String,
    /// stream name -> base64-encoded leaves, in submission order.
    pub streams: Map<String, Vec<String>>,
    pub leaf_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitResponse {
    pub round_id: String,
    pub merkle_root_hex: String,
    pub t0_iso: String,
    pub manifest: Manifest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconRequest {
    pub s_hex: String,
    pub vdf_t: u64,
    pub modulus_bits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconResponse {
    pub round_id: String,
    pub p_hex: String,
    pub y_hex: String,
    pub t1_iso: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub output_bits: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotas: Option<Map<String, f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub round_id: String,
    pub output_hex: String,
    pub selected_indices: SelectedIndices,
    pub t2_iso: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub round_id: String,
    pub stage: RoundStage,
    pub manifest: Manifest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomRangeRequest {
    pub start: i64,
    pub end: i64,
    pub count: usize,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_hex: Option<String>,
}

fn default_domain() -> String {
    "default".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomRangeResponse {
    pub round_id: String,
    pub start: i64,
    pub end: i64,
    pub count: usize,
    pub numbers: Vec<i64>,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub domain_bytes_hex: String,
    pub history_persisted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub ok: bool,
    pub reason: String,
    pub raw_verified: bool,
}

/// One append-only `random_ranges.jsonl` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeHistoryEntry {
    pub round_id: String,
    pub requested_at: String,
    pub start: i64,
    pub end: i64,
    pub count: usize,
    pub numbers: Vec<i64>,
    pub domain_hex: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_hex: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_is_derived_from_presence_of_fields() {
        let mut m = Manifest {
            round_id: "r1".into(),
            round_label: "demo".into(),
            leaf_size_bytes: 64,
            streams: Map::new(),
            index_map: Map::new(),
            merkle_root_hex: "00".into(),
            t0_iso: "2026-01-01T00:00:00+00:00".into(),
            s_hex: None,
            s_canonical_hex: None,
            t1_iso: None,
            vdf_t: None,
            modulus_bits: None,
            t2_iso: None,
            selected_indices: None,
            output_bits: None,
            output_bytes: None,
        };
        assert_eq!(m.stage(), RoundStage::Committed);

        m.s_hex = Some("00".into());
        m.t1_iso = Some("2026-01-01T00:00:10+00:00".into());
        assert_eq!(m.stage(), RoundStage::Beaconed);

        m.t2_iso = Some("2026-01-01T00:00:20+00:00".into());
        assert_eq!(m.stage(), RoundStage::Finalized);
    }

    #[test]
    fn manifest_round_trips_through_json() {
        let m = Manifest {
            round_id: "abc123".into(),
            round_label: "demo".into(),
            leaf_size_bytes: 64,
            streams: Map::from_iter([("a".to_string(), 2usize)]),
            index_map: Map::from_iter([("a".to_string(), vec![0usize, 1])]),
            merkle_root_hex: "deadbeef".into(),
            t0_iso: "2026-01-01T00:00:00+00:00".into(),
            s_hex: None,
            s_canonical_hex: None,
            t1_iso: None,
            vdf_t: None,
            modulus_bits: None,
            t2_iso: None,
            selected_indices: None,
            output_bits: None,
            output_bytes: None,
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.round_id, m.round_id);
        assert_eq!(back.streams, m.streams);
    }
}
