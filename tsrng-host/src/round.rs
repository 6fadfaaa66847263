//! Round state machine (C7): commit -> beacon -> finalize. Each function
//! takes the store and the previous stage's durable state and produces
//! the next stage, enforcing the ordering and equality invariants from
//! the data model.

use std::collections::BTreeMap;

use chrono::Utc;
use num_bigint::BigUint;
use num_traits::Num;

use tsrng_core::hash::h512;
use tsrng_core::merkle::MerkleTree;
use tsrng_core::seed::parse_seed;
use tsrng_core::selector::unique_indices;
use tsrng_core::vdf::{derive_prime, int_from_seed, vdf_encode};
use tsrng_types::{
    IndexMap, Manifest, RoundStage, SelectedFile, SelectedIndices, StreamCounts, VdfRecord,
};

use crate::error::ProtocolError;
use crate::store::ManifestStore;

const MODULUS_DOMAIN: &[u8] = b"TSRNG/modulus/";
const IDX_DOMAIN: &[u8] = b"TSRNG/idx/";

/// `commit(round_label, streams, leaf_size)`: persists leaves, builds
/// the Merkle tree over the linearized leaf sequence, writes the
/// initial manifest.
///
/// Preconditions: every leaf is exactly `leaf_size_bytes` long; at
/// least one stream carries at least one leaf.
pub fn commit(
    store: &ManifestStore,
    round_label: String,
    streams: BTreeMap<String, Vec<Vec<u8>>>,
    leaf_size_bytes: usize,
) -> Result<Manifest, ProtocolError> {
    if streams.is_empty() || streams.values().all(|v| v.is_empty()) {
        return Err(ProtocolError::EmptyCommit);
    }
    for (stream, leaves) in &streams {
        for leaf in leaves {
            if leaf.len() != leaf_size_bytes {
                return Err(ProtocolError::LeafSizeMismatch {
                    stream: stream.clone(),
                    expected: leaf_size_bytes,
                    actual: leaf.len(),
                });
            }
        }
    }

    let (round_id, _dir) = store.new_round()?;
    let t0_iso = Utc::now().to_rfc3339();

    let mut leaves_linear: Vec<Vec<u8>> = Vec::new();
    let mut index_map: IndexMap = IndexMap::new();
    let mut stream_counts: StreamCounts = StreamCounts::new();
    for (stream, leaves) in &streams {
        let start = leaves_linear.len();
        index_map.insert(stream.clone(), (start..start + leaves.len()).collect());
        stream_counts.insert(stream.clone(), leaves.len());
        leaves_linear.extend(leaves.iter().cloned());
    }

    let tree = MerkleTree::build(&leaves_linear)?;
    let root = tree.root();

    for (stream, leaves) in &streams {
        for (i, leaf) in leaves.iter().enumerate() {
            store.write_leaf(&round_id, stream, i, leaf)?;
        }
    }
    store.write_leaves_meta(&round_id, &stream_counts)?;

    let manifest = Manifest {
        round_id: round_id.clone(),
        round_label,
        leaf_size_bytes,
        streams: stream_counts,
        index_map,
        merkle_root_hex: hex::encode(root),
        t0_iso,
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
    store.write_manifest(&round_id, &manifest)?;
    Ok(manifest)
}

/// `beacon(round_id, S_raw, T, modulus_bits)`: derives the VDF modulus
/// from the seed, evaluates the sloth delay, and records both the VDF
/// proof and the manifest's seed/beacon fields.
///
/// Preconditions: the round exists and is `Committed`.
pub fn beacon(
    store: &ManifestStore,
    round_id: &str,
    s_hex_raw: String,
    vdf_t: u64,
    modulus_bits: u32,
) -> Result<VdfRecord, ProtocolError> {
    if !store.round_exists(round_id) {
        return Err(ProtocolError::RoundNotFound(round_id.to_string()));
    }
    let mut manifest = store.read_manifest(round_id)?;
    if manifest.stage() != RoundStage::Committed {
        return Err(ProtocolError::BadStage {
            round_id: round_id.to_string(),
            expected: "committed",
            actual: manifest.stage(),
        });
    }

    let s = parse_seed(&s_hex_raw);
    let t1_iso = Utc::now().to_rfc3339();

    let mut modulus_seed = MODULUS_DOMAIN.to_vec();
    modulus_seed.extend_from_slice(&s);
    let p = derive_prime(&modulus_seed, modulus_bits)?;
    let x = int_from_seed(&s, &p);
    let y = vdf_encode(&x, vdf_t, &p);

    let record = VdfRecord {
        s_hex: s_hex_raw.clone(),
        t: vdf_t,
        p_hex: p.to_str_radix(16),
        y_hex: y.to_str_radix(16),
        t1_iso: t1_iso.clone(),
    };
    store.write_vdf_record(round_id, &record)?;

    manifest.s_hex = Some(s_hex_raw);
    manifest.s_canonical_hex = Some(hex::encode(&s));
    manifest.t1_iso = Some(t1_iso);
    manifest.vdf_t = Some(vdf_t);
    manifest.modulus_bits = Some(modulus_bits);
    store.write_manifest(round_id, &manifest)?;

    Ok(record)
}

/// `finalize(round_id, output_bits, quotas?)`: reconstructs the Merkle
/// tree, selects leaves per stream, persists inclusion proofs, and
/// extracts the final output bytes.
///
/// Preconditions: the round exists and is `Beaconed`.
pub struct FinalizeOutcome {
    pub output: Vec<u8>,
    pub selected_indices: SelectedIndices,
    pub t2_iso: String,
}

pub fn finalize(
    store: &ManifestStore,
    round_id: &str,
    output_bits: u64,
    quotas: Option<BTreeMap<String, f64>>,
) -> Result<FinalizeOutcome, ProtocolError> {
    if !store.round_exists(round_id) {
        return Err(ProtocolError::RoundNotFound(round_id.to_string()));
    }
    let mut manifest = store.read_manifest(round_id)?;
    if manifest.stage() != RoundStage::Beaconed {
        return Err(ProtocolError::BadStage {
            round_id: round_id.to_string(),
            expected: "beaconed",
            actual: manifest.stage(),
        });
    }

    let all_streams: Vec<String> = manifest.index_map.keys().cloned().collect();

    let mut leaves_linear: Vec<Vec<u8>> = Vec::new();
    let mut stream_offsets: BTreeMap<String, usize> = BTreeMap::new();
    for s in &all_streams {
        stream_offsets.insert(s.clone(), leaves_linear.len());
        let count = store.stream_leaf_count(round_id, s)?;
        for i in 0..count {
            leaves_linear.push(store.read_leaf(round_id, s, i)?);
        }
    }

    let tree = MerkleTree::build(&leaves_linear)?;
    let root = tree.root();
    let stored_root = hex::decode(&manifest.merkle_root_hex)
        .map_err(|e| ProtocolError::MalformedArtifact(format!("bad merkle_root_hex: {e}")))?;
    if root.as_slice() != stored_root.as_slice() {
        return Err(ProtocolError::MerkleInconsistency {
            round_id: round_id.to_string(),
            recomputed_hex: hex::encode(root),
            stored_hex: manifest.merkle_root_hex.clone(),
        });
    }

    let s_hex = manifest
        .s_canonical_hex
        .clone()
        .or_else(|| manifest.s_hex.clone())
        .unwrap_or_default();
    let s = parse_seed(&s_hex);

    let quotas = quotas.unwrap_or_else(|| {
        let uniform = 1.0 / all_streams.len() as f64;
        all_streams.iter().map(|s| (s.clone(), uniform)).collect()
    });

    let leaf_size = manifest.leaf_size_bytes;
    let bits_per_leaf = leaf_size * 8;
    let need_leaves = std::cmp::max(1, output_bits.div_ceil(bits_per_leaf as u64));

    let mut selected: SelectedIndices = SelectedIndices::new();
    for s_name in &all_streams {
        let m = store.stream_leaf_count(round_id, s_name)?;
        if m == 0 {
            selected.insert(s_name.clone(), Vec::new());
            continue;
        }
        let quota = quotas.get(s_name).copied().unwrap_or(0.0);
        let mut cnt = std::cmp::max(1, (need_leaves as f64 * quota) as u64);
        if cnt > m as u64 {
            cnt = m as u64;
        }
        let mut domain = IDX_DOMAIN.to_vec();
        domain.extend_from_slice(s_name.as_bytes());
        let idxs = unique_indices(cnt, m as u64, &domain, &s, &root)?;
        selected.insert(s_name.clone(), idxs.into_iter().map(|i| i as usize).collect());
    }

    let mut selected_chunks: Vec<Vec<u8>> = Vec::new();
    for (s_name, idxs) in &selected {
        let global_offset = stream_offsets[s_name];
        for &i in idxs {
            let leaf = store.read_leaf(round_id, s_name, i)?;
            let proof = tree.proof(global_offset + i)?;
            let proof_json: Vec<(String, tsrng_types::ProofSide)> = proof
                .iter()
                .map(|step| (hex::encode(step.sibling), step.side))
                .collect();
            write_proof(store, round_id, s_name, i, &proof_json)?;
            selected_chunks.push(leaf);
        }
    }

    let mut concatenated = Vec::new();
    for chunk in &selected_chunks {
        concatenated.extend_from_slice(chunk);
    }
    let r_raw = h512(&concatenated);
    let length = output_bits.div_ceil(8) as usize;
    let output = tsrng_core::hash::hkdf_sha3(&r_raw, &s, length)?;

    store.write_output(round_id, &output)?;
    store.write_selected(
        round_id,
        &SelectedFile {
            indices: selected.clone(),
        },
    )?;

    let t2_iso = Utc::now().to_rfc3339();
    manifest.t2_iso = Some(t2_iso.clone());
    manifest.selected_indices = Some(selected.clone());
    manifest.output_bits = Some(output_bits);
    manifest.output_bytes = Some(output.len());
    store.write_manifest(round_id, &manifest)?;

    Ok(FinalizeOutcome {
        output,
        selected_indices: selected,
        t2_iso,
    })
}

fn write_proof(
    store: &ManifestStore,
    round_id: &str,
    stream: &str,
    index: usize,
    proof: &[(String, tsrng_types::ProofSide)],
) -> Result<(), ProtocolError> {
    let path = store.proof_path(round_id, stream, index);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(proof)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Re-derives the VDF modulus exactly as `beacon` would, used by the
/// standalone verifier to avoid trusting a stored `p`.
pub fn recompute_modulus(s: &[u8], modulus_bits: u32) -> Result<BigUint, ProtocolError> {
    let mut modulus_seed = MODULUS_DOMAIN.to_vec();
    modulus_seed.extend_from_slice(s);
    Ok(derive_prime(&modulus_seed, modulus_bits)?)
}

pub fn parse_hex_biguint(s: &str) -> Result<BigUint, ProtocolError> {
    BigUint::from_str_radix(s, 16)
        .map_err(|e| ProtocolError::MalformedArtifact(format!("bad hex integer: {e}")))
}
