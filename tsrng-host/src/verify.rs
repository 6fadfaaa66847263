//! Standalone artifact verifier (C9). Re-derives every check from the
//! package alone: it never trusts a stored value it can recompute.

use std::collections::BTreeMap;
use std::path::Path;

use tsrng_core::hash::{h512, hkdf_sha3};
use tsrng_core::merkle::{verify_proof, ProofStep};
use tsrng_core::seed::parse_seed;
use tsrng_core::vdf::{int_from_seed, vdf_verify};
use tsrng_types::{Manifest, ProofSide, SelectedFile, VdfRecord};

use crate::error::ProtocolError;
use crate::round::{parse_hex_biguint, recompute_modulus};

/// The outcome of a package verification, mirroring the transport-level
/// `VerifyResponse` shape.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub ok: bool,
    pub reason: String,
    pub raw_verified: bool,
}

impl VerifyOutcome {
    fn reject(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: reason.into(),
            raw_verified: false,
        }
    }

    /// Rejects with one of §7's named verifier-failure kinds, so the
    /// exhaustive `ProtocolError` taxonomy (not just an ad-hoc string) is
    /// what actually identifies the first offending check.
    fn reject_kind(err: ProtocolError) -> Self {
        Self::reject(err.to_string())
    }
}

/// Everything the verifier needs, already read off disk or out of a
/// zip/tar archive by the caller. Kept file-layout-agnostic so the same
/// checks run whether the package is an extracted directory or an
/// archive stream.
pub trait ArtifactReader {
    fn read_text(&self, rel_path: &str) -> Option<String>;
    fn read_bytes(&self, rel_path: &str) -> Option<Vec<u8>>;
}

/// Runs the full 8-step check from §4.9 against `reader`.
pub fn verify_package(reader: &dyn ArtifactReader) -> VerifyOutcome {
    let manifest: Manifest = match reader
        .read_text("manifest.json")
        .and_then(|t| serde_json::from_str(&t).ok())
    {
        Some(m) => m,
        None => {
            return VerifyOutcome::reject_kind(ProtocolError::MissingArtifactEntry(
                "manifest.json".to_string(),
            ))
        }
    };

    let merkle_root = match hex::decode(&manifest.merkle_root_hex) {
        Ok(b) if b.len() == 32 => b,
        _ => {
            return VerifyOutcome::reject_kind(ProtocolError::MalformedArtifact(
                "malformed merkle_root_hex".to_string(),
            ))
        }
    };

    if reader.read_text("leaves_meta.json").is_none() {
        return VerifyOutcome::reject_kind(ProtocolError::MissingArtifactEntry(
            "leaves_meta.json".to_string(),
        ));
    }
    let selected: SelectedFile = match reader
        .read_text("selected.json")
        .and_then(|t| serde_json::from_str(&t).ok())
    {
        Some(s) => s,
        None => {
            return VerifyOutcome::reject_kind(ProtocolError::MissingArtifactEntry(
                "selected.json".to_string(),
            ))
        }
    };
    let out_bytes = match reader.read_bytes("output.bin") {
        Some(b) => b,
        None => {
            return VerifyOutcome::reject_kind(ProtocolError::MissingArtifactEntry(
                "output.bin".to_string(),
            ))
        }
    };

    let s_hex = manifest
        .s_canonical_hex
        .clone()
        .or_else(|| manifest.s_hex.clone())
        .unwrap_or_default();
    let s = parse_seed(&s_hex);

    let vdf: VdfRecord = match reader
        .read_text("vdf/proof.json")
        .and_then(|t| serde_json::from_str(&t).ok())
    {
        Some(v) => v,
        None => {
            return VerifyOutcome::reject_kind(ProtocolError::MissingArtifactEntry(
                "vdf/proof.json".to_string(),
            ))
        }
    };

    let modulus_bits = manifest.modulus_bits.unwrap_or(0);
    let p = match parse_hex_biguint(&vdf.p_hex) {
        Ok(p) => p,
        Err(_) => {
            return VerifyOutcome::reject_kind(ProtocolError::MalformedArtifact(
                "malformed p_hex in VDF proof".to_string(),
            ))
        }
    };
    let modulus_bits = if modulus_bits == 0 {
        p.bits() as u32
    } else {
        modulus_bits
    };
    let expected_prime = match recompute_modulus(&s, modulus_bits) {
        Ok(p) => p,
        Err(_) => {
            return VerifyOutcome::reject_kind(ProtocolError::MalformedArtifact(
                "failed to re-derive VDF modulus".to_string(),
            ))
        }
    };
    if p != expected_prime {
        return VerifyOutcome::reject_kind(ProtocolError::VdfPrimeMismatch);
    }

    let y = match parse_hex_biguint(&vdf.y_hex) {
        Ok(y) => y,
        Err(_) => {
            return VerifyOutcome::reject_kind(ProtocolError::MalformedArtifact(
                "malformed y_hex in VDF proof".to_string(),
            ))
        }
    };
    let x = int_from_seed(&s, &p);
    if !vdf_verify(&x, &y, vdf.t, &p) {
        return VerifyOutcome::reject_kind(ProtocolError::VdfOutputMismatch);
    }

    if !vdf.s_hex.is_empty() {
        let recorded = parse_seed(&vdf.s_hex);
        if recorded != s {
            return VerifyOutcome::reject_kind(ProtocolError::SeedMismatch);
        }
    }

    let mut leaf_cache: BTreeMap<(String, usize), Vec<u8>> = BTreeMap::new();
    for (stream, idxs) in &selected.indices {
        for &i in idxs {
            let leaf_rel = format!("leaves/{stream}/{i}.leaf");
            let proof_rel = format!("proofs/{stream}/{i}.proof");
            let leaf = match reader.read_bytes(&leaf_rel) {
                Some(b) => b,
                None => return VerifyOutcome::reject_kind(ProtocolError::MissingArtifactEntry(leaf_rel)),
            };
            let proof_json: Vec<(String, ProofSide)> = match reader
                .read_text(&proof_rel)
                .and_then(|t| serde_json::from_str(&t).ok())
            {
                Some(p) => p,
                None => return VerifyOutcome::reject_kind(ProtocolError::MissingArtifactEntry(proof_rel)),
            };
            let proof: Vec<ProofStep> = match proof_json
                .into_iter()
                .map(|(hex_sib, side)| {
                    let mut sibling = [0u8; 32];
                    let bytes = hex::decode(hex_sib).ok()?;
                    if bytes.len() != 32 {
                        return None;
                    }
                    sibling.copy_from_slice(&bytes);
                    Some(ProofStep { sibling, side })
                })
                .collect::<Option<Vec<_>>>()
            {
                Some(p) => p,
                None => {
                    return VerifyOutcome::reject_kind(ProtocolError::MalformedArtifact(format!(
                        "malformed proof: {proof_rel}"
                    )))
                }
            };
            let mut root = [0u8; 32];
            root.copy_from_slice(&merkle_root);
            if !verify_proof(&leaf, &proof, &root) {
                return VerifyOutcome::reject_kind(ProtocolError::ProofFailed {
                    stream: stream.clone(),
                    index: i,
                });
            }
            leaf_cache.insert((stream.clone(), i), leaf);
        }
    }

    let mut flat_leaves = Vec::new();
    for (stream, idxs) in &selected.indices {
        for &i in idxs {
            flat_leaves.push(leaf_cache[&(stream.clone(), i)].clone());
        }
    }
    let mut concatenated = Vec::new();
    for leaf in &flat_leaves {
        concatenated.extend_from_slice(leaf);
    }
    let r_raw = h512(&concatenated);
    let expected = match hkdf_sha3(&r_raw, &s, out_bytes.len()) {
        Ok(e) => e,
        Err(_) => {
            return VerifyOutcome::reject_kind(ProtocolError::MalformedArtifact(
                "failed to recompute extractor output".to_string(),
            ))
        }
    };
    if expected != out_bytes {
        return VerifyOutcome::reject_kind(ProtocolError::ExtractorMismatch);
    }

    let leaf_size = manifest.leaf_size_bytes;
    let raw_available = reader.read_text("raw/summary.json").is_some()
        || reader.read_bytes("raw/summary.json").is_some();
    let mut raw_verified = false;
    if raw_available {
        for ((stream, idx), stored_leaf) in &leaf_cache {
            let raw_rel = format!("raw/{stream}/{idx}.raw");
            let meta_rel = format!("raw/{stream}/{idx}.meta.json");
            let raw_bytes = match reader.read_bytes(&raw_rel) {
                Some(b) => b,
                None => return VerifyOutcome::reject_kind(ProtocolError::MissingArtifactEntry(raw_rel)),
            };
            let derived_leaf = &h512(&raw_bytes)[..leaf_size.min(64)];
            if derived_leaf != stored_leaf.as_slice() {
                return VerifyOutcome::reject_kind(ProtocolError::RawBindingMismatch {
                    stream: stream.clone(),
                    index: *idx,
                    reason: "SHA3-512(raw)[0:leaf_size] does not match the committed leaf".to_string(),
                });
            }
            if let Some(meta_text) = reader.read_text(&meta_rel) {
                if let Ok(meta) = serde_json::from_str::<tsrng_types::RawLeafMeta>(&meta_text) {
                    if let Some(hash_hex) = meta.leaf_hash_hex {
                        if let Ok(hash_bytes) = hex::decode(&hash_hex) {
                            if &hash_bytes != stored_leaf {
                                return VerifyOutcome::reject_kind(ProtocolError::RawBindingMismatch {
                                    stream: stream.clone(),
                                    index: *idx,
                                    reason: "leaf_hash_hex metadata disagrees with the committed leaf"
                                        .to_string(),
                                });
                            }
                        }
                    }
                }
            }
        }
        raw_verified = true;
    }

    VerifyOutcome {
        ok: true,
        reason: if raw_verified {
            "OK (raw verified)".to_string()
        } else {
            "OK".to_string()
        },
        raw_verified,
    }
}

/// Reads an artifact laid out as a plain directory tree (the form
/// `finalize` writes). Archive formats can implement the same trait.
pub struct DirectoryArtifact {
    root: std::path::PathBuf,
}

impl DirectoryArtifact {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactReader for DirectoryArtifact {
    fn read_text(&self, rel_path: &str) -> Option<String> {
        std::fs::read_to_string(self.root.join(rel_path)).ok()
    }

    fn read_bytes(&self, rel_path: &str) -> Option<Vec<u8>> {
        std::fs::read(self.root.join(rel_path)).ok()
    }
}

pub fn verify_directory(path: impl AsRef<Path>) -> VerifyOutcome {
    let reader = DirectoryArtifact::new(path.as_ref());
    verify_package(&reader)
}
