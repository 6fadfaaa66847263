//! Range service (C10): deterministic number draws keyed by round and
//! domain tag, with non-fatal append-only history logging.

use chrono::Utc;

use tsrng_core::seed::parse_seed;
use tsrng_core::selector::unique_range;
use tsrng_types::{RandomRangeRequest, RandomRangeResponse, RangeHistoryEntry, RoundStage};

use crate::error::ProtocolError;
use crate::store::ManifestStore;

const RANGE_DOMAIN_PREFIX: &[u8] = b"TSRNG/range";

/// `random_range(round, start, end, count, domain?, context?, salt?)`.
///
/// Preconditions: the round is at least `Beaconed` (its canonical seed
/// and Merkle root must exist); `end >= start`; `1 <= count <=
/// end - start + 1`.
pub fn random_range(
    store: &ManifestStore,
    round_id: &str,
    req: RandomRangeRequest,
) -> Result<RandomRangeResponse, ProtocolError> {
    if !store.round_exists(round_id) {
        return Err(ProtocolError::RoundNotFound(round_id.to_string()));
    }
    if req.end < req.start {
        return Err(ProtocolError::RangeInvalid("end must be >= start".into()));
    }
    let range_size = (req.end - req.start + 1) as u64;
    if req.count == 0 || req.count as u64 > range_size {
        return Err(ProtocolError::RangeInvalid(
            "count must be >= 1 and <= range size".into(),
        ));
    }

    let manifest = store.read_manifest(round_id)?;
    if manifest.stage() == RoundStage::Committed {
        return Err(ProtocolError::BadStage {
            round_id: round_id.to_string(),
            expected: "beaconed or finalized",
            actual: manifest.stage(),
        });
    }
    let s_hex = manifest
        .s_canonical_hex
        .clone()
        .or_else(|| manifest.s_hex.clone())
        .ok_or_else(|| ProtocolError::BadSeed("round has no beacon seed".into()))?;
    let s = parse_seed(&s_hex);
    let root = hex::decode(&manifest.merkle_root_hex)
        .map_err(|e| ProtocolError::MalformedArtifact(format!("bad merkle_root_hex: {e}")))?;

    let domain_label = req.domain.clone();
    let mut domain_bytes = RANGE_DOMAIN_PREFIX.to_vec();
    domain_bytes.push(b'|');
    domain_bytes.extend_from_slice(round_id.as_bytes());
    domain_bytes.push(b'|');
    domain_bytes.extend_from_slice(domain_label.as_bytes());
    if let Some(context) = &req.context {
        domain_bytes.push(b'|');
        domain_bytes.extend_from_slice(context.as_bytes());
    }
    if let Some(salt_hex) = &req.salt_hex {
        let salt_bytes = hex::decode(salt_hex)
            .map_err(|e| ProtocolError::RangeInvalid(format!("invalid salt_hex: {e}")))?;
        domain_bytes.push(b'|');
        domain_bytes.extend_from_slice(&salt_bytes);
    }

    let numbers = unique_range(req.count as u64, req.start, req.end, &domain_bytes, &s, &root)?;

    let entry = RangeHistoryEntry {
        round_id: round_id.to_string(),
        requested_at: Utc::now().to_rfc3339(),
        start: req.start,
        end: req.end,
        count: req.count,
        numbers: numbers.clone(),
        domain_hex: hex::encode(&domain_bytes),
        domain: domain_label.clone(),
        context: req.context.clone(),
        salt_hex: req.salt_hex.as_ref().map(|s| s.to_lowercase()),
    };
    let history_persisted = store.append_range_history(round_id, &entry);

    Ok(RandomRangeResponse {
        round_id: round_id.to_string(),
        start: req.start,
        end: req.end,
        count: req.count,
        numbers,
        domain: domain_label,
        context: req.context,
        domain_bytes_hex: hex::encode(&domain_bytes),
        history_persisted,
    })
}
