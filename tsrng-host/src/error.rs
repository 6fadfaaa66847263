use thiserror::Error;
use tsrng_core::CoreError;

/// The round state machine's and verifier's error taxonomy. Each variant
/// pinpoints the first check that failed; none of these are retried
/// automatically.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("round '{0}' not found")]
    RoundNotFound(String),

    #[error("round '{round_id}' is {actual:?}, expected {expected:?} for this operation")]
    BadStage {
        round_id: String,
        expected: &'static str,
        actual: tsrng_types::RoundStage,
    },

    #[error("leaf size mismatch in stream '{stream}': expected {expected} bytes, got {actual}")]
    LeafSizeMismatch {
        stream: String,
        expected: usize,
        actual: usize,
    },

    #[error("commit request has no streams or no leaves")]
    EmptyCommit,

    #[error("seed parsing failed definitively: {0}")]
    BadSeed(String),

    #[error("range request invalid: {0}")]
    RangeInvalid(String),

    #[error(
        "Merkle root mismatch on round '{round_id}': recomputed {recomputed_hex}, stored {stored_hex}"
    )]
    MerkleInconsistency {
        round_id: String,
        recomputed_hex: String,
        stored_hex: String,
    },

    #[error("VDF prime mismatch: derived prime does not match the recorded one")]
    VdfPrimeMismatch,

    #[error("VDF output mismatch: recorded y does not verify against x, T, p")]
    VdfOutputMismatch,

    #[error("seed mismatch between manifest and VDF proof record")]
    SeedMismatch,

    #[error("Merkle proof failed for {stream}:{index}")]
    ProofFailed { stream: String, index: usize },

    #[error("extractor mismatch: recomputed output.bin does not match the stored output")]
    ExtractorMismatch,

    #[error("raw payload binding mismatch for {stream}:{index}: {reason}")]
    RawBindingMismatch {
        stream: String,
        index: usize,
        reason: String,
    },

    #[error("manifest or artifact entry missing: {0}")]
    MissingArtifactEntry(String),

    #[error("malformed artifact: {0}")]
    MalformedArtifact(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
