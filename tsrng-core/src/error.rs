use thiserror::Error;

/// Failures that can occur inside the pure cryptographic kernels, as
/// opposed to the round state machine or the artifact verifier (those live
/// in `tsrng-host::error` and wrap these where a kernel call is the root
/// cause).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Merkle `build` was called with no leaves.
    #[error("cannot build a Merkle tree over zero leaves")]
    EmptyLeafSet,

    /// Merkle `proof` was asked for an index outside the built tree.
    #[error("leaf index {index} out of range for a tree of {leaf_count} leaves")]
    IndexOutOfRange { index: usize, leaf_count: usize },

    /// HKDF expansion would need more than 2^32 - 1 counter blocks.
    #[error("HKDF output length {requested} exceeds the counter capacity of this construction")]
    HkdfLengthExceeded { requested: usize },

    /// `sample`/`sample_range` preconditions violated.
    #[error("cannot sample {k} distinct values from a domain of size {n}")]
    SampleDomainTooSmall { k: u64, n: u64 },

    /// Prime derivation exhausted an unreasonable number of candidates.
    /// Kept for defense; `derive_prime` is expected to succeed within a few
    /// hundred iterations for any requested bit length.
    #[error("failed to derive a prime after {attempts} candidates")]
    PrimeDerivationExhausted { attempts: u64 },

    /// `derive_prime` was asked for a bit length outside `8..=512`, the
    /// range a single SHA3-512 digest can supply candidate bits for.
    #[error("cannot derive a prime of {bits} bits (must be between 8 and 512)")]
    InvalidPrimeBitLength { bits: u32 },
}
