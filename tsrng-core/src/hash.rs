// SHA3 and HMAC/HKDF primitives (C1).
//
// The expand step here is *not* RFC 5869's: that standard uses a one-byte
// block counter (0x01..=0xff), but this protocol's producer and verifier
// both use a 4-byte big-endian counter, so the `hkdf` crate's `expand`
// would silently diverge from the artifact's recorded behavior. Extract
// (PRK = HMAC(salt, ikm)) is unmodified RFC 5869 and reuses `hmac`.

use hmac::Mac;
use sha3::{Digest, Sha3_256, Sha3_512};

use crate::error::CoreError;

pub type HmacSha3_256 = hmac::Hmac<Sha3_256>;

/// `H256(x) := SHA3-256(x)`.
pub fn h256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `H512(x) := SHA3-512(x)`.
pub fn h512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha3_512::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `HMAC-SHA3-256(key, msg)`.
pub fn hmac_sha3_256(key: &[u8], msg: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha3_256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(msg);
    mac.finalize().into_bytes().into()
}

/// `HKDF(ikm, salt, L)`: `PRK := HMAC-SHA3-256(key=salt, msg=ikm)`, then
/// expand with a 4-byte big-endian block counter starting at 1:
/// `T_i := HMAC(PRK, T_{i-1} || be32(i))`, `T_0 := empty`.
///
/// Preconditions: `length` reachable within a u32 block counter.
///
/// Postconditions: returns exactly `length` bytes, deterministic in
/// `(ikm, salt, length)`.
pub fn hkdf_sha3(ikm: &[u8], salt: &[u8], length: usize) -> Result<Vec<u8>, CoreError> {
    let blocks_needed = length.div_ceil(32);
    if blocks_needed > u32::MAX as usize {
        return Err(CoreError::HkdfLengthExceeded { requested: length });
    }

    let prk = hmac_sha3_256(salt, ikm);
    let mut okm = Vec::with_capacity(length);
    let mut t_prev: Vec<u8> = Vec::new();
    let mut counter: u32 = 1;
    while okm.len() < length {
        let mut msg = t_prev.clone();
        msg.extend_from_slice(&counter.to_be_bytes());
        let t_i = hmac_sha3_256(&prk, &msg);
        okm.extend_from_slice(&t_i);
        t_prev = t_i.to_vec();
        counter = counter
            .checked_add(1)
            .ok_or(CoreError::HkdfLengthExceeded { requested: length })?;
    }
    okm.truncate(length);
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h256_matches_known_vector_shape() {
        // SHA3-256("") has a well known digest; spot-check length and
        // determinism rather than hardcoding ecosystem-specific vectors.
        let a = h256(b"");
        let b = h256(b"");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn h512_is_64_bytes_and_deterministic() {
        let a = h512(b"tsrng");
        let b = h512(b"tsrng");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hkdf_is_deterministic_and_sized() {
        let ikm = b"raw-randomness";
        let salt = b"seed";
        let out1 = hkdf_sha3(ikm, salt, 48).unwrap();
        let out2 = hkdf_sha3(ikm, salt, 48).unwrap();
        assert_eq!(out1, out2);
        assert_eq!(out1.len(), 48);
    }

    #[test]
    fn hkdf_different_salt_differs() {
        let ikm = b"raw-randomness";
        let out1 = hkdf_sha3(ikm, b"salt-a", 32).unwrap();
        let out2 = hkdf_sha3(ikm, b"salt-b", 32).unwrap();
        assert_ne!(out1, out2);
    }

    #[test]
    fn hkdf_longer_than_one_block_still_deterministic() {
        let out = hkdf_sha3(b"ikm", b"salt", 100).unwrap();
        assert_eq!(out.len(), 100);
    }
}
