// Unbiased sampling without replacement (C6), built on the PRF stream.
//
// Rejection sampling removes modulo bias: words at or above
// `floor(2^64 / n) * n` are discarded rather than reduced, so every
// surviving residue class `0..n` is equally likely.

use crate::error::CoreError;
use crate::prf::PrfWords;

fn uniform_numbers(
    count: u64,
    range_size: u64,
    domain: &[u8],
    seed: &[u8],
    root: &[u8],
) -> Result<Vec<u64>, CoreError> {
    if range_size == 0 {
        return Err(CoreError::SampleDomainTooSmall { k: count, n: range_size });
    }
    if count > range_size {
        return Err(CoreError::SampleDomainTooSmall { k: count, n: range_size });
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    // range_size is a u64, so it is always strictly less than 2^64; the
    // threshold below always applies (unlike the 2^64-sized-domain case
    // this formula generalizes from).
    let modulus: u128 = 1u128 << 64;
    let threshold = ((modulus / range_size as u128) * range_size as u128) as u64;

    let mut seen = std::collections::HashSet::with_capacity(count as usize);
    let mut out = Vec::with_capacity(count as usize);

    for word in PrfWords::new(domain, seed, root) {
        if word >= threshold {
            continue;
        }
        let value = word % range_size;
        if seen.insert(value) {
            out.push(value);
            if out.len() as u64 >= count {
                break;
            }
        }
    }
    Ok(out)
}

/// Draws `count` distinct indices from `0..universe`.
pub fn unique_indices(
    count: u64,
    universe: u64,
    domain: &[u8],
    seed: &[u8],
    root: &[u8],
) -> Result<Vec<u64>, CoreError> {
    uniform_numbers(count, universe, domain, seed, root)
}

/// Draws `count` distinct integers from the inclusive range `[start, end]`.
///
/// Preconditions: `end >= start`.
pub fn unique_range(
    count: u64,
    start: i64,
    end: i64,
    domain: &[u8],
    seed: &[u8],
    root: &[u8],
) -> Result<Vec<i64>, CoreError> {
    let range_size = (end - start + 1) as u64;
    let offsets = uniform_numbers(count, range_size, domain, seed, root)?;
    Ok(offsets.into_iter().map(|o| start + o as i64).collect())
}
