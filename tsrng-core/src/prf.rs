// Counter-mode SHA3-256 PRF (C5): an infinite stream of 64-bit words
// derived from `domain || S || root || counter`.

use sha3::{Digest, Sha3_256};

/// Lazily yields 64-bit big-endian words from successive SHA3-256 blocks
/// of `domain || seed || root || counter`, four words per block.
///
/// Postconditions: the sequence is infinite and fully determined by
/// `(domain, seed, root)`; consumers stop pulling once they have enough.
pub struct PrfWords<'a> {
    domain: &'a [u8],
    seed: &'a [u8],
    root: &'a [u8],
    counter: u64,
    block: [u64; 4],
    block_pos: usize,
}

impl<'a> PrfWords<'a> {
    pub fn new(domain: &'a [u8], seed: &'a [u8], root: &'a [u8]) -> Self {
        let mut words = Self {
            domain,
            seed,
            root,
            counter: 0,
            block: [0; 4],
            block_pos: 4,
        };
        words.refill();
        words
    }

    fn refill(&mut self) {
        let mut hasher = Sha3_256::new();
        hasher.update(self.domain);
        hasher.update(self.seed);
        hasher.update(self.root);
        hasher.update(self.counter.to_be_bytes());
        let block = hasher.finalize();
        for (i, chunk) in block.chunks_exact(8).enumerate() {
            self.block[i] = u64::from_be_bytes(chunk.try_into().expect("8-byte chunk"));
        }
        self.counter += 1;
        self.block_pos = 0;
    }
}

impl Iterator for PrfWords<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.block_pos == 4 {
            self.refill();
        }
        let word = self.block[self.block_pos];
        self.block_pos += 1;
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_is_deterministic() {
        let a: Vec<u64> = PrfWords::new(b"domain", b"seed", b"root").take(10).collect();
        let b: Vec<u64> = PrfWords::new(b"domain", b"seed", b"root").take(10).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn different_domain_changes_the_stream() {
        let a: Vec<u64> = PrfWords::new(b"domain-a", b"seed", b"root").take(4).collect();
        let b: Vec<u64> = PrfWords::new(b"domain-b", b"seed", b"root").take(4).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn crosses_block_boundary_without_repeating() {
        let words: Vec<u64> = PrfWords::new(b"d", b"s", b"r").take(9).collect();
        assert_eq!(words.len(), 9);
    }
}
