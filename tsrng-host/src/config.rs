//! Runtime configuration, loaded from the environment with the
//! protocol's published defaults (§6) as fallbacks.

use std::path::PathBuf;

/// Preconditions: none; every field has a sensible default so the
/// binary runs with zero configuration against `./data`.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_root: PathBuf,
    pub default_leaf_size_bytes: usize,
    pub default_vdf_t: u64,
    pub default_modulus_bits: u32,
    pub default_output_bits: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_root: std::env::var("TSRNG_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            default_leaf_size_bytes: env_usize("TSRNG_LEAF_SIZE_BYTES", 64),
            default_vdf_t: env_u64("TSRNG_VDF_T", 50),
            default_modulus_bits: env_u32("TSRNG_MODULUS_BITS", 512),
            default_output_bits: env_u64("TSRNG_OUTPUT_BITS", 512),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
