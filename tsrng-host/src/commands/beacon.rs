use tracing::info;

use tsrng_host::{round, Config, ManifestStore};

use crate::commands::CommandResult;

/// `beacon(round_id, S_hex, vdf_T, modulus_bits)` (§6).
pub fn handle_beacon(
    round_id: String,
    seed: String,
    vdf_t: Option<u64>,
    modulus_bits: Option<u32>,
) -> CommandResult {
    let config = Config::from_env();
    let store = ManifestStore::new(&config.data_root);

    let vdf_t = vdf_t.unwrap_or(config.default_vdf_t);
    let modulus_bits = modulus_bits.unwrap_or(config.default_modulus_bits);

    let record = round::beacon(&store, &round_id, seed, vdf_t, modulus_bits)?;
    info!(round_id = %round_id, vdf_t, modulus_bits, "round beaconed");
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
