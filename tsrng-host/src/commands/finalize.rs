use std::collections::BTreeMap;

use tracing::info;

use tsrng_core::bitstring::ensure_output_text;
use tsrng_host::{round, Config, ManifestStore};

use crate::commands::CommandResult;

/// `finalize(round_id, output_bits, quotas?)` (§6). `quotas` is an
/// optional JSON object string, e.g. `{"a":0.25,"b":0.75}`.
pub fn handle_finalize(
    round_id: String,
    output_bits: Option<u64>,
    quotas: Option<String>,
    export_bits_file: bool,
) -> CommandResult {
    let config = Config::from_env();
    let store = ManifestStore::new(&config.data_root);

    let output_bits = output_bits.unwrap_or(config.default_output_bits);
    let quotas: Option<BTreeMap<String, f64>> = match quotas {
        Some(raw) => Some(serde_json::from_str(&raw)?),
        None => None,
    };

    let outcome = round::finalize(&store, &round_id, output_bits, quotas)?;
    info!(round_id = %round_id, output_bits, "round finalized");

    if export_bits_file {
        ensure_output_text(&store.output_bits_path(&round_id), &outcome.output, output_bits)?;
    }

    let response = tsrng_types::FinalizeResponse {
        round_id,
        output_hex: hex::encode(&outcome.output),
        selected_indices: outcome.selected_indices,
        t2_iso: outcome.t2_iso,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
