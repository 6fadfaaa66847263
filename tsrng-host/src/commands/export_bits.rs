use tsrng_core::bitstring::ensure_output_text;
use tsrng_host::{Config, ManifestStore};

use crate::commands::CommandResult;

/// Idempotently renders a finalized round's `output.bin` as
/// `output_bits.txt` (C11), standalone from `finalize --export-bits`.
pub fn handle_export_bits(round_id: String) -> CommandResult {
    let config = Config::from_env();
    let store = ManifestStore::new(&config.data_root);

    if !store.round_exists(&round_id) {
        return Err(format!("round '{round_id}' not found").into());
    }
    let manifest = store.read_manifest(&round_id)?;
    let output_bits = manifest
        .output_bits
        .ok_or("round has not been finalized; output_bits is unset")?;
    let output = store.read_output(&round_id)?;

    ensure_output_text(&store.output_bits_path(&round_id), &output, output_bits)?;
    println!(
        "wrote {} ({} bits)",
        store.output_bits_path(&round_id).display(),
        output_bits
    );
    Ok(())
}
