use tsrng_host::{Config, ManifestStore};

use crate::commands::CommandResult;

/// `status(round_id)` (§6): reads the manifest and reports its derived
/// stage, the read side of C7 the transparency routers expose.
pub fn handle_status(round_id: String) -> CommandResult {
    let config = Config::from_env();
    let store = ManifestStore::new(&config.data_root);

    if !store.round_exists(&round_id) {
        return Err(format!("round '{round_id}' not found").into());
    }
    let manifest = store.read_manifest(&round_id)?;
    let response = tsrng_types::StatusResponse {
        round_id,
        stage: manifest.stage(),
        manifest,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
