use serde::Serialize;

use tsrng_host::{Config, ManifestStore};

use crate::commands::CommandResult;

#[derive(Serialize)]
struct RoundSummary {
    round_id: String,
    stage: tsrng_types::RoundStage,
    round_label: String,
}

/// Transparency read surface supplementing C7/C10 (`original_source/`'s
/// `routers/transparency.py`): list every round and its stage, or, with
/// `--round`, dump its VDF record, selection record and range-call
/// history alongside the manifest already covered by `status`.
pub fn handle_list(round_id: Option<String>) -> CommandResult {
    let config = Config::from_env();
    let store = ManifestStore::new(&config.data_root);

    match round_id {
        None => {
            let mut summaries = Vec::new();
            for id in store.list_rounds()? {
                if let Ok(manifest) = store.read_manifest(&id) {
                    summaries.push(RoundSummary {
                        round_id: id,
                        stage: manifest.stage(),
                        round_label: manifest.round_label,
                    });
                }
            }
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Some(id) => {
            if !store.round_exists(&id) {
                return Err(format!("round '{id}' not found").into());
            }
            let manifest = store.read_manifest(&id)?;
            let vdf_record = store.read_vdf_record(&id).ok();
            let selected = store.read_selected(&id).ok();
            let history = store.read_range_history(&id).unwrap_or_default();

            let detail = serde_json::json!({
                "round_id": id,
                "stage": manifest.stage(),
                "manifest": manifest,
                "vdf_record": vdf_record,
                "selected": selected,
                "range_history": history,
            });
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
    }
    Ok(())
}
