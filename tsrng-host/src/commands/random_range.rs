use tracing::info;

use tsrng_host::{range, Config, ManifestStore};

use crate::commands::CommandResult;

/// `random_range(round_id, start, end, count, domain?, context?, salt_hex?)` (§6).
#[allow(clippy::too_many_arguments)]
pub fn handle_random_range(
    round_id: String,
    start: i64,
    end: i64,
    count: usize,
    domain: Option<String>,
    context: Option<String>,
    salt_hex: Option<String>,
) -> CommandResult {
    let config = Config::from_env();
    let store = ManifestStore::new(&config.data_root);

    let request = tsrng_types::RandomRangeRequest {
        start,
        end,
        count,
        domain: domain.unwrap_or_else(|| "default".to_string()),
        context,
        salt_hex,
    };
    let response = range::random_range(&store, &round_id, request)?;
    info!(
        round_id = %round_id,
        count,
        history_persisted = response.history_persisted,
        "random_range served"
    );
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
