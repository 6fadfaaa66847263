use tracing::{info, warn};

use tsrng_host::verify::verify_directory;

use crate::commands::CommandResult;

/// `verify(package_bytes)` (§6), restricted to the directory-tree form
/// of the artifact (`finalize`'s own output layout); archive formats are
/// an external collaborator's concern (§1).
pub fn handle_verify(package_dir: String) -> CommandResult {
    let outcome = verify_directory(&package_dir);
    if outcome.ok {
        info!(package = %package_dir, raw_verified = outcome.raw_verified, "artifact verified");
    } else {
        warn!(package = %package_dir, reason = %outcome.reason, "artifact rejected");
    }

    let response = tsrng_types::VerifyResponse {
        ok: outcome.ok,
        reason: outcome.reason,
        raw_verified: outcome.raw_verified,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.ok {
        return Err(format!("verification failed: {}", response.reason).into());
    }
    Ok(())
}
