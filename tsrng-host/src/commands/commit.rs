use std::collections::BTreeMap;

use base64::Engine as _;
use rand::RngCore;
use tracing::info;

use tsrng_host::{round, Config, ManifestStore};

use crate::commands::CommandResult;

/// `commit(round_label, streams, leaf_size_bytes)` (§6).
///
/// `request` points at a JSON file shaped like the logical
/// `CommitRequest` (stream name -> base64-encoded leaves); `demo`
/// instead fills `demo_streams` with OS-random leaves of `leaf_size`
/// bytes each, the self-seeding convenience the original service calls
/// `DemoCommitRequest`.
pub fn handle_commit(
    label: String,
    request: Option<String>,
    demo_streams: Vec<String>,
    leaf_size: usize,
) -> CommandResult {
    let config = Config::from_env();
    let store = ManifestStore::new(&config.data_root);

    let (streams, leaf_size_bytes) = if let Some(path) = request {
        let text = std::fs::read_to_string(&path)?;
        let req: tsrng_types::CommitRequest = serde_json::from_str(&text)?;
        let mut out = BTreeMap::new();
        for (name, leaves_b64) in req.streams {
            let mut leaves = Vec::with_capacity(leaves_b64.len());
            for leaf_b64 in leaves_b64 {
                leaves.push(base64::engine::general_purpose::STANDARD.decode(leaf_b64)?);
            }
            out.insert(name, leaves);
        }
        (out, req.leaf_size_bytes)
    } else {
        (demo_commit_streams(&demo_streams, leaf_size), leaf_size)
    };

    let manifest = round::commit(&store, label, streams, leaf_size_bytes)?;
    info!(round_id = %manifest.round_id, merkle_root = %manifest.merkle_root_hex, "round committed");
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}

/// Parses `name=count` pairs and fills each with `count` OS-random
/// leaves of `leaf_size` bytes, for local experimentation without a
/// real entropy collector wired up.
fn demo_commit_streams(specs: &[String], leaf_size: usize) -> BTreeMap<String, Vec<Vec<u8>>> {
    let mut rng = rand::thread_rng();
    let mut streams = BTreeMap::new();
    for spec in specs {
        let Some((name, count_str)) = spec.split_once('=') else {
            continue;
        };
        let count: usize = count_str.parse().unwrap_or(0);
        let mut leaves = Vec::with_capacity(count);
        for _ in 0..count {
            let mut leaf = vec![0u8; leaf_size];
            rng.fill_bytes(&mut leaf);
            leaves.push(leaf);
        }
        streams.insert(name.to_string(), leaves);
    }
    if streams.is_empty() {
        let mut leaf = vec![0u8; leaf_size];
        rng.fill_bytes(&mut leaf);
        streams.insert("demo".to_string(), vec![leaf]);
    }
    streams
}
