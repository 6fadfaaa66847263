//! Filesystem-backed manifest store: the single source of truth for a
//! round's durable state. All manifest writes are whole-file
//! replacements performed atomically (write to a temp file, fsync,
//! rename) so a crash never leaves a torn manifest on disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};

use tsrng_types::{Manifest, RangeHistoryEntry, SelectedFile, VdfRecord};

use crate::error::ProtocolError;

/// Filesystem layout rooted at `data_root` (see [`crate::config::Config`]).
#[derive(Debug, Clone)]
pub struct ManifestStore {
    data_root: PathBuf,
}

impl ManifestStore {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn round_dir(&self, round_id: &str) -> PathBuf {
        self.data_root.join("rounds").join(round_id)
    }

    /// Allocates a fresh round: a 128-bit random hex identifier with an
    /// empty directory tree ready for leaves.
    pub fn new_round(&self) -> Result<(String, PathBuf), ProtocolError> {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let round_id = hex::encode(bytes);
        let dir = self.round_dir(&round_id);
        fs::create_dir_all(&dir)?;
        Ok((round_id, dir))
    }

    pub fn round_exists(&self, round_id: &str) -> bool {
        self.round_dir(round_id).is_dir()
    }

    /// Lists every round directory name under the store, unordered.
    pub fn list_rounds(&self) -> Result<Vec<String>, ProtocolError> {
        let rounds_dir = self.data_root.join("rounds");
        if !rounds_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&rounds_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }
        Ok(ids)
    }

    pub fn read_manifest(&self, round_id: &str) -> Result<Manifest, ProtocolError> {
        self.read_json(round_id, "manifest.json")
    }

    pub fn write_manifest(&self, round_id: &str, manifest: &Manifest) -> Result<(), ProtocolError> {
        self.write_json_atomic(round_id, "manifest.json", manifest)
    }

    pub fn read_vdf_record(&self, round_id: &str) -> Result<VdfRecord, ProtocolError> {
        self.read_json(round_id, "vdf/proof.json")
    }

    pub fn write_vdf_record(&self, round_id: &str, record: &VdfRecord) -> Result<(), ProtocolError> {
        self.write_json_atomic(round_id, "vdf/proof.json", record)
    }

    pub fn read_selected(&self, round_id: &str) -> Result<SelectedFile, ProtocolError> {
        self.read_json(round_id, "selected.json")
    }

    pub fn write_selected(&self, round_id: &str, selected: &SelectedFile) -> Result<(), ProtocolError> {
        self.write_json_atomic(round_id, "selected.json", selected)
    }

    /// `leaves_meta.json`: stream -> leaf count, written once at commit.
    /// Duplicates `manifest.streams` as a standalone artifact entry
    /// because the package layout (§6) names it as its own file.
    pub fn write_leaves_meta(
        &self,
        round_id: &str,
        streams: &tsrng_types::StreamCounts,
    ) -> Result<(), ProtocolError> {
        self.write_json_atomic(round_id, "leaves_meta.json", streams)
    }

    pub fn read_leaves_meta(&self, round_id: &str) -> Result<tsrng_types::StreamCounts, ProtocolError> {
        self.read_json(round_id, "leaves_meta.json")
    }

    pub fn leaf_path(&self, round_id: &str, stream: &str, index: usize) -> PathBuf {
        self.round_dir(round_id)
            .join("leaves")
            .join(stream)
            .join(format!("{index}.leaf"))
    }

    pub fn proof_path(&self, round_id: &str, stream: &str, index: usize) -> PathBuf {
        self.round_dir(round_id)
            .join("proofs")
            .join(stream)
            .join(format!("{index}.proof"))
    }

    pub fn write_leaf(&self, round_id: &str, stream: &str, index: usize, data: &[u8]) -> Result<(), ProtocolError> {
        let path = self.leaf_path(round_id, stream, index);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    pub fn read_leaf(&self, round_id: &str, stream: &str, index: usize) -> Result<Vec<u8>, ProtocolError> {
        Ok(fs::read(self.leaf_path(round_id, stream, index))?)
    }

    pub fn stream_leaf_count(&self, round_id: &str, stream: &str) -> Result<usize, ProtocolError> {
        let dir = self.round_dir(round_id).join("leaves").join(stream);
        if !dir.is_dir() {
            return Ok(0);
        }
        Ok(fs::read_dir(dir)?.count())
    }

    pub fn write_output(&self, round_id: &str, bytes: &[u8]) -> Result<(), ProtocolError> {
        fs::write(self.round_dir(round_id).join("output.bin"), bytes)?;
        Ok(())
    }

    pub fn read_output(&self, round_id: &str) -> Result<Vec<u8>, ProtocolError> {
        Ok(fs::read(self.round_dir(round_id).join("output.bin"))?)
    }

    pub fn output_bits_path(&self, round_id: &str) -> PathBuf {
        self.round_dir(round_id).join("output_bits.txt")
    }

    /// Appends one JSON line to `random_ranges.jsonl`. Failure here is
    /// non-fatal to the caller (§4.10); returns whether the append
    /// succeeded so the caller can flag it in the response.
    pub fn append_range_history(&self, round_id: &str, entry: &RangeHistoryEntry) -> bool {
        let path = self.round_dir(round_id).join("random_ranges.jsonl");
        let result = (|| -> Result<(), ProtocolError> {
            let line = serde_json::to_string(entry)?;
            let mut file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
            writeln!(file, "{line}")?;
            Ok(())
        })();
        result.is_ok()
    }

    pub fn read_range_history(&self, round_id: &str) -> Result<Vec<RangeHistoryEntry>, ProtocolError> {
        let path = self.round_dir(round_id).join("random_ranges.jsonl");
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        let mut entries = Vec::new();
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            entries.push(serde_json::from_str(line)?);
        }
        Ok(entries)
    }

    fn read_json<T: DeserializeOwned>(&self, round_id: &str, rel_path: &str) -> Result<T, ProtocolError> {
        let path = self.round_dir(round_id).join(rel_path);
        let contents = fs::read_to_string(&path)
            .map_err(|_| ProtocolError::MissingArtifactEntry(rel_path.to_string()))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_json_atomic<T: Serialize>(
        &self,
        round_id: &str,
        rel_path: &str,
        value: &T,
    ) -> Result<(), ProtocolError> {
        let path = self.round_dir(round_id).join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_json_atomic(&path, value)
    }
}

/// Writes `value` as pretty JSON to `path` by way of a sibling temp file:
/// write, fsync, rename. The rename is atomic on POSIX filesystems, so a
/// reader never observes a partially written manifest.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), ProtocolError> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path)?;
        let json = serde_json::to_string_pretty(value)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<(), ProtocolError> {
    fs::create_dir_all(path)?;
    Ok(())
}
