// On-disk snapshot of the record set: one pretty-printed JSON array

use crate::record::Todo;
use eyre::{Context, Result, eyre};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Read every record from a snapshot file
///
/// A missing or zero-length file yields an empty set. Anything else that is
/// not a JSON array of records, each with a non-nil id, is an error.
pub fn read_snapshot(path: &Path) -> Result<Vec<Todo>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(file = ?path, "Snapshot file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read snapshot {}", path.display())),
    };

    if content.trim().is_empty() {
        info!(file = ?path, "Snapshot file is empty, starting empty");
        return Ok(Vec::new());
    }

    let records: Vec<Todo> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    if let Some(pos) = records.iter().position(|r| !r.has_id()) {
        return Err(eyre!("Record {} in snapshot {} has a nil id", pos, path.display()));
    }

    info!(file = ?path, count = records.len(), "Loaded records from snapshot");
    Ok(records)
}

/// Replace the snapshot file with `records`
///
/// The array is written to a sibling temp file, synced, then renamed over
/// the target so a crash never leaves a truncated snapshot behind.
pub fn write_snapshot(path: &Path, records: &[Todo]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
    }

    let tmp_path = temp_path(path);
    let file = File::create(&tmp_path).context("Failed to create temp snapshot file")?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, records).context("Failed to serialize records")?;
    writer.write_all(b"\n")?;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    fs::rename(&tmp_path, path).context("Failed to replace snapshot file")?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
