//! Size-bounded archive packaging
//!
//! Accumulates fetched payloads into one or more ZIP parts, sealing the
//! current part whenever adding the next payload would push its uncompressed
//! byte total past the configured threshold. Part boundaries are a pure
//! function of the input order and the threshold, so re-packing an identical
//! outcome sequence reproduces identical parts.

use crate::config::OutputConfig;
use crate::processor::RunHooks;
use crate::types::ArchiveHandle;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::FileOptions;

/// One payload destined for an archive part
pub type PackItem = (String, Vec<u8>);

/// Result of a packaging pass
///
/// Partial success is normal: a part that fails to write is logged and
/// counted, and packaging continues with the remaining items.
#[derive(Debug, Default)]
pub struct PackOutcome {
    /// Parts written successfully, in sequence order
    pub archives: Vec<ArchiveHandle>,
    /// Parts that could not be written
    pub failed_parts: usize,
    /// User-visible log lines emitted while packaging
    pub log: Vec<String>,
}

/// Packages payloads into `{stem}_part{n}.zip` files under an output directory
pub struct ArchivePackager {
    out_dir: PathBuf,
    stem: String,
    max_part_bytes: u64,
}

impl ArchivePackager {
    /// Build a packager from the output configuration
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            out_dir: config.output_dir.clone(),
            stem: config.archive_stem.clone(),
            max_part_bytes: config.max_part_bytes.max(1),
        }
    }

    /// Package payloads into size-bounded ZIP parts
    ///
    /// Items are taken in the given order; within a part, member order is
    /// insertion order. A single payload larger than the threshold still
    /// gets its own part rather than being dropped.
    pub fn pack(&self, items: Vec<PackItem>, hooks: &RunHooks) -> PackOutcome {
        let mut outcome = PackOutcome::default();

        if items.is_empty() {
            return outcome;
        }

        if let Err(e) = std::fs::create_dir_all(&self.out_dir) {
            emit(
                &mut outcome,
                hooks,
                &format!(
                    "[ERROR] Cannot create output directory {}: {}",
                    self.out_dir.display(),
                    e
                ),
            );
            outcome.failed_parts = 1;
            return outcome;
        }

        let mut sequence_index = 0usize;
        let mut current: Vec<PackItem> = Vec::new();
        let mut current_bytes = 0u64;

        for (name, payload) in items {
            let payload_bytes = payload.len() as u64;
            if !current.is_empty() && current_bytes + payload_bytes > self.max_part_bytes {
                sequence_index += 1;
                self.seal_part(
                    std::mem::take(&mut current),
                    sequence_index,
                    &mut outcome,
                    hooks,
                );
                current_bytes = 0;
            }
            current_bytes += payload_bytes;
            current.push((name, payload));
        }

        if !current.is_empty() {
            sequence_index += 1;
            self.seal_part(current, sequence_index, &mut outcome, hooks);
        }

        outcome
    }

    /// Write one sealed part to disk, best-effort
    fn seal_part(
        &self,
        members: Vec<PackItem>,
        sequence_index: usize,
        outcome: &mut PackOutcome,
        hooks: &RunHooks,
    ) {
        let path = self.part_path(sequence_index);
        let member_count = members.len();

        match write_zip(&path, members) {
            Ok(size_bytes) => {
                emit(
                    outcome,
                    hooks,
                    &format!(
                        "[ZIP_CREATED] {}: {} members, {:.1} MB",
                        path.display(),
                        member_count,
                        size_bytes as f64 / (1024.0 * 1024.0)
                    ),
                );
                outcome.archives.push(ArchiveHandle {
                    path,
                    size_bytes,
                    member_count,
                    sequence_index,
                });
            }
            Err(e) => {
                emit(
                    outcome,
                    hooks,
                    &format!("[ERROR] Failed to write {}: {}", path.display(), e),
                );
                outcome.failed_parts += 1;
                // A half-written part is useless; clean it up if present
                std::fs::remove_file(&path).ok();
            }
        }
    }

    fn part_path(&self, sequence_index: usize) -> PathBuf {
        self.out_dir
            .join(format!("{}_part{}.zip", self.stem, sequence_index))
    }
}

/// Write one ZIP file with the given members, returning its on-disk size
fn write_zip(path: &Path, members: Vec<PackItem>) -> crate::error::Result<u64> {
    let file = std::fs::File::create(path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, payload) in members {
        writer.start_file(name, options)?;
        writer.write_all(&payload)?;
    }
    writer.finish()?;

    Ok(std::fs::metadata(path)?.len())
}

fn emit(outcome: &mut PackOutcome, hooks: &RunHooks, line: &str) {
    tracing::debug!(line, "packaging log");
    outcome.log.push(line.to_string());
    hooks.emit_log(line);
}
