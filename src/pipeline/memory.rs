//! Correction memory: a bounded, deduplicated log of human-confirmed
//! corrections, persisted as a JSON array file.
//!
//! The in-process copy is authoritative for the running service. Disk is
//! best-effort: an unreadable store loads as empty, and a failed write keeps
//! the in-memory change and reports `RecordOutcome::NotPersisted`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::models::Correction;

/// Maximum number of corrections retained.
pub const MAX_CORRECTIONS: usize = 200;

/// What `record` did with a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    /// An entry with the same original text already exists; nothing changed.
    Duplicate,
    /// Appended and written to disk.
    Persisted,
    /// Appended in memory, but the store file could not be written.
    NotPersisted,
}

pub struct CorrectionMemory {
    path: PathBuf,
    entries: Mutex<Vec<Correction>>,
}

impl CorrectionMemory {
    /// Open the memory backed by `path`, loading whatever is readable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = read_store(&path);
        let dropped =
            dedupe_by_original_text(&mut entries) + evict_oldest(&mut entries, MAX_CORRECTIONS);
        if dropped > 0 {
            tracing::warn!(dropped, "Correction store held duplicate or excess entries");
        }
        tracing::info!(
            path = %path.display(),
            count = entries.len(),
            "Correction memory loaded"
        );
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current corrections, oldest first.
    pub fn load(&self) -> Vec<Correction> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Append a correction unless its original text is already known.
    ///
    /// Evicts the oldest entries beyond `MAX_CORRECTIONS`, then rewrites the
    /// store. The whole read-modify-write runs under the memory's lock.
    pub fn record(&self, mut correction: Correction) -> RecordOutcome {
        let mut entries = self.lock();

        if entries
            .iter()
            .any(|c| c.original_text == correction.original_text)
        {
            tracing::debug!("Correction already known, skipping");
            return RecordOutcome::Duplicate;
        }

        if correction.recorded_at.is_none() {
            correction.recorded_at = Some(chrono::Utc::now());
        }
        entries.push(correction);
        let evicted = evict_oldest(&mut entries, MAX_CORRECTIONS);
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted oldest corrections");
        }

        match write_store(&self.path, &entries) {
            Ok(()) => RecordOutcome::Persisted,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to persist correction memory; keeping in-memory copy"
                );
                RecordOutcome::NotPersisted
            }
        }
    }

    /// The `n` most recently inserted corrections, formatted as context lines.
    pub fn recent_examples(&self, n: usize) -> Vec<String> {
        let entries = self.lock();
        let start = entries.len().saturating_sub(n);
        entries[start..].iter().map(Correction::example_line).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Correction>> {
        // A panic mid-record leaves a valid Vec behind, so poisoning is ignored.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Drop entries from the front until at most `cap` remain.
/// Returns how many were removed.
pub fn evict_oldest<T>(entries: &mut Vec<T>, cap: usize) -> usize {
    let excess = entries.len().saturating_sub(cap);
    if excess > 0 {
        entries.drain(..excess);
    }
    excess
}

/// Keep the first occurrence of each original text. Returns how many were removed.
fn dedupe_by_original_text(entries: &mut Vec<Correction>) -> usize {
    let before = entries.len();
    let mut seen = std::collections::HashSet::new();
    entries.retain(|c| seen.insert(c.original_text.clone()));
    before - entries.len()
}

/// Read the store file. Missing or corrupt files yield an empty memory.
pub fn read_store(path: &Path) -> Vec<Correction> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Correction store unreadable");
            return Vec::new();
        }
    };

    match serde_json::from_slice::<Vec<Correction>>(&bytes) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Correction store corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Write the full set atomically: temp file in the same directory, then rename.
fn write_store(path: &Path, entries: &[Correction]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let json = serde_json::to_vec_pretty(entries)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
