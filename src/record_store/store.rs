//! Record Store - durable append-only feeding log
//!
//! Records are appended as JSON lines to `feedings.jsonl` and synced to disk
//! before `append` returns. The full log is replayed into memory on open so
//! reads never touch the file.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{FeedingResult, StorageError, StorageResult};
use crate::types::{FeedingRecord, NewFeeding};
use crate::validation::validate_new_feeding;

/// Configuration for the RecordStore
#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    /// Path to the data directory
    pub data_dir: PathBuf,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl RecordStoreConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to feedings.jsonl
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join("feedings.jsonl")
    }
}

/// Outcome of replaying the log file
struct Replay {
    records: Vec<FeedingRecord>,
    /// Byte length of the well-formed prefix
    valid_len: u64,
    /// Whether the well-formed prefix ends with a newline
    terminated: bool,
}

struct StoreState {
    file: File,
    /// Current committed length of the log in bytes
    len: u64,
    records: Vec<FeedingRecord>,
    next_id: u64,
    /// Set when a failed write could not be rolled back
    unavailable: Option<String>,
}

impl StoreState {
    fn ensure_available(&self) -> StorageResult<()> {
        match &self.unavailable {
            Some(reason) => Err(StorageError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.file.write_all(line)?;
        self.file.sync_data()
    }
}

/// Durable, id-ordered store of feeding records
///
/// Appends are serialized behind the write lock; `list` calls share the read lock.
pub struct RecordStore {
    config: RecordStoreConfig,
    state: RwLock<StoreState>,
}

impl RecordStore {
    /// Open (or create) the store in the configured data directory
    pub fn open(config: RecordStoreConfig) -> StorageResult<Self> {
        fs::create_dir_all(config.data_dir())?;

        let path = config.records_path();
        let replay = Self::replay(&path)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        let on_disk = file.metadata()?.len();
        if on_disk > replay.valid_len {
            warn!(
                path = %path.display(),
                dropped_bytes = on_disk - replay.valid_len,
                "Truncating torn write at end of record log"
            );
            file.set_len(replay.valid_len)?;
            file.sync_all()?;
        }

        let mut len = replay.valid_len;
        if !replay.terminated {
            file.write_all(b"\n")?;
            file.sync_data()?;
            len += 1;
        }

        let next_id = replay.records.last().map_or(1, |r| r.id + 1);

        info!(
            path = %path.display(),
            records = replay.records.len(),
            next_id,
            "Opened record store"
        );

        Ok(Self {
            config,
            state: RwLock::new(StoreState {
                file,
                len,
                records: replay.records,
                next_id,
                unavailable: None,
            }),
        })
    }

    /// Replay the log, validating every line and id ordering
    fn replay(path: &Path) -> StorageResult<Replay> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut records: Vec<FeedingRecord> = Vec::new();
        let mut valid_len = 0usize;
        let mut terminated = true;

        for (line_idx, chunk) in content.split_inclusive(|b| *b == b'\n').enumerate() {
            let has_newline = chunk.ends_with(b"\n");
            let line = chunk
                .strip_suffix(b"\n")
                .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
                .unwrap_or(chunk);

            if line.iter().all(u8::is_ascii_whitespace) {
                valid_len += chunk.len();
                terminated = has_newline;
                continue;
            }

            // A torn append may cut a multi-byte character in half
            let parsed = std::str::from_utf8(line)
                .map_err(|e| e.to_string())
                .and_then(|line| FeedingRecord::from_json_line(line).map_err(|e| e.to_string()));

            let record = match parsed {
                Ok(record) => record,
                // Only the unterminated tail can be a torn append
                Err(_) if !has_newline => break,
                Err(reason) => {
                    return Err(StorageError::Corrupted {
                        line: line_idx + 1,
                        reason,
                    })
                }
            };

            if let Some(last) = records.last() {
                if record.id <= last.id {
                    return Err(StorageError::Corrupted {
                        line: line_idx + 1,
                        reason: format!("id {} does not follow id {}", record.id, last.id),
                    });
                }
            }

            records.push(record);
            valid_len += chunk.len();
            terminated = has_newline;
        }

        Ok(Replay {
            records,
            valid_len: valid_len as u64,
            terminated,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &RecordStoreConfig {
        &self.config
    }

    /// Validate and durably append a new record
    ///
    /// The record is synced to disk before it becomes visible to `list`.
    pub fn append(&self, new: &NewFeeding) -> FeedingResult<FeedingRecord> {
        let new = validate_new_feeding(new)?;

        let mut state = self.state.write();
        state.ensure_available()?;

        let record = FeedingRecord {
            id: state.next_id,
            bird_type: new.bird_type,
            food_type: new.food_type,
            quantity: new.quantity,
            location: new.location,
            notes: new.notes,
            created_at: Utc::now(),
        };

        let mut line = record.to_json_line().map_err(StorageError::from)?;
        line.push('\n');

        if let Err(write_err) = state.write_line(line.as_bytes()) {
            let committed = state.len;
            if let Err(rollback_err) = state.file.set_len(committed) {
                error!(
                    error = %rollback_err,
                    "Failed to roll back partial append; record store is now unavailable"
                );
                state.unavailable = Some(format!(
                    "append failed ({}) and rollback failed ({})",
                    write_err, rollback_err
                ));
            }
            return Err(StorageError::Io(write_err).into());
        }

        state.len += line.len() as u64;
        state.next_id += 1;
        state.records.push(record.clone());

        debug!(id = record.id, "Appended feeding record");
        Ok(record)
    }

    /// List records in insertion order
    ///
    /// With a limit, only the most recent `limit` records are returned (still oldest first).
    pub fn list(&self, limit: Option<usize>) -> StorageResult<Vec<FeedingRecord>> {
        let state = self.state.read();
        state.ensure_available()?;

        let skip = limit.map_or(0, |limit| state.records.len().saturating_sub(limit));
        Ok(state.records[skip..].to_vec())
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Put the store in the state left by a failed rollback
    #[cfg(test)]
    pub(crate) fn mark_unavailable(&self, reason: &str) {
        self.state.write().unavailable = Some(reason.to_string());
    }
}
