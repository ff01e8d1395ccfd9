//! File-backed journal using JSON lines, one accepted mutation per line.
//!
//! Each line is written whole and synced before the append succeeds. A line
//! left incomplete by a crash is cut off when the journal is next opened,
//! and a failed append truncates the file back to its last complete line.

use std::fs::{self, create_dir_all, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::core::{Journal, JournalEntry, ScheduleError};

/// Append-only journal persisted at `<path>/<stream>_journal.jsonl`.
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    stream: String,
    file: File,
    len: u64,
}

fn backend(err: impl std::fmt::Display) -> ScheduleError {
    ScheduleError::TransientStoreFailure(err.to_string())
}

impl FileJournal {
    /// Open (creating if needed) the journal for `stream` under `path`.
    ///
    /// # Errors
    ///
    /// `TransientStoreFailure` when the directory or file cannot be opened.
    pub fn open(path: impl AsRef<Path>, stream: impl Into<String>) -> Result<Self, ScheduleError> {
        let path = path.as_ref().to_path_buf();
        let stream = stream.into();
        create_dir_all(&path).map_err(backend)?;
        let file_path = path.join(format!("{stream}_journal.jsonl"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .map_err(backend)?;

        let contents = fs::read(&file_path).map_err(backend)?;
        let complete = contents
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        let len = u64::try_from(complete).map_err(backend)?;
        if complete < contents.len() {
            tracing::warn!(
                path = %file_path.display(),
                torn_bytes = contents.len() - complete,
                "discarding incomplete trailing journal line"
            );
            file.set_len(len).map_err(backend)?;
        }
        Ok(Self {
            path,
            stream,
            file,
            len,
        })
    }

    /// Location of the journal file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.path.join(format!("{}_journal.jsonl", self.stream))
    }
}

impl Journal for FileJournal {
    fn append(&mut self, entry: &JournalEntry) -> Result<(), ScheduleError> {
        let mut line = serde_json::to_vec(entry).map_err(backend)?;
        line.push(b'\n');
        let written = self
            .file
            .write_all(&line)
            .and_then(|()| self.file.sync_data());
        if let Err(err) = written {
            if let Err(trim) = self.file.set_len(self.len) {
                tracing::error!(error = %trim, "could not trim partial journal line");
            }
            return Err(backend(err));
        }
        self.len += u64::try_from(line.len()).map_err(backend)?;
        Ok(())
    }

    fn replay(&self) -> Result<Vec<JournalEntry>, ScheduleError> {
        let file = OpenOptions::new()
            .read(true)
            .open(self.file_path())
            .map_err(backend)?;
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(backend)?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line).map_err(backend)?);
        }
        Ok(entries)
    }
}
