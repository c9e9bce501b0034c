//! Incremental JSON record artifact
//!
//! The artifact is a JSON array of `{"URL", "content"}` objects, one per line.
//! Each record is appended by truncating the closing `]`, writing the record,
//! and writing `]` again, then syncing. The file is valid JSON after every
//! append, so an interrupted run leaves every completed record readable.

use crate::output::traits::{OutputError, OutputResult, PageOutcome, Record, Sink};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const CLOSING: &[u8] = b"\n]\n";

/// Sink for content-scraping and replay modes
#[derive(Debug)]
pub struct JsonRecordSink {
    file: File,
    /// Byte offset where the closing bracket starts
    body_end: u64,
    count: usize,
    /// URLs already written; a URL gets at most one record
    urls: HashSet<String>,
}

impl JsonRecordSink {
    /// Opens the record artifact at `path`
    ///
    /// With `resume` set and the file present, its records are kept in place
    /// and returned so their URLs can be treated as already visited; new
    /// records are appended after them without rewriting the file. A file that
    /// is not a record array is moved aside to `<name>.bak` (or `<name>.bak.N`
    /// if that is taken) and the artifact starts empty.
    ///
    /// # Returns
    ///
    /// * `Ok((sink, records))` - The sink and any records carried over
    /// * `Err(OutputError)` - The artifact could not be created
    pub fn open(path: &Path, resume: bool) -> OutputResult<(Self, Vec<Record>)> {
        if resume && path.exists() {
            match parse_artifact(path) {
                Ok((records, body_end)) => {
                    let sink = Self::reopen(path, &records, body_end)?;
                    return Ok((sink, records));
                }
                Err(e) => {
                    let backup = backup_path(path);
                    tracing::warn!(
                        "Existing output {} is unreadable ({}); moving it to {}",
                        path.display(),
                        e,
                        backup.display()
                    );
                    fs::rename(path, &backup)?;
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut sink = Self {
            file,
            body_end: 0,
            count: 0,
            urls: HashSet::new(),
        };
        sink.write_header()?;
        Ok((sink, Vec::new()))
    }

    /// Continues an existing artifact whose last record ends at `body_end`
    fn reopen(path: &Path, records: &[Record], body_end: u64) -> OutputResult<Self> {
        let file = OpenOptions::new().write(true).open(path)?;

        Ok(Self {
            file,
            body_end,
            count: records.len(),
            urls: records.iter().map(|r| r.url.clone()).collect(),
        })
    }

    fn write_header(&mut self) -> OutputResult<()> {
        self.file.write_all(b"[")?;
        self.file.write_all(CLOSING)?;
        self.file.sync_data()?;
        self.body_end = 1;
        Ok(())
    }

    /// Appends one record and leaves the file a complete array
    ///
    /// A record for a URL that is already in the artifact is dropped.
    pub fn append(&mut self, record: &Record) -> OutputResult<()> {
        if self.urls.contains(&record.url) {
            tracing::debug!("Already recorded {}", record.url);
            return Ok(());
        }

        let mut chunk = Vec::new();
        if self.count > 0 {
            chunk.push(b',');
        }
        chunk.push(b'\n');
        serde_json::to_writer(&mut chunk, record)?;

        self.file.set_len(self.body_end)?;
        self.file.seek(SeekFrom::Start(self.body_end))?;
        self.file.write_all(&chunk)?;
        self.file.write_all(CLOSING)?;
        self.file.sync_data()?;

        self.body_end += chunk.len() as u64;
        self.count += 1;
        self.urls.insert(record.url.clone());
        Ok(())
    }
}

impl Sink for JsonRecordSink {
    /// Failed fetches produce no record
    fn record(&mut self, outcome: &PageOutcome) -> OutputResult<()> {
        match outcome {
            PageOutcome::Fetched { url, content, .. } => self.append(&Record {
                url: url.clone(),
                content: content.clone().unwrap_or_default(),
            }),
            PageOutcome::Failed { .. } => Ok(()),
        }
    }

    fn end_batch(&mut self) -> OutputResult<()> {
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.file.sync_all()?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.count
    }
}

/// Reads a record artifact
pub fn read_records(path: &Path) -> OutputResult<Vec<Record>> {
    parse_artifact(path).map(|(records, _)| records)
}

/// Parses an artifact and finds the offset just past its last record
///
/// A valid array ends with `]` followed only by whitespace, so the body ends
/// at the last non-whitespace byte before that bracket.
fn parse_artifact(path: &Path) -> OutputResult<(Vec<Record>, u64)> {
    let content = fs::read_to_string(path)?;
    let corrupt = |message: String| OutputError::Corrupt {
        path: path.display().to_string(),
        message,
    };

    let records: Vec<Record> =
        serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;

    let body = content
        .trim_end()
        .strip_suffix(']')
        .ok_or_else(|| corrupt("missing closing bracket".to_string()))?;
    let body_end = body.trim_end().len() as u64;

    Ok((records, body_end))
}

/// First of `<name>.bak`, `<name>.bak.1`, ... that does not exist yet
fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();

    (0u32..)
        .map(|n| {
            let mut candidate = name.clone();
            candidate.push(".bak");
            if n > 0 {
                candidate.push(format!(".{}", n));
            }
            path.with_file_name(candidate)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.with_extension("bak"))
}
