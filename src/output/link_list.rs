//! Sorted link list artifact
//!
//! The artifact is UTF-8 text, one canonical URL per line, sorted, with no
//! other content. It is rewritten in full after every batch through a
//! temporary file and a rename, so it always matches the last completed batch.

use crate::output::traits::{OutputResult, PageOutcome, Sink};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sink for link-generation mode
#[derive(Debug)]
pub struct LinkListSink {
    path: PathBuf,
    urls: BTreeSet<String>,
}

impl LinkListSink {
    /// Opens the link list at `path`
    ///
    /// With `resume` set and the file present, its URLs are loaded so the run
    /// extends the previous one. Otherwise the sink starts empty; the file is
    /// not touched until the first batch completes.
    pub fn open(path: &Path, resume: bool) -> OutputResult<Self> {
        let urls = if resume && path.exists() {
            read_link_list(path)?.into_iter().collect()
        } else {
            BTreeSet::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            urls,
        })
    }

    /// URLs currently held, in output order
    pub fn urls(&self) -> &BTreeSet<String> {
        &self.urls
    }

    fn write_snapshot(&self) -> OutputResult<()> {
        let tmp_path = temp_path(&self.path);

        {
            let mut file = fs::File::create(&tmp_path)?;
            for url in &self.urls {
                writeln!(file, "{}", url)?;
            }
            file.sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl Sink for LinkListSink {
    /// Every dispatched URL is listed, whether or not its fetch succeeded
    fn record(&mut self, outcome: &PageOutcome) -> OutputResult<()> {
        self.urls.insert(outcome.url().to_string());
        Ok(())
    }

    fn end_batch(&mut self) -> OutputResult<()> {
        self.write_snapshot()
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.write_snapshot()
    }

    fn len(&self) -> usize {
        self.urls.len()
    }
}

/// Reads a link list: one URL per line, blank lines ignored
pub fn read_link_list(path: &Path) -> OutputResult<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
