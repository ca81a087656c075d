// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Directory-backed response cache.
//!
//! Each cached entity is one file named `{id}_{YYYY-MM-DD}.txt` holding the
//! raw response body. The directory is scanned once into an id -> entry map
//! when the cache is opened; after that only `write`, `remove` and `repair`
//! change the map. Files written by another process are not noticed until
//! `repair` or a fresh `open`.

use crate::error::{AppError, Result};
use crate::time_utils::today;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const ENTRY_EXTENSION: &str = "txt";
const TEMP_EXTENSION: &str = "tmp";

/// Index entry for one cached id.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    filename: String,
    stored_date: NaiveDate,
}

/// Split `{id}_{date}.txt` into its parts.
fn parse_filename(filename: &str) -> Option<(u64, NaiveDate)> {
    let stem = filename.strip_suffix(".txt")?;
    let (id, date) = stem.split_once('_')?;
    let id = id.parse().ok()?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((id, date))
}

fn entry_filename(id: u64, date: NaiveDate) -> String {
    format!("{}_{}.{}", id, date.format("%Y-%m-%d"), ENTRY_EXTENSION)
}

/// Key -> blob store over a flat directory, at most one file per id.
#[derive(Debug)]
pub struct ResponseCache {
    dir: PathBuf,
    index: HashMap<u64, Entry>,
}

impl ResponseCache {
    /// Open (creating if needed) a cache directory and index its entries.
    ///
    /// If the directory already holds several files for one id, the newest
    /// is indexed; `repair` deletes the others.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| AppError::CacheWrite {
            path: dir.clone(),
            source,
        })?;

        let mut index = HashMap::new();
        for (id, mut entries) in scan(&dir)? {
            if let Some(newest) = entries.pop() {
                index.insert(id, newest);
            }
        }

        tracing::debug!(dir = %dir.display(), entries = index.len(), "Opened response cache");
        Ok(Self { dir, index })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Cached ids, ascending.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Filename of the entry for `id`, if one is indexed.
    pub fn contains(&self, id: u64) -> Option<&str> {
        self.index.get(&id).map(|e| e.filename.as_str())
    }

    /// Date the entry for `id` was stored.
    pub fn date_of(&self, id: u64) -> Option<NaiveDate> {
        self.index.get(&id).map(|e| e.stored_date)
    }

    /// Full body of the entry for `id`.
    pub fn read(&self, id: u64) -> Result<Option<String>> {
        let Some(entry) = self.index.get(&id) else {
            return Ok(None);
        };

        let path = self.dir.join(&entry.filename);
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| AppError::CacheRead { path, source })
    }

    /// Store `body` for `id` dated today, replacing any existing entry.
    pub fn write(&mut self, id: u64, body: &[u8]) -> Result<()> {
        self.write_dated(id, body, today())
    }

    /// The body is written under a temp name and renamed into place; the
    /// previous entry is removed only after that succeeds.
    fn write_dated(&mut self, id: u64, body: &[u8], date: NaiveDate) -> Result<()> {
        let filename = entry_filename(id, date);
        let path = self.dir.join(&filename);
        let tmp = self.dir.join(format!("{}.{}", filename, TEMP_EXTENSION));

        let text = String::from_utf8_lossy(body);
        if let Err(source) = fs::write(&tmp, text.as_bytes()).and_then(|_| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(AppError::CacheWrite { path, source });
        }

        let previous = self.index.insert(
            id,
            Entry {
                filename: filename.clone(),
                stored_date: date,
            },
        );
        if let Some(old) = previous.filter(|old| old.filename != filename) {
            let old_path = self.dir.join(&old.filename);
            match fs::remove_file(&old_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                // New entry is already indexed; `repair` prunes the leftover.
                Err(source) => {
                    return Err(AppError::CacheWrite {
                        path: old_path,
                        source,
                    })
                }
            }
        }

        tracing::debug!(id, file = %filename, bytes = body.len(), "Cached response");
        Ok(())
    }

    /// Delete the entry for `id`. Returns whether one existed.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        let Some(entry) = self.index.remove(&id) else {
            return Ok(false);
        };

        let path = self.dir.join(&entry.filename);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            // Already gone on disk; the index was the only stale part.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(source) => {
                self.index.insert(id, entry);
                Err(AppError::CacheWrite { path, source })
            }
        }
    }

    /// Rescan the directory, keep only the newest file per id, and rebuild
    /// the index. Returns the number of files deleted.
    pub fn repair(&mut self) -> Result<usize> {
        let mut index = HashMap::new();
        let mut deleted = 0;

        for (id, mut entries) in scan(&self.dir)? {
            let Some(newest) = entries.pop() else {
                continue;
            };
            for stale in entries {
                let path = self.dir.join(&stale.filename);
                fs::remove_file(&path).map_err(|source| AppError::CacheWrite { path, source })?;
                tracing::info!(id, file = %stale.filename, kept = %newest.filename, "Removed stale cache entry");
                deleted += 1;
            }
            index.insert(id, newest);
        }

        self.index = index;
        Ok(deleted)
    }
}

/// All well-formed entries in `dir`, grouped by id, oldest first.
fn scan(dir: &Path) -> Result<BTreeMap<u64, Vec<Entry>>> {
    let read_err = |source| AppError::CacheRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut grouped: BTreeMap<u64, Vec<Entry>> = BTreeMap::new();
    for item in fs::read_dir(dir).map_err(read_err)? {
        let item = item.map_err(read_err)?;
        let filename = item.file_name().to_string_lossy().into_owned();
        match parse_filename(&filename) {
            Some((id, stored_date)) => grouped.entry(id).or_default().push(Entry {
                filename,
                stored_date,
            }),
            None => tracing::trace!(file = %filename, "Ignoring non-cache file"),
        }
    }

    for entries in grouped.values_mut() {
        entries.sort_by_key(|e| e.stored_date);
    }
    Ok(grouped)
}
