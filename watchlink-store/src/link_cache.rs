//! TTL link cache.
//!
//! One JSON document maps work ids to their latest [`CacheEntry`]. Entries
//! are never deleted; expiry is decided on read. On flush the file is
//! re-read and only the keys this process changed are written over it, so
//! another writer's updates to other works survive.
//!
//! No file lock is taken. Run one writing process per cache file; two
//! processes flushing at the same instant can still lose the earlier write.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use watchlink_core::CacheEntry;

use crate::error::StoreError;
use crate::persistence::{load_json, save_json};

// ============================================================================
// Document
// ============================================================================

/// On-disk layout of the cache file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    /// Entries keyed by work id.
    #[serde(default)]
    pub movies: BTreeMap<String, CacheEntry>,
    /// When the file was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl CacheDocument {
    /// Reads the document at `path`.
    ///
    /// Returns an empty document when the file is missing or unparseable.
    pub async fn read(path: &Path) -> Self {
        match load_json(path).await {
            Ok(doc) => doc,
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Cache file not found, starting empty");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache file unreadable, starting empty");
                Self::default()
            }
        }
    }
}

// ============================================================================
// Expiry
// ============================================================================

/// Returns true if `entry` should no longer be served at `now`.
///
/// `expires_at` wins when present; otherwise `scraped_at + ttl`. Entries
/// with neither timestamp never expire, nor do entries whose
/// `scraped_at + ttl` lies past the representable range.
pub fn is_expired(entry: &CacheEntry, now: DateTime<Utc>, ttl: Duration) -> bool {
    match (entry.expires_at, entry.scraped_at) {
        (Some(expires_at), _) => now >= expires_at,
        (None, Some(scraped_at)) => scraped_at
            .checked_add_signed(ttl)
            .is_some_and(|expires_at| now >= expires_at),
        (None, None) => {
            debug!(service = entry.service(), "Legacy entry without timestamps, treating as fresh");
            false
        }
    }
}

/// Summary counts over the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// All entries.
    pub total: usize,
    /// Entries still served.
    pub fresh: usize,
    /// Entries past their expiry.
    pub expired: usize,
    /// Entries carrying a link.
    pub positive: usize,
    /// Entries recording a miss or failure.
    pub negative: usize,
}

// ============================================================================
// Link Cache
// ============================================================================

/// In-memory view of the cache file plus the set of keys changed since load.
#[derive(Debug)]
pub struct LinkCache {
    path: PathBuf,
    ttl: Duration,
    entries: BTreeMap<String, CacheEntry>,
    dirty: BTreeSet<String>,
}

impl LinkCache {
    /// Creates an empty cache bound to `path`.
    pub fn empty(path: impl Into<PathBuf>, ttl_days: u32) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::days(i64::from(ttl_days)),
            entries: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Loads the cache from `path`. Missing or unreadable files give an empty cache.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>, ttl_days: u32) -> Self {
        let path = path.as_ref();
        let doc = CacheDocument::read(path).await;
        debug!(entries = doc.movies.len(), "Loaded link cache");

        Self {
            entries: doc.movies,
            ..Self::empty(path, ttl_days)
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the TTL applied to entries without `expires_at`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the expiry to stamp on an entry written at `now`.
    ///
    /// Saturates at the latest representable instant.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Gets the entry for a work, expired or not.
    pub fn get(&self, work_id: &str) -> Option<&CacheEntry> {
        self.entries.get(work_id)
    }

    /// Gets the entry for a work only if it is still fresh at `now`.
    pub fn get_fresh(&self, work_id: &str, now: DateTime<Utc>) -> Option<&CacheEntry> {
        self.get(work_id).filter(|entry| !self.is_expired(entry, now))
    }

    /// Stores the latest result for a work, replacing any previous entry.
    pub fn put(&mut self, work_id: impl Into<String>, entry: CacheEntry) {
        let work_id = work_id.into();
        debug!(work_id = %work_id, service = entry.service(), success = entry.success, "Caching entry");
        self.dirty.insert(work_id.clone());
        self.entries.insert(work_id, entry);
    }

    /// Returns true if `entry` is expired at `now` under this cache's TTL.
    pub fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        is_expired(entry, now, self.ttl)
    }

    /// Returns true if there are unflushed changes.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in work-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Counts fresh, expired, positive and negative entries at `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in self.entries.values() {
            stats.total += 1;
            if self.is_expired(entry, now) {
                stats.expired += 1;
            } else {
                stats.fresh += 1;
            }
            if entry.streaming.link.is_some() {
                stats.positive += 1;
            } else {
                stats.negative += 1;
            }
        }
        stats
    }

    /// Writes changed entries to disk.
    ///
    /// Re-reads the file, overlays this process's changed keys, and writes
    /// the merged document atomically. The in-memory view then reflects the
    /// merged file. A clean cache writes nothing.
    #[instrument(skip(self), fields(path = %self.path.display(), dirty = self.dirty.len()))]
    pub async fn flush(&mut self) -> Result<(), StoreError> {
        if self.dirty.is_empty() {
            debug!("Link cache clean, nothing to flush");
            return Ok(());
        }

        let mut doc = CacheDocument::read(&self.path).await;
        for work_id in &self.dirty {
            if let Some(entry) = self.entries.get(work_id) {
                doc.movies.insert(work_id.clone(), entry.clone());
            }
        }
        doc.last_updated = Some(Utc::now());

        save_json(&self.path, &doc).await?;

        info!(written = self.dirty.len(), total = doc.movies.len(), "Flushed link cache");
        self.entries = doc.movies;
        self.dirty.clear();
        Ok(())
    }
}
