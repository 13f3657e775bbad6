//! TTL-cached front for the raw-table source.
//!
//! Wraps a [`RawTableSource`] with a configurable time-to-live cache and
//! transparent retry logic. Callers use [`TableManager::get_table`] to obtain
//! fresh-or-cached table bytes; the manager handles staleness checks, up to
//! three fetch attempts with back-off, and graceful fallback to the previous
//! cache on transient failure. Cache invalidation is explicit
//! ([`TableManager::invalidate`]) or time-based.

use std::thread;
use std::time::{Duration, Instant};

use pantry_core::error::{PantryError, Result};

use crate::source::RawTableSource;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds (mirrors the original dashboard's 5-minute
/// download cache).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Maximum number of fetch attempts before giving up.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── TableManager ──────────────────────────────────────────────────────────────

/// TTL-cached wrapper around a raw-table source.
///
/// # Example
/// ```no_run
/// use pantry_runtime::manager::TableManager;
/// use pantry_runtime::source::FileSource;
///
/// let mut mgr = TableManager::new(Box::new(FileSource::new("table.csv")), 300);
/// let bytes = mgr.get_table(false).expect("table bytes");
/// println!("{} bytes", bytes.len());
/// ```
pub struct TableManager {
    /// Where the table bytes come from.
    source: Box<dyn RawTableSource>,
    /// Maximum age of cached bytes before they are considered stale.
    cache_ttl: Duration,
    /// Most recently fetched table bytes.
    cached: Option<Vec<u8>>,
    /// When the cache was last populated.
    fetched_at: Option<Instant>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
}

impl TableManager {
    /// Create a new manager over `source` with a TTL of `cache_ttl_secs`.
    pub fn new(source: Box<dyn RawTableSource>, cache_ttl_secs: u64) -> Self {
        Self {
            source,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cached: None,
            fetched_at: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the table bytes, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed and a fresh fetch
    /// is always attempted. On fetch failure the previous cache (if any) is
    /// returned as a best-effort fallback; with no cache to fall back on the
    /// fetch error is surfaced.
    ///
    /// The fetch is retried up to [`MAX_RETRY_ATTEMPTS`] times with
    /// back-off (0 ms → 100 ms → 200 ms).
    pub fn get_table(&mut self, force_refresh: bool) -> Result<&[u8]> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached table bytes");
            // The validity check guarantees the cache is populated.
            return Ok(self.cached.as_deref().unwrap_or_default());
        }

        match self.fetch_with_retry() {
            Ok(bytes) => {
                tracing::debug!(
                    bytes = bytes.len(),
                    source = %self.source.describe(),
                    "table cache updated"
                );
                self.cached = Some(bytes);
                self.fetched_at = Some(Instant::now());
                self.last_error = None;
                Ok(self.cached.as_deref().unwrap_or_default())
            }
            Err(e) => {
                let message = e.to_string();
                self.last_error = Some(message.clone());
                match self.cached.as_deref() {
                    Some(stale) => {
                        tracing::warn!(error = %message, "fetch failed; serving stale table bytes");
                        Ok(stale)
                    }
                    None => Err(PantryError::Fetch(message)),
                }
            }
        }
    }

    /// Discard the current cache, forcing the next [`TableManager::get_table`]
    /// call to fetch.
    pub fn invalidate(&mut self) {
        self.cached = None;
        self.fetched_at = None;
        tracing::debug!("table cache invalidated");
    }

    /// Age of the current cache entry, or `None` if nothing has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.fetched_at.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when the cache holds bytes that are still within their TTL.
    fn is_cache_valid(&self) -> bool {
        match (self.cached.as_ref(), self.fetched_at) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    /// Attempt up to [`MAX_RETRY_ATTEMPTS`] fetches with back-off.
    ///
    /// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
    fn fetch_with_retry(&mut self) -> Result<Vec<u8>> {
        let mut last_err = PantryError::Fetch("no fetch attempted".to_string());

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = u64::from(attempt) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying fetch after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match self.source.fetch_raw_table() {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
