use chrono::{DateTime, Utc};
use dashboard_core::{WatchlistRow, WatchlistSource};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Clock seam so the refresh boundary is testable without sleeping
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What the loader hands to the page: the rows, plus a non-fatal
/// notice when the sheet read failed and the table degraded to empty.
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistSnapshot {
    pub rows: Vec<WatchlistRow>,
    pub notice: Option<String>,
}

struct CacheSlot {
    snapshot: WatchlistSnapshot,
    fetched_at: DateTime<Utc>,
}

/// Time-bound memo of the whole watchlist table. One writer path
/// (refresh on expiry), no other invalidation. A failed fetch is
/// memoized like any other result, carrying its notice.
pub struct CachedWatchlist<S> {
    source: S,
    clock: Arc<dyn Clock>,
    ttl_secs: i64,
    slot: RwLock<Option<CacheSlot>>,
}

impl<S: WatchlistSource> CachedWatchlist<S> {
    pub fn new(source: S, ttl: std::time::Duration) -> Self {
        Self::with_clock(source, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            ttl_secs: ttl.as_secs() as i64,
            slot: RwLock::new(None),
        }
    }

    /// Return the memoized table, refreshing it first when the memo
    /// is missing or older than the TTL. Never fails: a source error
    /// degrades to an empty table with a notice.
    pub async fn load(&self) -> WatchlistSnapshot {
        let now = self.clock.now();

        {
            let slot = self.slot.read().await;
            if let Some(entry) = slot.as_ref() {
                if (now - entry.fetched_at).num_seconds() < self.ttl_secs {
                    return entry.snapshot.clone();
                }
            }
        }

        let snapshot = match self.source.fetch_rows().await {
            Ok(rows) => {
                tracing::info!(rows = rows.len(), "watchlist refreshed");
                WatchlistSnapshot { rows, notice: None }
            }
            Err(e) => {
                tracing::warn!(error = %e, "watchlist read failed, serving empty table");
                WatchlistSnapshot {
                    rows: Vec::new(),
                    notice: Some(format!(
                        "Watchlist could not be read, check the sheet URL and permissions: {}",
                        e
                    )),
                }
            }
        };

        let mut slot = self.slot.write().await;
        *slot = Some(CacheSlot {
            snapshot: snapshot.clone(),
            fetched_at: now,
        });

        snapshot
    }
}
