//! Watchlist loader: a published Google Sheet read as CSV, memoized
//! behind an explicit time-to-live cache.

pub mod cache;
pub mod source;

pub use cache::{CachedWatchlist, Clock, SystemClock, WatchlistSnapshot};
pub use source::{parse_watchlist_csv, SheetCsvSource};
