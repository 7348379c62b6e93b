use crate::types::FeedEntry;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

pub const DEFAULT_WINDOW_HOURS: i64 = 24;

pub fn default_window() -> Duration {
    Duration::hours(DEFAULT_WINDOW_HOURS)
}

/// Keep entries published strictly after `now - window`, in their original order.
///
/// A window reaching past the earliest representable time keeps everything.
pub fn filter_recent(entries: Vec<FeedEntry>, now: DateTime<Utc>, window: Duration) -> Vec<FeedEntry> {
    let cutoff = now
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let total = entries.len();

    let recent: Vec<FeedEntry> = entries
        .into_iter()
        .filter(|entry| entry.published_at > cutoff)
        .collect();

    debug!(
        "{} of {} entries published after {}",
        recent.len(),
        total,
        cutoff.to_rfc3339()
    );
    recent
}
