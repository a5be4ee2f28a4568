use crate::deck::{apply_resolution, DeckEntry};
use crate::resolver::Resolution;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Marks one resolution request. Only the newest token may commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestToken(u64);

/// The user's current card list, plus the guard that discards results of
/// requests superseded while they were in flight.
pub struct DeckSession {
    entries: Mutex<Vec<DeckEntry>>,
    sequence: AtomicU64,
}

impl DeckSession {
    pub fn new(entries: Vec<DeckEntry>) -> Self {
        DeckSession {
            entries: Mutex::new(entries),
            sequence: AtomicU64::new(0),
        }
    }

    /// Starts a request. The sequence only moves under the entries lock, so
    /// a commit in progress finishes before it is superseded.
    pub fn begin(&self) -> RequestToken {
        let _entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        RequestToken(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.sequence.load(Ordering::SeqCst) == token.0
    }

    /// Applies `resolution` if `token` is still the latest request. Returns
    /// the number of entries updated, or `None` for a stale result.
    pub fn commit(&self, token: RequestToken, resolution: &Resolution) -> Option<usize> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_current(token) {
            debug!(token = token.0, "dropping stale resolution");
            return None;
        }
        Some(apply_resolution(&mut entries, resolution))
    }

    pub fn entries(&self) -> Vec<DeckEntry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn replace_entries(&self, entries: Vec<DeckEntry>) {
        *self.entries.lock().unwrap_or_else(|e| e.into_inner()) = entries;
    }
}
