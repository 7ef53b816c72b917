use serde_derive::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

use crate::track::TrackSnapshot;
use crate::tracker::Tracker;

/// Tracker output after one processed frame plus the derived counts that
/// stats consumers broadcast.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub frame: u64,
    pub tracks: Vec<TrackSnapshot>,
    pub currently_tracked: usize,
}

impl Snapshot {
    pub fn capture(frame: u64, tracker: &Tracker) -> Self {
        let tracks = tracker.snapshots();

        Self {
            frame,
            currently_tracked: tracks.len(),
            tracks,
        }
    }
}

/// Single-writer hand-off point. The writer swaps in a whole new snapshot;
/// readers clone the current `Arc` and never observe a partial update.
#[derive(Debug, Default)]
pub struct SnapshotCell {
    inner: RwLock<Arc<Snapshot>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Arc<Snapshot> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publishes `snapshot` and returns the shared handle to it.
    pub fn store(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = next.clone();

        next
    }
}
