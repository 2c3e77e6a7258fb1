// ── Reactive snapshot streams ──
//
// Subscription types for consuming mirror changes from a DataService.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::Snapshot;

/// A subscription to one resource mirror.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
/// The channel holds a single slot: a slow subscriber skips intermediate
/// snapshots and only ever observes the latest one.
pub struct SnapshotStream<R: Send + Sync + 'static> {
    current: Snapshot<R>,
    receiver: watch::Receiver<Snapshot<R>>,
}

impl<R: Send + Sync + 'static> SnapshotStream<R> {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot<R>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &Snapshot<R> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Snapshot<R> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the owning service has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot<R>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    ///
    /// The stream yields the current snapshot first, then every change.
    pub fn into_stream(self) -> SnapshotWatchStream<R> {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct SnapshotWatchStream<R: Send + Sync + 'static> {
    inner: WatchStream<Snapshot<R>>,
}

impl<R: Send + Sync + 'static> Stream for SnapshotWatchStream<R> {
    type Item = Snapshot<R>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // `WatchStream` is `Unpin`, so re-pinning the field is fine.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
