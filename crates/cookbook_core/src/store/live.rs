//! Live query streams and their cancellation handles.
//!
//! # Responsibility
//! - Carry snapshots from a background query task to one consumer.
//! - Let consumers cancel one subscription or a whole screen's worth.
//!
//! # Invariants
//! - Once cancelled, a `LiveQuery` yields nothing more, including snapshots
//!   already buffered in its channel.
//! - Items arrive in the order the background task produced them.
//! - Dropping a `LiveQuery` cancels it.

use super::StoreResult;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};

/// Cloneable cancellation token for one live query.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl SubscriptionHandle {
    pub(crate) fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel: Arc::new(cancel),
        }
    }

    /// Stops the subscription. Idempotent.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    pub(crate) fn cancelled(&self) -> watch::Receiver<bool> {
        self.cancel.subscribe()
    }
}

/// Long-lived stream of query snapshots.
///
/// Each item is either a fresh snapshot or the error that ended the
/// subscription. The stream stays open until cancelled.
#[derive(Debug)]
pub struct LiveQuery<T> {
    rx: mpsc::Receiver<StoreResult<T>>,
    handle: SubscriptionHandle,
}

impl<T> LiveQuery<T> {
    pub(crate) fn new(rx: mpsc::Receiver<StoreResult<T>>, handle: SubscriptionHandle) -> Self {
        Self { rx, handle }
    }

    /// Returns a handle that can cancel this subscription from elsewhere.
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Non-blocking receive for hosts that poll instead of awaiting.
    ///
    /// Returns `Disconnected` once the subscription is cancelled or its
    /// background task has ended.
    pub fn try_recv(&mut self) -> Result<StoreResult<T>, TryRecvError> {
        if self.handle.is_cancelled() {
            return Err(TryRecvError::Disconnected);
        }
        self.rx.try_recv()
    }
}

impl<T> Stream for LiveQuery<T> {
    type Item = StoreResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.handle.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// Group of subscriptions sharing one consumer lifetime, e.g. a screen.
///
/// `cancel_all` (or dropping the scope) cancels every collected handle.
#[derive(Debug, Default)]
pub struct SubscriptionScope {
    handles: Vec<SubscriptionHandle>,
}

impl SubscriptionScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, handle: SubscriptionHandle) {
        self.handles.retain(|handle| !handle.is_cancelled());
        self.handles.push(handle);
    }

    /// Collects the handle of `query`.
    pub fn track<T>(&mut self, query: &LiveQuery<T>) {
        self.add(query.handle());
    }

    /// Cancels and forgets every collected subscription. The scope stays usable.
    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
    }

    /// Number of collected subscriptions that are still active.
    pub fn active(&self) -> usize {
        self.handles
            .iter()
            .filter(|handle| !handle.is_cancelled())
            .count()
    }
}

impl Drop for SubscriptionScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
