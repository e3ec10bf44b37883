//! Readiness waiting.
//!
//! [`Collection::on_ready`] picks a strategy from the first held target:
//!
//! | First target | Ready when | Otherwise waits for |
//! |--------------|------------|---------------------|
//! | window | state is `complete` | window `load` |
//! | document | state is not `loading` | document `DOMContentLoaded` |
//! | element / none | selector matches | interval poll |
//!
//! Each waiter owns a latch, so its callback runs at most once per waiter
//! no matter how many signals arrive.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::host::{Host, Listener, ReadyState, Target, events};
use crate::identifiers::HandlerId;

use super::Collection;

// ============================================================================
// Types
// ============================================================================

/// Ready callback type.
type ReadyFn = Arc<dyn Fn(Collection) + Send + Sync>;

/// Outcome of a ready waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyStatus {
    /// Still waiting.
    Pending,
    /// The callback ran.
    Fired,
    /// Cancelled before firing.
    Cancelled,
    /// The ready timeout elapsed first.
    TimedOut,
    /// A poll failed; see the logs.
    Failed,
}

impl ReadyStatus {
    /// Returns `true` once the waiter can no longer fire.
    #[inline]
    #[must_use]
    pub fn is_settled(self) -> bool {
        self != Self::Pending
    }
}

// ============================================================================
// ReadyLatch
// ============================================================================

/// Once-only transition out of [`ReadyStatus::Pending`].
#[derive(Clone)]
struct ReadyLatch {
    tx: Arc<watch::Sender<ReadyStatus>>,
}

impl ReadyLatch {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(ReadyStatus::Pending);
        Self { tx: Arc::new(tx) }
    }

    /// Moves to `status` if still pending. Returns whether this call won.
    fn settle(&self, status: ReadyStatus) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_settled() {
                return false;
            }
            *current = status;
            true
        })
    }

    fn status(&self) -> ReadyStatus {
        *self.tx.borrow()
    }
}

// ============================================================================
// ReadyHandle
// ============================================================================

enum Waiter {
    /// Fired or failed before `on_ready` returned.
    Settled,
    /// Listening for a root event.
    Root {
        host: Weak<dyn Host>,
        target: Target,
        event: &'static str,
        id: HandlerId,
    },
    /// Background poll.
    Poll(Mutex<Option<JoinHandle<()>>>),
}

/// Handle to a pending [`Collection::on_ready`] waiter.
///
/// Dropping the handle does not cancel the waiter.
pub struct ReadyHandle {
    latch: ReadyLatch,
    waiter: Waiter,
}

impl fmt::Debug for ReadyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match &self.waiter {
            Waiter::Settled => "settled",
            Waiter::Root { .. } => "root",
            Waiter::Poll(_) => "poll",
        };
        f.debug_struct("ReadyHandle")
            .field("status", &self.status())
            .field("strategy", &strategy)
            .finish()
    }
}

impl ReadyHandle {
    /// Current status.
    #[must_use]
    pub fn status(&self) -> ReadyStatus {
        self.latch.status()
    }

    /// Stops the waiter if it has not fired yet.
    ///
    /// Returns `true` if this call cancelled it. Polling tasks are aborted;
    /// root listeners are removed from the host.
    pub async fn cancel(&self) -> Result<bool> {
        if !self.latch.settle(ReadyStatus::Cancelled) {
            return Ok(false);
        }

        match &self.waiter {
            Waiter::Settled => {}
            Waiter::Root {
                host,
                target,
                event,
                id,
            } => {
                if let Some(host) = host.upgrade() {
                    host.remove_listener(target, event, *id).await?;
                }
            }
            Waiter::Poll(task) => {
                if let Some(task) = task.lock().take() {
                    task.abort();
                }
            }
        }

        debug!("Ready waiter cancelled");
        Ok(true)
    }

    /// Resolves once the waiter settles and returns the final status.
    pub async fn wait(&self) -> ReadyStatus {
        let mut rx = self.latch.tx.subscribe();
        match rx.wait_for(|status| status.is_settled()).await {
            Ok(status) => *status,
            Err(_) => self.status(),
        }
    }
}

// ============================================================================
// Collection - Ready
// ============================================================================

impl Collection {
    /// Runs `callback` once the collection is ready.
    ///
    /// - Window: on `load`, or immediately when the document is complete.
    /// - Document: on `DOMContentLoaded`, or immediately once parsed.
    /// - Otherwise: polls the selector every
    ///   [`poll_interval`](crate::Options::poll_interval), starting now. The
    ///   first non-empty result calls `callback` once per element.
    ///
    /// Immediate callbacks run before this method returns.
    ///
    /// # Errors
    ///
    /// - [`Error::NoSelector`] when the collection is empty and has no
    ///   selector to poll.
    /// - [`Error::Runtime`] when polling outside a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let handle = dom.lazy("#app").on_ready(|app| {
    ///     tracing::info!(node = ?app.first_node(), "App mounted");
    /// })
    /// .await?;
    /// handle.wait().await;
    /// ```
    pub async fn on_ready<F>(&self, callback: F) -> Result<ReadyHandle>
    where
        F: Fn(Collection) + Send + Sync + 'static,
    {
        let callback: ReadyFn = Arc::new(callback);
        match self.targets().first() {
            Some(Target::Window) => {
                self.ready_on_root(Target::Window, events::LOAD, callback, |state| {
                    state == ReadyState::Complete
                })
                .await
            }
            Some(Target::Document) => {
                self.ready_on_root(
                    Target::Document,
                    events::DOM_CONTENT_LOADED,
                    callback,
                    |state| state != ReadyState::Loading,
                )
                .await
            }
            _ => self.ready_on_poll(callback),
        }
    }

    async fn ready_on_root(
        &self,
        target: Target,
        event: &'static str,
        callback: ReadyFn,
        is_ready: fn(ReadyState) -> bool,
    ) -> Result<ReadyHandle> {
        let host = &self.inner.host;
        let latch = ReadyLatch::new();
        let id = HandlerId::generate();

        let listener = {
            let latch = latch.clone();
            let callback = Arc::clone(&callback);
            let weak = Arc::downgrade(host);
            let options = self.inner.options;
            let target = target.clone();
            Listener::new(id, move |_| {
                if !latch.settle(ReadyStatus::Fired) {
                    return;
                }
                let Some(host) = weak.upgrade() else {
                    return;
                };
                debug!(%target, event, "Ready signal received");
                callback(Collection::with_targets(
                    Arc::clone(&host),
                    options,
                    vec![target.clone()],
                    None,
                ));
                detach_listener(&host, target.clone(), event, id);
            })
        };

        // Listen first so a signal between the check and registration is
        // not lost.
        host.add_listener(&target, event, listener).await?;

        let state = host.ready_state().await?;
        if is_ready(state) && latch.settle(ReadyStatus::Fired) {
            host.remove_listener(&target, event, id).await?;
            debug!(%target, state = state.as_str(), "Already ready");
            callback(self.single(target));
            return Ok(ReadyHandle {
                latch,
                waiter: Waiter::Settled,
            });
        }

        debug!(%target, event, "Waiting for ready signal");
        Ok(ReadyHandle {
            latch,
            waiter: Waiter::Root {
                host: Arc::downgrade(host),
                target,
                event,
                id,
            },
        })
    }

    fn ready_on_poll(&self, callback: ReadyFn) -> Result<ReadyHandle> {
        let latch = ReadyLatch::new();

        let Some(selector) = self.selector() else {
            let targets = self.targets();
            if targets.is_empty() {
                return Err(Error::no_selector("wait for readiness"));
            }
            latch.settle(ReadyStatus::Fired);
            debug!(count = targets.len(), "Ready without selector");
            for target in targets {
                callback(self.single(target));
            }
            return Ok(ReadyHandle {
                latch,
                waiter: Waiter::Settled,
            });
        };

        let runtime = Handle::try_current()
            .map_err(|_| Error::runtime("polling for readiness needs a Tokio runtime"))?;

        let options = self.inner.options;
        let collection = self.clone();
        let poll_latch = latch.clone();

        debug!(
            %selector,
            interval_ms = options.poll_interval.as_millis(),
            "Polling for readiness"
        );

        let task = runtime.spawn(async move {
            let poll = poll_until_found(&collection, &selector, &poll_latch, &callback);
            let Some(limit) = options.ready_timeout else {
                poll.await;
                return;
            };
            if timeout(limit, poll).await.is_err() && poll_latch.settle(ReadyStatus::TimedOut) {
                warn!(
                    %selector,
                    timeout_ms = limit.as_millis(),
                    "Ready poll timed out"
                );
            }
        });

        Ok(ReadyHandle {
            latch,
            waiter: Waiter::Poll(Mutex::new(Some(task))),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn poll_until_found(
    collection: &Collection,
    selector: &str,
    latch: &ReadyLatch,
    callback: &ReadyFn,
) {
    let mut ticker = interval(collection.inner.options.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if latch.status().is_settled() {
            return;
        }

        trace!(%selector, "Ready poll tick");
        match collection.load().await {
            Ok(0) => continue,
            Ok(count) => {
                if latch.settle(ReadyStatus::Fired) {
                    debug!(%selector, count, "Ready poll matched");
                    for target in collection.targets() {
                        callback(collection.single(target));
                    }
                }
                return;
            }
            Err(e) => {
                if latch.settle(ReadyStatus::Failed) {
                    warn!(%selector, error = %e, "Ready poll failed");
                }
                return;
            }
        }
    }
}

/// Removes a fired root listener. Listeners run synchronously inside the
/// host, so removal is deferred to a task.
fn detach_listener(host: &Arc<dyn Host>, target: Target, event: &'static str, id: HandlerId) {
    let Ok(runtime) = Handle::try_current() else {
        trace!(%target, event, "No runtime; ready listener stays registered");
        return;
    };
    let host = Arc::clone(host);
    runtime.spawn(async move {
        if let Err(e) = host.remove_listener(&target, event, id).await {
            warn!(%target, event, error = %e, "Failed to remove ready listener");
        }
    });
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::host::{Event, MemoryDocument};
    use crate::identifiers::NodeId;
    use crate::{Dom, Options};

    fn counter() -> (Arc<AtomicUsize>, impl Fn(Collection) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        (count, move |_: Collection| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn fast_dom(doc: MemoryDocument) -> Dom {
        Dom::builder()
            .host(doc)
            .poll_interval(Duration::from_millis(5))
            .build()
            .unwrap()
    }

    async fn settle_listeners(doc: &MemoryDocument, target: &Target, event: &str) -> usize {
        for _ in 0..20 {
            if doc.listener_count(target, event) == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        doc.listener_count(target, event)
    }

    #[tokio::test]
    async fn test_loaded_document_fires_before_return() {
        let doc = MemoryDocument::new();
        let dom = Dom::new(doc.clone());
        let (count, callback) = counter();

        let handle = dom.document().on_ready(callback).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(handle.status(), ReadyStatus::Fired);
        assert_eq!(doc.listener_count(&Target::Document, events::DOM_CONTENT_LOADED), 0);

        doc.fire(&Target::Document, &Event::new(events::DOM_CONTENT_LOADED));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_document_latch_ignores_duplicate_signals() {
        let doc = MemoryDocument::loading();
        let dom = Dom::new(doc.clone());
        let (count, callback) = counter();

        let handle = dom.document().on_ready(callback).await.unwrap();
        assert_eq!(handle.status(), ReadyStatus::Pending);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        doc.set_ready_state(ReadyState::Interactive);
        doc.fire(&Target::Document, &Event::new(events::DOM_CONTENT_LOADED));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(handle.wait().await, ReadyStatus::Fired);
        assert_eq!(
            settle_listeners(&doc, &Target::Document, events::DOM_CONTENT_LOADED).await,
            0
        );
    }

    #[tokio::test]
    async fn test_window_waits_for_load() {
        let doc = MemoryDocument::loading();
        let dom = Dom::new(doc.clone());
        let (count, callback) = counter();

        let handle = dom.window().on_ready(callback).await.unwrap();
        doc.set_ready_state(ReadyState::Interactive);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        doc.set_ready_state(ReadyState::Complete);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(handle.status(), ReadyStatus::Fired);
    }

    #[tokio::test]
    async fn test_root_cancel_removes_listener() {
        let doc = MemoryDocument::loading();
        let dom = Dom::new(doc.clone());
        let (count, callback) = counter();

        let handle = dom.window().on_ready(callback).await.unwrap();
        assert_eq!(doc.listener_count(&Target::Window, events::LOAD), 1);

        assert!(handle.cancel().await.unwrap());
        assert!(!handle.cancel().await.unwrap());
        assert_eq!(doc.listener_count(&Target::Window, events::LOAD), 0);

        doc.set_ready_state(ReadyState::Complete);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(handle.status(), ReadyStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_poll_fires_once_per_element_then_stops() {
        let doc = MemoryDocument::new();
        let dom = fast_dom(doc.clone());
        let seen = Arc::new(Mutex::new(Vec::<NodeId>::new()));
        let sink = Arc::clone(&seen);

        let lazy = dom.lazy("li.late");
        let handle = lazy
            .on_ready(move |item| sink.lock().extend(item.nodes()))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handle.status(), ReadyStatus::Pending);
        assert!(seen.lock().is_empty());

        let a = doc.insert(None, "li", &[("class", "late")]).unwrap();
        let b = doc.insert(None, "li", &[("class", "late")]).unwrap();

        let status = timeout(Duration::from_secs(2), handle.wait()).await.unwrap();
        assert_eq!(status, ReadyStatus::Fired);
        assert_eq!(*seen.lock(), vec![a, b]);
        assert_eq!(lazy.len(), 2);

        doc.insert(None, "li", &[("class", "late")]).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_poll_cancel() {
        let doc = MemoryDocument::new();
        let dom = fast_dom(doc.clone());
        let (count, callback) = counter();

        let handle = dom.lazy("p").on_ready(callback).await.unwrap();
        assert!(handle.cancel().await.unwrap());
        assert_eq!(handle.wait().await, ReadyStatus::Cancelled);

        doc.insert(None, "p", &[]).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_poll_timeout() {
        let doc = MemoryDocument::new();
        let dom = Dom::builder()
            .host(doc)
            .options(
                Options::new()
                    .with_poll_interval(Duration::from_millis(5))
                    .with_ready_timeout(Duration::from_millis(30)),
            )
            .build()
            .unwrap();
        let (count, callback) = counter();

        let handle = dom.lazy("p").on_ready(callback).await.unwrap();
        let status = timeout(Duration::from_secs(2), handle.wait()).await.unwrap();

        assert_eq!(status, ReadyStatus::TimedOut);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_poll_invalid_selector_fails() {
        let dom = fast_dom(MemoryDocument::new());
        let (count, callback) = counter();

        let handle = dom.lazy("div:hover").on_ready(callback).await.unwrap();
        let status = timeout(Duration::from_secs(2), handle.wait()).await.unwrap();

        assert_eq!(status, ReadyStatus::Failed);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_held_elements_without_selector_fire_immediately() {
        let doc = MemoryDocument::new();
        let a = doc.insert(None, "p", &[]).unwrap();
        let b = doc.insert(None, "p", &[]).unwrap();
        let dom = Dom::new(doc);
        let (count, callback) = counter();

        let list = dom.wrap(vec![a, b]).await.unwrap();
        let handle = list.on_ready(callback).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(handle.status(), ReadyStatus::Fired);

        let err = dom.empty().on_ready(|_| {}).await.unwrap_err();
        assert!(matches!(err, Error::NoSelector { .. }));
    }

    #[test]
    fn test_poll_outside_runtime() {
        let dom = Dom::new(MemoryDocument::new());
        let lazy = dom.lazy("p");

        // The poll branch makes no host calls before spawning.
        let result = futures_util::FutureExt::now_or_never(lazy.on_ready(|_| {}));

        let err = result.expect("future completes without awaiting").unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
    }
}
