//! Background polling that turns a pull-only backend into a push stream.
//!
//! Sources without a real-time channel (RSS) call [`spawn`] from
//! `observe_updates`: a tokio task re-fetches on a timer and forwards each
//! successful batch as a [`FeedUpdate::Patch`].
//!
//! ## For contributors
//!
//! The first tick is skipped because the coordinator issues its own initial
//! fetch right after subscribing. Fetch errors are logged and polling
//! continues; they are never pushed, since nobody asked for this request.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::source::{FeedItem, FeedUpdate};

/// Updates buffered between the poller and its subscriber.
const CHANNEL_CAPACITY: usize = 16;

/// Spawn the polling task.
///
/// The task exits when `cancel` fires or the returned receiver is dropped.
pub fn spawn<F, Fut>(
    label: String,
    interval: Duration,
    cancel: CancellationToken,
    fetch: F,
) -> mpsc::Receiver<FeedUpdate>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<FeedItem>, SourceError>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = fetch() => result,
            };

            match result {
                Ok(items) => {
                    tracing::debug!(source = %label, count = items.len(), "poll fetched items");
                    if tx.send(FeedUpdate::Patch(items)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(source = %label, error = %e, "poll failed"),
            }
        }
        tracing::debug!(source = %label, "poller stopped");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_fetch(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn() -> std::future::Ready<Result<Vec<FeedItem>, SourceError>> + Send + 'static {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(vec![FeedItem::new(format!("poll-{n}"), "P", "t")]))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn skips_first_tick_then_pushes_patches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let mut rx = spawn("t".into(), Duration::from_secs(60), cancel.clone(), counting_fetch(calls.clone()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0, "no fetch before the first interval");

        let update = rx.recv().await.unwrap();
        assert_eq!(update, FeedUpdate::Patch(vec![FeedItem::new("poll-0", "P", "t")]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_cancelled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let mut rx = spawn("t".into(), Duration::from_secs(10), cancel.clone(), counting_fetch(calls.clone()));

        cancel.cancel();
        assert!(rx.recv().await.is_none(), "channel closes after cancellation");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_not_pushed() {
        let cancel = CancellationToken::new();
        let mut rx = spawn("t".into(), Duration::from_secs(5), cancel.clone(), || {
            std::future::ready(Err::<Vec<FeedItem>, _>(SourceError::Timeout))
        });

        let waited = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await;
        assert!(waited.is_err(), "failed polls produce no updates");
        cancel.cancel();
    }
}
