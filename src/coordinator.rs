//! Lifecycle-aware load coordination.
//!
//! A [`LoadCoordinator`] owns exactly one in-flight or most-recent load. A
//! consumer subscribes to its event channel, asks it to start, and receives
//! either the decoded records or a failure signal when the background
//! fetch+decode completes. Resetting (or dropping) the coordinator
//! invalidates any outstanding load's delivery: the background task is not
//! interrupted mid-fetch, but its result is discarded at completion time if
//! the coordinator moved on.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::decoder;
use crate::error::Error;
use crate::fetcher::Fetcher;
use crate::types::{EventRecord, LoadEvent, LoadState};

/// Broadcast channel capacity for load events. One load is active at a time,
/// so a small buffer is plenty for slow subscribers.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Mutable load slot: the single cached sequence, the lifecycle state, and a
/// generation counter bumped on every reset to invalidate stale completions.
struct LoadSlot {
    state: LoadState,
    cached: Option<Vec<EventRecord>>,
    generation: u64,
}

/// Single-flight fetch+decode orchestrator.
///
/// State machine: `Idle -> Loading -> {Delivered, Failed}`, with `reset()`
/// returning to `Idle` from any state. `start()` while `Loading` is a no-op,
/// so deliveries are strictly ordered and never interleaved.
pub struct LoadCoordinator {
    fetcher: Fetcher,
    slot: Arc<Mutex<LoadSlot>>,
    event_tx: broadcast::Sender<LoadEvent>,
    /// Cancelled on drop so an in-flight task cannot deliver to a torn-down
    /// consumer's channel or mutate the cache afterwards.
    teardown: CancellationToken,
}

impl LoadCoordinator {
    /// Create an idle coordinator that will issue requests through `fetcher`.
    pub fn new(fetcher: Fetcher) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            slot: Arc::new(Mutex::new(LoadSlot {
                state: LoadState::Idle,
                cached: None,
                generation: 0,
            })),
            event_tx,
            teardown: CancellationToken::new(),
        }
    }

    /// Subscribe to load completion events.
    ///
    /// Every accepted `start` produces exactly one [`LoadEvent`] on this
    /// channel unless a `reset` or teardown invalidates it first.
    pub fn subscribe(&self) -> broadcast::Receiver<LoadEvent> {
        self.event_tx.subscribe()
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> LoadState {
        self.slot.lock().await.state
    }

    /// The most recently delivered record sequence, if any.
    pub async fn cached(&self) -> Option<Vec<EventRecord>> {
        self.slot.lock().await.cached.clone()
    }

    /// Start a background fetch+decode for `url`.
    ///
    /// No-op while a load is already in flight (at most one active load per
    /// coordinator). A missing URL fails the load immediately without
    /// issuing a request. Otherwise the coordinator transitions to
    /// `Loading` and the outcome arrives on the subscription channel.
    pub async fn start(&self, url: Option<Url>) {
        let generation;
        {
            let mut slot = self.slot.lock().await;
            if slot.state == LoadState::Loading {
                debug!("load already in flight, ignoring start");
                return;
            }

            let Some(url) = url.as_ref() else {
                warn!(error = %Error::NoQueryUrl, "cannot start load");
                slot.state = LoadState::Failed;
                slot.cached = None;
                let _ = self.event_tx.send(LoadEvent::Failed);
                return;
            };

            info!(url = %url, "starting catalog load");
            slot.state = LoadState::Loading;
            generation = slot.generation;
        }

        // url is Some past the guard above
        let Some(url) = url else { return };
        let fetcher = self.fetcher.clone();
        let slot = Arc::clone(&self.slot);
        let event_tx = self.event_tx.clone();
        let teardown = self.teardown.clone();

        tokio::spawn(async move {
            let outcome = fetcher.fetch(&url).await.map(|body| decoder::decode(&body));

            let mut slot = slot.lock().await;
            if teardown.is_cancelled() || slot.generation != generation {
                debug!("load invalidated before completion, discarding result");
                return;
            }

            match outcome {
                Ok(records) => {
                    debug!(count = records.len(), "catalog load delivered");
                    slot.state = LoadState::Delivered;
                    slot.cached = Some(records.clone());
                    let _ = event_tx.send(LoadEvent::Delivered(records));
                }
                Err(e) => {
                    warn!(error = %e, "catalog load failed");
                    slot.state = LoadState::Failed;
                    slot.cached = None;
                    let _ = event_tx.send(LoadEvent::Failed);
                }
            }
        });
    }

    /// Deliver the cached result if one exists, otherwise start a load.
    ///
    /// Models a consumer reattaching after a transient teardown/recreate
    /// cycle: an existing `Delivered` result is re-broadcast without a
    /// redundant network call.
    pub async fn initialize_or_reuse(&self, url: Option<Url>) {
        {
            let slot = self.slot.lock().await;
            if slot.state == LoadState::Delivered
                && let Some(records) = &slot.cached
            {
                debug!(count = records.len(), "reusing cached catalog result");
                let _ = self.event_tx.send(LoadEvent::Delivered(records.clone()));
                return;
            }
        }
        self.start(url).await;
    }

    /// Discard cached data, return to `Idle`, and invalidate any in-flight
    /// load's delivery. Callable from any state.
    pub async fn reset(&self) {
        let mut slot = self.slot.lock().await;
        debug!(from = ?slot.state, "resetting coordinator");
        slot.generation += 1;
        slot.cached = None;
        slot.state = LoadState::Idle;
    }
}

impl Drop for LoadCoordinator {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE: &str = r#"{
        "features": [
            {"properties": {"mag": 7.2, "place": "88km N of Yelizovo, Russia",
                            "time": 1454124312220, "url": "https://example.com/a"}},
            {"properties": {"mag": 6.1, "place": "Oklahoma",
                            "time": 1454124312250, "url": "https://example.com/b"}}
        ]
    }"#;

    fn coordinator() -> LoadCoordinator {
        LoadCoordinator::new(Fetcher::new().unwrap())
    }

    async fn recv(
        rx: &mut broadcast::Receiver<LoadEvent>,
    ) -> Result<LoadEvent, tokio::time::error::Elapsed> {
        tokio::time::timeout(Duration::from_secs(5), async {
            rx.recv().await.unwrap()
        })
        .await
    }

    #[tokio::test]
    async fn successful_load_delivers_records_and_caches_them() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&format!("{}/query", server.uri())).unwrap();

        coordinator.start(Some(url)).await;

        let event = recv(&mut rx).await.unwrap();
        let LoadEvent::Delivered(records) = event else {
            panic!("expected Delivered, got {event:?}");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location, "88km N of Yelizovo, Russia");

        assert_eq!(coordinator.state().await, LoadState::Delivered);
        assert_eq!(coordinator.cached().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_delivers_failed_with_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&server.uri()).unwrap();

        coordinator.start(Some(url)).await;

        assert_eq!(recv(&mut rx).await.unwrap(), LoadEvent::Failed);
        assert_eq!(coordinator.state().await, LoadState::Failed);
        assert!(coordinator.cached().await.is_none());
    }

    #[tokio::test]
    async fn missing_url_fails_without_issuing_a_request() {
        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();

        coordinator.start(None).await;

        assert_eq!(recv(&mut rx).await.unwrap(), LoadEvent::Failed);
        assert_eq!(coordinator.state().await, LoadState::Failed);
    }

    #[tokio::test]
    async fn malformed_payload_is_delivered_as_zero_records_not_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&server.uri()).unwrap();

        coordinator.start(Some(url)).await;

        assert_eq!(recv(&mut rx).await.unwrap(), LoadEvent::Delivered(vec![]));
        assert_eq!(coordinator.state().await, LoadState::Delivered);
    }

    #[tokio::test]
    async fn empty_feature_collection_is_delivered_not_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"features":[]}"#))
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&server.uri()).unwrap();

        coordinator.start(Some(url)).await;

        assert_eq!(recv(&mut rx).await.unwrap(), LoadEvent::Delivered(vec![]));
        assert_eq!(coordinator.state().await, LoadState::Delivered);
    }

    #[tokio::test]
    async fn start_while_loading_does_not_issue_a_second_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SAMPLE)
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&server.uri()).unwrap();

        coordinator.start(Some(url.clone())).await;
        assert_eq!(coordinator.state().await, LoadState::Loading);
        coordinator.start(Some(url)).await;

        // Exactly one delivery, then silence.
        assert!(matches!(
            recv(&mut rx).await.unwrap(),
            LoadEvent::Delivered(_)
        ));
        assert!(
            tokio::time::timeout(Duration::from_millis(300), rx.recv())
                .await
                .is_err(),
            "second start must not produce a second delivery"
        );
        // MockServer verifies expect(1) on drop.
    }

    #[tokio::test]
    async fn reset_before_completion_discards_the_stale_delivery() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SAMPLE)
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&server.uri()).unwrap();

        coordinator.start(Some(url)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        coordinator.reset().await;

        // The fetch will still succeed server-side, but its result must
        // never reach the subscriber or the cache.
        assert!(
            tokio::time::timeout(Duration::from_millis(600), rx.recv())
                .await
                .is_err(),
            "stale load must not be delivered after reset"
        );
        assert_eq!(coordinator.state().await, LoadState::Idle);
        assert!(coordinator.cached().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_coordinator_discards_the_in_flight_delivery() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SAMPLE)
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&server.uri()).unwrap();

        coordinator.start(Some(url)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(coordinator);

        // The background task still holds a sender clone, so the channel
        // only closes once the fetch resolves. Whatever happens, no event
        // may come through: the cancelled token gates the delivery.
        match tokio::time::timeout(Duration::from_millis(600), rx.recv()).await {
            Err(_) => {}
            Ok(Err(broadcast::error::RecvError::Closed)) => {}
            Ok(other) => panic!("stale load must not be delivered after teardown: {other:?}"),
        }
    }

    #[tokio::test]
    async fn initialize_or_reuse_redelivers_cache_without_refetching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&server.uri()).unwrap();

        coordinator.start(Some(url.clone())).await;
        let first = recv(&mut rx).await.unwrap();

        // Reattach: same records again, no second HTTP request.
        coordinator.initialize_or_reuse(Some(url)).await;
        let second = recv(&mut rx).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn initialize_or_reuse_starts_a_load_when_nothing_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();
        let url = Url::parse(&server.uri()).unwrap();

        coordinator.initialize_or_reuse(Some(url)).await;
        assert!(matches!(
            recv(&mut rx).await.unwrap(),
            LoadEvent::Delivered(_)
        ));
    }

    #[tokio::test]
    async fn reset_after_failure_returns_to_idle() {
        let coordinator = coordinator();
        let mut rx = coordinator.subscribe();

        coordinator.start(None).await;
        assert_eq!(recv(&mut rx).await.unwrap(), LoadEvent::Failed);

        coordinator.reset().await;
        assert_eq!(coordinator.state().await, LoadState::Idle);
    }
}
