use crate::bridge::{Bridge, Outcome};
use crate::transport::Transport;
use crate::view::View;
use crate::{Error, FormFields, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// An async-friendly handle over a [`Bridge`].
///
/// Every click becomes its own task on tokio's blocking pool, so the caller
/// is never suspended by the network round-trip. Overlapping clicks are not
/// queued or de-duplicated; the bridge's [`crate::ResponseOrdering`] decides
/// which response ends up on the page.
pub struct AsyncBridge<V, T> {
    inner: Arc<Bridge<V, T>>,
}

impl<V, T> Clone for AsyncBridge<V, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V, T> AsyncBridge<V, T>
where
    V: View + 'static,
    T: Transport + 'static,
{
    pub fn new(bridge: Bridge<V, T>) -> Self {
        Self {
            inner: Arc::new(bridge),
        }
    }

    pub fn bridge(&self) -> &Bridge<V, T> {
        &self.inner
    }

    /// Click the control. Fields and sequence number are captured before
    /// this returns; the exchange runs in the background. Dropping the
    /// handle does not cancel it.
    pub fn click(&self) -> JoinHandle<Result<Outcome>> {
        let submission = self.inner.press();
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || inner.complete(submission))
    }

    /// Submit explicit values in the background.
    pub fn submit(&self, fields: FormFields) -> JoinHandle<Result<Outcome>> {
        let submission = self.inner.begin(fields);
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || inner.complete(submission))
    }
}

#[cfg(feature = "http")]
impl<V: View + 'static> AsyncBridge<V, crate::transport::HttpTransport> {
    /// Build an HTTP-backed bridge without blocking the calling task.
    ///
    /// The blocking reqwest client cannot be constructed on an async worker,
    /// so setup runs on the blocking pool.
    pub async fn with_http(config: crate::BridgeConfig, view: V) -> Result<Self> {
        let bridge = tokio::task::spawn_blocking(move || Bridge::with_http(config, view))
            .await
            .map_err(|e| Error::Other(format!("Bridge setup canceled: {}", e)))??;
        Ok(Self::new(bridge))
    }
}

/// Wait for a click handle, folding a panicked task into an error.
pub async fn settle(handle: JoinHandle<Result<Outcome>>) -> Result<Outcome> {
    handle
        .await
        .map_err(|e| Error::Other(format!("Submission task failed: {}", e)))?
}

/// Wait for several in-flight clicks, in the order they were issued.
pub async fn settle_all(handles: Vec<JoinHandle<Result<Outcome>>>) -> Vec<Result<Outcome>> {
    futures::future::join_all(handles.into_iter().map(settle)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use crate::view::MemoryDocument;
    use crate::{BridgeConfig, ResponseOrdering};
    use std::time::Duration;

    /// Echoes the `real` field back after sleeping `iterations` milliseconds.
    struct Delayed;

    impl Transport for Delayed {
        fn post_json(&self, _url: &str, body: String) -> Result<HttpResponse> {
            let v: serde_json::Value = serde_json::from_str(&body)?;
            let delay: u64 = v["iterations"].as_str().unwrap_or("0").parse().unwrap_or(0);
            std::thread::sleep(Duration::from_millis(delay));
            Ok(HttpResponse::ok(v["real"].as_str().unwrap_or_default()))
        }
    }

    fn async_bridge(ordering: ResponseOrdering) -> AsyncBridge<MemoryDocument, Delayed> {
        let cfg = BridgeConfig {
            ordering,
            ..Default::default()
        };
        AsyncBridge::new(Bridge::new(cfg, MemoryDocument::default(), Delayed).unwrap())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn last_arrival_wins_by_default() {
        let b = async_bridge(ResponseOrdering::LastArrival);
        let view = b.bridge().view();

        // Slow request first, fast request second
        view.fill(&FormFields::new("slow", "0", "0", "300"));
        let first = b.click();
        view.fill(&FormFields::new("fast", "0", "0", "10"));
        let second = b.click();

        let results = settle_all(vec![first, second]).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(view.image_writes(), 2);
        assert_eq!(view.image_source().as_deref(), Some("data:image/png;base64, slow"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn latest_issued_keeps_newest_request() {
        let b = async_bridge(ResponseOrdering::LatestIssued);
        let view = b.bridge().view();

        view.fill(&FormFields::new("slow", "0", "0", "300"));
        let first = b.click();
        view.fill(&FormFields::new("fast", "0", "0", "10"));
        let second = b.click();

        let first = settle(first).await.unwrap();
        let second = settle(second).await.unwrap();

        assert_eq!(first, Outcome::Superseded { seq: 1, latest: 2 });
        assert!(matches!(second, Outcome::Rendered { seq: 2, .. }));
        assert_eq!(view.image_source().as_deref(), Some("data:image/png;base64, fast"));
    }

    #[tokio::test]
    async fn fields_are_captured_at_click_time() {
        let b = async_bridge(ResponseOrdering::LastArrival);
        let view = b.bridge().view();

        view.fill(&FormFields::new("before", "0", "0", "50"));
        let handle = b.click();
        view.fill(&FormFields::new("after", "0", "0", "0"));

        settle(handle).await.unwrap();
        assert_eq!(view.image_source().as_deref(), Some("data:image/png;base64, before"));
        assert_eq!(view.console_messages()[0].text, "before");
    }
}
