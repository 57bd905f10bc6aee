//! The click-to-fetch-to-render bridge.

use crate::transport::Transport;
use crate::view::{ConsoleMessage, View};
use crate::{data_uri, BridgeConfig, Error, FormFields, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Which response wins when several submissions overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrdering {
    /// Apply every OK response as it arrives; the last one to arrive wins.
    #[default]
    LastArrival,
    /// Apply a response only if it belongs to the most recently issued
    /// submission.
    LatestIssued,
}

/// What a successful exchange did to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The image `src` was replaced.
    Rendered { seq: u64, src: String },
    /// The response was valid but a newer submission had been issued.
    Superseded { seq: u64, latest: u64 },
}

/// A submission whose fields and sequence number were fixed at click time.
#[derive(Debug, Clone)]
pub struct Submission {
    pub seq: u64,
    pub fields: FormFields,
}

/// Connects a [`View`] to a [`Transport`].
pub struct Bridge<V, T> {
    config: BridgeConfig,
    view: V,
    transport: T,
    issued: AtomicU64,
    // Serializes the "is this still the latest?" check with the write
    apply_lock: Mutex<()>,
}

impl<V: View, T: Transport> Bridge<V, T> {
    pub fn new(config: BridgeConfig, view: V, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            view,
            transport,
            issued: AtomicU64::new(0),
            apply_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Sequence number of the most recently issued submission (0 if none).
    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Handle a click on the control.
    ///
    /// Runs the diagnostic listener (echoes the `real` field to the console)
    /// and then the submit listener, which snapshots the form and sends it.
    pub fn click(&self) -> Result<Outcome> {
        let submission = self.press();
        self.complete(submission)
    }

    /// The synchronous half of a click: run the diagnostic listener, read
    /// the form and allocate a sequence number. Nothing is sent yet.
    pub fn press(&self) -> Submission {
        if self.config.echo_real_on_click {
            let real = self.view.read_fields().real;
            self.view.console(ConsoleMessage::log(real));
        }
        self.begin(self.view.read_fields())
    }

    /// Submit the given field values.
    pub fn submit(&self, fields: FormFields) -> Result<Outcome> {
        let submission = self.begin(fields);
        self.complete(submission)
    }

    /// Allocate a sequence number for `fields`.
    pub fn begin(&self, fields: FormFields) -> Submission {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Issued submission #{}", seq);
        Submission { seq, fields }
    }

    /// Perform the exchange for a submission and route its outcome.
    ///
    /// Every failure, transport or application, is written to the console
    /// and returned; the image is left untouched.
    pub fn complete(&self, submission: Submission) -> Result<Outcome> {
        let seq = submission.seq;
        self.exchange(submission).map_err(|err| {
            log::warn!("Submission #{} failed ({:?}): {}", seq, err.kind(), err);
            let text = match &err {
                // Bare network message, as a browser console would show it
                Error::Transport(msg) => msg.clone(),
                other => other.to_string(),
            };
            self.view.console(ConsoleMessage::error(text));
            err
        })
    }

    fn exchange(&self, submission: Submission) -> Result<Outcome> {
        let body = submission.fields.to_json()?;
        let resp = self.transport.post_json(&self.config.endpoint, body)?;
        if !resp.is_ok() {
            return Err(Error::Status {
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(self.apply(submission.seq, &resp.body))
    }

    fn apply(&self, seq: u64, body: &str) -> Outcome {
        let _guard = self.apply_lock.lock().unwrap();
        if self.config.ordering == ResponseOrdering::LatestIssued {
            let latest = self.latest_issued();
            if seq != latest {
                log::info!("Dropping response #{} (latest is #{})", seq, latest);
                return Outcome::Superseded { seq, latest };
            }
        }

        let src = data_uri::png_data_uri(body, self.config.uri_style);
        self.view.set_image_source(src.clone());
        log::info!("Rendered response #{} ({} bytes)", seq, body.len());
        Outcome::Rendered { seq, src }
    }
}

#[cfg(feature = "http")]
impl<V: View> Bridge<V, crate::transport::HttpTransport> {
    /// Build a bridge that talks to the configured endpoint over HTTP.
    pub fn with_http(config: BridgeConfig, view: V) -> Result<Self> {
        let transport = crate::transport::HttpTransport::new(&config)?;
        Self::new(config, view, transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use crate::view::MemoryDocument;

    /// Replies with a fixed result and records request bodies.
    struct Canned {
        reply: std::result::Result<HttpResponse, String>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Canned {
        fn new(reply: std::result::Result<HttpResponse, String>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn post_json(&self, url: &str, body: String) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push((url.to_string(), body));
            self.reply.clone().map_err(Error::Transport)
        }
    }

    fn bridge(reply: std::result::Result<HttpResponse, String>) -> Bridge<MemoryDocument, Canned> {
        let doc = MemoryDocument::with_fields(
            Default::default(),
            &FormFields::new("-0.5", "0", "2", "100"),
        );
        Bridge::new(BridgeConfig::default(), doc, Canned::new(reply)).unwrap()
    }

    #[test]
    fn ok_response_sets_image_source() {
        let b = bridge(Ok(HttpResponse::ok("AAAA")));
        let outcome = b.click().unwrap();

        assert_eq!(
            outcome,
            Outcome::Rendered {
                seq: 1,
                src: "data:image/png;base64, AAAA".into()
            }
        );
        assert_eq!(b.view().image_source().as_deref(), Some("data:image/png;base64, AAAA"));
        assert_eq!(b.view().image_writes(), 1);
    }

    #[test]
    fn click_sends_one_post_with_current_fields() {
        let b = bridge(Ok(HttpResponse::ok("AAAA")));
        b.view().set_value("zoom", "");
        b.click().unwrap();

        let seen = b.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "http://127.0.0.1:5000/calculate");
        let json: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"real": "-0.5", "imaginary": "0", "zoom": "", "iterations": "100"})
        );
    }

    #[test]
    fn click_echoes_real_value_first() {
        let b = bridge(Ok(HttpResponse::ok("AAAA")));
        b.click().unwrap();
        assert_eq!(b.view().console_messages(), vec![ConsoleMessage::log("-0.5")]);
    }

    #[test]
    fn non_ok_response_is_reported_and_leaves_image_alone() {
        let b = bridge(Ok(HttpResponse {
            status: 500,
            body: "Internal Server Error".into(),
        }));
        b.view().set_image_source("previous".into());

        let err = b.click().unwrap_err();
        assert!(matches!(err, Error::Status { status: 500, .. }));
        assert_eq!(b.view().image_source().as_deref(), Some("previous"));

        let console = b.view().console_messages();
        assert_eq!(console.last().unwrap().level, "error");
        assert!(console.last().unwrap().text.contains("500"));
    }

    #[test]
    fn transport_failure_logs_message() {
        let b = bridge(Err("connection refused".into()));
        let err = b.click().unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert!(b.view().image_source().is_none());
        let console = b.view().console_messages();
        assert_eq!(console.last().unwrap().text, "connection refused");
    }

    #[test]
    fn diagnostic_listener_fires_even_when_submit_fails() {
        let b = bridge(Err("connection refused".into()));
        b.view().set_value("real_number", "0.25");
        assert!(b.click().is_err());

        let console = b.view().console_messages();
        assert_eq!(console.len(), 2);
        assert_eq!(console[0], ConsoleMessage::log("0.25"));
        assert_eq!(console[1].level, "error");
    }

    #[test]
    fn latest_issued_drops_stale_responses() {
        let cfg = BridgeConfig {
            ordering: ResponseOrdering::LatestIssued,
            ..Default::default()
        };
        let b = Bridge::new(cfg, MemoryDocument::default(), Canned::new(Ok(HttpResponse::ok("OLD")))).unwrap();

        let first = b.begin(FormFields::default());
        let _second = b.begin(FormFields::default());
        let outcome = b.complete(first).unwrap();

        assert_eq!(outcome, Outcome::Superseded { seq: 1, latest: 2 });
        assert_eq!(b.view().image_writes(), 0);
    }

    #[test]
    fn diagnostic_listener_can_be_disabled() {
        let cfg = BridgeConfig {
            echo_real_on_click: false,
            ..Default::default()
        };
        let b = Bridge::new(cfg, MemoryDocument::default(), Canned::new(Ok(HttpResponse::ok("A")))).unwrap();
        b.click().unwrap();
        assert!(b.view().console_messages().is_empty());
    }
}
