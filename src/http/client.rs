use super::debug::{Direction, HttpDebugConfig, debug_lines};
use crate::trace::{SessionTrace, TraceKind};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

type LineSink = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// JSON-over-HTTP client. Every exchange is mirrored to the `[http-debug]`
/// output when enabled and to the session trace when one is attached.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    debug: HttpDebugConfig,
    sink: LineSink,
    trace: Option<SessionTrace>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("debug", &self.debug)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

impl HttpClient {
    pub fn new(inner: Client, debug: HttpDebugConfig) -> Self {
        Self {
            inner,
            debug,
            sink: Arc::new(|line| eprintln!("{line}")),
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    /// POSTs `payload` as JSON. Non-2xx statuses come back as data; only
    /// encoding and transport failures are errors.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        payload: &T,
    ) -> Result<HttpResponseData, HttpError> {
        let body = serde_json::to_string(payload)?;

        let mut builder = self.inner.post(url).header(CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(body.clone()).build()?;
        self.observe(
            Direction::Outgoing,
            &format!("{} {}", request.method(), request.url()),
            request.headers(),
            &body,
        );

        let response = self
            .inner
            .execute(request)
            .await
            .inspect_err(|err| self.observe_failure(err))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .inspect_err(|err| self.observe_failure(err))?;
        self.observe(Direction::Incoming, &format!("HTTP {status}"), &headers, &body);

        Ok(HttpResponseData { status, body })
    }

    fn observe(&self, direction: Direction, start_line: &str, headers: &HeaderMap, body: &str) {
        if self.debug.enabled {
            for line in debug_lines(self.debug, direction, start_line, headers, body) {
                (self.sink)(&line);
            }
        }
        if let Some(trace) = &self.trace {
            let kind = match direction {
                Direction::Outgoing => TraceKind::HttpReq,
                Direction::Incoming => TraceKind::HttpRes,
            };
            trace.record_http(kind, start_line, headers, body);
        }
    }

    fn observe_failure(&self, err: &reqwest::Error) {
        if self.debug.enabled {
            (self.sink)(&format!("[http-debug] ! {err}"));
        }
        if let Some(trace) = &self.trace {
            trace.record(TraceKind::HttpErr, &err.to_string());
        }
    }

    #[cfg(test)]
    fn capturing(
        inner: Client,
        debug: HttpDebugConfig,
    ) -> (Self, Arc<std::sync::Mutex<Vec<String>>>) {
        let lines = Arc::new(std::sync::Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let mut client = Self::new(inner, debug);
        client.sink = Arc::new(move |line| {
            if let Ok(mut lines) = captured.lock() {
                lines.push(line.to_string());
            }
        });
        (client, lines)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status: u16,
    pub body: String,
}

impl HttpResponseData {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
