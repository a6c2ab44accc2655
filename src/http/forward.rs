//! Request forwarding and response relay.
//!
//! # Responsibilities
//! - Replay the inbound GET against the chosen backend
//! - Relay status, headers and body back without re-encoding
//! - Map any transport failure to the fixed gateway error
//!
//! # Design Decisions
//! - The body is streamed in bounded chunks, never buffered whole
//! - `content-encoding`, `transfer-encoding` and `connection` are owned by
//!   the serving transport and never relayed
//! - No retry and no failover inside one request

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{
        header::{self, HeaderMap, HeaderName},
        uri::PathAndQuery,
        Request, Uri,
    },
    response::Response,
};
use futures_util::{stream, Stream, StreamExt};
use thiserror::Error;

use crate::config::ForwardConfig;
use crate::http::response::bad_gateway;
use crate::load_balancer::BackendDescriptor;
use crate::resilience::{within, TimeoutError};

/// Response headers never copied from the backend.
pub const EXCLUDED_RESPONSE_HEADERS: [HeaderName; 3] = [
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Why the backend could not be reached.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("backend did not respond: {0}")]
    Timeout(#[from] TimeoutError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result of one forwarding attempt. Transport errors stop here.
#[derive(Debug)]
pub enum ForwardOutcome {
    Success(reqwest::Response),
    BackendUnreachable(ForwardError),
}

/// Sends requests to backends and relays their responses.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    timeout: Duration,
    chunk_size: usize,
}

impl Forwarder {
    pub fn new(config: &ForwardConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);
        // Redirects are relayed to the client, not followed. The read timeout
        // bounds every idle gap, so a backend stalling mid-body ends the relay.
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .no_proxy()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            timeout,
            chunk_size: config.chunk_size.max(1),
        })
    }

    /// Forward `request` to `backend` and produce the client response.
    pub async fn forward(&self, backend: &BackendDescriptor, request: Request<Body>) -> Response {
        let target = backend.target(path_and_query(request.uri()));

        match self.send(&target, request.headers()).await {
            ForwardOutcome::Success(upstream) => self.relay(upstream),
            ForwardOutcome::BackendUnreachable(e) => {
                tracing::error!(backend = %backend.url(), target = %target, error = %e, "Error forwarding request");
                bad_gateway()
            }
        }
    }

    /// Issue the GET with the inbound headers. The deadline covers the
    /// connection and the response head; the body is read later, lazily,
    /// under the client's per-read timeout.
    pub async fn send(&self, target: &str, headers: &HeaderMap) -> ForwardOutcome {
        let request = self.client.get(target).headers(headers.clone()).send();

        match within(self.timeout, request).await {
            Ok(Ok(response)) => ForwardOutcome::Success(response),
            Ok(Err(e)) => ForwardOutcome::BackendUnreachable(e.into()),
            Err(e) => ForwardOutcome::BackendUnreachable(e.into()),
        }
    }

    /// Turn a backend response into the client response.
    pub fn relay(&self, upstream: reqwest::Response) -> Response {
        let status = upstream.status();
        let headers = filter_headers(upstream.headers());
        let body = Body::from_stream(rechunk(upstream.bytes_stream(), self.chunk_size));

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// Path plus query string, verbatim. `/` when the URI carries neither.
pub fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query().map(PathAndQuery::as_str).unwrap_or("/")
}

/// Copy of `headers` without the excluded response headers. Repeated headers
/// keep every value.
pub fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !EXCLUDED_RESPONSE_HEADERS.contains(name) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// Re-slice a byte stream so no chunk exceeds `chunk_size`. Bytes and their
/// order are unchanged; splitting shares the underlying buffer.
pub fn rechunk<S, E>(body: S, chunk_size: usize) -> impl Stream<Item = Result<Bytes, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    let chunk_size = chunk_size.max(1);
    body.flat_map(move |item| {
        let pieces: Vec<Result<Bytes, E>> = match item {
            Ok(bytes) => split(bytes, chunk_size).into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(pieces)
    })
}

fn split(mut bytes: Bytes, chunk_size: usize) -> Vec<Bytes> {
    let mut pieces = Vec::with_capacity(bytes.len() / chunk_size + 1);
    while bytes.len() > chunk_size {
        pieces.push(bytes.split_to(chunk_size));
    }
    if !bytes.is_empty() {
        pieces.push(bytes);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::convert::Infallible;

    #[test]
    fn strips_transport_headers_only() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let filtered = filter_headers(&headers);

        assert_eq!(filtered.len(), 3);
        assert!(filtered.get(header::CONTENT_ENCODING).is_none());
        assert!(filtered.get(header::TRANSFER_ENCODING).is_none());
        assert!(filtered.get(header::CONNECTION).is_none());
        assert_eq!(filtered.get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn path_and_query_is_verbatim() {
        let uri: Uri = "/search?q=a%20b&x=1".parse().unwrap();
        assert_eq!(path_and_query(&uri), "/search?q=a%20b&x=1");

        let uri: Uri = "http://example.com".parse().unwrap();
        assert_eq!(path_and_query(&uri), "/");
    }

    #[tokio::test]
    async fn rechunk_bounds_chunk_size() {
        let body = stream::iter(vec![
            Ok::<_, Infallible>(Bytes::from(vec![7u8; 2500])),
            Ok(Bytes::new()),
            Ok(Bytes::from_static(b"tail")),
        ]);

        let chunks: Vec<Bytes> = rechunk(body, 1024)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        let sizes: Vec<usize> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(sizes, vec![1024, 1024, 452, 4]);

        let joined: Vec<u8> = chunks.concat();
        assert_eq!(&joined[..2500], &[7u8; 2500][..]);
        assert_eq!(&joined[2500..], b"tail");
    }

    #[tokio::test]
    async fn rechunk_passes_errors_through() {
        let body = stream::iter(vec![Ok(Bytes::from_static(b"ok")), Err("broken")]);
        let items: Vec<Result<Bytes, &str>> = rechunk(body, 1).collect().await;
        assert_eq!(
            items,
            vec![Ok(Bytes::from_static(b"o")), Ok(Bytes::from_static(b"k")), Err("broken")]
        );
    }
}
