mod basic_ext;
mod json_ext;

use crate::prelude::*;
use crate::Result;
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest_middleware::RequestBuilder;
use std::time::{Duration, Instant};

pub(crate) mod prelude {
    pub(crate) use super::basic_ext::RequestBuilderBasicExt;
    pub(crate) use super::json_ext::RequestBuilderJsonExt;
}

pub(crate) const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Some lyrics sites sit behind Cloudflare, which serves a challenge page
/// to clients that don't look like a regular browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Limits the size of the error response body that we keep in the error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

pub(crate) type Client = reqwest_middleware::ClientWithMiddleware;

/// Creates the HTTP client shared by all lyrics sources. Every request made
/// with it fails if it doesn't finish within the given `timeout`.
pub(crate) fn create_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .fatal_ctx(|| "Failed to build the HTTP client")?;

    let client = reqwest_middleware::ClientBuilder::new(client)
        .with(ObservingMiddleware)
        .with_init(|request_builder: RequestBuilder| {
            request_builder.header(header::USER_AGENT, BROWSER_USER_AGENT)
        })
        .build();

    Ok(client)
}

struct ObservingMiddleware;

#[async_trait]
impl reqwest_middleware::Middleware for ObservingMiddleware {
    async fn handle(
        &self,
        request: reqwest::Request,
        extensions: &mut http::Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let span = info_span!(
            "request",
            method = %request.method(),
            url = %request.url(),
        );

        async {
            let method = request.method().to_string();
            let host = request.url().host_str().unwrap_or("{unknown}").to_owned();

            let start = Instant::now();
            let result = next.run(request, extensions).await;
            let elapsed = start.elapsed();

            let duration = tracing_duration(elapsed);

            let status = match &result {
                Ok(response) => response.status().to_string(),
                Err(_) => "{fatal}".to_owned(),
            };

            metrics::histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                "method" => method,
                "host" => host,
                "status" => status
            )
            .record(elapsed.as_secs_f64());

            let response = match &result {
                Ok(response) => response,
                Err(err) => {
                    warn!(duration, err = tracing_err(err), "Network request failed");
                    return result;
                }
            };

            let status = response.status();

            let Err(err) = response.error_for_status_ref() else {
                debug!(duration, %status, "Network request succeeded");
                return result;
            };

            warn!(
                err = tracing_err(&err),
                duration,
                %status,
                "Network request failed (error status)"
            );

            result
        }
        .instrument(span)
        .await
    }
}

/// Errors at the layer of the HTTP API
#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpClientError {
    #[error("HTTP request failed")]
    Request { source: reqwest_middleware::Error },

    #[error("Failed to read HTTP response")]
    ReadPayload { source: reqwest::Error },

    #[error("HTTP request has failed (HTTP status code: {status}):\n{body}")]
    BadResponseStatusCode {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Received an unexpected response JSON object")]
    UnexpectedResponseJsonShape { source: serde_json::Error },
}
