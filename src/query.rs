//! SQL execution against the `/v2/query` endpoint.

use bytes::Bytes;
use log::{debug, warn};

use crate::auth::AuthProvider;
use crate::error::{HasuraLinkError, Result};
use crate::models::{ErrorResponse, QueryResult, RequestBody};

/// Handles request submission to the query API.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    url: String,
    http_client: reqwest::Client,
    auth: AuthProvider,
    max_retries: u32,
}

impl QueryExecutor {
    pub(crate) fn new(
        base_url: &str,
        http_client: reqwest::Client,
        auth: AuthProvider,
        max_retries: u32,
    ) -> Self {
        Self {
            url: format!("{}/v2/query", base_url.trim_end_matches('/')),
            http_client,
            auth,
            max_retries,
        }
    }

    /// Endpoint URL requests are sent to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a request body and return the raw response bytes.
    ///
    /// Transient transport failures (connect errors, timeouts) are retried
    /// with a short backoff up to the configured retry limit. A non-success
    /// status is returned as [`HasuraLinkError::Server`] with the server's
    /// error message when the body parses as one.
    pub async fn send(&self, body: &RequestBody) -> Result<Bytes> {
        let mut retries = 0;
        loop {
            let mut request = self.http_client.post(&self.url).json(body);
            request = self.auth.apply_to_request(request);

            debug!(
                "[QUERY] POST {} type={} (attempt {}/{})",
                self.url,
                body.kind,
                retries + 1,
                self.max_retries + 1
            );

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.bytes().await?);
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());

                    // Prefer the structured error message when the body is one
                    let message = match serde_json::from_str::<ErrorResponse>(&error_text) {
                        Ok(parsed) => parsed.error,
                        Err(_) => error_text,
                    };

                    warn!("[QUERY] server error: status={} message={:?}", status, message);

                    return Err(HasuraLinkError::Server {
                        status_code: status.as_u16(),
                        message,
                    });
                }
                Err(err) if retries < self.max_retries && is_retriable(&err) => {
                    warn!(
                        "[QUERY] retriable error (attempt {}/{}): {}",
                        retries + 1,
                        self.max_retries + 1,
                        err
                    );
                    retries += 1;
                    tokio::time::sleep(std::time::Duration::from_millis(100 * retries as u64))
                        .await;
                }
                Err(err) => {
                    warn!("[QUERY] fatal transport error: {}", err);
                    return Err(err.into());
                }
            }
        }
    }

    /// Execute one SQL statement against a database source.
    pub async fn run_sql(&self, source: &str, sql: &str, cascade: bool) -> Result<QueryResult> {
        let body = RequestBody::run_sql(source, sql, cascade);
        let bytes = self.send(&body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send multiple requests at once, answered by one result per request.
    pub async fn bulk(&self, requests: Vec<RequestBody>) -> Result<Vec<QueryResult>> {
        let body = RequestBody::bulk(requests);
        let bytes = self.send(&body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn is_retriable(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
