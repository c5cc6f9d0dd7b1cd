//! Feedbacks API HTTP client.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error, warn};

use crate::config::WbConfig;
use crate::error::WbError;
use crate::types::{id_as_string, FeedbacksResponse, RawReview, ReplyRequest, SortOrder};

/// Page size used when polling; the API allows up to 5000 per request.
pub const DEFAULT_PAGE_SIZE: u32 = 5000;

/// Maximum response-body length echoed into error messages.
const SNIPPET_LEN: usize = 200;

/// Query parameters for the feedbacks listing endpoint.
#[derive(Debug, Clone)]
pub struct FeedbacksQuery {
    /// Tri-state answered filter: `Some(true)`/`Some(false)` are encoded as
    /// lowercase string tokens, `None` omits the parameter entirely.
    pub answered: Option<bool>,
    /// Page size (`take`).
    pub take: u32,
    /// Page offset (`skip`).
    pub skip: u32,
    /// Optional product filter (`nmId`).
    pub nm_id: Option<i64>,
    /// Sort order; polling wants newest first.
    pub order: SortOrder,
}

impl FeedbacksQuery {
    /// The polling query: unanswered feedbacks, one full page, newest first.
    pub fn unanswered() -> Self {
        Self {
            answered: Some(false),
            ..Default::default()
        }
    }

    /// Same page shape as [`FeedbacksQuery::unanswered`], answered side.
    pub fn answered() -> Self {
        Self {
            answered: Some(true),
            ..Default::default()
        }
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if let Some(answered) = self.answered {
            params.push(("isAnswered", answered.to_string()));
        }
        params.push(("take", self.take.to_string()));
        params.push(("skip", self.skip.to_string()));
        params.push(("order", self.order.as_str().to_string()));
        if let Some(nm_id) = self.nm_id {
            params.push(("nmId", nm_id.to_string()));
        }
        params
    }
}

impl Default for FeedbacksQuery {
    fn default() -> Self {
        Self {
            answered: None,
            take: DEFAULT_PAGE_SIZE,
            skip: 0,
            nm_id: None,
            order: SortOrder::DateDesc,
        }
    }
}

/// Client for the Wildberries feedbacks API, bound to one account credential.
#[derive(Debug, Clone)]
pub struct WbClient {
    http: Client,
    config: WbConfig,
}

impl WbClient {
    /// Create a client authenticated with an account's API key.
    pub fn new(api_key: &str, config: WbConfig) -> Result<Self, WbError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(api_key)
            .map_err(|_| WbError::Config("API key is not a valid header value".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &WbConfig {
        &self.config
    }

    /// Fetch a page of feedbacks.
    ///
    /// This is the error-reporting primitive; sweep callers normally go
    /// through [`WbClient::fetch_unanswered`], which degrades to empty.
    pub async fn fetch_feedbacks(&self, query: &FeedbacksQuery) -> Result<Vec<RawReview>, WbError> {
        let url = self.config.feedbacks_url();
        let params = query.to_params();
        let (status, body) = self.execute(|| self.http.get(&url).query(&params)).await?;

        let parsed: FeedbacksResponse =
            serde_json::from_str(&body).map_err(|_| WbError::MalformedResponse {
                status,
                snippet: snippet(&body),
            })?;

        Ok(parsed.data.feedbacks)
    }

    /// Fetch the unanswered page, degrading to empty on any failure.
    ///
    /// Errors are logged, never returned, so one account's broken
    /// credential or a flaky remote cannot abort a polling sweep.
    pub async fn fetch_unanswered(&self) -> Vec<RawReview> {
        match self.fetch_feedbacks(&FeedbacksQuery::unanswered()).await {
            Ok(feedbacks) => feedbacks,
            Err(e) => {
                error!("Fetching unanswered feedbacks failed: {e}");
                Vec::new()
            }
        }
    }

    /// Fetch the answered page, degrading to empty on any failure.
    pub async fn fetch_answered(&self) -> Vec<RawReview> {
        match self.fetch_feedbacks(&FeedbacksQuery::answered()).await {
            Ok(feedbacks) => feedbacks,
            Err(e) => {
                error!("Fetching answered feedbacks failed: {e}");
                Vec::new()
            }
        }
    }

    /// Look up one feedback by id.
    ///
    /// The API has no direct lookup endpoint, so this scans the unanswered
    /// page and then the answered page for a matching id.
    pub async fn get_review_by_id(&self, feedback_id: &str) -> Option<RawReview> {
        let matches = |raw: &RawReview| {
            raw.get("id")
                .is_some_and(|id| id_as_string(id) == feedback_id)
        };

        if let Some(found) = self.fetch_unanswered().await.into_iter().find(matches) {
            return Some(found);
        }
        self.fetch_answered().await.into_iter().find(matches)
    }

    /// Submit a reply to a feedback. True only on confirmed remote success.
    ///
    /// Empty arguments are rejected locally without a network call.
    pub async fn send_reply(&self, feedback_id: &str, text: &str) -> bool {
        if feedback_id.is_empty() || text.is_empty() {
            warn!("Rejecting reply with empty feedback id or text");
            return false;
        }

        let url = self.config.reply_url(feedback_id);
        let request = ReplyRequest { text };
        match self.execute(|| self.http.post(&url).json(&request)).await {
            Ok(_) => {
                debug!(feedback_id, "Reply accepted");
                true
            }
            Err(e) => {
                error!(feedback_id, "Reply failed: {e}");
                false
            }
        }
    }

    /// Execute a request with the retry policy, returning status and body text.
    ///
    /// 401/403 fail immediately; 429 sleeps for the server-specified delay
    /// and retries without consuming an attempt (bounded separately); other
    /// failures back off exponentially until the attempt limit.
    async fn execute(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<(u16, String), WbError> {
        let retry = &self.config.retry;
        let mut attempts = 0u32;
        let mut rate_limit_retries = 0u32;

        loop {
            let last_error = match build().send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Ok((status.as_u16(), body));
                    }

                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        return Err(WbError::Auth {
                            status: status.as_u16(),
                        });
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let delay = retry_after(&response).unwrap_or(retry.rate_limit_delay);
                        if rate_limit_retries >= retry.max_rate_limit_retries {
                            return Err(WbError::RateLimited { retry_after: delay });
                        }
                        rate_limit_retries += 1;
                        warn!(?delay, "Rate limited, waiting before retry");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    format!("HTTP {}: {}", status.as_u16(), snippet(&body))
                }
                Err(e) => format!("transport error: {e}"),
            };

            attempts += 1;
            if attempts >= retry.max_attempts {
                return Err(WbError::RetriesExhausted {
                    attempts,
                    last: last_error,
                });
            }

            let delay = retry.backoff_for_attempt(attempts);
            warn!(attempts, ?delay, "Request failed, backing off: {last_error}");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Parse the Retry-After header as a seconds delay.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn snippet(body: &str) -> String {
    if body.len() <= SNIPPET_LEN {
        body.to_string()
    } else {
        let mut end = SNIPPET_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> WbClient {
        let mut config = WbConfig::new(base_url.to_string());
        // Keep test retries fast; delay amounts are covered by config tests.
        config.retry.backoff_base = Duration::from_millis(5);
        config.retry.rate_limit_delay = Duration::from_millis(5);
        WbClient::new("test-api-key", config).unwrap()
    }

    fn feedbacks_body(feedbacks: serde_json::Value) -> serde_json::Value {
        json!({"data": {"feedbacks": feedbacks}})
    }

    #[tokio::test]
    async fn fetch_unanswered_encodes_filter_and_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .and(query_param("isAnswered", "false"))
            .and(query_param("take", "5000"))
            .and(query_param("skip", "0"))
            .and(query_param("order", "dateDesc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(feedbacks_body(json!([{"id": "fb-1"}, {"id": "fb-2"}]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let feedbacks = client.fetch_unanswered().await;
        assert_eq!(feedbacks.len(), 2);
    }

    #[tokio::test]
    async fn answered_filter_omitted_when_not_filtering() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .and(query_param_is_missing("isAnswered"))
            .and(query_param("nmId", "987654"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(feedbacks_body(json!([]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let query = FeedbacksQuery {
            nm_id: Some(987654),
            ..Default::default()
        };
        let feedbacks = client.fetch_feedbacks(&query).await.unwrap();
        assert!(feedbacks.is_empty());
    }

    #[tokio::test]
    async fn auth_failure_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.fetch_feedbacks(&FeedbacksQuery::unanswered()).await;
        assert!(matches!(result, Err(WbError::Auth { status: 401 })));
    }

    #[tokio::test]
    async fn rate_limit_sleeps_once_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(feedbacks_body(json!([{"id": 1}]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let feedbacks = client
            .fetch_feedbacks(&FeedbacksQuery::unanswered())
            .await
            .unwrap();
        assert_eq!(feedbacks.len(), 1);
    }

    #[tokio::test]
    async fn server_errors_exhaust_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.fetch_feedbacks(&FeedbacksQuery::unanswered()).await;
        match result {
            Err(WbError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(last.contains("503"), "got: {last}");
                assert!(last.contains("overloaded"), "got: {last}");
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.fetch_feedbacks(&FeedbacksQuery::unanswered()).await;
        match result {
            Err(WbError::MalformedResponse { status, snippet }) => {
                assert_eq!(status, 200);
                assert!(snippet.contains("oops"));
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_unanswered_degrades_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client.fetch_unanswered().await.is_empty());
    }

    #[tokio::test]
    async fn send_reply_posts_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/feedbacks/fb-9/reply"))
            .and(body_json(json!({"text": "Спасибо за отзыв!"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client.send_reply("fb-9", "Спасибо за отзыв!").await);
    }

    #[tokio::test]
    async fn send_reply_rejects_empty_arguments_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(!client.send_reply("", "text").await);
        assert!(!client.send_reply("fb-9", "").await);
    }

    #[tokio::test]
    async fn send_reply_false_on_remote_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/feedbacks/fb-9/reply"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(!client.send_reply("fb-9", "text").await);
    }

    #[tokio::test]
    async fn get_review_by_id_scans_both_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .and(query_param("isAnswered", "false"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(feedbacks_body(json!([{"id": "fb-1"}]))),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/feedbacks"))
            .and(query_param("isAnswered", "true"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(feedbacks_body(json!([{"id": 777, "text": "ок"}]))),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());

        // Numeric ids match their stringified form
        let found = client.get_review_by_id("777").await.unwrap();
        assert_eq!(found["text"], "ок");

        assert!(client.get_review_by_id("fb-1").await.is_some());
        assert!(client.get_review_by_id("missing").await.is_none());
    }
}
