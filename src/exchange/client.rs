//! MEXC REST client for signed account calls.

use super::credentials::Credentials;
use super::error::ExchangeError;
use super::params::RequestParams;
use super::signing::{SignedRequest, SigningContext, SigningScheme};
use super::types::{value_text, FuturesEnvelope, Record, SpotAccount};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const SPOT_ACCOUNT_PATH: &str = "/api/v3/account";
pub const FUTURES_ASSETS_PATH: &str = "/api/v1/private/account/assets";

/// Status and body of a response, before any classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client bound to one API host.
#[derive(Debug, Clone)]
pub struct MexcClient {
    http: Client,
    base_url: String,
}

impl MexcClient {
    /// Create a client for `base_url` (scheme and host, no trailing path).
    pub fn new(base_url: &str) -> Result<Self, ExchangeError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    /// Send a GET and return whatever came back, without judging the status.
    #[instrument(skip(self, request))]
    pub async fn send(
        &self,
        path: &str,
        request: &SignedRequest,
    ) -> Result<RawResponse, ExchangeError> {
        let url = self.url(path, &request.query);
        debug!("GET {}", url);

        let mut builder = self.http.get(&url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("Response status {} ({} bytes)", status, body.len());
        Ok(RawResponse { status, body })
    }

    /// Sign `params` with `scheme`, send the GET and decode the payload.
    ///
    /// Spot calls yield the whole JSON body; futures calls yield the `data` field.
    #[instrument(skip(self, params, credentials))]
    pub async fn signed_get(
        &self,
        path: &str,
        params: RequestParams,
        scheme: SigningScheme,
        credentials: &Credentials,
    ) -> Result<Value, ExchangeError> {
        let ctx = SigningContext::now(credentials);
        let request = scheme.sign(params, &ctx)?;
        let raw = self.send(path, &request).await?;
        classify(scheme, raw)
    }

    /// Fetch the spot account (`GET /api/v3/account`).
    pub async fn spot_account(&self, credentials: &Credentials) -> Result<SpotAccount, ExchangeError> {
        let payload = self
            .signed_get(
                SPOT_ACCOUNT_PATH,
                RequestParams::new(),
                SigningScheme::Spot,
                credentials,
            )
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Fetch all futures wallet assets (`GET /api/v1/private/account/assets`).
    pub async fn futures_assets(&self, credentials: &Credentials) -> Result<Vec<Record>, ExchangeError> {
        let payload = self
            .signed_get(
                FUTURES_ASSETS_PATH,
                RequestParams::new(),
                SigningScheme::Futures,
                credentials,
            )
            .await?;
        Ok(serde_json::from_value(payload)?)
    }
}

/// Turn a raw response into a payload or a typed failure.
pub fn classify(scheme: SigningScheme, raw: RawResponse) -> Result<Value, ExchangeError> {
    if !raw.is_success() {
        return Err(ExchangeError::Status {
            status: raw.status,
            body: raw.body,
        });
    }

    match scheme {
        SigningScheme::Spot => Ok(serde_json::from_str(&raw.body)?),
        SigningScheme::Futures => {
            let envelope: FuturesEnvelope = serde_json::from_str(&raw.body)?;
            if !envelope.success {
                return Err(ExchangeError::Api {
                    code: value_text(&envelope.code),
                    message: value_text(&envelope.message),
                });
            }
            Ok(match envelope.data {
                Value::Null => Value::Array(Vec::new()),
                data => data,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds() -> Credentials {
        Credentials::new("test-key", "test-secret")
    }

    #[test]
    fn test_classify_non_2xx_is_status_error() {
        let raw = RawResponse {
            status: 503,
            body: "maintenance".to_string(),
        };

        match classify(SigningScheme::Spot, raw) {
            Err(ExchangeError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_classify_futures_null_data_is_empty_list() {
        let raw = RawResponse {
            status: 200,
            body: r#"{"success":true,"code":0,"data":null}"#.to_string(),
        };

        let payload = classify(SigningScheme::Futures, raw).unwrap();
        assert_eq!(payload, json!([]));
    }

    #[test]
    fn test_classify_futures_failure_with_string_code() {
        let raw = RawResponse {
            status: 200,
            body: r#"{"success":false,"code":"400","message":"bad"}"#.to_string(),
        };

        match classify(SigningScheme::Futures, raw) {
            Err(ExchangeError::Api { code, message }) => {
                assert_eq!(code, "400");
                assert_eq!(message, "bad");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_classify_futures_failure_with_float_code_and_no_message() {
        let raw = RawResponse {
            status: 200,
            body: r#"{"success":false,"code":400.0}"#.to_string(),
        };

        match classify(SigningScheme::Futures, raw) {
            Err(ExchangeError::Api { code, message }) => {
                assert_eq!(code, "400.0");
                assert_eq!(message, "");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_classify_spot_returns_whole_body() {
        let raw = RawResponse {
            status: 200,
            body: r#"{"balances":[],"canTrade":true}"#.to_string(),
        };

        let payload = classify(SigningScheme::Spot, raw).unwrap();
        assert_eq!(payload["canTrade"], true);
    }

    #[tokio::test]
    async fn test_spot_account_sends_signed_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SPOT_ACCOUNT_PATH))
            .and(header("X-MEXC-APIKEY", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "balances": [{"asset":"BTC","free":"1.0","locked":"0.5","available":"0.5"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = MexcClient::new(&server.uri()).unwrap();
        let account = client.spot_account(&creds()).await.unwrap();
        assert_eq!(account.balances.len(), 1);

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(query.starts_with("timestamp="), "{}", query);
        assert!(query.contains("&signature="), "{}", query);
    }

    #[tokio::test]
    async fn test_futures_assets_uses_header_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(FUTURES_ASSETS_PATH))
            .and(header("ApiKey", "test-key"))
            .and(header("Recv-Window", "30"))
            .and(header_exists("Request-Time"))
            .and(header_exists("Signature"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "code": 0,
                "data": [{"currency":"USDT","equity":12.5}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = MexcClient::new(&server.uri()).unwrap();
        let assets = client.futures_assets(&creds()).await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0]["currency"], "USDT");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_futures_business_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(FUTURES_ASSETS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "code": 400,
                "message": "bad"
            })))
            .mount(&server)
            .await;

        let client = MexcClient::new(&server.uri()).unwrap();
        match client.futures_assets(&creds()).await {
            Err(ExchangeError::Api { code, message }) => {
                assert_eq!(code, "400");
                assert_eq!(message, "bad");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"code":700002,"msg":"Signature for this request is not valid."}"#),
            )
            .mount(&server)
            .await;

        let client = MexcClient::new(&server.uri()).unwrap();
        let err = client.spot_account(&creds()).await.unwrap_err();

        assert!(err.is_transport());
        match err {
            ExchangeError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("700002"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_secret_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = MexcClient::new(&server.uri()).unwrap();
        let result = client
            .spot_account(&Credentials::new("key", ""))
            .await;

        assert!(matches!(result, Err(ExchangeError::Config(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = MexcClient::new("http://127.0.0.1:1").unwrap();
        let err = client.spot_account(&creds()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Network(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = MexcClient::new("https://api.mexc.co/").unwrap();
        assert_eq!(client.base_url(), "https://api.mexc.co");
        assert_eq!(
            client.url("/api/v3/account", "a=1"),
            "https://api.mexc.co/api/v3/account?a=1"
        );
    }
}
