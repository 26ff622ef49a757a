//! Billing server client configuration and HTTP transport

use std::path::PathBuf;
use std::time::Duration;

use planshift_shared::{Account, Tier};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::{BillingApi, CheckoutRedirect};
use crate::error::{BillingError, BillingResult};

const DEFAULT_BASE_URL: &str = "http://localhost:2586";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

const TIERS_PATH: &str = "/v1/tiers";
const ACCOUNT_PATH: &str = "/v1/account";
const SUBSCRIPTION_PATH: &str = "/v1/account/billing/subscription";

/// Server error codes for a 409 that are not about reservation capacity
const NON_RESERVATION_CONFLICT_CODES: [i64; 3] = [40901, 40903, 40904];

/// Configuration for the billing server connection
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Base URL of the billing server, without trailing slash
    pub base_url: String,
    /// Bearer token of the signed-in session
    pub access_token: Option<String>,
    /// File the access token was read from, if any
    pub token_file: Option<PathBuf>,
    /// Per-request timeout
    pub request_timeout_ms: u64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            token_file: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl BillingConfig {
    /// Create config from environment variables
    pub fn from_env() -> BillingResult<Self> {
        let base_url = std::env::var("PLANSHIFT_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BillingError::Config(format!(
                "PLANSHIFT_BASE_URL must be an http(s) URL, got {}",
                base_url
            )));
        }

        let token_file = std::env::var("PLANSHIFT_TOKEN_FILE").ok().map(PathBuf::from);
        let access_token = match std::env::var("PLANSHIFT_ACCESS_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
            _ => match &token_file {
                Some(path) if path.exists() => {
                    let token = std::fs::read_to_string(path).map_err(|e| {
                        BillingError::Config(format!(
                            "Cannot read token file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    Some(token.trim().to_string()).filter(|t| !t.is_empty())
                }
                _ => None,
            },
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            token_file,
            request_timeout_ms: std::env::var("PLANSHIFT_REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_MS.to_string())
                .parse()
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        })
    }

    /// Absolute URL for a server path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Serialize)]
struct SubscriptionRequest<'a> {
    tier: &'a str,
}

/// Error payload returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    error: String,
}

/// HTTP billing client
#[derive(Clone)]
pub struct BillingClient {
    http: Client,
    config: BillingConfig,
}

impl BillingClient {
    /// Create a new client from config
    pub fn new(config: BillingConfig) -> BillingResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self { http, config })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> BillingResult<Self> {
        Self::new(BillingConfig::from_env()?)
    }

    /// Get the config
    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Fetch the signed-in account
    pub async fn get_account(&self) -> BillingResult<Account> {
        let response = self.send(self.request(Method::GET, ACCOUNT_PATH)).await?;
        decode(response).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.config.url(path));
        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> BillingResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), status = %status, "Billing API response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> BillingResult<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Map a non-2xx response onto the billing error taxonomy
///
/// A 409 is a reservation conflict unless the body carries one of the codes
/// the server uses for other conflicts; a 409 without a code counts as one.
fn classify_failure(status: StatusCode, body: &str) -> BillingError {
    let (code, message) = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.is_empty() => {
            let message = if parsed.code != 0 {
                format!("{} (code {})", parsed.error, parsed.code)
            } else {
                parsed.error
            };
            (parsed.code, message)
        }
        _ => (0, body.trim().to_string()),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BillingError::Unauthorized,
        StatusCode::CONFLICT if !NON_RESERVATION_CONFLICT_CODES.contains(&code) => {
            BillingError::TierReservationConflict(message)
        }
        _ => BillingError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

impl BillingApi for BillingClient {
    async fn list_tiers(&self) -> BillingResult<Vec<Tier>> {
        let response = self.send(self.request(Method::GET, TIERS_PATH)).await?;
        decode(response).await
    }

    async fn create_subscription(&self, tier: &str) -> BillingResult<CheckoutRedirect> {
        let builder = self
            .request(Method::POST, SUBSCRIPTION_PATH)
            .json(&SubscriptionRequest { tier });
        let response = self.send(builder).await?;
        decode(response).await
    }

    async fn update_subscription(&self, tier: &str) -> BillingResult<()> {
        let builder = self
            .request(Method::PUT, SUBSCRIPTION_PATH)
            .json(&SubscriptionRequest { tier });
        self.send(builder).await?;
        Ok(())
    }

    async fn delete_subscription(&self) -> BillingResult<()> {
        self.send(self.request(Method::DELETE, SUBSCRIPTION_PATH))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use serial_test::serial;

    fn client_for(server: &mockito::ServerGuard) -> BillingClient {
        BillingClient::new(BillingConfig {
            base_url: server.url(),
            access_token: Some("tk_test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_tiers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/tiers")
            .match_header("authorization", "Bearer tk_test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    { "limits": { "messages": 250 } },
                    { "code": "pro", "name": "Pro", "price": "$10", "limits": { "reservations": 20 } }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let tiers = client_for(&server).list_tiers().await.unwrap();

        mock.assert_async().await;
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].code, None);
        assert_eq!(tiers[1].code.as_deref(), Some("pro"));
        assert_eq!(tiers[1].limits.reservations, 20);
    }

    #[tokio::test]
    async fn test_create_subscription_returns_redirect() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/account/billing/subscription")
            .match_body(Matcher::Json(json!({ "tier": "pro" })))
            .with_status(200)
            .with_body(json!({ "redirect_url": "https://checkout.example.com/c/pay_123" }).to_string())
            .create_async()
            .await;

        let redirect = client_for(&server).create_subscription("pro").await.unwrap();

        mock.assert_async().await;
        assert_eq!(redirect.redirect_url, "https://checkout.example.com/c/pay_123");
    }

    #[tokio::test]
    async fn test_update_and_delete_subscription() {
        let mut server = mockito::Server::new_async().await;
        let update = server
            .mock("PUT", "/v1/account/billing/subscription")
            .match_body(Matcher::Json(json!({ "tier": "business" })))
            .with_status(200)
            .with_body("{\"success\":true}")
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/v1/account/billing/subscription")
            .with_status(200)
            .with_body("{\"success\":true}")
            .create_async()
            .await;

        let client = client_for(&server);
        client.update_subscription("business").await.unwrap();
        client.delete_subscription().await.unwrap();

        update.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_is_classified() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/v1/account/billing/subscription")
            .with_status(401)
            .with_body(json!({ "code": 40101, "http": 401, "error": "unauthorized" }).to_string())
            .create_async()
            .await;

        let err = client_for(&server).update_subscription("pro").await.unwrap_err();
        assert!(matches!(err, BillingError::Unauthorized));
    }

    #[tokio::test]
    async fn test_conflict_is_reservation_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/v1/account/billing/subscription")
            .with_status(409)
            .with_body(
                json!({ "code": 40902, "http": 409, "error": "conflict: too many reservations for this tier" })
                    .to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server).update_subscription("starter").await.unwrap_err();
        match err {
            BillingError::TierReservationConflict(message) => {
                assert!(message.contains("too many reservations"));
                assert!(message.contains("40902"));
            }
            other => panic!("expected reservation conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forbidden_is_classified_as_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/v1/account/billing/subscription")
            .with_status(403)
            .with_body(json!({ "code": 40301, "http": 403, "error": "forbidden" }).to_string())
            .create_async()
            .await;

        let err = client_for(&server).delete_subscription().await.unwrap_err();
        assert!(matches!(err, BillingError::Unauthorized));
    }

    #[tokio::test]
    async fn test_other_conflict_codes_are_not_reservation_conflicts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/account/billing/subscription")
            .with_status(409)
            .with_body(
                json!({ "code": 40903, "http": 409, "error": "conflict: billing subscription already exists" })
                    .to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server).create_subscription("pro").await.unwrap_err();
        match err {
            BillingError::Api { status, message } => {
                assert_eq!(status, 409);
                assert!(message.contains("already exists"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
        // Without a code, a 409 still counts as a reservation conflict
        assert!(matches!(
            classify_failure(StatusCode::CONFLICT, "conflict"),
            BillingError::TierReservationConflict(_)
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_other() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/v1/account/billing/subscription")
            .with_status(500)
            .with_body("internal server error")
            .create_async()
            .await;

        let err = client_for(&server).delete_subscription().await.unwrap_err();
        match err {
            BillingError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal server error");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/tiers")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client_for(&server).list_tiers().await.unwrap_err();
        assert!(matches!(err, BillingError::Json(_)));
        assert_eq!(err.kind(), crate::error::SubmitErrorKind::Other);
    }

    #[tokio::test]
    async fn test_get_account() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/account")
            .with_status(200)
            .with_body(
                json!({
                    "username": "phil",
                    "tier": { "code": "pro", "name": "Pro" },
                    "billing": { "customer": true, "subscription": true, "paid_until": 1741046400 }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let account = client_for(&server).get_account().await.unwrap();
        assert_eq!(account.username, "phil");
        assert_eq!(account.current_tier_code(), Some("pro"));
        assert!(account.paid_until().is_some());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("PLANSHIFT_BASE_URL", "https://billing.example.com/");
        std::env::set_var("PLANSHIFT_ACCESS_TOKEN", "tk_env");
        std::env::set_var("PLANSHIFT_REQUEST_TIMEOUT_MS", "not-a-number");

        let config = BillingConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://billing.example.com");
        assert_eq!(config.access_token.as_deref(), Some("tk_env"));
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.url("/v1/tiers"), "https://billing.example.com/v1/tiers");

        std::env::remove_var("PLANSHIFT_BASE_URL");
        std::env::remove_var("PLANSHIFT_ACCESS_TOKEN");
        std::env::remove_var("PLANSHIFT_REQUEST_TIMEOUT_MS");
    }

    #[test]
    #[serial]
    fn test_config_rejects_non_http_url() {
        std::env::set_var("PLANSHIFT_BASE_URL", "ftp://billing.example.com");
        let result = BillingConfig::from_env();
        assert!(matches!(result, Err(BillingError::Config(_))));
        std::env::remove_var("PLANSHIFT_BASE_URL");
    }

    #[test]
    #[serial]
    fn test_config_reads_token_file() {
        let path = std::env::temp_dir().join(format!("planshift-token-{}", std::process::id()));
        std::fs::write(&path, "tk_from_file\n").unwrap();
        std::env::remove_var("PLANSHIFT_ACCESS_TOKEN");
        std::env::set_var("PLANSHIFT_TOKEN_FILE", &path);

        let config = BillingConfig::from_env().unwrap();
        assert_eq!(config.access_token.as_deref(), Some("tk_from_file"));
        assert_eq!(config.token_file.as_deref(), Some(path.as_path()));

        std::env::remove_var("PLANSHIFT_TOKEN_FILE");
        let _ = std::fs::remove_file(&path);
    }
}
