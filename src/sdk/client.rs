//! Simulated payment SDK client
//!
//! Every call fabricates a JSON response after a fixed delay and records the
//! request/response pair so it can be inspected. Nothing leaves the process.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;

use super::error::SdkError;
use super::exchange::{ApiRequest, ChargeRequest, Endpoint, Exchange};
use super::keys::{base36, Credentials, SdkMode};
use super::traits::SdkClientTrait;

/// Default simulated network delay
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);

/// Client for the sandbox payment API
#[derive(Debug)]
pub struct SandboxClient {
    mode: SdkMode,
    credentials: Option<Credentials>,
    auth_token: Option<String>,
    latency: Duration,
    /// The user lookup demonstrates a failing call
    fail_user_lookup: bool,
    exchanges: BTreeMap<Endpoint, Exchange>,
}

impl SandboxClient {
    pub fn new(mode: SdkMode) -> Self {
        Self {
            mode,
            credentials: None,
            auth_token: None,
            latency: DEFAULT_LATENCY,
            fail_user_lookup: true,
            exchanges: Endpoint::ALL
                .into_iter()
                .map(|endpoint| (endpoint, Exchange::default()))
                .collect(),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_failing_user_lookup(mut self, fail: bool) -> Self {
        self.fail_user_lookup = fail;
        self
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    fn slot(&mut self, endpoint: Endpoint) -> &mut Exchange {
        self.exchanges.entry(endpoint).or_default()
    }

    fn require_token(&self) -> Result<String, SdkError> {
        self.auth_token.clone().ok_or(SdkError::NotAuthenticated)
    }

    /// Templates for the calls that need a token
    fn prepare_authorized_requests(&mut self, token: &str) {
        let user = ApiRequest::get(Endpoint::User).with_bearer(token);
        let cards = ApiRequest::get(Endpoint::Cards)
            .with_bearer(token)
            .with_params(json!({ "limit": 10, "offset": 0 }));
        let charge = ApiRequest::post(Endpoint::Charge, ChargeRequest::sample().to_body())
            .with_bearer(token);

        *self.slot(Endpoint::User) = Exchange::prepared(user);
        *self.slot(Endpoint::Cards) = Exchange::prepared(cards);
        *self.slot(Endpoint::Charge) = Exchange::prepared(charge);
    }

    /// Mark the call in flight, wait out the latency, then record the result
    async fn simulate(
        &mut self,
        endpoint: Endpoint,
        response: Value,
        should_fail: bool,
    ) -> Result<Value, SdkError> {
        self.slot(endpoint).start();
        tracing::info!(endpoint = %endpoint, "Sandbox request sent");

        tokio::time::sleep(self.latency).await;

        if should_fail {
            let message = "The request could not be processed due to validation errors.";
            let body = json!({
                "status": 400,
                "error": "Bad Request",
                "message": message,
                "details": {
                    "code": "VALIDATION_ERROR",
                    "fields": ["Invalid parameters"],
                },
            });
            self.slot(endpoint).finish(body, true);
            tracing::warn!(endpoint = %endpoint, "Sandbox request rejected");
            return Err(SdkError::Rejected {
                endpoint: endpoint.path().to_string(),
                status: 400,
                code: "VALIDATION_ERROR".to_string(),
                message: message.to_string(),
            });
        }

        self.slot(endpoint).finish(response.clone(), false);
        tracing::info!(endpoint = %endpoint, "Sandbox request succeeded");
        Ok(response)
    }
}

impl Default for SandboxClient {
    fn default() -> Self {
        Self::new(SdkMode::default())
    }
}

#[async_trait]
impl SdkClientTrait for SandboxClient {
    fn initialize(&mut self, mode: SdkMode) -> Credentials {
        let credentials = Credentials::generate(mode);
        let keys = &credentials.keys;
        let request = ApiRequest::post(
            Endpoint::Auth,
            json!({
                "apiKey": keys.api_key,
                "publicKey": keys.public_key,
                "secretKey": keys.secret_key,
            }),
        );

        self.mode = mode;
        self.credentials = Some(credentials.clone());
        self.auth_token = None;
        for endpoint in Endpoint::ALL {
            *self.slot(endpoint) = Exchange::default();
        }
        *self.slot(Endpoint::Auth) = Exchange::prepared(request);

        tracing::info!(mode = %mode, endpoint = %credentials.endpoint_url, "Sandbox initialized");
        credentials
    }

    fn set_mode(&mut self, mode: SdkMode) {
        if mode == self.mode {
            return;
        }
        if self.credentials.is_some() {
            self.initialize(mode);
        } else {
            self.mode = mode;
        }
    }

    fn mode(&self) -> SdkMode {
        self.mode
    }

    fn credentials(&self) -> Option<Credentials> {
        self.credentials.clone()
    }

    fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    fn exchange(&self, endpoint: Endpoint) -> Exchange {
        self.exchanges.get(&endpoint).cloned().unwrap_or_default()
    }

    async fn authenticate(&mut self) -> Result<String, SdkError> {
        if self.credentials.is_none() {
            return Err(SdkError::NotInitialized);
        }

        let token = format!("oauth_{}_{}", base36(13), base36(13));
        let response = json!({
            "status": 200,
            "data": {
                "token": token,
                "expires_in": 3600,
                "token_type": "Bearer",
                "scope": "read write",
            },
        });

        self.simulate(Endpoint::Auth, response, false).await?;
        self.prepare_authorized_requests(&token);
        self.auth_token = Some(token.clone());
        Ok(token)
    }

    async fn get_user(&mut self) -> Result<Value, SdkError> {
        self.require_token()?;
        let now = Utc::now().to_rfc3339();
        let response = json!({
            "status": 200,
            "data": {
                "id": format!("usr_{}", base36(8)),
                "email": "user@example.com",
                "name": "John Doe",
                "created": now,
                "metadata": { "lastLogin": now },
            },
        });
        let fail = self.fail_user_lookup;
        self.simulate(Endpoint::User, response, fail).await
    }

    async fn get_cards(&mut self) -> Result<Value, SdkError> {
        self.require_token()?;
        let response = json!({
            "status": 200,
            "data": {
                "total": 2,
                "data": [
                    {
                        "id": format!("card_{}", base36(8)),
                        "type": "card",
                        "brand": "visa",
                        "last4": "4242",
                        "expMonth": 12,
                        "expYear": 2025,
                        "isDefault": true,
                    },
                    {
                        "id": format!("card_{}", base36(8)),
                        "type": "card",
                        "brand": "mastercard",
                        "last4": "8210",
                        "expMonth": 3,
                        "expYear": 2024,
                        "isDefault": false,
                    },
                ],
            },
        });
        self.simulate(Endpoint::Cards, response, false).await
    }

    async fn charge(&mut self, request: ChargeRequest) -> Result<Value, SdkError> {
        let token = self.require_token()?;
        let api_request = ApiRequest::post(Endpoint::Charge, request.to_body())
            .with_bearer(&token)
            .with_header("Idempotency-Key", uuid::Uuid::new_v4().to_string());
        *self.slot(Endpoint::Charge) = Exchange::prepared(api_request);

        let response = json!({
            "status": 200,
            "data": {
                "id": format!("ch_{}", base36(8)),
                "amount": request.amount,
                "currency": request.currency,
                "status": "succeeded",
                "payment_method": request.payment_method,
                "created": Utc::now().to_rfc3339(),
                "description": request.description,
                "metadata": { "orderId": request.order_id },
            },
        });
        self.simulate(Endpoint::Charge, response, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SandboxClient {
        SandboxClient::new(SdkMode::Mock).with_latency(Duration::ZERO)
    }

    async fn authenticated() -> SandboxClient {
        let mut client = client();
        client.initialize(SdkMode::Mock);
        client.authenticate().await.unwrap();
        client
    }

    mod initialization {
        use super::*;

        #[test]
        fn test_new_client_is_empty() {
            let client = client();
            assert!(client.credentials().is_none());
            assert!(!client.is_authenticated());
            assert_eq!(client.exchange(Endpoint::Auth), Exchange::default());
        }

        #[test]
        fn test_initialize_prepares_auth_request() {
            let mut client = client();
            let credentials = client.initialize(SdkMode::Mock);
            let exchange = client.exchange(Endpoint::Auth);
            let request = exchange.request.unwrap();

            assert_eq!(request.method, "POST");
            assert_eq!(request.endpoint, "/api/auth/token");
            assert_eq!(
                request.body.unwrap()["apiKey"],
                json!(credentials.keys.api_key)
            );
            assert!(exchange.response.is_none());
        }

        #[test]
        fn test_set_mode_reinitializes_when_initialized() {
            let mut client = client();
            client.set_mode(SdkMode::Live);
            assert_eq!(client.mode(), SdkMode::Live);
            assert!(client.credentials().is_none());

            let first = client.initialize(SdkMode::Live);
            client.set_mode(SdkMode::Mock);
            let second = client.credentials().unwrap();
            assert_eq!(second.mode, SdkMode::Mock);
            assert_ne!(first.keys, second.keys);
            assert!(second.keys.client_id.starts_with("dev_"));
        }

        #[test]
        fn test_set_same_mode_keeps_keys() {
            let mut client = client();
            let first = client.initialize(SdkMode::Mock);
            client.set_mode(SdkMode::Mock);
            assert_eq!(client.credentials(), Some(first));
        }
    }

    mod calls {
        use super::*;

        #[tokio::test]
        async fn test_authenticate_requires_keys() {
            let mut client = client();
            assert_eq!(client.authenticate().await, Err(SdkError::NotInitialized));
        }

        #[tokio::test]
        async fn test_authenticate_issues_token_and_templates() {
            let client = authenticated().await;
            let token = client.auth_token().unwrap().to_string();
            assert!(token.starts_with("oauth_"));
            assert_eq!(token.len(), "oauth_".len() + 13 + 1 + 13);

            let auth = client.exchange(Endpoint::Auth);
            assert_eq!(auth.response.unwrap()["data"]["token_type"], json!("Bearer"));

            let cards = client.exchange(Endpoint::Cards).request.unwrap();
            assert_eq!(cards.headers["Authorization"], format!("Bearer {token}"));
        }

        #[tokio::test]
        async fn test_calls_need_a_token() {
            let mut client = client();
            client.initialize(SdkMode::Mock);
            assert_eq!(client.get_cards().await, Err(SdkError::NotAuthenticated));
            assert_eq!(
                client.charge(ChargeRequest::sample()).await,
                Err(SdkError::NotAuthenticated)
            );
        }

        #[tokio::test]
        async fn test_user_lookup_fails_by_default() {
            let mut client = authenticated().await;
            let result = client.get_user().await;
            assert!(matches!(result, Err(SdkError::Rejected { status: 400, .. })));

            let exchange = client.exchange(Endpoint::User);
            assert!(exchange.has_error);
            assert!(!exchange.is_loading);
            assert_eq!(
                exchange.response.unwrap()["details"]["code"],
                json!("VALIDATION_ERROR")
            );
        }

        #[tokio::test]
        async fn test_user_lookup_can_succeed() {
            let mut client = authenticated().await.with_failing_user_lookup(false);
            let user = client.get_user().await.unwrap();
            assert!(user["data"]["id"].as_str().unwrap().starts_with("usr_"));
        }

        #[tokio::test]
        async fn test_cards_listing() {
            let mut client = authenticated().await;
            let cards = client.get_cards().await.unwrap();
            assert_eq!(cards["data"]["total"], json!(2));
            assert_eq!(cards["data"]["data"][0]["last4"], json!("4242"));
            assert_eq!(cards["data"]["data"][1]["brand"], json!("mastercard"));
        }

        #[tokio::test]
        async fn test_charge_echoes_request() {
            let mut client = authenticated().await;
            let request = ChargeRequest {
                amount: 12500,
                currency: "eur".to_string(),
                payment_method: "card_4242".to_string(),
                description: "Apartment booking".to_string(),
                order_id: "order_42".to_string(),
            };
            let charge = client.charge(request).await.unwrap();
            assert!(charge["data"]["id"].as_str().unwrap().starts_with("ch_"));
            assert_eq!(charge["data"]["amount"], json!(12500));
            assert_eq!(charge["data"]["status"], json!("succeeded"));
            assert_eq!(charge["data"]["metadata"]["orderId"], json!("order_42"));

            let sent = client.exchange(Endpoint::Charge).request.unwrap();
            assert!(sent.headers.contains_key("Idempotency-Key"));
            assert_eq!(sent.body.unwrap()["currency"], json!("eur"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_latency_is_simulated() {
            let mut client = SandboxClient::new(SdkMode::Mock);
            client.initialize(SdkMode::Mock);
            let started = tokio::time::Instant::now();
            client.authenticate().await.unwrap();
            assert!(started.elapsed() >= DEFAULT_LATENCY);
        }
    }
}
