//! Request/response pairs shown in the sandbox inspector

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The mocked API endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    Auth,
    User,
    Cards,
    Charge,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [Self::Auth, Self::User, Self::Cards, Self::Charge];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Auth => "/api/auth/token",
            Self::User => "/api/users/current",
            Self::Cards => "/api/payment-methods",
            Self::Charge => "/api/charges",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth => "Authentication",
            Self::User => "User",
            Self::Cards => "Payment methods",
            Self::Charge => "Charge",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// A request as the developer would send it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub method: String,
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl ApiRequest {
    fn new(method: &str, endpoint: Endpoint) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            method: method.to_string(),
            endpoint: endpoint.path().to_string(),
            headers,
            body: None,
            params: None,
        }
    }

    pub fn get(endpoint: Endpoint) -> Self {
        Self::new("GET", endpoint)
    }

    pub fn post(endpoint: Endpoint, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new("POST", endpoint)
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// State of one endpoint panel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub request: Option<ApiRequest>,
    pub response: Option<Value>,
    pub is_loading: bool,
    pub has_error: bool,
}

impl Exchange {
    /// A request template that has not been sent yet
    pub fn prepared(request: ApiRequest) -> Self {
        Self {
            request: Some(request),
            ..Self::default()
        }
    }

    pub fn start(&mut self) {
        self.response = None;
        self.is_loading = true;
        self.has_error = false;
    }

    pub fn finish(&mut self, response: Value, has_error: bool) {
        self.response = Some(response);
        self.is_loading = false;
        self.has_error = has_error;
    }
}

/// A charge the checkout asks the SDK to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeRequest {
    /// Amount in minor units
    pub amount: u64,
    pub currency: String,
    pub payment_method: String,
    pub description: String,
    pub order_id: String,
}

impl ChargeRequest {
    /// The sample order preloaded in the charge panel
    pub fn sample() -> Self {
        Self {
            amount: 2000,
            currency: "usd".to_string(),
            payment_method: "card_default".to_string(),
            description: "Payment for order #1234".to_string(),
            order_id: "order_1234".to_string(),
        }
    }

    pub fn to_body(&self) -> Value {
        json!({
            "amount": self.amount,
            "currency": self.currency,
            "payment_method": self.payment_method,
            "description": self.description,
            "metadata": { "orderId": self.order_id },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_request_shape() {
        let request = ApiRequest::get(Endpoint::Cards)
            .with_bearer("tok")
            .with_params(json!({ "limit": 10, "offset": 0 }));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "GET",
                "endpoint": "/api/payment-methods",
                "headers": {
                    "Authorization": "Bearer tok",
                    "Content-Type": "application/json",
                },
                "params": { "limit": 10, "offset": 0 },
            })
        );
    }

    #[test]
    fn test_post_request_has_body() {
        let request = ApiRequest::post(Endpoint::Charge, ChargeRequest::sample().to_body());
        assert_eq!(request.method, "POST");
        assert_eq!(request.body.as_ref().unwrap()["amount"], json!(2000));
        assert_eq!(request.body.as_ref().unwrap()["metadata"]["orderId"], json!("order_1234"));
    }

    #[test]
    fn test_exchange_lifecycle() {
        let mut exchange = Exchange::prepared(ApiRequest::get(Endpoint::User));
        assert!(!exchange.is_loading);
        exchange.start();
        assert!(exchange.is_loading);
        assert!(exchange.response.is_none());
        exchange.finish(json!({ "status": 400 }), true);
        assert!(!exchange.is_loading);
        assert!(exchange.has_error);

        exchange.start();
        assert!(!exchange.has_error);
    }

    #[test]
    fn test_exchange_serializes_camel_case() {
        let json = serde_json::to_value(Exchange::default()).unwrap();
        assert_eq!(json["isLoading"], json!(false));
        assert_eq!(json["hasError"], json!(false));
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Auth.to_string(), "/api/auth/token");
        assert_eq!(Endpoint::ALL.len(), 4);
    }
}
