//! Trait abstraction for the sandbox SDK to enable mocking in tests

use async_trait::async_trait;
use serde_json::Value;

use super::error::SdkError;
use super::exchange::{ChargeRequest, Endpoint, Exchange};
use super::keys::{Credentials, SdkMode};

/// Trait for sandbox SDK operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SdkClientTrait: Send + Sync {
    /// Generate fresh credentials for `mode` and prepare the auth request
    fn initialize(&mut self, mode: SdkMode) -> Credentials;

    /// Switch mode, regenerating credentials if already initialized
    fn set_mode(&mut self, mode: SdkMode);

    fn mode(&self) -> SdkMode;

    fn credentials(&self) -> Option<Credentials>;

    fn is_authenticated(&self) -> bool;

    /// Current request/response panel for an endpoint
    fn exchange(&self, endpoint: Endpoint) -> Exchange;

    /// Exchange the keys for a bearer token
    async fn authenticate(&mut self) -> Result<String, SdkError>;

    /// Fetch the current user
    async fn get_user(&mut self) -> Result<Value, SdkError>;

    /// List saved payment methods
    async fn get_cards(&mut self) -> Result<Value, SdkError>;

    /// Create a charge
    async fn charge(&mut self, request: ChargeRequest) -> Result<Value, SdkError>;
}
