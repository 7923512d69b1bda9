//! Sandbox payment SDK
//!
//! A stand-in for a third-party payment API: fake credentials, canned
//! responses and an artificial delay.

mod client;
mod error;
mod exchange;
mod keys;
mod traits;

pub use client::{SandboxClient, DEFAULT_LATENCY};
pub use error::SdkError;
pub use exchange::{ApiRequest, ChargeRequest, Endpoint, Exchange};
pub use keys::{Credentials, SdkKeys, SdkMode};
pub use traits::SdkClientTrait;

#[cfg(test)]
pub use traits::MockSdkClientTrait;
