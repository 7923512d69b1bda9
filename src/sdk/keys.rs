//! Fake credentials and identifiers for the sandbox

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::SdkError;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Which environment the generated credentials pretend to target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdkMode {
    #[default]
    Live,
    Mock,
}

impl SdkMode {
    /// Prefix for client and secret ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Live => "pb_",
            Self::Mock => "dev_",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Live => "https://api.payment.com",
            Self::Mock => "https://sandbox.payment.api",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::Mock => "MOCK",
        }
    }
}

impl fmt::Display for SdkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for SdkMode {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "mock" | "dev" => Ok(Self::Mock),
            _ => Err(SdkError::UnknownMode(s.to_string())),
        }
    }
}

/// API keys handed to the developer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkKeys {
    pub api_key: String,
    pub public_key: String,
    pub secret_key: String,
    pub client_id: String,
    pub secret_id: String,
}

impl SdkKeys {
    pub fn generate(mode: SdkMode) -> Self {
        let prefix = mode.id_prefix();
        Self {
            api_key: alphanumeric(24),
            public_key: alphanumeric(24),
            secret_key: alphanumeric(24),
            client_id: format!("{prefix}{}", alphanumeric(16)),
            secret_id: format!("{prefix}{}", alphanumeric(16)),
        }
    }
}

/// Keys plus the endpoint they were issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub mode: SdkMode,
    pub keys: SdkKeys,
    pub endpoint_url: String,
}

impl Credentials {
    pub fn generate(mode: SdkMode) -> Self {
        Self {
            mode,
            keys: SdkKeys::generate(mode),
            endpoint_url: format!("{}/{}", mode.base_url(), alphanumeric(8).to_lowercase()),
        }
    }
}

/// Random mixed-case letters and digits
pub fn alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random lowercase letters and digits
pub fn base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("live".parse::<SdkMode>().unwrap(), SdkMode::Live);
        assert_eq!("MOCK".parse::<SdkMode>().unwrap(), SdkMode::Mock);
        assert!("staging".parse::<SdkMode>().is_err());
    }

    #[test]
    fn test_mode_serde() {
        assert_eq!(serde_json::to_string(&SdkMode::Mock).unwrap(), "\"mock\"");
        let parsed: SdkMode = serde_json::from_str("\"live\"").unwrap();
        assert_eq!(parsed, SdkMode::Live);
    }

    #[test]
    fn test_keys_shape() {
        let keys = SdkKeys::generate(SdkMode::Live);
        assert_eq!(keys.api_key.len(), 24);
        assert_eq!(keys.public_key.len(), 24);
        assert_eq!(keys.secret_key.len(), 24);
        assert!(keys.client_id.starts_with("pb_"));
        assert_eq!(keys.client_id.len(), 3 + 16);
        assert!(keys.api_key.chars().all(|c| c.is_ascii_alphanumeric()));

        let keys = SdkKeys::generate(SdkMode::Mock);
        assert!(keys.secret_id.starts_with("dev_"));
    }

    #[test]
    fn test_endpoint_url_follows_mode() {
        let live = Credentials::generate(SdkMode::Live);
        assert!(live.endpoint_url.starts_with("https://api.payment.com/"));
        let suffix = live.endpoint_url.rsplit('/').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert_eq!(suffix, suffix.to_lowercase());

        let mock = Credentials::generate(SdkMode::Mock);
        assert!(mock.endpoint_url.starts_with("https://sandbox.payment.api/"));
    }

    #[test]
    fn test_base36_alphabet() {
        let id = base36(32);
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_keys_serialize_camel_case() {
        let json = serde_json::to_value(SdkKeys::generate(SdkMode::Live)).unwrap();
        assert!(json.get("apiKey").is_some());
        assert!(json.get("clientId").is_some());
    }
}
