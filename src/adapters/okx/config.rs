//! OKX Configuration

/// Mainnet REST URL
const MAINNET_REST_URL: &str = "https://www.okx.com";

/// Configuration for the OKX source (public market data only)
#[derive(Debug, Clone)]
pub struct OkxConfig {
    /// REST base URL
    pub base_url: String,
}

impl Default for OkxConfig {
    fn default() -> Self {
        Self {
            base_url: MAINNET_REST_URL.to_string(),
        }
    }
}

impl OkxConfig {
    /// `OKX_API_URL` overrides the REST base URL.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OKX_API_URL").unwrap_or_else(|_| MAINNET_REST_URL.to_string());
        Self { base_url }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}
