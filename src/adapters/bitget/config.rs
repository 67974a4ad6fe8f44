//! Bitget Configuration

const MAINNET_REST_URL: &str = "https://api.bitget.com";

#[derive(Debug, Clone)]
pub struct BitgetConfig {
    /// REST base URL
    pub base_url: String,
}

impl Default for BitgetConfig {
    fn default() -> Self {
        Self {
            base_url: MAINNET_REST_URL.to_string(),
        }
    }
}

impl BitgetConfig {
    /// `BITGET_API_URL` overrides the REST base URL.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("BITGET_API_URL").unwrap_or_else(|_| MAINNET_REST_URL.to_string());
        Self { base_url }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}
