//! MEXC Configuration

const MAINNET_REST_URL: &str = "https://contract.mexc.com";

/// Contracts below this 24h turnover (quote currency) are ignored
pub const DEFAULT_MIN_TURNOVER_24H: f64 = 1_000_000.0;

#[derive(Debug, Clone)]
pub struct MexcConfig {
    /// REST base URL
    pub base_url: String,
    /// Minimum 24h turnover for a contract to be reported
    pub min_turnover_24h: f64,
}

impl Default for MexcConfig {
    fn default() -> Self {
        Self {
            base_url: MAINNET_REST_URL.to_string(),
            min_turnover_24h: DEFAULT_MIN_TURNOVER_24H,
        }
    }
}

impl MexcConfig {
    /// `MEXC_API_URL` overrides the REST base URL.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("MEXC_API_URL").unwrap_or_else(|_| MAINNET_REST_URL.to_string());
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
