//! Binance Configuration

// =============================================================================
// Constants
// =============================================================================

/// Mainnet REST URL for USDⓈ-M futures
const MAINNET_REST_URL: &str = "https://fapi.binance.com";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Binance source (public market data only)
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// REST base URL
    pub base_url: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: MAINNET_REST_URL.to_string(),
        }
    }
}

impl BinanceConfig {
    /// Create configuration from environment variables
    ///
    /// `BINANCE_API_URL` overrides the REST base URL.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("BINANCE_API_URL").unwrap_or_else(|_| MAINNET_REST_URL.to_string());
        Self { base_url }
    }

    /// Point the source at a different host (mock servers, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}
