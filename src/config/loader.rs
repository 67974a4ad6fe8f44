//! Configuration loader for YAML files
//!
//! This module handles loading and validating configuration from YAML files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;

use super::types::AppConfig;

/// Load configuration from a YAML file
///
/// This function:
/// 1. Checks if the file exists
/// 2. Parses the YAML content
/// 3. Applies environment overrides (`WECHAT_WEBHOOK`)
/// 4. Validates the configuration rules
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use funding_monitor::config::load_config;
///
/// let config = load_config(Path::new("config.yaml"))?;
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut config: AppConfig = serde_yaml::from_reader(reader).map_err(|e| {
        AppError::Config(format!("YAML parse error in '{}': {}", path.display(), e))
    })?;

    config.apply_env_overrides();
    config.validate()?;

    Ok(config)
}

/// Load configuration from a YAML string (no environment overrides)
pub fn load_config_from_str(yaml_content: &str) -> Result<AppConfig, AppError> {
    let config: AppConfig = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    config.validate()?;

    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG_YAML: &str = r#"
monitor:
  threshold: 0.005
  cooldown_secs: 1800
  top_n: 3
  cycle_interval_secs: 15
sources:
  - binance
  - okx
  - gate
notifier:
  wechat_webhook: "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=test"
"#;

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(VALID_CONFIG_YAML).unwrap();
        assert_eq!(config.monitor.threshold, 0.005);
        assert_eq!(config.monitor.cooldown_secs, 1800);
        assert_eq!(config.monitor.top_n, 3);
        // Unset keys keep their defaults
        assert_eq!(config.monitor.refresh_interval_secs, 3600);
        assert_eq!(config.monitor.utc_offset_hours, 8);
        assert_eq!(config.sources, vec!["binance", "okx", "gate"]);
        assert!(config.webhook().unwrap().ends_with("key=test"));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.sources.len(), 6);
        assert!(config.webhook().is_none());
    }

    #[test]
    fn test_load_config_from_str_invalid_yaml() {
        let result = load_config_from_str("monitor: [threshold");
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    fn test_load_config_from_str_validation_failure() {
        let yaml = r#"
monitor:
  top_n: 0
"#;
        let result = load_config_from_str(yaml);
        assert!(result.unwrap_err().to_string().contains("top_n must be >= 1"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.yaml"));
        assert!(result.unwrap_err().to_string().contains("Configuration file not found"));
    }

    #[test]
    #[serial]
    fn test_load_config_from_file() {
        std::env::remove_var(crate::config::WEBHOOK_ENV);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID_CONFIG_YAML.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.sources.len(), 3);
        assert!(config.webhook().unwrap().ends_with("key=test"));
    }

    #[test]
    #[serial]
    fn test_load_config_env_webhook_wins() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID_CONFIG_YAML.as_bytes()).unwrap();

        std::env::set_var(crate::config::WEBHOOK_ENV, "https://override.invalid/hook");
        let config = load_config(file.path());
        std::env::remove_var(crate::config::WEBHOOK_ENV);

        assert_eq!(config.unwrap().webhook(), Some("https://override.invalid/hook"));
    }

    #[test]
    fn test_load_config_file_parse_error_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"sources: {broken").unwrap();
        let err = load_config(file.path()).unwrap_err().to_string();
        assert!(err.contains("YAML parse error in"));
    }
}
