use crate::analyzer::scoring::ScoringConstants;
use crate::analyzer::summary::Markup;
use crate::model::{ComparisonRequest, ConfigError, Priorities};
use crate::session::{DEFAULT_MAX_COMPARE, MIN_COMPARE};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub label: Option<String>,
    pub ids: Vec<String>,
    #[serde(default)]
    pub priorities: Priorities,
    #[serde(default)]
    pub prompt: String,
}

impl RequestConfig {
    pub fn to_request(&self) -> ComparisonRequest {
        ComparisonRequest::new(self.ids.clone(), self.priorities, self.prompt.clone())
    }

    /// Explicit label, or the joined ids.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.trim().to_string(),
            _ => self.ids.join(" vs "),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub catalog: String,
    #[serde(default = "default_delay_ms")]
    pub simulated_delay_ms: u64,
    #[serde(default = "default_max_compare")]
    pub max_compare: usize,
    #[serde(default)]
    pub markup: Markup,
    #[serde(default)]
    pub scoring: ScoringConstants,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub requests: Vec<RequestConfig>,
}

fn default_delay_ms() -> u64 {
    1500
}

fn default_max_compare() -> usize {
    DEFAULT_MAX_COMPARE
}

impl AppConfig {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog location is empty".into()));
        }
        if self.max_compare < MIN_COMPARE {
            return Err(ConfigError::Invalid(format!(
                "max_compare must be at least {}, got {}",
                MIN_COMPARE, self.max_compare
            )));
        }
        for (name, value) in [
            ("price_scale", self.scoring.price_scale),
            ("balance_scale", self.scoring.balance_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("scoring.{} must be positive, got {}", name, value)));
            }
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(r#"{"catalog": "data/products.json"}"#).unwrap();
        assert_eq!(config.simulated_delay(), Duration::from_millis(1500));
        assert_eq!(config.max_compare, 3);
        assert_eq!(config.markup, Markup::Html);
        assert_eq!(config.scoring, ScoringConstants::default());
        assert!(config.output_dir.is_none());
        assert!(config.requests.is_empty());
    }

    #[test]
    fn test_requests_are_lenient() {
        let config = parse_config(
            r#"{
                "catalog": "data/products.json",
                "markup": "plain",
                "requests": [
                    {"label": "Gaming", "ids": ["a", "b"], "priorities": {"performance": "90", "mobility": 130}, "prompt": "chơi game"},
                    {"ids": ["c", "d"]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.markup, Markup::Plain);
        let gaming = config.requests[0].to_request();
        assert_eq!(gaming.priorities, Priorities::new(90.0, 100.0, 50.0));
        assert_eq!(gaming.prompt, "chơi game");
        assert_eq!(config.requests[0].display_label(), "Gaming");
        assert_eq!(config.requests[1].display_label(), "c vs d");
        assert_eq!(config.requests[1].to_request().priorities, Priorities::default());
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(parse_config(r#"{"catalog": "  "}"#), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            parse_config(r#"{"catalog": "x.json", "max_compare": 1}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse_config(r#"{"catalog": "x.json", "scoring": {"price_scale": 0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(parse_config("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"catalog": "https://example.com/p.json", "simulated_delay_ms": 0}"#).unwrap();
        let config = load_config(path.to_str().unwrap()).unwrap();
        assert!(config.simulated_delay().is_zero());
        assert!(matches!(load_config("does/not/exist.json"), Err(ConfigError::Io(_))));
    }
}
