use crate::domain::model::{Bound, OutputFormat, DEFAULT_BOUND, MAX_BOUND};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::Level;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub scan: ScanSection,
    pub output: Option<OutputSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSection {
    pub bound: Option<i64>,
    pub max_bound: Option<i64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
    pub log_level: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ScanError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScanError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures<'_>| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn raw_bound(&self) -> i64 {
        self.scan.bound.unwrap_or(DEFAULT_BOUND)
    }

    pub fn max_bound(&self) -> i64 {
        self.scan.max_bound.unwrap_or(MAX_BOUND)
    }

    pub fn format_name(&self) -> &str {
        self.output
            .as_ref()
            .map(|o| o.format.as_str())
            .unwrap_or("text")
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    /// `monitoring.log_level` as a tracing level; names are case-insensitive.
    pub fn tracing_level(&self) -> Result<Option<Level>> {
        let Some(level) = self.log_level() else {
            return Ok(None);
        };
        validate_non_empty_string("monitoring.log_level", level)?;
        level
            .trim()
            .parse::<Level>()
            .map(Some)
            .map_err(|_| ScanError::InvalidConfigValueError {
                field: "monitoring.log_level".to_string(),
                value: level.to_string(),
                reason: "Valid levels: trace, debug, info, warn, error".to_string(),
            })
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_range("scan.max_bound", self.max_bound(), i64::MIN, MAX_BOUND)?;
        validate_range("scan.bound", self.raw_bound(), i64::MIN, self.max_bound())?;

        if let Some(seconds) = self.scan.timeout_seconds {
            validate_positive_number("scan.timeout_seconds", seconds, 1)?;
        }

        // 與 CLI 相同，格式名稱不分大小寫
        self.format_name().parse::<OutputFormat>()?;
        self.tracing_level()?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    /// Only meaningful after `validate`; out-of-range values fall back to the default bound.
    fn bound(&self) -> Bound {
        Bound::new(self.raw_bound()).unwrap_or_default()
    }

    fn timeout(&self) -> Option<Duration> {
        self.scan.timeout_seconds.map(Duration::from_secs)
    }

    fn output_format(&self) -> OutputFormat {
        self.format_name().parse().unwrap_or_default()
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[scan]
bound = 100
max_bound = 1000
timeout_seconds = 30

[output]
format = "json"

[monitoring]
enabled = true
log_level = "debug"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.bound().get(), 100);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_level(), Some("debug"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.bound(), Bound::default());
        assert_eq!(config.output_format(), OutputFormat::Text);
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PRIME_SCAN_TEST_BOUND", "250");

        let config = TomlConfig::from_toml_str(
            r#"
[scan]
bound = ${PRIME_SCAN_TEST_BOUND}
"#,
        )
        .unwrap();
        assert_eq!(config.raw_bound(), 250);

        std::env::remove_var("PRIME_SCAN_TEST_BOUND");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let content = r#"format = "${PRIME_SCAN_SURELY_UNSET}""#;
        assert_eq!(TomlConfig::substitute_env_vars(content), content);
    }

    #[test]
    fn test_bound_above_max_bound_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[scan]
bound = 5000
max_bound = 1000
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scan.bound"));
    }

    #[test]
    fn test_unknown_format_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[output]
format = "xml"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_format_is_case_insensitive_like_the_cli() {
        let config = TomlConfig::from_toml_str(
            r#"
[output]
format = "JSON"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert_eq!(config.output_format(), "JSON".parse::<OutputFormat>().unwrap());
    }

    #[test]
    fn test_log_level_is_parsed() {
        for (raw, expected) in [
            ("trace", Level::TRACE),
            ("WARN", Level::WARN),
            ("error", Level::ERROR),
        ] {
            let config = TomlConfig::from_toml_str(&format!(
                "[monitoring]\nenabled = false\nlog_level = \"{}\"\n",
                raw
            ))
            .unwrap();
            assert!(config.validate().is_ok(), "level {}", raw);
            assert_eq!(config.tracing_level().unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_unknown_log_level_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[monitoring]
enabled = false
log_level = "loud"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("monitoring.log_level"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = TomlConfig::from_toml_str("[scan\nbound = ").unwrap_err();
        assert!(matches!(err, ScanError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[scan]\nbound = 30\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.bound().get(), 30);
    }

    #[test]
    fn test_missing_file() {
        let err = TomlConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ScanError::ConfigError { .. }));
    }
}
