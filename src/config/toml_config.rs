use crate::core::OutputFormat;
use crate::utils::error::{Result, SeqError};
use crate::utils::validation::{validate_optional_positive, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional run file, e.g.
///
/// ```toml
/// [run]
/// max_length = 3
/// format = "hex"
///
/// [monitoring]
/// enabled = true
/// every_iterations = 1000000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub run: RunSection,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSection {
    pub max_iterations: Option<u64>,
    pub max_length: Option<u64>,
    pub format: Option<OutputFormat>,
    pub flush_every: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub every_iterations: Option<u64>,
}

impl RunConfig {
    /// 從 TOML 檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SeqError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SeqError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// `${VAR}` 換成環境變數，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| SeqError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_optional_positive("run.max_iterations", self.run.max_iterations)?;
        validate_optional_positive("run.max_length", self.run.max_length)?;
        validate_optional_positive("run.flush_every", self.run.flush_every)?;
        if let Some(monitoring) = &self.monitoring {
            validate_optional_positive("monitoring.every_iterations", monitoring.every_iterations)?;
        }
        Ok(())
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
[run]
max_iterations = 1000
max_length = 2
format = "hex"
flush_every = 64

[monitoring]
enabled = true
every_iterations = 500
"#;

        let config = RunConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.run.max_iterations, Some(1000));
        assert_eq!(config.run.max_length, Some(2));
        assert_eq!(config.run.format, Some(OutputFormat::Hex));
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_unbounded() {
        let config = RunConfig::from_toml_str("").unwrap();
        assert_eq!(config.run.max_iterations, None);
        assert_eq!(config.run.max_length, None);
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BYTESEQ_TEST_MAX_LENGTH", "4");

        let config = RunConfig::from_toml_str("[run]\nmax_length = ${BYTESEQ_TEST_MAX_LENGTH}\n").unwrap();
        assert_eq!(config.run.max_length, Some(4));

        std::env::remove_var("BYTESEQ_TEST_MAX_LENGTH");
    }

    #[test]
    fn test_zero_bound_fails_validation() {
        let config = RunConfig::from_toml_str("[run]\nmax_length = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(RunConfig::from_toml_str("[run]\nformat = \"octal\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[run]\nmax_iterations = 10\n").unwrap();

        let config = RunConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.run.max_iterations, Some(10));
    }
}
