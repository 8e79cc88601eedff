//! 配置
//!
//! 从 TOML 文件加载处理链和日志配置，环境变量可以覆盖文件中的值：
//!
//! ```toml
//! [processors]
//! enabled = true
//! disabled = ["timingProcessor"]
//!
//! [logging]
//! level = "debug"
//! format = "compact"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::logging::{LogFormat, LogLevel, LoggingConfig};

/// 处理链总开关对应的环境变量
pub const ENABLED_ENV: &str = "BEANFLOW_ENABLED";

/// 全部配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub processors: ProcessorSettings,
    pub logging: LoggingSettings,
}

/// 处理链配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcessorSettings {
    /// 关闭后所有 Bean 原样通过（默认：true）
    pub enabled: bool,

    /// 按名称禁用的处理器
    pub disabled: Vec<String>,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled: Vec::new(),
        }
    }
}

impl ProcessorSettings {
    /// 处理器是否被禁用
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|disabled| disabled == name)
    }
}

/// 日志配置（文件形式）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
    pub show_target: bool,
    pub filter: Option<String>,
}

impl Settings {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// 从文件加载 TOML 配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let settings = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// 用环境变量覆盖配置
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.with_enabled_override(std::env::var(ENABLED_ENV).ok().as_deref())
    }

    /// 用给定的值覆盖 `processors.enabled`
    pub fn with_enabled_override(mut self, value: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(value) = value {
            self.processors.enabled = parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
                key: ENABLED_ENV,
                message: format!("expected a boolean, got '{}'", value),
            })?;
        }
        Ok(self)
    }

    /// 转换为日志配置
    pub fn logging_config(&self) -> Result<LoggingConfig, ConfigError> {
        let mut config = LoggingConfig::new().show_target(self.logging.show_target);

        if let Some(level) = &self.logging.level {
            let level: LogLevel = level
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "logging.level",
                    message,
                })?;
            config = config.level(level);
        }

        if let Some(format) = &self.logging.format {
            let format: LogFormat = format
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "logging.format",
                    message,
                })?;
            config = config.format(format);
        }

        if let Some(filter) = &self.logging.filter {
            config = config.filter(filter.clone());
        }

        Ok(config)
    }
}

/// 解析布尔值，支持 true/false、yes/no、1/0
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();

        assert!(settings.processors.enabled);
        assert!(settings.processors.disabled.is_empty());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::from_toml_str(
            r#"
            [processors]
            enabled = false
            disabled = ["timingProcessor", "auditProcessor"]

            [logging]
            level = "debug"
            format = "json"
            show-target = true
            "#,
        )
        .unwrap();

        assert!(!settings.processors.enabled);
        assert!(settings.processors.is_disabled("auditProcessor"));
        assert!(!settings.processors.is_disabled("fieldProcessor"));

        let logging = settings.logging_config().unwrap();
        assert_eq!(logging.level, LogLevel::Debug);
        assert_eq!(logging.format, LogFormat::Json);
        assert!(logging.show_target);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml_str("[processors\nenabled = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_log_level() {
        let settings = Settings::from_toml_str("[logging]\nlevel = \"loud\"").unwrap();
        let err = settings.logging_config().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "logging.level", .. }));
    }

    #[test]
    fn test_enabled_override() {
        let settings = Settings::default().with_enabled_override(Some("no")).unwrap();
        assert!(!settings.processors.enabled);

        let settings = settings.with_enabled_override(None).unwrap();
        assert!(!settings.processors.enabled);

        assert!(Settings::default().with_enabled_override(Some("maybe")).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
