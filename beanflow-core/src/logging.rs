//! 日志初始化
//!
//! 处理链本身只通过 `tracing` 输出日志；这里负责按配置安装订阅者，
//! 供 demo 或宿主程序在启动时调用一次。

use std::fmt;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::ConfigError;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        if value == "warning" {
            return Ok(LogLevel::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == value)
            .ok_or_else(|| format!("unknown log level '{}', expected one of trace/debug/info/warn/error", s))
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 单行紧凑输出（默认）
    Compact,
    /// tracing-subscriber 的默认格式
    Full,
    /// 每条日志一个 JSON 对象
    Json,
    /// 多行输出，适合本地调试
    Pretty,
}

impl LogFormat {
    const ALL: [LogFormat; 4] = [LogFormat::Compact, LogFormat::Full, LogFormat::Json, LogFormat::Pretty];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Full => "full",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == value)
            .ok_or_else(|| format!("unknown log format '{}', expected one of compact/full/json/pretty", s))
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// 输出模块路径
    pub show_target: bool,
    pub show_thread_ids: bool,
    /// EnvFilter 指令，例如 "beanflow_core=trace,processor_demo=debug"
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            show_target: false,
            show_thread_ids: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn show_thread_ids(mut self, show: bool) -> Self {
        self.show_thread_ids = show;
        self
    }

    pub fn filter(mut self, filter: String) -> Self {
        self.filter = Some(filter);
        self
    }

    /// 用 `RUST_LOG`、`LOG_LEVEL`、`LOG_FORMAT` 覆盖当前配置
    ///
    /// 无法解析的 `LOG_LEVEL` / `LOG_FORMAT` 会被忽略
    pub fn apply_env(mut self) -> Self {
        if let Ok(directives) = std::env::var("RUST_LOG") {
            self.filter = Some(directives);
        }
        if let Some(level) = env_parse::<LogLevel>("LOG_LEVEL") {
            self.level = level;
        }
        if let Some(format) = env_parse::<LogFormat>("LOG_FORMAT") {
            self.format = format;
        }
        self
    }

    /// 构建过滤器：`filter` 指令无效时退回到 `level`
    pub fn env_filter(&self) -> EnvFilter {
        let fallback = || {
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(self.level.into()).into())
                .parse_lossy("")
        };

        match &self.filter {
            Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| fallback()),
            None => fallback(),
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids);

        match self.format {
            LogFormat::Compact => Box::new(layer.compact()),
            LogFormat::Full => Box::new(layer),
            LogFormat::Json => Box::new(layer.json()),
            LogFormat::Pretty => Box::new(layer.pretty()),
        }
    }

    /// 安装全局订阅者
    ///
    /// 全局订阅者只能安装一次，再次调用返回 [`ConfigError::LoggingInit`]
    pub fn init(self) -> Result<(), ConfigError> {
        tracing_subscriber::registry()
            .with(self.fmt_layer())
            .with(self.env_filter())
            .try_init()
            .map_err(|err| ConfigError::LoggingInit(err.to_string()))?;

        tracing::debug!(
            "Logging initialized (level: {}, format: {})",
            self.level,
            self.format
        );
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}
