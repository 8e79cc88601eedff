//! 统一的错误处理类型
//!
//! 面向用户的操作（后置处理器、注册表）统一使用 `anyhow::Result`，
//! 通过 `.context()` 附加 Bean 名称、处理器名称等上下文。
//! 反射和配置这类叶子操作使用 `thiserror` 定义的具体错误类型，
//! 调用方可以在 `anyhow::Error` 上 `downcast_ref` 取回它们。
//!
//! # 示例
//!
//! ```rust,ignore
//! use anyhow::Context;
//!
//! registry
//!     .apply_before_initialization(bean, "userService")
//!     .context("Failed to post-process 'userService'")?;
//! ```
pub use anyhow::Result;

use thiserror::Error;

/// 反射操作的结果类型
pub type ReflectResult<T> = std::result::Result<T, ReflectError>;

/// 反射访问失败
///
/// 这些错误不会被恢复，直接向上传播给宿主容器
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReflectError {
    /// Bean 不是成员声明类型（或其 extends 链）的实例
    #[error("cannot access '{member}' on a bean that is not a '{expected}'")]
    ReceiverMismatch {
        member: &'static str,
        expected: &'static str,
    },

    /// 字段的实际类型与请求的类型不符
    #[error("field '{owner}::{field}' holds '{actual}', not '{requested}'")]
    FieldTypeMismatch {
        owner: &'static str,
        field: &'static str,
        actual: &'static str,
        requested: &'static str,
    },

    /// 方法参数个数不符
    #[error("method '{method}' expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        method: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 方法参数类型不符
    #[error("argument #{index} of method '{method}' is not a '{expected}'")]
    ArgumentType {
        method: &'static str,
        index: usize,
        expected: &'static str,
    },
}

/// 配置加载失败
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}
