//! 错误处理模块
//!
//! 定义翻译流程中使用的错误类型，以及把服务端原始错误归类为类型化变体的分类器。

use crate::types::DegradeReason;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// 翻译服务提供方错误
///
/// 单次 `generate` 调用的失败结果，已经过分类。
///
/// # 变体说明
///
/// * `Authentication` - 凭据无效，对整个运行是致命的
/// * `RateLimited` - 配额耗尽或 "too many requests"，可重试
/// * `Transient` - 其他任何失败，可重试
/// * `EmptyResponse` - 响应格式正确但没有可提取的文本，可重试
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 凭据被拒绝
    #[error("Authentication error: {0}")]
    Authentication(String),
    /// 速率限制
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
    /// 其他API错误
    #[error("API request failed: {0}")]
    Transient(String),
    /// 空响应
    #[error("Provider returned no usable content")]
    EmptyResponse,
}

impl ProviderError {
    /// A bad credential fails identically on every later call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::Authentication(_))
    }

    /// Map the last failure of a block to the marker embedded in its degraded text.
    pub fn degrade_reason(&self) -> DegradeReason {
        match self {
            ProviderError::RateLimited(_) => DegradeReason::RateLimit,
            ProviderError::EmptyResponse => DegradeReason::NoContent,
            ProviderError::Authentication(msg) | ProviderError::Transient(msg) => {
                DegradeReason::ApiError(msg.clone())
            }
        }
    }
}

/// 错误分类器
///
/// 服务端没有类型化的错误码，只能通过HTTP状态码和错误消息里的子串来判断。
/// 这些子串与具体服务相关，可能会变化，因此全部可以在配置文件中覆盖。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ErrorClassifier {
    /// 表示凭据无效的消息子串
    pub auth_patterns: Vec<String>,
    /// 表示速率限制的消息子串
    pub rate_limit_patterns: Vec<String>,
    /// 表示凭据无效的HTTP状态码
    pub auth_status_codes: Vec<u16>,
    /// 表示速率限制的HTTP状态码
    pub rate_limit_status_codes: Vec<u16>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            auth_patterns: vec!["API key not valid".to_string(), "API_KEY_INVALID".to_string()],
            rate_limit_patterns: vec!["resource_exhausted".to_string(), "429".to_string()],
            auth_status_codes: vec![401],
            rate_limit_status_codes: vec![429],
        }
    }
}

impl ErrorClassifier {
    /// Classify a raw provider failure. Authentication wins over rate limiting.
    pub fn classify(&self, status: Option<u16>, message: impl Into<String>) -> ProviderError {
        let message = message.into();
        let lowered = message.to_lowercase();
        let matches_any = |patterns: &[String]| {
            patterns
                .iter()
                .any(|p| !p.is_empty() && lowered.contains(&p.to_lowercase()))
        };

        let status_in = |codes: &[u16]| status.map_or(false, |s| codes.contains(&s));

        if status_in(&self.auth_status_codes) || matches_any(&self.auth_patterns) {
            ProviderError::Authentication(message)
        } else if status_in(&self.rate_limit_status_codes) || matches_any(&self.rate_limit_patterns) {
            ProviderError::RateLimited(message)
        } else {
            ProviderError::Transient(message)
        }
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write configuration file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no API keys configured in 'api_keys' of {0}")]
    NoApiKeys(PathBuf),
    #[error("placeholder API key found in 'api_keys' of {0}; replace it with a real key")]
    PlaceholderApiKey(PathBuf),
}

/// 翻译错误类型
///
/// 运行级别的错误。单个块的失败不会出现在这里，它们会被降级为 `BlockResult`。
#[derive(Error, Debug)]
pub enum TranslationError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// 输入文件缺失或无法读取
    #[error("Input error: {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 凭据被拒绝，运行中止
    #[error("Authentication failed: {0}")]
    Authentication(String),
    /// 输出文件写入失败
    #[error("Output error: {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// HTTP客户端错误
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// 翻译结果类型别名
///
/// 简化返回类型，使用 `TranslationError` 作为错误类型。
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_invalid_key_message_is_authentication() {
        let classifier = ErrorClassifier::default();
        let err = classifier.classify(Some(400), "API key not valid. Please pass a valid API key.");
        assert!(matches!(err, ProviderError::Authentication(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_classify_rate_limit_by_status_and_message() {
        let classifier = ErrorClassifier::default();
        assert!(matches!(classifier.classify(Some(429), "slow down"), ProviderError::RateLimited(_)));
        assert!(matches!(
            classifier.classify(None, "RESOURCE_EXHAUSTED: quota exceeded"),
            ProviderError::RateLimited(_)
        ));
    }

    #[test]
    fn test_classify_other_failures_are_transient() {
        let classifier = ErrorClassifier::default();
        let err = classifier.classify(Some(500), "internal error");
        assert_eq!(err, ProviderError::Transient("internal error".to_string()));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_custom_patterns_replace_defaults() {
        let classifier = ErrorClassifier {
            auth_patterns: vec!["bad token".to_string()],
            rate_limit_patterns: vec![],
            auth_status_codes: vec![],
            rate_limit_status_codes: vec![],
        };
        assert!(matches!(classifier.classify(None, "Bad Token supplied"), ProviderError::Authentication(_)));
        assert!(matches!(classifier.classify(Some(429), "429"), ProviderError::Transient(_)));
    }

    #[test]
    fn test_degrade_reason_follows_failure_class() {
        assert_eq!(ProviderError::RateLimited("x".into()).degrade_reason(), DegradeReason::RateLimit);
        assert_eq!(ProviderError::EmptyResponse.degrade_reason(), DegradeReason::NoContent);
        assert_eq!(
            ProviderError::Transient("boom".into()).degrade_reason(),
            DegradeReason::ApiError("boom".into())
        );
    }
}
