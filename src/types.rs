//! 类型定义模块
//!
//! 定义翻译库中使用的所有数据结构和配置类型。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 单个块的最大字符数
///
/// 服务端的请求上限约为5000字符，这里留出提示词包装文本的余量。
pub const MAX_CHUNK_SIZE: usize = 4900;

/// 默认目标语言
pub const DEFAULT_TARGET_LANGUAGE: &str = "Brazilian Portuguese";

/// 默认模型
pub const DEFAULT_MODEL_NAME: &str = "gemini-1.5-flash";

/// 默认API地址
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 翻译配置
///
/// # 字段说明
///
/// * `target_lang` - 目标语言名称，直接写入提示词
/// * `max_chunk_size` - 单次翻译的最大文本长度（字符数）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationConfig {
    /// 目标语言名称
    pub target_lang: String,
    /// 单次翻译的最大文本长度
    pub max_chunk_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: DEFAULT_TARGET_LANGUAGE.to_string(),
            max_chunk_size: MAX_CHUNK_SIZE,
        }
    }
}

/// Gemini 服务配置
///
/// `api_keys` 是逗号分隔的字符串，每次运行随机选用其中一个。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    /// 逗号分隔的API密钥列表
    pub api_keys: String,
    /// 模型名称
    pub model_name: String,
    /// API地址
    pub api_base_url: String,
    /// 单次请求的超时时间（秒）
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_keys: String::new(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// 重试配置
///
/// 第一次尝试之前不等待；第 n 次重试之前等待 `delay_for(n)`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2000,
            max_delay_ms: 60_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before the retry numbered `retry` (0 = the wait before the second attempt).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(retry.min(i32::MAX as u32) as i32);
        let millis = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(millis as u64)
    }
}

/// 块的翻译状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Success,
    Degraded,
}

/// 降级原因，决定降级文本中的错误标记
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    RateLimit,
    ApiError(String),
    NoContent,
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::RateLimit => write!(f, "RATE LIMIT"),
            DegradeReason::ApiError(msg) => write!(f, "API ERROR: {}", msg),
            DegradeReason::NoContent => write!(f, "NO CONTENT AFTER RETRIES"),
        }
    }
}

/// 单个块的翻译结果
///
/// 降级结果总是原样包含未翻译的块文本，外加一个可被机器识别的错误标记。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockResult {
    /// 块在输出序列中的位置（从0开始）
    pub index: usize,
    pub status: BlockStatus,
    /// 译文或降级文本
    pub text: String,
}

impl BlockResult {
    pub fn success(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            status: BlockStatus::Success,
            text: text.into(),
        }
    }

    pub fn degraded(index: usize, original: &str, reason: &DegradeReason) -> Self {
        Self {
            index,
            status: BlockStatus::Degraded,
            text: format!("### [TRANSLATION ERROR - {}]\n\n{}\n\n###", reason, original),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status == BlockStatus::Degraded
    }
}

/// generateContent 请求体
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, rename = "finishReason", skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// generateContent 响应体
///
/// 译文可能出现在两个位置：顶层的 `text` 字段，或者第一个候选项的内容片段中。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Response carrying the text directly.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            candidates: Vec::new(),
        }
    }

    /// Response carrying the text inside a single candidate.
    pub fn with_candidate_text(text: impl Into<String>) -> Self {
        Self {
            text: None,
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: Some(text.into()),
                    }],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
        }
    }

    /// 提取译文。空白文本视为没有内容。
    pub fn extract_text(&self) -> Option<String> {
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return Some(text.to_string());
        }

        let content = self.candidates.first()?.content.as_ref()?;
        let joined: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}
