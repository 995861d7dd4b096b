//! 翻译服务提供方模块
//!
//! 定义翻译服务的抽象接口，以及基于 Gemini generateContent API 的实现。

use crate::error::{ErrorClassifier, ProviderError, Result};
use crate::types::{GenerateContentRequest, GenerateContentResponse, GeminiConfig};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use std::time::Duration;

/// 翻译服务提供方
///
/// 接收一段完整的提示词，返回响应或已分类的错误。实现方只负责一次调用，
/// 重试和降级由 `TranslationService` 负责。
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Send one prompt and return the raw response envelope.
    async fn generate(&self, prompt: &str) -> std::result::Result<GenerateContentResponse, ProviderError>;

    /// Human-readable provider name used in log lines.
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Gemini 服务客户端
///
/// 在运行开始时用选中的密钥构建一次，之后所有块和所有重试都复用同一个密钥。
pub struct GeminiProvider {
    /// HTTP客户端，用于API调用
    client: Client,
    api_key: String,
    model_name: String,
    api_base_url: String,
    classifier: ErrorClassifier,
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model_name", &self.model_name)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// 创建新的客户端
    ///
    /// # 参数
    ///
    /// * `api_key` - 本次运行选中的密钥
    /// * `config` - 模型名称、API地址和超时设置
    /// * `classifier` - 错误分类规则
    pub fn new(api_key: impl Into<String>, config: &GeminiConfig, classifier: ErrorClassifier) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(2)
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!("md-translate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model_name: config.model_name.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            classifier,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model_name)
    }
}

#[async_trait]
impl TranslationProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> std::result::Result<GenerateContentResponse, ProviderError> {
        let request = GenerateContentRequest::from_prompt(prompt);
        debug!("Sending request to {} ({} chars)", self.endpoint(), prompt.chars().count());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classifier.classify(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classifier.classify(Some(status.as_u16()), format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
                Ok(envelope) => format!("{} {}", envelope.error.status, envelope.error.message)
                    .trim()
                    .to_string(),
                Err(_) => body,
            };
            return Err(self.classifier.classify(Some(status.as_u16()), format!("{} - {}", status, message)));
        }

        serde_json::from_str::<GenerateContentResponse>(&body)
            .map_err(|e| ProviderError::Transient(format!("failed to parse response JSON: {}", e)))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
