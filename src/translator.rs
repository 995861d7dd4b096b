//! 翻译服务核心模块
//!
//! 逐块调用翻译服务，负责重试、指数退避、错误分类和降级。
//! 块严格按顺序串行翻译，同一时间只有一个未完成的请求。

use crate::chunker::split_into_blocks;
use crate::document::join_blocks;
use crate::error::{ProviderError, Result, TranslationError};
use crate::progress::{LogReporter, ProgressReporter};
use crate::provider::TranslationProvider;
use crate::types::{BlockResult, RetryConfig};
use async_trait::async_trait;
use log::debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// 可注入的等待接口
///
/// 测试中可以替换为只记录等待时长、不真正等待的实现。
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// 使用 `tokio::time::sleep` 真实等待
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 构建单个块的翻译提示词
///
/// 块文本放在两行 `---` 之间，提示词要求保留 Markdown 结构且不添加任何说明。
pub fn build_prompt(block: &str, target_language: &str) -> String {
    format!(
        "Translate the following Markdown text into {}. Preserve the original Markdown formatting, \
         including code blocks, lists, headings, etc., as much as possible. Do not add introductions \
         or conclusions to the translation, only translate the provided text:\n\n---\n{}\n---",
        target_language, block
    )
}

/// 带指数退避的重试机制
///
/// 最多执行 `config.max_attempts` 次。第一次尝试之前不等待，第 n 次重试之前等待
/// `config.delay_for(n - 1)`。致命错误立即返回；可重试错误耗尽次数后返回最后一个错误。
///
/// `on_failure` 在每次失败后调用，参数为尝试序号（从1开始）、错误以及下一次重试前的等待时长
/// （没有下一次时为 `None`）。
pub async fn retry_with_backoff<F, Fut, T, N>(
    mut operation: F,
    config: &RetryConfig,
    sleeper: &dyn Sleeper,
    mut on_failure: N,
) -> std::result::Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, ProviderError>>,
    N: FnMut(u32, &ProviderError, Option<Duration>),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_fatal() || attempt >= max_attempts => {
                on_failure(attempt, &e, None);
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for(attempt - 1);
                on_failure(attempt, &e, Some(delay));
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// 翻译服务主类
///
/// 持有本次运行的服务提供方（已绑定选中的密钥）、重试配置、等待实现和进度报告器。
///
/// # 示例
///
/// ```rust,no_run
/// use md_translate::{AppConfig, GeminiProvider, TranslationService};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AppConfig::from_file("config.toml")?;
///     let key = config.select_api_key(&mut rand::rng()).ok_or("no API key")?;
///     let provider = GeminiProvider::new(key, &config.gemini, config.classifier.clone())?;
///     let service = TranslationService::new(Arc::new(provider), config.retry.clone());
///
///     let translated = service
///         .translate_document("# Hello\n\nWorld.", 4900, "German")
///         .await?;
///     println!("{}", translated);
///     Ok(())
/// }
/// ```
pub struct TranslationService {
    provider: Arc<dyn TranslationProvider>,
    retry: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    reporter: Arc<dyn ProgressReporter>,
}

impl TranslationService {
    /// 创建新的翻译服务实例，默认真实等待并通过 `log` 报告进度
    pub fn new(provider: Arc<dyn TranslationProvider>, retry: RetryConfig) -> Self {
        Self {
            provider,
            retry,
            sleeper: Arc::new(TokioSleeper),
            reporter: Arc::new(LogReporter),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// 翻译单个块
    ///
    /// 可重试的失败在次数耗尽后降级为包含原文的 `BlockResult`；
    /// 只有认证错误会返回 `Err`。
    pub async fn translate_block(&self, index: usize, block: &str, target_language: &str) -> Result<BlockResult> {
        let prompt = build_prompt(block, target_language);
        let provider = &self.provider;
        let prompt = prompt.as_str();

        let outcome = retry_with_backoff(
            move || async move {
                let response = provider.generate(prompt).await?;
                response.extract_text().ok_or(ProviderError::EmptyResponse)
            },
            &self.retry,
            self.sleeper.as_ref(),
            |attempt, error, retry_in| self.reporter.attempt_failed(index, attempt, error, retry_in),
        )
        .await;

        match outcome {
            Ok(text) => Ok(BlockResult::success(index, text)),
            Err(ProviderError::Authentication(message)) => Err(TranslationError::Authentication(message)),
            Err(e) => Ok(BlockResult::degraded(index, block, &e.degrade_reason())),
        }
    }

    /// 按顺序翻译所有块
    ///
    /// 输出与输入一一对应。遇到认证错误立即中止，不再处理后续块。
    pub async fn translate_all(&self, blocks: &[String], target_language: &str) -> Result<Vec<BlockResult>> {
        let total = blocks.len();
        debug!("Translating {} blocks with provider {}", total, self.provider.name());
        self.reporter.run_started(total, target_language);

        let mut results = Vec::with_capacity(total);
        for (index, block) in blocks.iter().enumerate() {
            self.reporter.block_started(index, total, block.chars().count());
            let result = self.translate_block(index, block, target_language).await?;
            self.reporter.block_finished(&result);
            results.push(result);
        }

        self.reporter.run_finished();
        Ok(results)
    }

    /// 分块、翻译并重新拼接整篇文档
    pub async fn translate_document(&self, text: &str, max_chunk_size: usize, target_language: &str) -> Result<String> {
        let blocks = split_into_blocks(text, max_chunk_size);
        let results = self.translate_all(&blocks, target_language).await?;
        Ok(join_blocks(&results))
    }
}
