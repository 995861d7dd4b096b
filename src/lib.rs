//! # Markdown Translate
//!
//! 通过有请求长度上限的翻译服务翻译长篇 Markdown 文档。
//!
//! ## 主要特性
//!
//! - **文本分块**: 按段落打包，超长段落优先在行尾或句末切分，其次在空格处切分
//! - **错误恢复**: 每块最多重试3次，2秒起指数退避；失败的块保留原文并带上错误标记
//! - **认证短路**: 密钥无效时立即中止整个运行
//! - **配置灵活**: 支持TOML配置文件，多个密钥每次运行随机选用一个
//! - **可测试**: 服务提供方、等待和进度报告都可注入
//!
//! ## 流程
//!
//! 文档 → `split_into_blocks` → `TranslationService::translate_all` → `join_blocks` → 输出文档
//!
//! ## 配置文件支持
//!
//! ```toml
//! [gemini]
//! api_keys = "KEY_ONE,KEY_TWO"
//! model_name = "gemini-1.5-flash"
//!
//! [translation]
//! target_lang = "Brazilian Portuguese"
//! max_chunk_size = 4900
//!
//! [retry]
//! max_attempts = 3
//! initial_delay_ms = 2000
//! backoff_multiplier = 2.0
//! ```

pub mod chunker;
pub mod config;
pub mod document;
pub mod error;
pub mod progress;
pub mod provider;
pub mod translator;
pub mod types;

pub use chunker::split_into_blocks;
pub use config::AppConfig;
pub use document::{join_blocks, load_document, render_to_console, write_document};
pub use error::{ConfigError, ErrorClassifier, ProviderError, Result, TranslationError};
pub use progress::{ConsoleProgress, LogReporter, ProgressReporter, SilentReporter};
pub use provider::{GeminiProvider, TranslationProvider};
pub use translator::{build_prompt, retry_with_backoff, Sleeper, TokioSleeper, TranslationService};
pub use types::{
    BlockResult, BlockStatus, DegradeReason, GeminiConfig, GenerateContentResponse, RetryConfig,
    TranslationConfig, MAX_CHUNK_SIZE,
};
