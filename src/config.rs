//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入、校验以及API密钥的随机选择。

use crate::error::{ConfigError, ErrorClassifier};
use crate::types::{GeminiConfig, RetryConfig, TranslationConfig};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 示例配置中使用的占位密钥
pub const PLACEHOLDER_API_KEYS: &[&str] = &["YOUR_API_KEY_HERE", "API_KEY_1", "API_KEY_2", "API_KEY_3_ETC"];

/// 应用配置结构
///
/// 包含所有翻译相关的配置选项，支持从TOML文件加载和保存。
///
/// # 示例
///
/// ```toml
/// [gemini]
/// api_keys = "KEY_ONE,KEY_TWO"
/// model_name = "gemini-1.5-flash"
///
/// [translation]
/// target_lang = "Brazilian Portuguese"
/// max_chunk_size = 4900
///
/// [retry]
/// max_attempts = 3
/// initial_delay_ms = 2000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// 服务配置
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// 翻译配置
    #[serde(default)]
    pub translation: TranslationConfig,
    /// 重试配置
    #[serde(default)]
    pub retry: RetryConfig,
    /// 错误分类规则
    #[serde(default)]
    pub classifier: ErrorClassifier,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Generate example configuration file
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let mut example_config = Self::default();
        example_config.gemini.api_keys = PLACEHOLDER_API_KEYS[0].to_string();
        example_config.save_to_file(path)
    }

    /// 解析逗号分隔的密钥列表，去掉空白和空项
    pub fn api_key_list(&self) -> Vec<String> {
        self.gemini
            .api_keys
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 校验密钥列表非空且不含占位符
    ///
    /// `path` 只用于错误消息。
    pub fn validate<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let keys = self.api_key_list();
        if keys.is_empty() {
            return Err(ConfigError::NoApiKeys(path.as_ref().to_path_buf()));
        }
        if keys.iter().any(|key| PLACEHOLDER_API_KEYS.contains(&key.as_str())) {
            return Err(ConfigError::PlaceholderApiKey(path.as_ref().to_path_buf()));
        }
        Ok(())
    }

    /// Pick one key uniformly at random. Called once per run.
    pub fn select_api_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.api_key_list().choose(rng).cloned()
    }
}
