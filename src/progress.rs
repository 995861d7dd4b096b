//! 进度报告模块
//!
//! 编排器通过注入的 `ProgressReporter` 报告进度和警告，不直接操作终端。

use crate::error::ProviderError;
use crate::types::BlockResult;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::time::Duration;

/// 进度报告接口
///
/// 所有方法都有空实现，只需覆盖关心的事件。
pub trait ProgressReporter: Send + Sync {
    fn run_started(&self, _total_blocks: usize, _target_language: &str) {}

    fn block_started(&self, _index: usize, _total_blocks: usize, _chars: usize) {}

    /// `retry_in` is `None` when this was the last attempt for the block.
    fn attempt_failed(&self, _index: usize, _attempt: u32, _error: &ProviderError, _retry_in: Option<Duration>) {}

    fn block_finished(&self, _result: &BlockResult) {}

    fn run_finished(&self) {}
}

/// 不输出任何内容
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// 通过 `log` 输出进度
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn run_started(&self, total_blocks: usize, target_language: &str) {
        info!("Translating {} blocks into {}", total_blocks, target_language);
    }

    fn block_started(&self, index: usize, total_blocks: usize, chars: usize) {
        info!("Translating block {}/{} ({} chars)", index + 1, total_blocks, chars);
    }

    fn attempt_failed(&self, index: usize, attempt: u32, error: &ProviderError, retry_in: Option<Duration>) {
        log_attempt_failure(index, attempt, error, retry_in);
    }

    fn block_finished(&self, result: &BlockResult) {
        if result.is_degraded() {
            error!("Block {} could not be translated; original text kept", result.index + 1);
        }
    }

    fn run_finished(&self) {
        info!("Translation finished");
    }
}

fn log_attempt_failure(index: usize, attempt: u32, error: &ProviderError, retry_in: Option<Duration>) {
    let rate_note = if matches!(error, ProviderError::RateLimited(_)) { " (rate limit)" } else { "" };
    match retry_in {
        Some(delay) => warn!(
            "Block {} attempt {} failed: {}. Retrying in {}s{}",
            index + 1,
            attempt,
            error,
            delay.as_secs(),
            rate_note
        ),
        None => warn!("Block {} attempt {} failed: {}. No attempts left{}", index + 1, attempt, error, rate_note),
    }
}

/// 终端进度条
///
/// 警告同时写入日志，进度条在 `run_finished` 时结束。
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn run_started(&self, total_blocks: usize, target_language: &str) {
        self.bar.set_length(total_blocks as u64);
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        self.bar.set_style(style);
        self.bar
            .set_message(format!("Translating {} blocks into {}", total_blocks, target_language));
        self.bar.enable_steady_tick(Duration::from_millis(120));
    }

    fn attempt_failed(&self, index: usize, attempt: u32, error: &ProviderError, retry_in: Option<Duration>) {
        self.bar.suspend(|| log_attempt_failure(index, attempt, error, retry_in));
    }

    fn block_finished(&self, result: &BlockResult) {
        if result.is_degraded() {
            self.bar
                .suspend(|| error!("Block {} could not be translated; original text kept", result.index + 1));
        }
        self.bar.inc(1);
    }

    fn run_finished(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for ConsoleProgress {
    // 运行被认证错误中止时 run_finished 不会被调用
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
