/*!
 * Common test utilities: scripted providers and a sleeper that only records delays
 */

#![allow(dead_code)]

use async_trait::async_trait;
use md_translate::{GenerateContentResponse, ProviderError, Sleeper, TranslationProvider};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

type Script = Box<dyn Fn(&str, usize) -> Result<GenerateContentResponse, ProviderError> + Send + Sync>;

/// Provider whose answer is computed from the prompt and the 0-based call number
pub struct ScriptedProvider {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl fmt::Debug for ScriptedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedProvider").finish_non_exhaustive()
    }
}

impl ScriptedProvider {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, usize) -> Result<GenerateContentResponse, ProviderError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always succeeds, echoing the framed block text with a prefix
    pub fn working() -> Self {
        Self::new(|prompt, _| Ok(GenerateContentResponse::with_text(format!("[TRANSLATED] {}", framed_block(prompt)))))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, ProviderError> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };
        (self.script)(prompt, call)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Extract the block text between the `---` delimiter lines of a prompt
pub fn framed_block(prompt: &str) -> &str {
    let start = prompt.find("\n---\n").map(|i| i + 5).unwrap_or(0);
    let end = prompt.rfind("\n---").filter(|&e| e >= start).unwrap_or(prompt.len());
    &prompt[start..end]
}

/// Sleeper that records requested delays without waiting
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
