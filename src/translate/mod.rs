// Translation backend
//
// The workflow only talks to the `Translator` trait; `gemini` provides the
// HTTP implementation and `common` the response cleanup shared by backends.

pub mod common;
pub mod gemini;

use async_trait::async_trait;

pub use common::*;
pub use gemini::GeminiTranslator;
use crate::config::TranslateConfig;
use crate::error::Result;

/// A text-generation service that turns a prompt into translated SRT text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Send `prompt` and return the raw generated text
    async fn translate(&self, prompt: &str) -> Result<String>;

    /// Name used in log lines
    fn name(&self) -> String;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_translator(config: TranslateConfig, api_key: String) -> Result<Box<dyn Translator>> {
        Ok(Box::new(GeminiTranslator::new(config, api_key)?))
    }
}
