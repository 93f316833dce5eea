use crate::subtitle::{SubtitleBlock, format_blocks};

/// Outcome of building a prompt for one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Text to send to the backend
    Request(String),
    /// Every block in the chunk is empty; do not call the backend
    Skip,
}

/// Assembles translation requests from static instructions, the glossary and a chunk
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instructions: String,
    glossary: String,
    target_language: String,
}

impl PromptBuilder {
    pub fn new(
        instructions: impl Into<String>,
        glossary: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            glossary: glossary.into(),
            target_language: target_language.into(),
        }
    }

    /// Build the prompt for `chunk`. Blocks without text are left out of the payload.
    pub fn build(&self, chunk: &[SubtitleBlock]) -> Prompt {
        let source = format_blocks(chunk.iter().filter(|block| block.has_text()));
        if source.is_empty() {
            return Prompt::Skip;
        }

        Prompt::Request(format!(
            r#"{instructions}

## Glossary & ASR Corrections
Use these mappings as a strict reference:
{glossary}

## Task
Translate the following SRT blocks to {language}.
- Keep every block's index and timecode exactly as given; never renumber, merge or split blocks.
- Translate only the subtitle text.
- Fix known transcription errors (for example 'lama index' -> 'LlamaIndex') using the glossary above.
- Keep sentences flowing naturally even when they are split across blocks.
- Output only the translated SRT content. Do not wrap it in markdown code blocks such as ```srt or ```.

## Source SRT Input:
{source}
## {language} SRT Output:
"#,
            instructions = self.instructions,
            glossary = self.glossary,
            language = self.target_language,
            source = source,
        ))
    }
}
