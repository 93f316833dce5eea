use std::path::{Path, PathBuf};
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::bidi;
use crate::config::{Config, IndexCheck};
use crate::error::{FarsisubError, Result};
use crate::prompt::{Prompt, PromptBuilder};
use crate::subtitle::{SubtitleBlock, chunk_blocks, format_blocks, merge_translation, parse_srt, parse_translated};
use crate::translate::{Translator, looks_like_srt, strip_code_fences};

const BOM: &str = "\u{feff}";

/// Per-file counters reported at the end of a translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    pub blocks: usize,
    pub chunks: usize,
    pub translated_chunks: usize,
    /// Chunks without any text, written through without a backend call
    pub skipped_chunks: usize,
    /// Chunks whose backend call failed; absent from the output
    pub failed_chunks: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub translated: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

pub struct Workflow {
    config: Config,
    translator: Box<dyn Translator>,
    prompts: PromptBuilder,
}

impl Workflow {
    /// Create a workflow, loading the instructions and glossary once for the whole run
    pub async fn new(config: Config, translator: Box<dyn Translator>) -> Result<Self> {
        config.validate()?;

        let instructions = load_collaborator(&config.paths.instructions_file).await;
        let glossary = load_collaborator(&config.paths.glossary_file).await;
        let prompts = PromptBuilder::new(instructions, glossary, config.translate.target_language.clone());

        info!("Using model: {}", translator.name());

        Ok(Self {
            config,
            translator,
            prompts,
        })
    }

    /// Translate every `.srt` file of the input directory into the output directory
    pub async fn process_directory(&self) -> Result<RunSummary> {
        let input_dir = &self.config.paths.input_dir;
        let output_dir = &self.config.paths.output_dir;
        info!("Processing directory: {}", input_dir.display());

        fs::create_dir_all(input_dir).await?;
        fs::create_dir_all(output_dir).await?;

        let files = find_srt_files(input_dir);
        let mut summary = RunSummary::default();

        if files.is_empty() {
            info!("No .srt files found in '{}'", input_dir.display());
            return Ok(summary);
        }

        info!("Found {} subtitle files to translate", files.len());

        for input_path in files {
            let Some(file_name) = input_path.file_name() else {
                continue;
            };
            let output_path = output_dir.join(file_name);

            match self.process_file(&input_path, &output_path).await {
                Ok(report) => {
                    info!(
                        "Translated {}: {} blocks, {}/{} chunks translated, {} empty, {} failed",
                        input_path.display(),
                        report.blocks,
                        report.translated_chunks,
                        report.chunks,
                        report.skipped_chunks,
                        report.failed_chunks
                    );
                    summary.translated.push(input_path);
                }
                Err(e) => {
                    error!("Failed to translate {}: {}", input_path.display(), e);
                    summary.failed.push(input_path);
                }
            }
        }

        info!(
            "Finished: {} files translated, {} failed",
            summary.translated.len(),
            summary.failed.len()
        );

        Ok(summary)
    }

    /// Translate one file, streaming each chunk to `output_path` as soon as it is ready
    pub async fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<FileReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        info!("Reading {}", input_path.display());

        if !input_path.is_file() {
            return Err(FarsisubError::FileNotFound(input_path.display().to_string()));
        }

        let content = fs::read_to_string(input_path).await?;
        let blocks = parse_srt(&content);
        if blocks.is_empty() {
            return Err(FarsisubError::EmptyInput(input_path.display().to_string()));
        }

        let chunk_size = self.config.translate.chunk_size;
        let mut report = FileReport {
            blocks: blocks.len(),
            chunks: blocks.len().div_ceil(chunk_size),
            ..Default::default()
        };
        info!("Found {} subtitle blocks, translating in {} chunks", report.blocks, report.chunks);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut writer = BufWriter::new(fs::File::create(output_path).await?);
        if self.config.output.write_bom {
            writer.write_all(BOM.as_bytes()).await?;
        }

        let progress = chunk_progress(report.chunks as u64);
        let mut called_backend = false;

        for (idx, chunk) in chunk_blocks(&blocks, chunk_size).enumerate() {
            debug!("Processing chunk {}/{}", idx + 1, report.chunks);

            let srt = match self.prompts.build(chunk) {
                Prompt::Skip => {
                    debug!("Chunk {} has no text, skipping backend call", idx + 1);
                    report.skipped_chunks += 1;
                    format_blocks(chunk)
                }
                Prompt::Request(prompt) => {
                    if called_backend {
                        self.pause(self.config.translate.chunk_delay_ms).await;
                    }
                    called_backend = true;

                    match self.translate_chunk(chunk, &prompt, idx + 1).await {
                        Ok(srt) => {
                            report.translated_chunks += 1;
                            srt
                        }
                        Err(e) => {
                            error!("Error translating chunk {}: {}", idx + 1, e);
                            report.failed_chunks += 1;
                            progress.inc(1);
                            continue;
                        }
                    }
                }
            };

            writer.write_all(bidi::normalize(&srt).as_bytes()).await?;
            writer.flush().await?;
            progress.inc(1);
        }

        progress.finish_and_clear();
        writer.shutdown().await?;

        info!("Saved translation to {}", output_path.display());
        Ok(report)
    }

    /// Call the backend for one chunk, retrying up to `max_retries` extra times
    async fn translate_chunk(&self, chunk: &[SubtitleBlock], prompt: &str, number: usize) -> Result<String> {
        let max_retries = self.config.translate.max_retries;
        let mut attempt = 0;

        loop {
            let result = match self.translator.translate(prompt).await {
                Ok(response) => self.assemble(chunk, &response, number),
                Err(e) => Err(e),
            };

            match result {
                Ok(srt) => return Ok(srt),
                Err(e) if attempt < max_retries => {
                    attempt += 1;
                    warn!("Chunk {} attempt {} failed: {}; retrying", number, attempt, e);
                    self.pause(self.config.translate.retry_backoff_ms * u64::from(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Turn a raw backend response into SRT text for `chunk`
    fn assemble(&self, chunk: &[SubtitleBlock], response: &str, number: usize) -> Result<String> {
        let cleaned = strip_code_fences(response);

        if !looks_like_srt(&cleaned) {
            warn!("Chunk {} output might be malformed (no timecode found); writing it through", number);
            return Ok(format!("{}\n\n", cleaned));
        }

        let translated = parse_translated(&cleaned);
        if translated.is_empty() {
            warn!("Chunk {} output has no index/timecode pair; writing it through", number);
            return Ok(format!("{}\n\n", cleaned));
        }

        let outcome = merge_translation(chunk, &translated);
        if !outcome.is_exact() {
            match self.config.output.index_check {
                IndexCheck::Reject => {
                    return Err(FarsisubError::IndexMismatch {
                        missing: outcome.missing,
                        unexpected: outcome.unexpected,
                    });
                }
                IndexCheck::Warn => warn!(
                    "Chunk {} indices differ from request (missing: {:?}, unexpected: {:?})",
                    number, outcome.missing, outcome.unexpected
                ),
            }
        }

        Ok(format_blocks(&outcome.blocks))
    }

    async fn pause(&self, millis: u64) {
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}

/// Rewrite an existing SRT file with right-to-left repair only
pub async fn fix_rtl_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
    write_bom: bool,
) -> Result<()> {
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();

    if !input_path.is_file() {
        return Err(FarsisubError::FileNotFound(input_path.display().to_string()));
    }

    let content = fs::read_to_string(input_path).await?;
    let content = content.trim_start_matches(BOM).replace("\r\n", "\n");

    let mut fixed = String::with_capacity(content.len() + 64);
    if write_bom {
        fixed.push_str(BOM);
    }
    fixed.push_str(&bidi::normalize(&content));

    fs::write(output_path, fixed).await?;
    info!("Fixed (RLE+PDF wrapped) SRT saved to: {}", output_path.display());
    Ok(())
}

/// `.srt` files directly inside `dir`, sorted by name
pub fn find_srt_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("srt"))
        })
        .collect();

    files.sort();
    files
}

/// Read an auxiliary prompt file; a missing file degrades to empty content
async fn load_collaborator(path: &Path) -> String {
    match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Required file not found: {} ({}); continuing without it", path.display(), e);
            String::new()
        }
    }
}

fn chunk_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] chunk {pos}/{len}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
