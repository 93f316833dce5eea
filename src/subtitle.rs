use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// One or more blank (or whitespace-only) lines
static BLOCK_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("block separator pattern is valid"));

static INDEX_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("index pattern is valid"));

static TIMECODE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2},\d{3} --> \d{2}:\d{2}:\d{2},\d{3}$").expect("timecode pattern is valid")
});

/// Marker every SRT timecode line carries
pub const TIMECODE_ARROW: &str = "-->";

/// `^\d+$`, ignoring surrounding whitespace
pub fn is_index_line(line: &str) -> bool {
    INDEX_LINE.is_match(line.trim())
}

/// `HH:MM:SS,mmm --> HH:MM:SS,mmm`, ignoring surrounding whitespace
pub fn is_timecode_line(line: &str) -> bool {
    TIMECODE_LINE.is_match(line.trim())
}

/// A single subtitle entry. Index and timecode are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    pub index: String,
    pub timecode: String,
    pub text: String,
}

impl SubtitleBlock {
    pub fn new(index: impl Into<String>, timecode: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            timecode: timecode.into(),
            text: text.into(),
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl fmt::Display for SubtitleBlock {
    /// `index\ntimecode\ntext\n\n`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}\n\n", self.index, self.timecode, self.text)
    }
}

/// Parse SRT content into blocks, in source order.
///
/// Candidates with fewer than two lines are dropped silently. Caption lines
/// are collapsed into one line joined by single spaces.
pub fn parse_srt(content: &str) -> Vec<SubtitleBlock> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    BLOCK_SEPARATOR
        .split(content)
        .filter_map(|candidate| {
            let lines: Vec<&str> = candidate.lines().collect();
            if lines.len() < 2 {
                return None;
            }

            let text = lines[2..]
                .iter()
                .map(|line| line.trim())
                .collect::<Vec<_>>()
                .join(" ");

            Some(SubtitleBlock::new(lines[0].trim(), lines[1].trim(), text.trim()))
        })
        .collect()
}

/// Split blocks into contiguous batches of at most `size`.
///
/// # Panics
///
/// Panics if `size` is zero; `Config::validate` rejects that value up front.
pub fn chunk_blocks(blocks: &[SubtitleBlock], size: usize) -> std::slice::Chunks<'_, SubtitleBlock> {
    blocks.chunks(size)
}

/// Parse generated SRT text, anchoring every block on an index line directly
/// followed by a timecode line.
///
/// Anything before the first anchor (a model preamble) is ignored. A block's
/// text runs up to the first blank line or the next anchor.
pub fn parse_translated(content: &str) -> Vec<SubtitleBlock> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    let starts: Vec<usize> = (1..lines.len())
        .filter(|&i| lines[i].contains(TIMECODE_ARROW) && is_index_line(lines[i - 1]))
        .map(|i| i - 1)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(lines.len());
            let text = lines[start + 2..end]
                .iter()
                .take_while(|line| !line.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            SubtitleBlock::new(lines[start], lines[start + 1], text)
        })
        .collect()
}

/// Serialize blocks back to SRT text
pub fn format_blocks<'a>(blocks: impl IntoIterator<Item = &'a SubtitleBlock>) -> String {
    blocks.into_iter().map(|block| block.to_string()).collect()
}

/// Result of correlating a backend response with the blocks that were sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub blocks: Vec<SubtitleBlock>,
    /// Indices that were sent but not echoed back
    pub missing: Vec<String>,
    /// Echoed indices left over after matching: never sent, or echoed more often than sent
    pub unexpected: Vec<String>,
}

impl MergeOutcome {
    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// Correlate translated blocks with their sources by echoed index.
///
/// Every source block keeps its own index and timecode. Blocks without text
/// were never sent and stay empty. Repeated indices are matched in order of
/// appearance. Sent blocks the response lacks keep their source text.
pub fn merge_translation(source: &[SubtitleBlock], translated: &[SubtitleBlock]) -> MergeOutcome {
    let mut by_index: HashMap<&str, VecDeque<&str>> = HashMap::new();
    for block in translated {
        by_index
            .entry(block.index.as_str())
            .or_default()
            .push_back(block.text.as_str());
    }

    let mut missing = Vec::new();
    let blocks = source
        .iter()
        .map(|block| {
            if !block.has_text() {
                return block.clone();
            }
            match by_index.get_mut(block.index.as_str()).and_then(VecDeque::pop_front) {
                Some(text) => SubtitleBlock::new(block.index.as_str(), block.timecode.as_str(), text),
                None => {
                    missing.push(block.index.clone());
                    block.clone()
                }
            }
        })
        .collect();

    let unexpected = translated
        .iter()
        .filter(|block| {
            by_index
                .get_mut(block.index.as_str())
                .and_then(VecDeque::pop_front)
                .is_some()
        })
        .map(|block| block.index.clone())
        .collect();

    MergeOutcome {
        blocks,
        missing,
        unexpected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n\
                          2\n00:00:03,000 --> 00:00:04,000\nFirst line\nsecond line\n\n\n\
                          5\n00:00:05,000 --> 00:00:06,000\n";

    #[test]
    fn test_parse_preserves_index_timecode_and_order() {
        let blocks = parse_srt(SAMPLE);

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], SubtitleBlock::new("1", "00:00:01,000 --> 00:00:02,500", "Hello there"));
        assert_eq!(blocks[1].index, "2");
        assert_eq!(blocks[1].timecode, "00:00:03,000 --> 00:00:04,000");
        assert_eq!(blocks[2].index, "5");
        assert_eq!(blocks[2].timecode, "00:00:05,000 --> 00:00:06,000");
    }

    #[test]
    fn test_parse_collapses_multiline_caption() {
        let blocks = parse_srt(SAMPLE);
        assert_eq!(blocks[1].text, "First line second line");
    }

    #[test]
    fn test_parse_keeps_block_without_text() {
        let blocks = parse_srt("12\n00:05:00,000 --> 00:05:02,000\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "");
        assert!(!blocks[0].has_text());
    }

    #[test]
    fn test_parse_drops_single_line_candidates() {
        let blocks = parse_srt("garbage\n\n3\n00:00:01,000 --> 00:00:02,000\nok\n\n   \n\nlonely");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].index, "3");
    }

    #[test]
    fn test_parse_handles_crlf_bom_and_padding() {
        let content = "\u{feff}\r\n\r\n1\r\n00:00:01,000 --> 00:00:02,000\r\nHi\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nBye\r\n\r\n";
        let blocks = parse_srt(content);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, "1");
        assert_eq!(blocks[1].text, "Bye");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_srt("").is_empty());
        assert!(parse_srt(" \n\n \t").is_empty());
    }

    #[test]
    fn test_chunks_cover_all_blocks() {
        let blocks: Vec<SubtitleBlock> = (1..=67)
            .map(|i| SubtitleBlock::new(i.to_string(), "00:00:00,000 --> 00:00:01,000", format!("line {}", i)))
            .collect();

        let chunks: Vec<&[SubtitleBlock]> = chunk_blocks(&blocks, 30).collect();
        assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![30, 30, 7]);

        let rebuilt: Vec<SubtitleBlock> = chunks.concat();
        assert_eq!(rebuilt, blocks);
    }

    #[test]
    fn test_chunking_is_restartable() {
        let blocks = parse_srt(SAMPLE);
        let first: Vec<_> = chunk_blocks(&blocks, 2).collect();
        let second: Vec<_> = chunk_blocks(&blocks, 2).collect();
        assert_eq!(first, second);
        assert!(chunk_blocks(&[], 20).next().is_none());
    }

    #[test]
    fn test_format_blocks() {
        let blocks = vec![
            SubtitleBlock::new("7", "00:01:12,500 --> 00:01:15,200", "Hello"),
            SubtitleBlock::new("8", "00:01:16,000 --> 00:01:17,000", ""),
        ];
        assert_eq!(
            format_blocks(&blocks),
            "7\n00:01:12,500 --> 00:01:15,200\nHello\n\n8\n00:01:16,000 --> 00:01:17,000\n\n\n"
        );
    }

    #[test]
    fn test_merge_matches_by_index() {
        let source = vec![
            SubtitleBlock::new("1", "00:00:01,000 --> 00:00:02,000", "Hello"),
            SubtitleBlock::new("2", "00:00:02,000 --> 00:00:03,000", ""),
            SubtitleBlock::new("3", "00:00:03,000 --> 00:00:04,000", "World"),
        ];
        // Backend reordered the blocks and mangled a timecode.
        let translated = vec![
            SubtitleBlock::new("3", "00:00:03,000 --> 00:00:04,001", "دنیا"),
            SubtitleBlock::new("1", "00:00:01,000 --> 00:00:02,000", "سلام"),
        ];

        let outcome = merge_translation(&source, &translated);
        assert!(outcome.is_exact());
        assert_eq!(outcome.blocks[0].text, "سلام");
        assert_eq!(outcome.blocks[1], source[1]);
        assert_eq!(outcome.blocks[2].text, "دنیا");
        assert_eq!(outcome.blocks[2].timecode, "00:00:03,000 --> 00:00:04,000");
    }

    #[test]
    fn test_merge_reports_missing_and_unexpected() {
        let source = vec![
            SubtitleBlock::new("1", "00:00:01,000 --> 00:00:02,000", "Hello"),
            SubtitleBlock::new("2", "00:00:02,000 --> 00:00:03,000", "World"),
        ];
        let translated = vec![
            SubtitleBlock::new("1", "00:00:01,000 --> 00:00:02,000", "سلام"),
            SubtitleBlock::new("9", "00:00:09,000 --> 00:00:10,000", "اضافه"),
        ];

        let outcome = merge_translation(&source, &translated);
        assert_eq!(outcome.missing, vec!["2".to_string()]);
        assert_eq!(outcome.unexpected, vec!["9".to_string()]);
        assert_eq!(outcome.blocks.len(), 2);
        assert_eq!(outcome.blocks[1].text, "World");
    }

    #[test]
    fn test_merge_repeated_indices_in_order() {
        let source = vec![
            SubtitleBlock::new("1", "00:00:01,000 --> 00:00:02,000", "First"),
            SubtitleBlock::new("1", "00:00:02,000 --> 00:00:03,000", "Second"),
            SubtitleBlock::new("1", "00:00:03,000 --> 00:00:04,000", "Third"),
        ];
        let translated = vec![
            SubtitleBlock::new("1", "00:00:01,000 --> 00:00:02,000", "اول"),
            SubtitleBlock::new("1", "00:00:02,000 --> 00:00:03,000", "دوم"),
        ];

        let outcome = merge_translation(&source, &translated);
        let texts: Vec<&str> = outcome.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["اول", "دوم", "Third"]);
        assert_eq!(outcome.missing, vec!["1".to_string()]);
        assert!(outcome.unexpected.is_empty());
    }

    #[test]
    fn test_merge_reports_surplus_repeats() {
        let source = vec![SubtitleBlock::new("4", "00:00:01,000 --> 00:00:02,000", "Hi")];
        let translated = vec![
            SubtitleBlock::new("4", "00:00:01,000 --> 00:00:02,000", "سلام"),
            SubtitleBlock::new("4", "00:00:01,000 --> 00:00:02,000", "درود"),
        ];

        let outcome = merge_translation(&source, &translated);
        assert_eq!(outcome.blocks[0].text, "سلام");
        assert_eq!(outcome.unexpected, vec!["4".to_string()]);
        assert!(!outcome.is_exact());
    }

    #[test]
    fn test_parse_translated_skips_preamble() {
        let response = "Here is the translation:\n1\n00:00:01,000 --> 00:00:02,000\nسلام\n\n\
                        2\n00:00:02,000 --> 00:00:03,000\nدنیا\nخط دوم\n\nHope this helps!";
        let blocks = parse_translated(response);

        assert_eq!(blocks, vec![
            SubtitleBlock::new("1", "00:00:01,000 --> 00:00:02,000", "سلام"),
            SubtitleBlock::new("2", "00:00:02,000 --> 00:00:03,000", "دنیا خط دوم"),
        ]);
    }

    #[test]
    fn test_parse_translated_without_blank_separators() {
        let response = "1\n00:00:01,000 --> 00:00:02,000\nسلام\n2\n00:00:02,000 --> 00:00:03,000\n3\n00:00:03,000 --> 00:00:04,000\nدنیا";
        let blocks = parse_translated(response);

        let indices: Vec<&str> = blocks.iter().map(|b| b.index.as_str()).collect();
        assert_eq!(indices, vec!["1", "2", "3"]);
        assert_eq!(blocks[1].text, "");
        assert_eq!(blocks[2].text, "دنیا");
    }

    #[test]
    fn test_line_shapes() {
        assert!(is_index_line(" 12 "));
        assert!(!is_index_line("12a"));
        assert!(is_timecode_line("00:01:12,500 --> 00:01:15,200"));
        assert!(!is_timecode_line("0:01:12,500 --> 00:01:15,200"));
    }
}
