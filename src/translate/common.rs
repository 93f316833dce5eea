use crate::subtitle::TIMECODE_ARROW;

/// Remove markdown code-fence lines (```srt, ```) the model may wrap its answer in
pub fn strip_code_fences(response: &str) -> String {
    response
        .trim()
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Whether the response carries at least one timecode line
pub fn looks_like_srt(response: &str) -> bool {
    response.contains(TIMECODE_ARROW)
}
