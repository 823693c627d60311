//! Text helpers shared by the line and data nodes

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineSelectError {
    #[error("⚠️ Line index {index} out of range (0-{max})")]
    OutOfRange { index: i64, max: i64 },
}

/// Normalizes `\r\n` and `\r` to `\n` and splits into lines
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Counts lines, including empty ones; blank text has no lines
pub fn count_lines(text: &str) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    normalize_lines(text).len()
}

/// Returns the line at `index` (0-based); negative indexes are out of range
pub fn select_line(text: &str, index: i64) -> Result<String, LineSelectError> {
    let mut lines = normalize_lines(text);
    match usize::try_from(index) {
        Ok(i) if i < lines.len() => Ok(lines.swap_remove(i)),
        _ => Err(LineSelectError::OutOfRange {
            index,
            max: lines.len() as i64 - 1,
        }),
    }
}

/// Removes a surrounding markdown code fence such as ```` ```json ````
///
/// The text is always trimmed. The closing fence is only removed when the
/// opening one was present.
pub fn strip_code_fence(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }

    let mut lines: Vec<&str> = text.split('\n').collect();
    lines.remove(0);
    if lines.last().is_some_and(|last| last.trim() == "```") {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_lines() {
        assert_eq!(count_lines("Line 1\nLine 2\nLine 3"), 3);
        assert_eq!(count_lines("a\r\nb\rc"), 3);
        assert_eq!(count_lines("a\n\nb\n"), 4);
        assert_eq!(count_lines("   \n\t"), 0);
        assert_eq!(count_lines(""), 0);
    }

    #[test]
    fn selects_lines() {
        assert_eq!(select_line("a\n\nc", 1).unwrap(), "");
        assert_eq!(select_line("a\r\nb", 1).unwrap(), "b");
    }

    #[test]
    fn select_out_of_range() {
        let err = select_line("a\nb", 5).unwrap_err();
        assert_eq!(err.to_string(), "⚠️ Line index 5 out of range (0-1)");

        let err = select_line("a\nb", -1).unwrap_err();
        assert_eq!(err, LineSelectError::OutOfRange { index: -1, max: 1 });
    }

    #[test]
    fn strips_tagged_fence() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"a\": 1}");
    }

    #[test]
    fn strips_fence_without_closing() {
        assert_eq!(strip_code_fence("```\nline one\nline two"), "line one\nline two");
    }

    #[test]
    fn leaves_plain_text() {
        assert_eq!(strip_code_fence("  plain  \n"), "plain");
        assert_eq!(strip_code_fence("a\n```"), "a\n```");
    }
}
