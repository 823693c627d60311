//! Custom dropdown menu options

/// Options used when a menu has not been edited
pub const DEFAULT_OPTIONS: &str = "low\nmedium\nhigh\nultra";

/// Splits newline-separated options, dropping blank entries
pub fn parse_options(options: &str) -> Vec<String> {
    super::text::normalize_lines(options)
        .into_iter()
        .map(|option| option.trim().to_string())
        .filter(|option| !option.is_empty())
        .collect()
}
