//! Splitting command text into words.
//!
//! There is no quoting or escaping: a delimiter character never appears
//! inside a word.

/// Delimiters used when none are given explicitly.
pub const DEFAULT_DELIMITERS: &str = " \t";

/// Split `text` on any character in `delimiters`.
///
/// Runs of delimiters are collapsed and empty words are discarded, so an
/// empty or all-delimiter input yields an empty vector.
pub fn tokenize(text: &str, delimiters: &str) -> Vec<String> {
    text.split(|c: char| delimiters.contains(c))
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Split `text` on [`DEFAULT_DELIMITERS`].
pub fn split_words(text: &str) -> Vec<String> {
    tokenize(text, DEFAULT_DELIMITERS)
}
