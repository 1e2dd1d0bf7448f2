//! Alias and variable substitution applied to a sub-command before it is
//! split into words.

use crate::lexer::DEFAULT_DELIMITERS;
use crate::session::Session;
use crate::store::Store;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\?|\$|[A-Za-z_][A-Za-z0-9_]*)").expect("variable pattern is valid")
});

/// Rewrite `text` in place: alias pass first, then the variable pass.
pub fn expand(text: &mut String, session: &Session) {
    if let Some(replaced) = expand_alias(text, &session.aliases) {
        *text = replaced;
    }
    let expanded = expand_vars(text, session);
    log::trace!("expanded to {:?}", expanded);
    *text = expanded;
}

/// Replace the leading word with its alias, if it has one.
///
/// The replacement is not expanded again, so `alias ls=ls -F` cannot loop.
pub fn expand_alias(text: &str, aliases: &Store) -> Option<String> {
    let trimmed = text.trim_start_matches(|c| DEFAULT_DELIMITERS.contains(c));
    let end = trimmed
        .find(|c| DEFAULT_DELIMITERS.contains(c))
        .unwrap_or(trimmed.len());
    let (word, rest) = trimmed.split_at(end);
    if word.is_empty() {
        return None;
    }
    aliases.get(word).map(|value| format!("{}{}", value, rest))
}

/// Substitute `$?`, `$$` and `$NAME`. Unknown names expand to nothing.
pub fn expand_vars(text: &str, session: &Session) -> String {
    VARIABLE
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "?" => session.last_status.to_string(),
            "$" => session.pid.to_string(),
            name => session.env.get_var(name).unwrap_or_default().to_owned(),
        })
        .into_owned()
}
