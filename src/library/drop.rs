//! Turn a terminal drag-and-drop into paths.
//!
//! Terminals deliver dropped files as a bracketed paste. Depending on the
//! emulator the text is a list of shell-quoted paths (`'/a b.mp3'`),
//! backslash-escaped paths (`/a\ b.mp3`) or newline-separated `file://` URIs.

use std::path::PathBuf;

/// Split pasted text into the paths it names.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for line in text.lines() {
        for token in split_shell_words(line.trim()) {
            if let Some(path) = token_to_path(&token) {
                out.push(path);
            }
        }
    }
    out
}

fn token_to_path(token: &str) -> Option<PathBuf> {
    if token.is_empty() {
        return None;
    }
    if let Some(rest) = token.strip_prefix("file://") {
        // `file://host/path`: only local files are meaningful here.
        let path = rest.strip_prefix("localhost").unwrap_or(rest);
        let decoded = urlencoding::decode(path).ok()?;
        return Some(PathBuf::from(decoded.into_owned()));
    }
    Some(PathBuf::from(token))
}

/// Minimal POSIX-ish word splitting: whitespace separates words outside of
/// quotes, `\` escapes the next char outside single quotes.
fn split_shell_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut in_word = false;
    let mut chars = line.chars();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => cur.push(c),
            (Some(_), '\\') | (None, '\\') => {
                if let Some(next) = chars.next() {
                    cur.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => cur.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            (None, c) => {
                cur.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(cur);
    }
    words
}
