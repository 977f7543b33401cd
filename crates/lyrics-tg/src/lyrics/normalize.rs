//! Whitespace cleanup of the plain text returned by lyrics sources.
//!
//! The values must already be plain text. Sources that receive HTML convert
//! it themselves, so the text here is never decoded twice.

use lazy_regex::regex;

/// Normalizes multiline lyrics text.
pub(crate) fn lyrics(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\u{a0}', " ");

    let text = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    let text = regex!(r"\n{3,}").replace_all(&text, "\n\n");

    text.trim().to_owned()
}

/// Normalizes a value that must fit in a single line such as a song title.
pub(crate) fn single_line(text: &str) -> String {
    regex!(r"\s+").replace_all(text.trim(), " ").into_owned()
}
