//! Reading-time estimates for post bodies

use serde::Serialize;
use std::fmt;

/// Assumed reading speed. Fixed so that estimates are reproducible.
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimated time to read a body of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    /// Number of words counted
    pub words: usize,
    /// Whole minutes, rounded up
    pub minutes: usize,
}

impl ReadingTime {
    /// Display string, like "3 min read"
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min read", self.minutes)
    }
}

/// Estimate the reading time of `body`.
///
/// An empty body reads in "0 min read".
pub fn estimate(body: &str) -> ReadingTime {
    let words = count_words(body);
    let exact = words as f64 / WORDS_PER_MINUTE as f64;
    // Round to hundredths before taking the ceiling
    let minutes = ((exact * 100.0).round() / 100.0).ceil() as usize;
    ReadingTime { words, minutes }
}

/// Count words: whitespace-separated runs, with every CJK character as a word of its own
pub fn count_words(text: &str) -> usize {
    let mut words = 0;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            words += 1;
            in_word = false;
        } else if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            words += 1;
            in_word = true;
        }
    }

    words
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{3400}'..='\u{4DBF}' // CJK Extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
        | '\u{AC00}'..='\u{D7AF}' // Hangul syllables
        | '\u{F900}'..='\u{FAFF}' // CJK Compatibility Ideographs
    )
}
