//! Character-level segmentation for language-model consumption.
//!
//! The n-gram model consumes one token per character, space-joined.
//! Candidates never contain spaces (phrase lists are space-delimited at
//! parse time), so `dejoin` inverts `segment` by dropping separators.

/// Space-join the characters of `line`, one token per character.
pub fn segment(line: &str) -> String {
    let mut out = String::with_capacity(line.len() * 2);
    for (i, c) in line.chars().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Remove token separators, restoring the plain line.
pub fn dejoin(tokens: &str) -> String {
    tokens.chars().filter(|&c| c != ' ').collect()
}
