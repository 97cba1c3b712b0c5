mod store;

pub use store::TopicLexicon;

use std::io;

/// Error type for loading and resolving the topic lexicon.
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("default topic {0:?} is missing from the lexicon")]
    DefaultTopicMissing(String),
}

/// Length class of an admissible keyword phrase.
///
/// Only these two lengths compose into a five-character line, so every
/// other length is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseClass {
    /// Two characters.
    Double,
    /// Three characters.
    Triple,
}

/// A short keyword phrase attached to a topic.
///
/// Length is measured in logical characters (`char` count), never encoded
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPhrase {
    text: String,
    class: PhraseClass,
}

impl KeywordPhrase {
    /// Validate `text` as a keyword phrase. Returns `None` unless the
    /// character count is exactly 2 or 3.
    pub fn new(text: &str) -> Option<Self> {
        let class = match text.chars().count() {
            2 => PhraseClass::Double,
            3 => PhraseClass::Triple,
            _ => return None,
        };
        Some(Self {
            text: text.to_string(),
            class,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn class(&self) -> PhraseClass {
        self.class
    }

    pub fn char_len(&self) -> usize {
        match self.class {
            PhraseClass::Double => 2,
            PhraseClass::Triple => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_classification() {
        assert_eq!(KeywordPhrase::new("明月").unwrap().class(), PhraseClass::Double);
        assert_eq!(
            KeywordPhrase::new("杨柳风").unwrap().class(),
            PhraseClass::Triple
        );
        assert!(KeywordPhrase::new("月").is_none());
        assert!(KeywordPhrase::new("春花秋月夜").is_none());
        assert!(KeywordPhrase::new("").is_none());
    }

    #[test]
    fn test_phrase_length_is_chars_not_bytes() {
        // Three CJK characters occupy nine UTF-8 bytes; classification must
        // still see three characters.
        let phrase = KeywordPhrase::new("桃花雨").unwrap();
        assert_eq!(phrase.as_str().len(), 9);
        assert_eq!(phrase.char_len(), 3);
        assert_eq!(phrase.class(), PhraseClass::Triple);
    }
}
