use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::{KeywordPhrase, LexiconError};

/// Topic → keyword-phrase store parsed from a Shixuehanying-style resource.
///
/// The resource is line-oriented: a block opens at a line containing the
/// literal `begin` and closes at a line containing `end`. The topic name
/// appears somewhere in the opening line. Data lines inside a block are
/// tab-delimited; the last tab field holds a space-delimited phrase list.
#[derive(Debug)]
pub struct TopicLexicon {
    blocks: Vec<TopicBlock>,
}

#[derive(Debug)]
struct TopicBlock {
    header: String,
    phrases: Vec<KeywordPhrase>,
}

impl TopicLexicon {
    pub fn open(path: &Path) -> Result<Self, LexiconError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Parse lexicon text. Malformed data lines are skipped with a
    /// diagnostic; one bad entry must not block the remaining topics.
    pub fn parse(text: &str) -> Self {
        let mut blocks = Vec::new();
        let mut current: Option<TopicBlock> = None;

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');

            if line.contains("begin") {
                if current.is_some() {
                    warn!(line = lineno + 1, "unterminated block before new begin marker");
                }
                current = Some(TopicBlock {
                    header: line.to_string(),
                    phrases: Vec::new(),
                });
            } else if line.contains("end") {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            } else if let Some(block) = current.as_mut() {
                if line.is_empty() {
                    continue;
                }
                let Some((_, phrase_field)) = line.rsplit_once('\t') else {
                    warn!(
                        line = lineno + 1,
                        "lexicon line has no tab delimiter, skipping"
                    );
                    continue;
                };
                for token in phrase_field.split(' ') {
                    if token.is_empty() {
                        continue;
                    }
                    // Phrases outside the 2/3-character classes cannot
                    // compose into a five-character line.
                    if let Some(phrase) = KeywordPhrase::new(token) {
                        block.phrases.push(phrase);
                    }
                }
            }
        }

        // A block still open at EOF never saw its end marker; its phrases
        // are not trusted.
        if current.is_some() {
            warn!("unterminated block at end of lexicon, dropping");
        }

        debug!(blocks = blocks.len(), "lexicon loaded");
        Self { blocks }
    }

    /// First block whose header contains `topic`, if any.
    pub fn lookup(&self, topic: &str) -> Option<&[KeywordPhrase]> {
        self.blocks
            .iter()
            .find(|b| b.header.contains(topic))
            .map(|b| b.phrases.as_slice())
    }

    /// Resolve `topic`, falling back to `default_topic` when absent.
    ///
    /// The fallback is a single bounded step: a missing default topic is a
    /// fatal configuration error, never a retry.
    pub fn lookup_or_default(
        &self,
        topic: &str,
        default_topic: &str,
    ) -> Result<&[KeywordPhrase], LexiconError> {
        if let Some(phrases) = self.lookup(topic) {
            return Ok(phrases);
        }
        warn!(topic, default_topic, "topic not found, using default topic");
        self.lookup(default_topic)
            .ok_or_else(|| LexiconError::DefaultTopicMissing(default_topic.to_string()))
    }

    /// Block headers, in file order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.header.as_str())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
