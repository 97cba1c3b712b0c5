//! Opening-line generation for classical Chinese verse.
//!
//! Given a topic name, the engine resolves the topic to keyword phrases in
//! a Shixuehanying-style lexicon, assembles five-character candidate lines
//! by bounded combination, scores every candidate with an external n-gram
//! language model, and returns the lowest-perplexity line.

pub mod candidates;
pub mod engine;
pub mod lexicon;
pub mod scoring;
pub mod segment;
pub mod settings;
pub mod trace_init;

pub use engine::{Engine, GenerateError, ScoredLine};
pub use lexicon::{KeywordPhrase, LexiconError, PhraseClass, TopicLexicon};
pub use scoring::{Scorer, ScoringError, SrilmScorer};

/// Generate the opening line for `topic` using settings-configured
/// resources. Convenience wrapper over [`Engine::from_settings`].
pub fn generate_first_sentence(topic: &str) -> Result<String, GenerateError> {
    let engine = Engine::from_settings()?;
    engine.generate_first_sentence(topic)
}
