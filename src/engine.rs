//! Pipeline orchestration: lexicon → candidates → segmentation → scoring →
//! selection.

use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

use crate::candidates::{self, DEFAULT_SAMPLE_CAP};
use crate::lexicon::{LexiconError, TopicLexicon};
use crate::scoring::{Scorer, ScoringError, SrilmScorer};
use crate::segment::{dejoin, segment};
use crate::settings::settings;

/// Error type for a whole generation request.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error("no candidate lines could be generated for this topic")]
    EmptyCandidateSet,

    #[error("scoring unavailable: {0}")]
    Scoring(#[from] ScoringError),
}

/// One line from the ranked pipeline output.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredLine {
    pub line: String,
    pub ppl: f64,
}

/// Opening-line generation engine.
///
/// Holds the read-only lexicon and the scoring client; every request gets
/// its own RNG and scoring scratch state, so concurrent requests are safe.
pub struct Engine {
    lexicon: TopicLexicon,
    scorer: Box<dyn Scorer>,
    default_topic: String,
    sample_cap: usize,
    seed: Option<u64>,
}

impl Engine {
    pub fn new(
        lexicon: TopicLexicon,
        scorer: Box<dyn Scorer>,
        default_topic: impl Into<String>,
    ) -> Self {
        Self {
            lexicon,
            scorer,
            default_topic: default_topic.into(),
            sample_cap: DEFAULT_SAMPLE_CAP,
            seed: None,
        }
    }

    /// Build an engine from the settings singleton.
    pub fn from_settings() -> Result<Self, LexiconError> {
        let s = settings();
        let lexicon = TopicLexicon::open(Path::new(&s.lexicon.path))?;
        let scorer = SrilmScorer::new(&s.scoring.ngram_bin, &s.scoring.lm_path)
            .with_order(s.scoring.order)
            .with_timeout(Duration::from_secs(s.scoring.timeout_secs));
        Ok(
            Self::new(lexicon, Box::new(scorer), &s.lexicon.default_topic)
                .with_sample_cap(s.generation.sample_cap),
        )
    }

    /// Per-partition sampling cap for candidate generation.
    pub fn with_sample_cap(mut self, cap: usize) -> Self {
        self.sample_cap = cap;
        self
    }

    /// Fix the RNG seed so candidate sampling is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate the single most fluent opening line for `topic`.
    pub fn generate_first_sentence(&self, topic: &str) -> Result<String, GenerateError> {
        let ranked = self.generate_nbest(topic, 1)?;
        match ranked.into_iter().next() {
            Some(best) => Ok(best.line),
            None => Err(GenerateError::EmptyCandidateSet),
        }
    }

    /// Generate the `n` lowest-perplexity lines for `topic`, best first.
    ///
    /// Ties keep candidate-generation order (stable sort), so the selected
    /// 1-best is the first minimum-score candidate.
    pub fn generate_nbest(&self, topic: &str, n: usize) -> Result<Vec<ScoredLine>, GenerateError> {
        let phrases = self.lexicon.lookup_or_default(topic, &self.default_topic)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let raw = candidates::generate(phrases, self.sample_cap, &mut rng);
        if raw.is_empty() {
            return Err(GenerateError::EmptyCandidateSet);
        }
        debug!(topic, candidates = raw.len(), "scoring candidate batch");

        let batch: Vec<String> = raw.iter().map(|line| segment(line)).collect();
        let scores = self.scorer.score_batch(&batch)?;
        if scores.len() != batch.len() {
            return Err(GenerateError::Scoring(ScoringError::MalformedReport(
                format!("submitted {} lines, got {} scores", batch.len(), scores.len()),
            )));
        }

        let mut ranked: Vec<ScoredLine> = batch
            .into_iter()
            .zip(scores)
            .map(|(tokens, ppl)| ScoredLine {
                line: dejoin(&tokens),
                ppl,
            })
            .collect();
        ranked.sort_by(|a, b| a.ppl.total_cmp(&b.ppl));
        ranked.truncate(n.max(1));
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::LINE_CHARS;

    const LEXICON: &str = "<begin>\t1\t丽人类\n\
                           1\t红颜 黛眉 倾城色 解语花\n\
                           <end>\n\
                           <begin>\t2\t小类\n\
                           1\tAB EFG\n\
                           <end>\n";

    /// Scorer that inverts each line's position in the batch, making the
    /// last submitted candidate the most fluent.
    struct ReverseScorer;

    impl Scorer for ReverseScorer {
        fn score_batch(&self, lines: &[String]) -> Result<Vec<f64>, ScoringError> {
            Ok((0..lines.len()).map(|i| (lines.len() - i) as f64).collect())
        }
    }

    /// Scorer that gives every line the same perplexity.
    struct FlatScorer;

    impl Scorer for FlatScorer {
        fn score_batch(&self, lines: &[String]) -> Result<Vec<f64>, ScoringError> {
            Ok(vec![7.5; lines.len()])
        }
    }

    struct FailingScorer;

    impl Scorer for FailingScorer {
        fn score_batch(&self, _lines: &[String]) -> Result<Vec<f64>, ScoringError> {
            Err(ScoringError::MalformedReport(
                "report contains no score lines".to_string(),
            ))
        }
    }

    fn engine(scorer: Box<dyn Scorer>) -> Engine {
        Engine::new(TopicLexicon::parse(LEXICON), scorer, "丽人类").with_seed(42)
    }

    #[test]
    fn test_generates_five_char_line() {
        let line = engine(Box::new(ReverseScorer))
            .generate_first_sentence("丽人")
            .unwrap();
        assert_eq!(line.chars().count(), LINE_CHARS);
        assert!(!line.contains(' '));
    }

    #[test]
    fn test_selects_minimum_score() {
        // ReverseScorer makes the last generated candidate cheapest.
        let engine = engine(Box::new(ReverseScorer));
        let ranked = engine.generate_nbest("丽人", 3).unwrap();
        assert_eq!(ranked.len(), 3);
        assert!(ranked[0].ppl <= ranked[1].ppl);
        assert_eq!(ranked[0].ppl, 1.0);

        let best = engine.generate_first_sentence("丽人").unwrap();
        assert_eq!(best, ranked[0].line);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        // 小类 has one double and one triple: exactly two candidates, in
        // a fixed order ("ABEFG" then "EFGAB"). Equal scores must select
        // the first.
        let engine = engine(Box::new(FlatScorer));
        let line = engine.generate_first_sentence("小类").unwrap();
        assert_eq!(line, "ABEFG");
    }

    #[test]
    fn test_unknown_topic_falls_back_to_default() {
        let line = engine(Box::new(ReverseScorer))
            .generate_first_sentence("不存在的主题")
            .unwrap();
        assert_eq!(line.chars().count(), LINE_CHARS);
    }

    #[test]
    fn test_missing_default_topic_is_fatal() {
        let engine = Engine::new(
            TopicLexicon::parse(LEXICON),
            Box::new(ReverseScorer),
            "也不存在",
        );
        let err = engine.generate_first_sentence("不存在的主题").unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Lexicon(LexiconError::DefaultTopicMissing(_))
        ));
    }

    #[test]
    fn test_no_usable_phrases_is_empty_candidate_set() {
        let text = "<begin>\t1\t空类\n1\t月\n<end>\n";
        let engine = Engine::new(TopicLexicon::parse(text), Box::new(ReverseScorer), "空类");
        let err = engine.generate_first_sentence("空类").unwrap_err();
        assert!(matches!(err, GenerateError::EmptyCandidateSet));
    }

    #[test]
    fn test_scoring_failure_is_hard_failure() {
        let err = engine(Box::new(FailingScorer))
            .generate_first_sentence("丽人")
            .unwrap_err();
        assert!(matches!(err, GenerateError::Scoring(_)));
    }

    #[test]
    fn test_seeded_requests_are_reproducible() {
        let engine = engine(Box::new(ReverseScorer));
        let a = engine.generate_first_sentence("丽人").unwrap();
        let b = engine.generate_first_sentence("丽人").unwrap();
        assert_eq!(a, b);
    }
}
