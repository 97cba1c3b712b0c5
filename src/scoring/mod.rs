mod report;
mod srilm;

pub use srilm::SrilmScorer;

use std::io;
use std::time::Duration;

/// Error type for the external scoring boundary.
///
/// Every variant is a hard failure for the request that triggered it; the
/// pipeline never returns partial or best-effort scores.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to launch scorer {bin}: {source}")]
    Spawn { bin: String, source: io::Error },

    #[error("scorer did not finish within {0:?}")]
    Timeout(Duration),

    #[error("scorer exited with {0}")]
    ProcessFailed(String),

    #[error("malformed perplexity report: {0}")]
    MalformedReport(String),
}

/// Fluency oracle for a batch of segmented candidate lines.
///
/// Implementations return one perplexity per input line, in input order,
/// lower = more fluent. The scoring engine evolves independently of this
/// crate, so the seam is a trait rather than a concrete call.
pub trait Scorer: Send + Sync {
    fn score_batch(&self, lines: &[String]) -> Result<Vec<f64>, ScoringError>;
}
