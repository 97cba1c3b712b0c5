//! Candidate line assembly from topic keyword phrases.
//!
//! Doubles and triples combine into five-character lines under four
//! strategies. To bound the blow-up, each partition is down-sampled to a
//! cap before every combination round, with a fresh sample per round.

use rand::seq::index;
use rand::Rng;
use tracing::debug;

use crate::lexicon::{KeywordPhrase, PhraseClass};

/// Characters in a generated line.
pub const LINE_CHARS: usize = 5;

/// Per-partition sampling cap applied before each combination round.
pub const DEFAULT_SAMPLE_CAP: usize = 20;

/// Generate candidate lines from `phrases`.
///
/// Duplicates across (and within) strategies are permitted; scoring decides.
/// Every returned line has exactly [`LINE_CHARS`] characters.
pub fn generate<R: Rng>(phrases: &[KeywordPhrase], cap: usize, rng: &mut R) -> Vec<String> {
    let doubles: Vec<&str> = phrases
        .iter()
        .filter(|p| p.class() == PhraseClass::Double)
        .map(|p| p.as_str())
        .collect();
    let triples: Vec<&str> = phrases
        .iter()
        .filter(|p| p.class() == PhraseClass::Triple)
        .map(|p| p.as_str())
        .collect();

    let mut lines = Vec::new();

    // double+triple / triple+double: order 5 by construction.
    let two = sample(&doubles, cap, rng);
    let three = sample(&triples, cap, rng);
    for &d in &two {
        for &t in &three {
            lines.push(format!("{d}{t}"));
            lines.push(format!("{t}{d}"));
        }
    }

    // triple+triple: 6 characters truncated to 5.
    let three = sample(&triples, cap, rng);
    for &a in &three {
        for &b in &three {
            if a == b {
                continue;
            }
            lines.push(truncate_line(&[a, b]));
            lines.push(truncate_line(&[b, a]));
        }
    }

    // double x3: all 6 permutations of each pairwise-distinct triple of
    // doubles, truncated to 5.
    let two = sample(&doubles, cap, rng);
    for &a in &two {
        for &b in &two {
            for &c in &two {
                if a == b || a == c || b == c {
                    continue;
                }
                for perm in [
                    [a, b, c],
                    [a, c, b],
                    [b, a, c],
                    [b, c, a],
                    [c, b, a],
                    [c, a, b],
                ] {
                    lines.push(truncate_line(&perm));
                }
            }
        }
    }

    debug!(
        doubles = doubles.len(),
        triples = triples.len(),
        candidates = lines.len(),
        "candidate generation finished"
    );
    lines
}

/// Uniform sample without replacement, clamped to the pool size.
fn sample<'a, R: Rng>(pool: &[&'a str], cap: usize, rng: &mut R) -> Vec<&'a str> {
    let amount = pool.len().min(cap);
    index::sample(rng, pool.len(), amount)
        .iter()
        .map(|i| pool[i])
        .collect()
}

/// Concatenate `parts` and keep the first [`LINE_CHARS`] characters,
/// counted as logical characters rather than bytes.
fn truncate_line(parts: &[&str]) -> String {
    let joined: String = parts.concat();
    joined.chars().take(LINE_CHARS).collect()
}
