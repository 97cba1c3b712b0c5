//! Parser for `ngram -ppl -debug 1` perplexity reports.
//!
//! The report interleaves, per scored sentence: the echoed sentence, a
//! sentence/word-count line, and a statistics line carrying the perplexity.
//! A trailing whole-file summary starts at a line naming the input file.

use super::ScoringError;

pub(crate) struct PplReport {
    /// Echoed sentences, in emission order.
    pub sentences: Vec<String>,
    /// One perplexity per sentence, same order.
    pub scores: Vec<f64>,
}

/// Parse a perplexity report.
///
/// Grammar: blank lines and lines containing `words` are skipped; the
/// per-sentence section ends at the first line containing `file`; a line
/// containing `ppl` contributes its last space-delimited field as a score;
/// anything else is an echoed sentence.
pub(crate) fn parse(text: &str) -> Result<PplReport, ScoringError> {
    let mut sentences = Vec::new();
    let mut scores = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end_matches('\r');
        if line.contains("file") {
            break;
        }
        if line.trim().is_empty() || line.contains("words") {
            continue;
        }
        if line.contains("ppl") {
            // e.g. "0 zeroprobs, logprob= -7.04 ppl= 49.21 ppl1= 60.05"
            let field = line.rsplit(' ').next().unwrap_or_default();
            let value: f64 = field.parse().map_err(|_| {
                ScoringError::MalformedReport(format!("unparsable score field {field:?}"))
            })?;
            scores.push(value);
        } else {
            sentences.push(line.trim().to_string());
        }
    }

    if scores.is_empty() {
        return Err(ScoringError::MalformedReport(
            "report contains no score lines".to_string(),
        ));
    }
    if sentences.len() != scores.len() {
        return Err(ScoringError::MalformedReport(format!(
            "{} sentences but {} scores",
            sentences.len(),
            scores.len()
        )));
    }

    Ok(PplReport { sentences, scores })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
床 前 明 月 光
1 sentences, 5 words, 0 OOVs
0 zeroprobs, logprob= -7.04 ppl= 49.21 ppl1= 60.05

明 月 光 床 前
1 sentences, 5 words, 0 OOVs
0 zeroprobs, logprob= -9.60 ppl= 142.33 ppl1= 180.17

file ./batch.txt: 2 sentences, 10 words, 0 OOVs
0 zeroprobs, logprob= -16.64 ppl= 88.11 ppl1= 101.42
";

    #[test]
    fn test_parse_report() {
        let report = parse(REPORT).unwrap();
        assert_eq!(report.sentences.len(), 2);
        assert_eq!(report.sentences[0], "床 前 明 月 光");
        assert_eq!(report.scores, [60.05, 180.17]);
    }

    #[test]
    fn test_summary_after_file_line_is_ignored() {
        // The whole-file statistics line also contains "ppl" but must not
        // contribute a third score.
        let report = parse(REPORT).unwrap();
        assert_eq!(report.scores.len(), 2);
    }

    #[test]
    fn test_empty_report_is_malformed() {
        assert!(matches!(
            parse(""),
            Err(ScoringError::MalformedReport(_))
        ));
        assert!(matches!(
            parse("file ./batch.txt: 0 sentences\n"),
            Err(ScoringError::MalformedReport(_))
        ));
    }

    #[test]
    fn test_unparsable_score_is_malformed() {
        let text = "床 前 明 月 光\n0 zeroprobs, logprob= -7 ppl= 49.2 ppl1= undefined\n";
        assert!(matches!(
            parse(text),
            Err(ScoringError::MalformedReport(_))
        ));
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let text = "\
床 前 明 月 光
0 zeroprobs, logprob= -7.04 ppl= 49.21 ppl1= 60.05
明 月 光 床 前
";
        assert!(matches!(
            parse(text),
            Err(ScoringError::MalformedReport(_))
        ));
    }
}
