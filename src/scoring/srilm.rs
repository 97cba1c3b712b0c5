use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::report;
use super::{Scorer, ScoringError};

const DEFAULT_ORDER: u32 = 4;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Scoring client for an SRILM-style `ngram` binary.
///
/// Each call writes the batch to its own scratch file, runs
/// `ngram -ppl <batch> -debug 1 -order <n> -lm <model>` and parses the
/// captured report. The scratch file lives only for the call, so
/// concurrent requests never share scorer state.
pub struct SrilmScorer {
    ngram_bin: PathBuf,
    lm_path: PathBuf,
    order: u32,
    timeout: Duration,
}

impl SrilmScorer {
    pub fn new(ngram_bin: impl Into<PathBuf>, lm_path: impl Into<PathBuf>) -> Self {
        Self {
            ngram_bin: ngram_bin.into(),
            lm_path: lm_path.into(),
            order: DEFAULT_ORDER,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the scorer over `batch_path` and return the captured report.
    ///
    /// Stdout is drained on a helper thread so the main thread can bound
    /// the wait; on expiry the child is killed and reaped.
    fn run(&self, batch_path: &Path) -> Result<String, ScoringError> {
        let mut child = Command::new(&self.ngram_bin)
            .arg("-ppl")
            .arg(batch_path)
            .arg("-debug")
            .arg("1")
            .arg("-order")
            .arg(self.order.to_string())
            .arg("-lm")
            .arg(&self.lm_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ScoringError::Spawn {
                bin: self.ngram_bin.display().to_string(),
                source,
            })?;

        let mut stdout = child.stdout.take();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = String::new();
            let result = match stdout.as_mut() {
                Some(out) => out.read_to_string(&mut buf).map(|_| buf),
                None => Ok(buf),
            };
            let _ = tx.send(result);
        });

        let output = match rx.recv_timeout(self.timeout) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ScoringError::Io(e));
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ScoringError::Timeout(self.timeout));
            }
        };

        // Stdout hit EOF, so the scorer is done writing; reap it.
        let status = child.wait()?;
        if !status.success() {
            return Err(ScoringError::ProcessFailed(status.to_string()));
        }
        Ok(output)
    }
}

impl Scorer for SrilmScorer {
    fn score_batch(&self, lines: &[String]) -> Result<Vec<f64>, ScoringError> {
        // Per-request scratch file, removed on drop on every exit path.
        let mut batch = tempfile::NamedTempFile::new()?;
        for line in lines {
            writeln!(batch, "{line}")?;
        }
        batch.flush()?;

        debug!(lines = lines.len(), "invoking ngram scorer");
        let output = self.run(batch.path())?;

        let parsed = report::parse(&output)?;
        if parsed.scores.len() != lines.len() {
            return Err(ScoringError::MalformedReport(format!(
                "submitted {} lines, report scored {}",
                lines.len(),
                parsed.scores.len()
            )));
        }
        Ok(parsed.scores)
    }
}
