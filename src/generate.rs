//! Single and batch generation via captured stdout.
//!
//! One turn per project: pipe the prompt to `claude --continue`, capture
//! stdout until the process exits, and accept the turn only when the output
//! clears the minimum length. The artifact is written by this process, so a
//! timed-out or undersized turn leaves the project tree untouched.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::TaskError;
use crate::project::{self, Project};
use crate::prompt::requirements_prompt;
use crate::spec::load_spec;

// ─── Types ────────────────────────────────────────────────────────────────────

/// Metrics of an accepted turn, as reported on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateReport {
    pub lines: usize,
    pub bytes: usize,
}

impl GenerateReport {
    fn from_output(output: &str) -> Self {
        Self {
            // Segment count, so a trailing newline still counts a final
            // (empty) line.
            lines: output.split('\n').count(),
            bytes: output.len(),
        }
    }
}

/// Counters for one batch window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub success: usize,
    pub failed: usize,
}

// ─── Generator ────────────────────────────────────────────────────────────────

pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Process one project, printing a status line per outcome.
    ///
    /// Returns whether an artifact was written. Never panics or propagates;
    /// every failure is a printed status line, so a batch caller can keep
    /// going.
    pub async fn generate(&self, project_id: &str) -> bool {
        let project = Project::new(&self.config.projects_dir, project_id);

        // Cheap existence check before spawning anything.
        if !project.spec_path().is_file() {
            println!("No specification found for {project_id}");
            return false;
        }

        println!("Processing {project_id}...");

        match self.try_generate(&project).await {
            Ok(report) => {
                println!(
                    "{project_id} - Success ({} lines, {} bytes)",
                    report.lines, report.bytes
                );
                true
            }
            Err(TaskError::Timeout { limit_secs }) => {
                warn!(project = %project_id, limit_secs, "claude timed out");
                println!("{project_id} - Timeout");
                false
            }
            Err(err @ TaskError::InsufficientOutput { .. }) => {
                println!("{project_id} - Failed ({err})");
                false
            }
            Err(err) => {
                println!("{project_id} - Error: {err}");
                false
            }
        }
    }

    /// One complete turn for `project`: load spec, run the CLI, gate the
    /// output, write the artifact.
    pub async fn try_generate(&self, project: &Project) -> Result<GenerateReport, TaskError> {
        let spec = load_spec(&project.spec_path())?;
        let prompt = requirements_prompt(&spec);

        debug!(project = %project.id, bin = %self.config.claude_bin, "spawning claude");
        let mut child = Command::new(&self.config.claude_bin)
            .arg("--continue")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn claude (is it installed and on PATH?)")?;

        let mut stdin = child.stdin.take().context("no stdin")?;
        let mut stdout = child.stdout.take().context("no stdout")?;
        let mut stderr = child.stderr.take().context("no stderr")?;

        let limit = self.config.generate_timeout;
        let outcome = tokio::time::timeout(limit, async {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .context("write prompt to claude stdin")?;
            // Close stdin so the CLI sees EOF and starts the turn.
            drop(stdin);

            let mut output = String::new();
            let mut diagnostics = String::new();
            let (out_read, err_read) = tokio::join!(
                stdout.read_to_string(&mut output),
                stderr.read_to_string(&mut diagnostics),
            );
            out_read.context("read claude stdout")?;
            err_read.context("read claude stderr")?;
            let status = child.wait().await.context("wait for claude")?;
            Ok::<_, anyhow::Error>((output, diagnostics, status))
        })
        .await;

        let (output, diagnostics, status) = match outcome {
            Ok(result) => result?,
            Err(_) => {
                // Kill the timed-out child and reap it.
                let _ = child.kill().await;
                let _ = child.wait().await;
                return Err(TaskError::Timeout {
                    limit_secs: limit.as_secs(),
                });
            }
        };

        if !diagnostics.trim().is_empty() {
            debug!(target: "claude_stderr", project = %project.id, "{}", diagnostics.trim_end());
        }
        if !status.success() {
            // Acceptance is by output length alone; the exit code is only
            // recorded.
            debug!(project = %project.id, code = ?status.code(), "claude exited non-zero");
        }

        check_minimum(&output, self.config.min_output_chars)?;

        tokio::fs::write(project.output_path(), &output)
            .await
            .context("write requirements.md")?;
        Ok(GenerateReport::from_output(&output))
    }

    /// Batch mode: first `batch_limit` discovered projects, sequentially,
    /// with a pause after each turn to stay under provider rate limits.
    pub async fn run_batch(&self) -> anyhow::Result<BatchSummary> {
        let projects = project::discover(&self.config.projects_dir)?;
        println!("Found {} projects to process", projects.len());

        let mut summary = BatchSummary::default();
        for (i, project) in projects.iter().take(self.config.batch_limit).enumerate() {
            println!(
                "\n[{}/{}] Processing {}",
                i + 1,
                self.config.batch_limit,
                project.id
            );
            if self.generate(&project.id).await {
                summary.success += 1;
            } else {
                summary.failed += 1;
            }
            tokio::time::sleep(self.config.batch_delay).await;
        }

        println!(
            "\nComplete! Success: {}, Failed: {}",
            summary.success, summary.failed
        );
        Ok(summary)
    }
}

/// Accept output at or above `min` characters (not bytes; multibyte text is
/// not penalized).
fn check_minimum(output: &str, min: usize) -> Result<(), TaskError> {
    let len = output.chars().count();
    if len < min {
        return Err(TaskError::InsufficientOutput { len, min });
    }
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_lines_and_bytes() {
        let report = GenerateReport::from_output("alpha\nbeta\n");
        assert_eq!(report.lines, 3);
        assert_eq!(report.bytes, 11);
    }

    #[test]
    fn empty_output_is_one_line() {
        let report = GenerateReport::from_output("");
        assert_eq!(report.lines, 1);
        assert_eq!(report.bytes, 0);
    }

    #[test]
    fn minimum_is_inclusive() {
        let exactly = "x".repeat(1000);
        assert!(check_minimum(&exactly, 1000).is_ok());

        let short = "x".repeat(999);
        let err = check_minimum(&short, 1000).unwrap_err();
        match err {
            TaskError::InsufficientOutput { len, min } => {
                assert_eq!(len, 999);
                assert_eq!(min, 1000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn minimum_counts_characters_not_bytes() {
        // 1000 two-byte characters: 2000 bytes but exactly at the gate.
        let wide = "é".repeat(1000);
        assert!(check_minimum(&wide, 1000).is_ok());
    }
}
