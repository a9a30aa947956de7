//! Concurrent regeneration driven by artifact appearance.
//!
//! Each task gets its own scratch directory with an MCP config scoping
//! filesystem access to the project, spawns `claude` with its output
//! discarded, and polls for `requirements.md` to appear. The subprocess is
//! opaque: success is decided entirely by the artifact existing when the
//! watch ends, and the child is always terminated and reaped afterwards,
//! whether or not it delivered.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::TaskError;
use crate::mcp;
use crate::poll;
use crate::project::Project;
use crate::prompt::full_requirements_prompt;
use crate::spec::load_spec;

/// Progress block printed after every this many completions.
const PROGRESS_EVERY: usize = 10;

// ─── Types ────────────────────────────────────────────────────────────────────

/// Counters for one pool run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

// ─── Regenerator ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Regenerator {
    config: Arc<GeneratorConfig>,
}

impl Regenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Run every project through the pool and return the tallies.
    ///
    /// Tasks are all spawned up front; a semaphore holds concurrency at
    /// `max_workers`. The receiving side owns the counters, so progress and
    /// totals never race.
    pub async fn run(&self, projects: Vec<Project>) -> RunSummary {
        let total = projects.len();
        println!("Starting requirements regeneration for {total} projects");
        println!(
            "Configuration: {} workers, {}s timeout",
            self.config.max_workers,
            self.config.regenerate_timeout.as_secs()
        );
        println!();

        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let (tx, mut rx) = mpsc::unbounded_channel::<bool>();

        for (i, project) in projects.into_iter().enumerate() {
            let worker = i % self.config.max_workers;
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            let runner = self.clone();
            tokio::spawn(async move {
                // The semaphore is never closed; should an acquire ever
                // fail, the task still reports, so the tallies always
                // cover every spawned project.
                let delivered = match semaphore.acquire_owned().await {
                    Ok(_permit) => runner.process(&project, worker).await,
                    Err(_) => false,
                };
                let _ = tx.send(delivered);
            });
        }
        drop(tx);

        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };
        let mut completed = 0usize;
        while let Some(delivered) = rx.recv().await {
            if delivered {
                summary.success += 1;
            } else {
                summary.failed += 1;
            }
            completed += 1;
            if completed % PROGRESS_EVERY == 0 {
                print_progress(&summary, completed, start.elapsed());
            }
        }

        summary.elapsed = start.elapsed();
        print_final_summary(&summary);
        summary
    }

    /// Process one project, printing a status line per outcome. Returns
    /// whether the artifact was delivered.
    pub async fn process(&self, project: &Project, worker: usize) -> bool {
        match self.try_process(project, worker).await {
            Ok(bytes) => {
                println!("{} - Success ({bytes} bytes)", project.id);
                true
            }
            Err(TaskError::MissingArtifact { limit_secs }) => {
                warn!(project = %project.id, limit_secs, "no artifact before deadline");
                println!("{} - Failed", project.id);
                false
            }
            Err(err) => {
                warn!(project = %project.id, error = %err, "regeneration errored");
                println!("{} - Error: {err}", project.id);
                false
            }
        }
    }

    /// One complete task: scratch dir, MCP config, spawn, watch, terminate.
    /// Returns the artifact size in bytes.
    pub async fn try_process(&self, project: &Project, worker: usize) -> Result<u64, TaskError> {
        let spec = load_spec(&project.spec_path())?;

        let task_dir = tempfile::Builder::new()
            .prefix(&format!("claude-req-{}-", project.id))
            .tempdir()
            .context("create task scratch dir")?;
        let config_path = mcp::write_mcp_config(task_dir.path(), &project.dir).await?;

        let output_path = project.output_path();
        let prompt = full_requirements_prompt(&spec, &output_path);

        println!("[Worker {worker}] Processing {}...", project.id);

        debug!(project = %project.id, bin = %self.config.claude_bin, "spawning claude");
        let mut child = Command::new(&self.config.claude_bin)
            .arg("--mcp-config")
            .arg(&config_path)
            .arg("--continue")
            .arg("--dangerously-skip-permissions")
            .current_dir(task_dir.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn claude (is it installed and on PATH?)")?;

        // No `?` between here and the reap below: the child must never
        // outlive this task, whatever the watch produced.
        let observed = self.drive(&mut child, &prompt, &output_path).await;
        terminate_and_reap(&mut child, self.config.reap_grace).await;
        let observed = observed?;

        if observed && output_path.is_file() {
            let size = tokio::fs::metadata(&output_path)
                .await
                .context("stat requirements.md")?
                .len();
            Ok(size)
        } else {
            Err(TaskError::MissingArtifact {
                limit_secs: self.config.regenerate_timeout.as_secs(),
            })
        }
    }

    /// Feed the prompt and watch for the artifact. The subprocess's own
    /// output stays discarded; the file is the only completion signal.
    async fn drive(
        &self,
        child: &mut Child,
        prompt: &str,
        output_path: &Path,
    ) -> Result<bool, TaskError> {
        let mut stdin = child.stdin.take().context("no stdin")?;
        stdin
            .write_all(prompt.as_bytes())
            .await
            .context("write prompt to claude stdin")?;
        drop(stdin);

        let observed = poll::wait_for(
            || output_path.is_file(),
            self.config.poll_interval,
            self.config.regenerate_timeout,
        )
        .await;

        if observed {
            // The file exists but may still be mid-write; give the tool a
            // moment before it is terminated.
            tokio::time::sleep(self.config.write_grace).await;
        }
        Ok(observed)
    }
}

// ─── Subprocess teardown ──────────────────────────────────────────────────────

/// Terminate `child` and guarantee it is reaped.
///
/// On Unix: SIGTERM first, then SIGKILL if the process is still alive after
/// `grace`. Elsewhere it goes straight to a hard kill.
async fn terminate_and_reap(child: &mut Child, grace: Duration) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(_) => return,
            Err(_) => debug!(pid, "claude ignored SIGTERM, killing"),
        }
    }
    #[cfg(not(unix))]
    let _ = grace;
    let _ = child.kill().await;
    let _ = child.wait().await;
}

// ─── Reporting ────────────────────────────────────────────────────────────────

fn print_progress(summary: &RunSummary, completed: usize, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.success as f64 / secs
    } else {
        0.0
    };
    let eta = if rate > 0.0 {
        (summary.total - completed) as f64 / rate
    } else {
        0.0
    };
    println!(
        "\nProgress: {completed}/{} ({:.0}%)",
        summary.total,
        completed as f64 / summary.total as f64 * 100.0
    );
    println!("   Success: {}, Failed: {}", summary.success, summary.failed);
    println!("   Time: {secs:.0}s, Rate: {rate:.2}/s, ETA: {eta:.0}s\n");
}

fn print_final_summary(summary: &RunSummary) {
    let secs = summary.elapsed.as_secs_f64();
    let pct = if summary.total > 0 {
        summary.success as f64 / summary.total as f64 * 100.0
    } else {
        0.0
    };
    let rate = if secs > 0.0 {
        summary.success as f64 / secs
    } else {
        0.0
    };
    println!("\nRegeneration Complete!");
    println!("   Total: {} projects", summary.total);
    println!("   Success: {} ({pct:.0}%)", summary.success);
    println!("   Failed: {}", summary.failed);
    println!(
        "   Time: {secs:.0}s ({}m {}s)",
        summary.elapsed.as_secs() / 60,
        summary.elapsed.as_secs() % 60
    );
    println!("   Rate: {rate:.2} projects/second");
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn reap_after_sigterm_is_prompt() {
        let mut child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("spawn sleep");
        let started = std::time::Instant::now();
        terminate_and_reap(&mut child, Duration::from_secs(5)).await;
        // sleep dies on the SIGTERM itself, well under the escalation grace.
        assert!(started.elapsed() < Duration::from_secs(3));
        // Reaped: the pid is gone from the handle.
        assert!(child.id().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reap_escalates_when_sigterm_is_ignored() {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg("trap '' TERM; sleep 30")
            .spawn()
            .expect("spawn sh");
        // Give the shell a beat to install the trap.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let started = std::time::Instant::now();
        terminate_and_reap(&mut child, Duration::from_millis(300)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(child.id().is_none());
    }

    #[test]
    fn summary_starts_empty() {
        let summary = RunSummary::default();
        assert_eq!(summary.success + summary.failed, 0);
        assert_eq!(summary.elapsed, Duration::ZERO);
    }
}
