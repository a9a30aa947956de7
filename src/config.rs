//! Runtime configuration for both generator binaries.
//!
//! Everything is a fixed constant unless an environment variable overrides
//! it. Priority: env var > built-in default. There is no config file; the
//! tools are deliberately zero-surface batch utilities.

use std::path::PathBuf;
use std::time::Duration;

/// Concurrent workers in the regeneration pool.
pub const DEFAULT_MAX_WORKERS: usize = 6;

/// Wall-clock cap for one `claude --continue` exchange in single mode.
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 40;

/// Window the regenerator waits for the output file to appear.
pub const DEFAULT_REGENERATE_TIMEOUT_SECS: u64 = 80;

/// Captured output below this many characters is rejected as a truncated
/// or empty generation, even when the subprocess exited cleanly.
pub const DEFAULT_MIN_OUTPUT_CHARS: usize = 1000;

/// Interval between output-file existence checks.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Pause after the output file appears, letting the tool finish writing.
pub const DEFAULT_WRITE_GRACE_SECS: u64 = 2;

/// How long a terminated subprocess gets to exit before SIGKILL.
pub const DEFAULT_REAP_GRACE_SECS: u64 = 5;

/// Sequential batch mode stops after this many projects.
pub const DEFAULT_BATCH_LIMIT: usize = 10;

/// Delay between sequential invocations, to avoid hammering the tool.
pub const DEFAULT_BATCH_DELAY_SECS: u64 = 2;

const DEFAULT_CLAUDE_BIN: &str = "claude";

// ─── GeneratorConfig ──────────────────────────────────────────────────────────

/// Shared knobs for the single runner and the concurrent regenerator.
///
/// Binaries build this with [`GeneratorConfig::from_env`]; tests construct it
/// directly with shortened timeouts and a sandbox projects directory.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root directory holding one subdirectory per project
    /// (`REQGEN_PROJECTS_DIR` env var).
    pub projects_dir: PathBuf,
    /// External AI tool binary (`REQGEN_CLAUDE_BIN` env var, default
    /// `claude`). Overridable so tests can substitute a stub.
    pub claude_bin: String,
    pub max_workers: usize,
    pub generate_timeout: Duration,
    pub regenerate_timeout: Duration,
    pub min_output_chars: usize,
    pub poll_interval: Duration,
    pub write_grace: Duration,
    pub reap_grace: Duration,
    pub batch_limit: usize,
    pub batch_delay: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            claude_bin: DEFAULT_CLAUDE_BIN.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            generate_timeout: Duration::from_secs(DEFAULT_GENERATE_TIMEOUT_SECS),
            regenerate_timeout: Duration::from_secs(DEFAULT_REGENERATE_TIMEOUT_SECS),
            min_output_chars: DEFAULT_MIN_OUTPUT_CHARS,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            write_grace: Duration::from_secs(DEFAULT_WRITE_GRACE_SECS),
            reap_grace: Duration::from_secs(DEFAULT_REAP_GRACE_SECS),
            batch_limit: DEFAULT_BATCH_LIMIT,
            batch_delay: Duration::from_secs(DEFAULT_BATCH_DELAY_SECS),
        }
    }
}

impl GeneratorConfig {
    /// Build config from the environment.
    ///
    /// Recognized variables:
    ///   REQGEN_PROJECTS_DIR   projects root (default: ~/ai/projects/projecthubv3/projects)
    ///   REQGEN_CLAUDE_BIN     external tool binary (default: claude)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var("REQGEN_PROJECTS_DIR")
            .ok()
            .filter(|s| !s.is_empty())
        {
            config.projects_dir = PathBuf::from(dir);
        }
        if let Some(bin) = std::env::var("REQGEN_CLAUDE_BIN")
            .ok()
            .filter(|s| !s.is_empty())
        {
            config.claude_bin = bin;
        }
        config
    }
}

fn default_projects_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join("ai")
            .join("projects")
            .join("projecthubv3")
            .join("projects");
    }
    // No HOME (stripped-down containers): fall back to a relative path.
    PathBuf::from("projects")
}
