//! MCP configuration for regeneration tasks.
//!
//! Each task writes `mcp-config.json` into its own scratch directory and
//! passes it to the CLI via `--mcp-config`. The config registers a single
//! filesystem server scoped to the project directory, so a task can read its
//! specification and write its requirements document but cannot touch
//! anything outside the project tree.

use std::path::{Path, PathBuf};

use serde_json::json;

/// File name of the per-task config inside the scratch directory.
pub const MCP_CONFIG_FILE: &str = "mcp-config.json";

// ─── Config generation ────────────────────────────────────────────────────────

/// Generate the JSON value scoping filesystem access to `project_dir`.
pub fn filesystem_mcp_config(project_dir: &Path) -> serde_json::Value {
    json!({
        "mcpServers": {
            "filesystem": {
                "command": "npx",
                "args": [
                    "-y",
                    "@modelcontextprotocol/server-filesystem",
                    project_dir.display().to_string()
                ]
            }
        }
    })
}

/// Write the config into `task_dir` and return its path.
pub async fn write_mcp_config(task_dir: &Path, project_dir: &Path) -> anyhow::Result<PathBuf> {
    let config = filesystem_mcp_config(project_dir);
    let content = serde_json::to_string_pretty(&config)?;
    let path = task_dir.join(MCP_CONFIG_FILE);
    tokio::fs::write(&path, content).await?;
    Ok(path)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
