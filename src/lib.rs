//! Batch generation of project requirements documents with the `claude` CLI.
//!
//! Two entry points share this library. `reqgen` runs one project or a small
//! sequential batch, capturing the CLI's stdout and gating acceptance on
//! output length. `reqregen` pushes every project through a bounded worker
//! pool, letting the CLI write the artifact itself and judging success
//! solely by the file appearing on disk.

pub mod config;
pub mod error;
pub mod generate;
pub mod mcp;
pub mod poll;
pub mod project;
pub mod prompt;
pub mod regenerate;
pub mod spec;
