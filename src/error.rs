//! Per-project failure taxonomy.
//!
//! Every failure is resolved at project granularity: the runner converts a
//! `TaskError` into a status line and a boolean, and nothing propagates past
//! that boundary, so one project can never abort its siblings.

use crate::spec::SpecError;

/// Why one project's generation attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The specification was absent, unreadable, or unparsable.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// The subprocess did not finish inside its wall-clock window and was
    /// killed.
    #[error("claude did not finish within {limit_secs}s")]
    Timeout { limit_secs: u64 },

    /// The subprocess finished but its captured output is below the
    /// acceptance threshold.
    #[error("insufficient output: {len} chars, minimum {min}")]
    InsufficientOutput { len: usize, min: usize },

    /// The expected output file never appeared inside the poll window; the
    /// subprocess was terminated.
    #[error("requirements.md did not appear within {limit_secs}s")]
    MissingArtifact { limit_secs: u64 },

    /// Anything else (spawn failure, I/O error, broken pipe). Logged with
    /// the project id; never retried, never propagated.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_one_line() {
        let errors: Vec<TaskError> = vec![
            TaskError::Timeout { limit_secs: 40 },
            TaskError::InsufficientOutput { len: 12, min: 1000 },
            TaskError::MissingArtifact { limit_secs: 80 },
        ];
        for e in errors {
            let msg = e.to_string();
            assert!(!msg.contains('\n'), "multi-line reason: {msg:?}");
            assert!(!msg.is_empty());
        }
    }

    #[test]
    fn insufficient_output_names_both_sizes() {
        let e = TaskError::InsufficientOutput { len: 999, min: 1000 };
        let msg = e.to_string();
        assert!(msg.contains("999"));
        assert!(msg.contains("1000"));
    }
}
