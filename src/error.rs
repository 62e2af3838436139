//! Crate-wide error type.
//!
//! Line-scoped dispatch failures (`CommandNotFound`, `AmbiguousCommand`,
//! `NotEnoughArgs`) are recoverable: the run loop reports them and reads the
//! next line. Everything else is fatal for the API call that produced it.

use rustyline::error::ReadlineError;
use thiserror::Error;

/// Error returned by user callbacks and exit hooks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type of user callbacks and exit hooks.
pub type CallbackResult = Result<(), CallbackError>;

#[derive(Debug, Error)]
pub enum PromptrError {
    #[error("Command Not Found \"{cmd}\"")]
    CommandNotFound { cmd: String },

    #[error("Ambiguous Command \"{cmd}\" (could be {})", .candidates.join(", "))]
    AmbiguousCommand { cmd: String, candidates: Vec<String> },

    #[error("Not enough args \"{cmd}\" requires [{}]", .required.join(", "))]
    NotEnoughArgs { cmd: String, required: Vec<String> },

    #[error("Callback for \"{node}\" failed: {source}")]
    Callback {
        node: String,
        #[source]
        source: CallbackError,
    },

    #[error("Template error in \"{template}\": {reason}")]
    Template { template: String, reason: String },

    #[error("Build error: {0}")]
    Build(String),

    #[error("Initialization failed: {0}")]
    Init(String),

    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
}

impl PromptrError {
    /// True for failures scoped to a single input line.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PromptrError::CommandNotFound { .. }
                | PromptrError::AmbiguousCommand { .. }
                | PromptrError::NotEnoughArgs { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_errors_are_recoverable() {
        let err = PromptrError::CommandNotFound { cmd: "stait".into() };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Command Not Found \"stait\"");

        let err = PromptrError::NotEnoughArgs {
            cmd: "state1".into(),
            required: vec!["arg1".into()],
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Not enough args \"state1\" requires [arg1]");
    }

    #[test]
    fn callback_and_build_errors_are_fatal() {
        let err = PromptrError::Callback {
            node: "cmd1".into(),
            source: "boom".into(),
        };
        assert!(!err.is_recoverable());
        assert!(!PromptrError::Build("bad".into()).is_recoverable());
    }
}
