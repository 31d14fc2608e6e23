use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline stage an attachment is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Open,
    Normalize,
    Extract,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Open => "open",
            Stage::Normalize => "normalize",
            Stage::Extract => "extract",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Open,
    Normalize,
    Extract,
    Persist,
    Timeout { stage: Stage },
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Open => write!(f, "open failure"),
            FailureKind::Normalize => write!(f, "normalize failure"),
            FailureKind::Extract => write!(f, "extract failure"),
            FailureKind::Persist => write!(f, "persist failure"),
            FailureKind::Timeout { stage } => write!(f, "timeout at stage {stage}"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A stage failure: machine-readable kind plus the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ExtractionError {
    pub kind: FailureKind,
    pub message: String,
}

impl ExtractionError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Success {
        attachment: String,
        save_path: PathBuf,
    },
    UnsupportedType {
        attachment: String,
    },
    Failure {
        attachment: String,
        error: ExtractionError,
    },
}

impl ExtractionOutcome {
    pub fn attachment(&self) -> &str {
        match self {
            ExtractionOutcome::Success { attachment, .. }
            | ExtractionOutcome::UnsupportedType { attachment }
            | ExtractionOutcome::Failure { attachment, .. } => attachment,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExtractionOutcome::Failure { error, .. } => Some(error.kind),
            _ => None,
        }
    }
}

impl fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionOutcome::Success { save_path, .. } => {
                write!(f, "SUCCESS: Saved extraction at {}", save_path.display())
            }
            ExtractionOutcome::UnsupportedType { attachment } => {
                write!(
                    f,
                    "FAILURE: attachment doesn't have appropriate extension {attachment}"
                )
            }
            ExtractionOutcome::Failure { attachment, error } => {
                match error.kind {
                    FailureKind::Open => write!(f, "FAILURE: failed to open {attachment}")?,
                    FailureKind::Normalize => write!(f, "FAILURE: failed to save {attachment}")?,
                    FailureKind::Extract => {
                        write!(f, "FAILURE: failed to extract text from {attachment}")?
                    }
                    FailureKind::Persist => {
                        write!(f, "FAILURE: failed to write extraction of {attachment}")?
                    }
                    FailureKind::Timeout { stage } => {
                        write!(f, "FAILURE: timed out during {stage} of {attachment}")?
                    }
                    FailureKind::Cancelled => {
                        write!(f, "FAILURE: extraction cancelled for {attachment}")?
                    }
                }
                if !error.message.is_empty() {
                    write!(f, ": {}", error.message)?;
                }
                Ok(())
            }
        }
    }
}

/// One human-readable report line emitted by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Started { attachment: String },
    Elapsed { attachment: String, elapsed: Duration },
    Finished(ExtractionOutcome),
}

impl WorkerEvent {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            WorkerEvent::Finished(
                ExtractionOutcome::Failure { .. } | ExtractionOutcome::UnsupportedType { .. }
            )
        )
    }
}

impl fmt::Display for WorkerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerEvent::Started { attachment } => write!(f, "Extracting text from {attachment}"),
            WorkerEvent::Elapsed {
                attachment,
                elapsed,
            } => write!(
                f,
                "Time taken to extract text from {attachment} is {} seconds",
                elapsed.as_secs_f64()
            ),
            WorkerEvent::Finished(outcome) => write!(f, "{outcome}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_lines_keep_greppable_prefixes() {
        let outcome = ExtractionOutcome::Failure {
            attachment: "a.pdf".into(),
            error: ExtractionError::new(FailureKind::Normalize, "broken xref"),
        };
        assert_eq!(outcome.to_string(), "FAILURE: failed to save a.pdf: broken xref");

        let outcome = ExtractionOutcome::Failure {
            attachment: "a.pdf".into(),
            error: ExtractionError::new(
                FailureKind::Timeout {
                    stage: Stage::Extract,
                },
                "",
            ),
        };
        assert_eq!(outcome.to_string(), "FAILURE: timed out during extract of a.pdf");
    }

    #[test]
    fn elapsed_line_reports_seconds() {
        let event = WorkerEvent::Elapsed {
            attachment: "a.pdf".into(),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            event.to_string(),
            "Time taken to extract text from a.pdf is 1.5 seconds"
        );
    }
}
