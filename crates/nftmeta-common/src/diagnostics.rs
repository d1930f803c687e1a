//! Ordered log of non-fatal conditions met during one pipeline run
//!
//! Node-local problems (an unreachable URI, an unknown extension) never
//! interrupt the walk. They are recorded here, in the order they happen,
//! and mirrored to `tracing` so they also reach the configured log output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Kind of a recorded condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    UnreachableFile,
    UnsupportedFileType,
    MissingDefaultToken,
    MissingTokens,
    AmbiguousInput,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            DiagnosticKind::UnreachableFile => "UNREACHABLE_FILE",
            DiagnosticKind::UnsupportedFileType => "UNSUPPORTED_FILE_TYPE",
            DiagnosticKind::MissingDefaultToken => "MISSING_DEFAULT_TOKEN",
            DiagnosticKind::MissingTokens => "MISSING_TOKENS",
            DiagnosticKind::AmbiguousInput => "AMBIGUOUS_INPUT",
        };
        f.write_str(code)
    }
}

/// One recorded condition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub time: DateTime<Utc>,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Append-only diagnostics collector owned by a single run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a condition and emit it as a warning
    pub fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        warn!(kind = %kind, "{}", message);
        self.entries.push(Diagnostic {
            time: Utc::now(),
            kind,
            message,
        });
    }

    /// Record that a locator could not be read
    pub fn unreachable(&mut self, locator: &str) {
        self.record(
            DiagnosticKind::UnreachableFile,
            format!("File with URL or Path of '{}' could not be reached or found.", locator),
        );
    }

    /// Move every entry of `other` to the end of this log.
    ///
    /// The entries were already mirrored to `tracing` when first recorded.
    pub fn append(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }
}
