//! Diagnostic classification and scoring.
//!
//! Compiler diagnostics that survive the filter are reduced to an error flag
//! and a warning count, which map onto a score from 1 to 10.

use serde::{Deserialize, Serialize};

/// Highest score, reserved for a clean compile.
pub const MAX_SCORE: u8 = 10;

/// Score for any output mentioning an error.
pub const ERROR_SCORE: u8 = 1;

/// Score floor for compiles that only produced warnings.
pub const MIN_WARNING_SCORE: u8 = 2;

/// Warning count beyond which the floor applies.
const WARNING_CEILING: u32 = 10;

/// Classified output of one compile attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// Filtered diagnostic text as captured from the pipeline.
    pub text: String,
    /// Number of errors detected (0 or 1; presence only).
    pub errors: u32,
    /// Number of `warning` tokens.
    pub warnings: u32,
    /// Derived score.
    pub score: u8,
}

impl DiagnosticRecord {
    /// Classify diagnostic text into a record.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let (errors, warnings) = classify(&text);
        Self {
            score: score(errors, warnings),
            text,
            errors,
            warnings,
        }
    }

    /// Whether any error was present.
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Count errors and warnings in diagnostic text.
///
/// Any occurrence of the substring `error` counts as one error. Warnings are
/// counted per token exactly equal to `warning` after splitting on whitespace
/// and sentence punctuation.
pub fn classify(text: &str) -> (u32, u32) {
    let errors = u32::from(text.contains("error"));
    let warnings = text
        .split(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
        .filter(|token| *token == "warning")
        .count() as u32;
    (errors, warnings)
}

/// Map error and warning counts to a score.
pub fn score(errors: u32, warnings: u32) -> u8 {
    if errors > 0 {
        ERROR_SCORE
    } else if warnings == 0 {
        MAX_SCORE
    } else if warnings > WARNING_CEILING {
        MIN_WARNING_SCORE
    } else {
        let scaled = 8 * (WARNING_CEILING - warnings) / WARNING_CEILING;
        MIN_WARNING_SCORE + scaled as u8
    }
}
