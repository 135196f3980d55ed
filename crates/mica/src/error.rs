//! Error types for construction-time failures
//!
//! All fatal errors in this crate surface at construction time, when a
//! widget resolves its templates and builds its subtree. Runtime input that
//! is merely out of range (slider values, popup indices) is clamped, and
//! operations on unknown keys are no-ops returning `None` - neither of those
//! goes through these types.

use thiserror::Error;

/// Failure while resolving or parsing a markup template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The markup fragment did not parse after substitution
    #[error("malformed template markup: {0}")]
    Markup(String),

    /// A `{...}` placeholder contained a syntactically invalid expression
    #[error("malformed template expression `{expr}`: {reason}")]
    Expression { expr: String, reason: String },
}

/// Failure while constructing a widget
#[derive(Debug, Error)]
pub enum BuildError {
    /// A template failed to resolve
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Constructor argument arrays disagree in length
    #[error("mismatched constructor arguments: expected {expected} entries, got {got}")]
    MismatchedArguments { expected: usize, got: usize },

    /// The widget was asked to render before `realize` was called
    #[error("widget `{0}` used before realize")]
    Unrealized(&'static str),
}
