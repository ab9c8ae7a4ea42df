use thiserror::Error;

/// XPath error codes surfaced by extension resolution and invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FORG0001, // invalid value (malformed format template)
    XPST0017, // unknown function / wrong arity
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FORG0001 => "err:FORG0001",
            ErrorCode::XPST0017 => "err:XPST0017",
        }
    }
}

/// Why a format template was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatSyntaxReason {
    #[error("index {index} is out of range for {count} value(s)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("expected a placeholder index after '{{'")]
    MissingIndex,
    #[error("placeholder index is too large")]
    IndexTooLarge,
    #[error("placeholder is not terminated by '}}'")]
    UnterminatedPlaceholder,
    #[error("unmatched '}}' (use '}}}}' for a literal brace)")]
    UnmatchedClosingBrace,
    #[error("invalid alignment")]
    InvalidAlignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("function \"{name}\" not found ({})", ErrorCode::XPST0017.as_str())]
    FunctionNotFound { name: String },

    #[error(
        "function \"{name}\" cannot be called with {arity} argument(s); expected {} ({})",
        arity_range(.min, .max),
        ErrorCode::XPST0017.as_str()
    )]
    WrongArity { name: String, arity: usize, min: usize, max: Option<usize> },

    #[error("invalid format template {template:?} at offset {position}: {reason} ({})", ErrorCode::FORG0001.as_str())]
    FormatSyntax { template: String, position: usize, reason: FormatSyntaxReason },
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::ref_option)]
fn arity_range(min: &usize, max: &Option<usize>) -> String {
    match *max {
        Some(m) if m == *min => min.to_string(),
        Some(m) => format!("{min}..={m}"),
        None => format!("at least {min}"),
    }
}

impl Error {
    pub fn function_not_found(name: impl Into<String>) -> Self {
        Error::FunctionNotFound { name: name.into() }
    }

    pub fn format_syntax(template: &str, position: usize, reason: FormatSyntaxReason) -> Self {
        Error::FormatSyntax { template: template.to_string(), position, reason }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Error::FunctionNotFound { .. } | Error::WrongArity { .. } => ErrorCode::XPST0017,
            Error::FormatSyntax { .. } => ErrorCode::FORG0001,
        }
    }

    /// Placeholder index that caused a format failure, when one was parsed.
    pub fn format_index(&self) -> Option<usize> {
        match self {
            Error::FormatSyntax { reason: FormatSyntaxReason::IndexOutOfRange { index, .. }, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }
}
