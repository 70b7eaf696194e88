use thiserror::Error;

/// A line of macro text that could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unknown command: {text}")]
    UnknownCommand { text: String },
    #[error("malformed <{modifier}> modifier: {text}")]
    MalformedModifier { modifier: &'static str, text: String },
    #[error("unknown key '{key}': {text}")]
    InvalidKey { key: String, text: String },
    #[error("invalid /{verb} syntax: {text}")]
    InvalidArgument { verb: &'static str, text: String },
}

impl SyntaxError {
    /// The offending source text.
    pub fn text(&self) -> &str {
        match self {
            SyntaxError::UnknownCommand { text }
            | SyntaxError::MalformedModifier { text, .. }
            | SyntaxError::InvalidKey { text, .. }
            | SyntaxError::InvalidArgument { text, .. } => text,
        }
    }
}

/// A [`SyntaxError`] located within a multi-line macro.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {error}")]
pub struct MacroSyntaxError {
    /// 1-based line number in the macro source.
    pub line: usize,
    #[source]
    pub error: SyntaxError,
}
