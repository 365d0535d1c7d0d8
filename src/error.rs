use thiserror::Error;

pub type JtmlResult<T> = std::result::Result<T, JtmlError>;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ParseErrorKind {
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("Unexpected EOF{expected_what}")]
    UnexpectedEOF {
        /// Describes what was expected, e.g., " (expected '>')"
        expected_what: String,
    },
    #[error("Closing tag </{found}> does not match open tag <{open}>")]
    MismatchedTag { open: String, found: String },
    #[error("Closing tag </{tag}> has no matching open tag")]
    UnopenedTag { tag: String },
    #[error("Expected {description}")]
    Expected { description: String },
}

impl ParseErrorKind {
    pub fn unexpected_eof(expected: Option<&str>) -> Self {
        Self::UnexpectedEOF {
            expected_what: expected.map_or_else(String::new, |e| format!(" (expected '{}')", e)),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("Parse error at line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    #[source]
    pub kind: ParseErrorKind,
}

/// A condition directive that could not be compiled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ConditionError {
    #[error("Unknown operator '{operator}' in condition '{expression}'")]
    UnknownOperator { operator: String, expression: String },
    #[error("Condition '{expression}' must have the form '<left> <op> <right>', found {tokens} token(s)")]
    Malformed { expression: String, tokens: usize },
    #[error("Unterminated string literal in condition '{expression}'")]
    UnterminatedString { expression: String },
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum JtmlError {
    #[error("Template already exists: {template_name}")]
    TemplateExists { template_name: String },
    #[error("Template not found: {template_name}")]
    MissingTemplate { template_name: String },
    #[error("Invalid condition on <{tag}>: {source}")]
    Condition {
        tag: String,
        #[source]
        source: ConditionError,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}
