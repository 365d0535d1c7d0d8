use std::borrow::Cow;

use serde_json::Value;

use crate::config::Missing;
use crate::path::Path;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A single piece of a compiled interpolation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Text emitted verbatim.
    Literal(String),
    /// A `{{path}}` placeholder.
    Path(Path),
}

/// The result of evaluating a [`CompiledText`].
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolated<'v> {
    /// The expression was exactly one placeholder, and it resolved.
    Value(&'v Value),
    /// The expression was exactly one placeholder, and it did not resolve.
    Absent,
    /// Anything else: literal text, or text with substituted placeholders.
    Text(String),
}

impl Interpolated<'_> {
    /// `false` for absent, `null`, `false` and empty strings.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Text(text) => !text.is_empty(),
            Self::Value(value) => match value {
                Value::Null | Value::Bool(false) => false,
                Value::String(text) => !text.is_empty(),
                _ => true,
            },
        }
    }

    /// The stringified value, or `None` when absent.
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Text(text) => Some(text),
            Self::Value(value) => Some(stringify(value).into_owned()),
        }
    }
}

/// Renders a data value as text: strings verbatim, everything else in its
/// compact JSON form.
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// An interpolation string compiled into literal and path tokens.
///
/// # Example
///
/// ```
/// use jtml::{CompiledText, Missing};
/// use serde_json::json;
///
/// let text = CompiledText::compile("Hello {{user.name}}!");
/// let data = json!({"user": {"name": "Ada"}});
/// let rendered = text.evaluate(&data, Missing::Empty).into_string();
/// assert_eq!(rendered.as_deref(), Some("Hello Ada!"));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledText {
    tokens: Vec<Token>,
}

impl CompiledText {
    /// Tokenises `template`. Never fails: an unmatched `{{` and everything
    /// after it is kept as literal text, as is an empty `{{}}`.
    pub fn compile(template: &str) -> Self {
        let mut tokens = Vec::new();
        let mut rest = template;

        while !rest.is_empty() {
            let Some(start) = rest.find(OPEN) else {
                push_literal(&mut tokens, rest);
                break;
            };

            push_literal(&mut tokens, &rest[..start]);
            let after_open = &rest[start + OPEN.len()..];

            let Some(end) = after_open.find(CLOSE) else {
                push_literal(&mut tokens, &rest[start..]);
                break;
            };

            let key = after_open[..end].trim();
            if key.is_empty() {
                push_literal(&mut tokens, &rest[start..start + OPEN.len() + end + CLOSE.len()]);
            } else {
                tokens.push(Token::Path(Path::new(key)));
            }
            rest = &after_open[end + CLOSE.len()..];
        }

        Self { tokens }
    }

    /// Compiles a directive value, which is either an interpolation string or
    /// a bare path. Values containing `{{` are interpolations; anything else
    /// is treated as the single placeholder `{{value}}`.
    pub fn from_expression(expression: &str) -> Self {
        if expression.contains(OPEN) {
            return Self::compile(expression);
        }

        Self {
            tokens: vec![Token::Path(Path::new(expression.trim()))],
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Iterates the paths referenced by this text, in order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Path(path) => Some(path),
            Token::Literal(_) => None,
        })
    }

    /// Evaluates against `context`.
    ///
    /// A lone placeholder yields the resolved value itself so non-string data
    /// survives unstringified. Mixed templates are concatenated, with absent
    /// placeholders handled according to `missing`.
    pub fn evaluate<'v>(&self, context: &'v Value, missing: Missing) -> Interpolated<'v> {
        match self.tokens.as_slice() {
            [] => Interpolated::Text(String::new()),
            [Token::Literal(text)] => Interpolated::Text(text.clone()),
            [Token::Path(path)] => match path.resolve(context) {
                Some(value) => Interpolated::Value(value),
                None => Interpolated::Absent,
            },
            tokens => {
                let mut out = String::new();
                for token in tokens {
                    match token {
                        Token::Literal(text) => out.push_str(text),
                        Token::Path(path) => match path.resolve(context) {
                            Some(value) => out.push_str(&stringify(value)),
                            None => {
                                if missing == Missing::Raw {
                                    out.push_str(OPEN);
                                    out.push_str(path.as_str());
                                    out.push_str(CLOSE);
                                }
                            }
                        },
                    }
                }
                Interpolated::Text(out)
            }
        }
    }
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Token::Literal(previous)) = tokens.last_mut() {
        previous.push_str(text);
        return;
    }
    tokens.push(Token::Literal(text.to_string()));
}
