use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ConditionError;
use crate::path::Path;

/// The comparison operators a condition may use.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Self::Eq),
            "neq" => Ok(Self::Neq),
            "gt" => Ok(Self::Gt),
            "lt" => Ok(Self::Lt),
            "gte" => Ok(Self::Gte),
            "lte" => Ok(Self::Lte),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
        })
    }
}

/// The right-hand side of a condition.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A quoted string or a number.
    Literal(Value),
    /// Another lookup in the data context.
    Path(Path),
}

impl Operand {
    fn parse(token: &str, expression: &str) -> Result<Self, ConditionError> {
        if let Some(quoted) = token.strip_prefix('\'') {
            let inner = quoted
                .strip_suffix('\'')
                .ok_or_else(|| ConditionError::UnterminatedString {
                    expression: expression.to_string(),
                })?;
            return Ok(Self::Literal(Value::String(inner.to_string())));
        }

        if looks_numeric(token) {
            if let Ok(number) = token.parse::<i64>() {
                return Ok(Self::Literal(Value::from(number)));
            }
            if let Some(number) = token.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Ok(Self::Literal(Value::Number(number)));
            }
        }

        Ok(Self::Path(Path::new(token)))
    }

    fn resolve<'v>(&'v self, context: &'v Value) -> Option<&'v Value> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Path(path) => path.resolve(context),
        }
    }
}

/// Splits off the first whitespace-delimited token, returning it and the rest.
fn split_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], input[end..].trim_start()),
        None => (input, ""),
    }
}

/// Only tokens shaped like numbers are parsed as numbers, so that paths such
/// as `nan` or `infinity` stay paths.
fn looks_numeric(token: &str) -> bool {
    let unsigned = token.strip_prefix(['-', '+']).unwrap_or(token);
    let unsigned = unsigned.strip_prefix('.').unwrap_or(unsigned);
    unsigned.starts_with(|c: char| c.is_ascii_digit())
}

/// A compiled `left op right` comparison.
///
/// # Example
///
/// ```
/// use jtml::Condition;
/// use serde_json::json;
///
/// let adult = Condition::compile("age gt 18").unwrap();
/// assert!(adult.evaluate(&json!({"age": 20})));
/// assert!(!adult.evaluate(&json!({"age": 15})));
/// assert!(!adult.evaluate(&json!({})));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    left: Path,
    operator: Operator,
    right: Operand,
}

impl Condition {
    /// Parses a condition expression.
    ///
    /// # Errors
    ///
    /// * `ConditionError::UnknownOperator` if the middle token is not one of
    ///   `eq`, `neq`, `gt`, `lt`, `gte`, `lte`
    /// * `ConditionError::Malformed` if the expression does not have exactly
    ///   three parts
    /// * `ConditionError::UnterminatedString` if a quoted literal is not closed
    pub fn compile(expression: &str) -> Result<Self, ConditionError> {
        let malformed = |tokens: usize| ConditionError::Malformed {
            expression: expression.to_string(),
            tokens,
        };

        let (left, rest) = split_token(expression);
        if left.is_empty() {
            return Err(malformed(0));
        }
        let (operator, right) = split_token(rest);
        if operator.is_empty() {
            return Err(malformed(1));
        }
        let right = right.trim();
        if right.is_empty() {
            return Err(malformed(2));
        }

        let operator = operator.parse::<Operator>().map_err(|()| {
            ConditionError::UnknownOperator {
                operator: operator.to_string(),
                expression: expression.to_string(),
            }
        })?;

        // Only a quoted literal may contain whitespace, and nothing may follow it.
        match right.strip_prefix('\'').map(|quoted| quoted.split_once('\'')) {
            Some(Some((_, trailing))) if !trailing.trim().is_empty() => {
                return Err(malformed(3 + trailing.split_whitespace().count()));
            }
            Some(_) => {}
            None if right.contains(char::is_whitespace) => {
                return Err(malformed(2 + right.split_whitespace().count()));
            }
            None => {}
        }

        Ok(Self {
            left: Path::new(left),
            operator,
            right: Operand::parse(right, expression)?,
        })
    }

    pub fn left(&self) -> &Path {
        &self.left
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn right(&self) -> &Operand {
        &self.right
    }

    /// Evaluates the comparison. Any absent operand makes every operator
    /// evaluate to `false`.
    pub fn evaluate(&self, context: &Value) -> bool {
        let (Some(left), Some(right)) = (self.left.resolve(context), self.right.resolve(context))
        else {
            return false;
        };

        match self.operator {
            Operator::Eq => loosely_equal(left, right),
            Operator::Neq => !loosely_equal(left, right),
            Operator::Gt => compare(left, right) == Some(Ordering::Greater),
            Operator::Lt => compare(left, right) == Some(Ordering::Less),
            Operator::Gte => matches!(
                compare(left, right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lte => matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.left, self.operator)?;
        match &self.right {
            Operand::Literal(Value::String(text)) => write!(f, "'{}'", text),
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Path(path) => write!(f, "{}", path),
        }
    }
}

/// Numbers compare by value regardless of integer/float representation;
/// everything else uses structural equality.
fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
