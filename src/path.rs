use std::fmt;

use serde_json::Value;

/// The identity path, resolving to the context itself.
pub const IDENTITY: &str = ".";

/// A dotted key path, split once so it can be resolved many times.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    raw: String,
    segments: Vec<String>,
}

impl Path {
    pub fn new<T: Into<String>>(raw: T) -> Self {
        let raw = raw.into();
        let segments = if raw == IDENTITY {
            Vec::new()
        } else {
            raw.split('.').map(str::to_string).collect()
        };
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_identity(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walks `context` segment by segment. Returns `None` as soon as a segment
    /// is missing, steps through a scalar, or lands on `null`.
    pub fn resolve<'v>(&self, context: &'v Value) -> Option<&'v Value> {
        let mut current = context;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(array_index(segment)?)?,
                _ => return None,
            };
        }

        match current {
            Value::Null => None,
            value => Some(value),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parses a canonical array index: ASCII digits only, no leading zero.
fn array_index(segment: &str) -> Option<usize> {
    let canonical = match segment.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    };
    if !canonical {
        return None;
    }
    segment.parse().ok()
}

/// Resolves `path` against `context` without keeping the split path around.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// let data = json!({"user": {"name": "Ada"}});
/// assert_eq!(jtml::resolve(&data, "user.name"), Some(&json!("Ada")));
/// assert_eq!(jtml::resolve(&data, "user.email"), None);
/// assert_eq!(jtml::resolve(&data, "."), Some(&data));
/// ```
pub fn resolve<'v>(context: &'v Value, path: &str) -> Option<&'v Value> {
    Path::new(path).resolve(context)
}
