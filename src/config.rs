/// Spelling of the directive attributes recognised by the compiler.
///
/// Every directive is `prefix` followed by its name, so with the defaults a
/// template uses `jt-foreach`, `jt-text`, `jt-if` and `jt-<attribute>` for
/// attribute bindings. A binding may carry a `:<interpolate_suffix>` suffix
/// (`jt-href:var="/users/{{id}}"`) to force interpolation mode.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directives {
    pub prefix: String,
    pub repeat: String,
    pub text: String,
    pub condition: String,
    pub interpolate_suffix: String,
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            prefix: "jt-".to_string(),
            repeat: "foreach".to_string(),
            text: "text".to_string(),
            condition: "if".to_string(),
            interpolate_suffix: "var".to_string(),
        }
    }
}

/// How a directive attribute was classified by [`Directives::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DirectiveKind<'a> {
    Repeat,
    Text { interpolate: bool },
    Condition,
    Attribute { target: &'a str, interpolate: bool },
}

impl Directives {
    /// Classifies an attribute name, returning `None` for plain attributes.
    pub(crate) fn classify<'a>(&self, name: &'a str) -> Option<DirectiveKind<'a>> {
        let rest = name.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            return None;
        }

        if rest == self.repeat {
            return Some(DirectiveKind::Repeat);
        }
        if rest == self.condition {
            return Some(DirectiveKind::Condition);
        }

        let (target, interpolate) = match rest.split_once(':') {
            Some((target, suffix)) => (target, suffix == self.interpolate_suffix),
            None => (rest, false),
        };

        if target == self.text {
            return Some(DirectiveKind::Text { interpolate });
        }

        Some(DirectiveKind::Attribute {
            target,
            interpolate,
        })
    }
}

/// What an interpolation emits for a placeholder whose path is absent.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Missing {
    /// Substitute the empty string.
    #[default]
    Empty,
    /// Re-emit the placeholder as written, e.g. `{{user.name}}`.
    Raw,
}

/// Engine-wide configuration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Config {
    pub directives: Directives,
    pub missing: Missing,
}
