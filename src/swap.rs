use std::str::FromStr;

use crate::node::{Element, Fragment};

/// How a rendered fragment is placed into its target element.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Swap {
    /// Replace every existing child.
    #[default]
    Replace,
    /// Add after the existing children.
    Append,
    /// Add before the existing children.
    Prepend,
}

/// An unrecognised swap mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown swap mode '{0}', expected 'replace', 'append' or 'prepend'")]
pub struct UnknownSwap(pub String);

impl FromStr for Swap {
    type Err = UnknownSwap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            other => Err(UnknownSwap(other.to_string())),
        }
    }
}

impl Swap {
    /// Moves `fragment` into `target`.
    pub fn apply(self, target: &mut Element, mut fragment: Fragment) {
        match self {
            Self::Replace => target.children = fragment,
            Self::Append => target.children.append(&mut fragment),
            Self::Prepend => {
                fragment.append(&mut target.children);
                target.children = fragment;
            }
        }
    }
}
