use serde_json::Value;

use crate::node::{Fragment, Node};

/// How a template reads a data path.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathUsage {
    /// Iterated by a repeat directive; expected to be an array.
    Repeat,
    /// Read by a text directive.
    Text,
    /// Read by an attribute binding.
    Attribute,
    /// Compared by a condition directive.
    Condition,
}

/// `JtmlInterface` is the surface the surrounding framework uses to register
/// templates once and render them on every incoming data payload.
pub trait JtmlInterface {
    /// `add_template` parses and compiles markup under `name`.
    ///
    /// # Errors
    /// - If the template name is a duplicate.
    /// - If the markup is malformed.
    /// - If a condition directive is invalid.
    fn add_template<N: AsRef<str>, C: AsRef<str>>(
        &mut self,
        name: N,
        content: C,
    ) -> crate::JtmlResult<()>;

    /// `add_node` compiles an already-built template root under `name`.
    ///
    /// # Errors
    /// - If the template name is a duplicate.
    /// - If a condition directive is invalid.
    fn add_node<N: AsRef<str>>(&mut self, name: N, root: &Node) -> crate::JtmlResult<()>;

    /// `render` evaluates a template against `data`.
    ///
    /// # Errors
    /// - If the template name is not found.
    fn render<N: AsRef<str>>(&self, template_name: N, data: &Value) -> crate::JtmlResult<Fragment>;

    /// `paths` lists every data path the template reads, in document order.
    ///
    /// Paths below a repeat are relative to the repeated item. Returns an
    /// empty list for unknown templates.
    fn paths<T: AsRef<str>>(&self, template_name: T) -> Vec<(&str, PathUsage)>;
}
