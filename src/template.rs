use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::compiler::{ElementRenderer, RendererNode, compile_tree};
use crate::config::{Config, Missing};
use crate::error::JtmlResult;
use crate::node::{Element, Fragment, Node};
use crate::parser::parse;

/// A compiled template that can be evaluated against any number of data
/// contexts.
///
/// Compilation happens once in [`Template::compile`]; [`Template::evaluate`]
/// only reads the compiled renderers, so one `Template` can be shared across
/// threads and evaluated concurrently.
///
/// # Example
///
/// ```rust
/// use jtml::{Template, to_html};
/// use serde_json::json;
///
/// let template = Template::from_markup(
///     r#"<li jt-foreach="items"><span jt-text="label"></span></li>"#,
/// )
/// .unwrap();
///
/// let data = json!({"items": [{"label": "A"}, {"label": "B"}]});
/// let fragment = template.evaluate(&data);
/// assert_eq!(to_html(&fragment), "<li><span>A</span></li><li><span>B</span></li>");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub(crate) renderers: Vec<RendererNode>,
    missing: Missing,
}

impl Template {
    /// Compiles a template root with the default directive spelling.
    ///
    /// A `<template>` element contributes only its children; any other node
    /// is compiled as the single top-level node.
    ///
    /// # Errors
    ///
    /// Returns `JtmlError::Condition` if any condition directive is invalid.
    pub fn compile(root: &Node) -> JtmlResult<Self> {
        Self::compile_with(root, &Config::default())
    }

    /// Compiles a template root using `config`.
    ///
    /// # Errors
    ///
    /// Returns `JtmlError::Condition` if any condition directive is invalid.
    pub fn compile_with(root: &Node, config: &Config) -> JtmlResult<Self> {
        let renderers = compile_tree(root, &config.directives)?;
        debug!(renderers = renderers.len(), "compiled template");
        Ok(Self {
            renderers,
            missing: config.missing,
        })
    }

    /// Parses `markup` and compiles every top-level node as one template.
    ///
    /// # Errors
    ///
    /// * `JtmlError::Parse` if the markup is malformed
    /// * `JtmlError::Condition` if any condition directive is invalid
    pub fn from_markup(markup: &str) -> JtmlResult<Self> {
        Self::from_markup_with(markup, &Config::default())
    }

    /// Parses `markup` and compiles it using `config`.
    ///
    /// # Errors
    ///
    /// * `JtmlError::Parse` if the markup is malformed
    /// * `JtmlError::Condition` if any condition directive is invalid
    pub fn from_markup_with(markup: &str, config: &Config) -> JtmlResult<Self> {
        let mut nodes = parse(markup)?;
        nodes.retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
        let root = match <[Node; 1]>::try_from(nodes) {
            Ok([root]) => root,
            Err(nodes) => Node::Element(Element {
                tag: crate::compiler::TEMPLATE_TAG.to_string(),
                attributes: Vec::new(),
                children: nodes,
            }),
        };
        Self::compile_with(&root, config)
    }

    pub fn renderers(&self) -> &[RendererNode] {
        &self.renderers
    }

    /// Renders the template against `data`, returning a fresh fragment.
    ///
    /// Missing data never fails: absent bindings leave the template's static
    /// content in place and a repeat over anything but an array renders
    /// nothing.
    pub fn evaluate(&self, data: &Value) -> Fragment {
        let mut output = Vec::new();
        render_nodes(&self.renderers, data, self.missing, &mut output);
        output
    }
}

fn render_nodes(renderers: &[RendererNode], context: &Value, missing: Missing, output: &mut Fragment) {
    for renderer in renderers {
        render_node(renderer, context, missing, output);
    }
}

/// Renders a single compiled node into `output`.
///
/// - Text is copied unconditionally.
/// - A failed condition suppresses the element and its whole subtree.
/// - A repeat emits one clone per array item, with the item as the context.
fn render_node(renderer: &RendererNode, context: &Value, missing: Missing, output: &mut Fragment) {
    let element = match renderer {
        RendererNode::Text(text) => {
            output.push(Node::Text(text.clone()));
            return;
        }
        RendererNode::Element(element) => element,
    };

    if let Some(condition) = &element.condition {
        if !condition.evaluate(context) {
            return;
        }
    }

    let Some(repeat) = &element.repeat else {
        output.push(Node::Element(render_element(element, context, missing)));
        return;
    };

    match repeat.resolve(context) {
        Some(Value::Array(items)) => {
            trace!(path = %repeat, items = items.len(), "expanding repeat");
            output.extend(
                items
                    .iter()
                    .map(|item| Node::Element(render_element(element, item, missing))),
            );
        }
        Some(other) => {
            warn!(path = %repeat, found = %other, "repeat expected an array");
        }
        None => {
            warn!(path = %repeat, "repeat path did not resolve to an array");
        }
    }
}

fn render_element(element: &ElementRenderer, context: &Value, missing: Missing) -> Element {
    let mut clone = element.shell.clone();

    for binding in &element.bindings {
        if let Some(value) = binding.value.evaluate(context, missing).into_string() {
            clone.set_attr(binding.target.as_str(), value);
        }
    }

    if let Some(text) = &element.text {
        let value = text.evaluate(context, missing);
        if value.is_truthy() {
            if let Some(value) = value.into_string() {
                clone.set_text(value);
                return clone;
            }
        }
    }

    render_nodes(&element.children, context, missing, &mut clone.children);
    clone
}
