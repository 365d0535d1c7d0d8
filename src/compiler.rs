use crate::condition::Condition;
use crate::config::{DirectiveKind, Directives};
use crate::error::{JtmlError, JtmlResult};
use crate::interpolate::CompiledText;
use crate::node::{Element, Node};
use crate::path::Path;

/// The tag whose children form a template's content.
pub(crate) const TEMPLATE_TAG: &str = "template";

/// A compiled template node, ready for repeated evaluation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererNode {
    /// Literal text, emitted as-is.
    Text(String),
    Element(ElementRenderer),
}

/// A compiled element.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRenderer {
    /// Tag and static attributes, with directives stripped and no children.
    pub(crate) shell: Element,
    pub(crate) repeat: Option<Path>,
    pub(crate) text: Option<CompiledText>,
    pub(crate) condition: Option<Condition>,
    pub(crate) bindings: Vec<AttributeBinding>,
    pub(crate) children: Vec<RendererNode>,
}

/// Sets the `target` attribute of the output element from `value`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    pub(crate) target: String,
    pub(crate) value: CompiledText,
}

impl ElementRenderer {
    pub fn tag(&self) -> &str {
        &self.shell.tag
    }

    pub fn repeat(&self) -> Option<&Path> {
        self.repeat.as_ref()
    }

    pub fn text(&self) -> Option<&CompiledText> {
        self.text.as_ref()
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    pub fn children(&self) -> &[RendererNode] {
        &self.children
    }
}

impl AttributeBinding {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn value(&self) -> &CompiledText {
        &self.value
    }
}

/// Compiles a template root into renderer nodes.
///
/// A `<template>` root is transparent: its children become the top-level
/// renderers. Any other root compiles to a single renderer (or none, for
/// whitespace-only text).
///
/// # Errors
///
/// Returns `JtmlError::Condition` for the first condition directive that
/// fails to compile. No partial renderer is produced.
pub fn compile_tree(root: &Node, directives: &Directives) -> JtmlResult<Vec<RendererNode>> {
    match root {
        Node::Element(element) if element.tag == TEMPLATE_TAG => {
            compile_children(&element.children, directives)
        }
        node => Ok(compile_node(node, directives)?.into_iter().collect()),
    }
}

pub(crate) fn compile_children(
    nodes: &[Node],
    directives: &Directives,
) -> JtmlResult<Vec<RendererNode>> {
    let mut renderers = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let Some(renderer) = compile_node(node, directives)? {
            renderers.push(renderer);
        }
    }
    Ok(renderers)
}

fn compile_node(node: &Node, directives: &Directives) -> JtmlResult<Option<RendererNode>> {
    match node {
        Node::Text(text) if text.trim().is_empty() => Ok(None),
        Node::Text(text) => Ok(Some(RendererNode::Text(text.clone()))),
        Node::Element(element) => {
            compile_element(element, directives).map(|e| Some(RendererNode::Element(e)))
        }
    }
}

fn compile_element(element: &Element, directives: &Directives) -> JtmlResult<ElementRenderer> {
    let mut shell = Element::new(element.tag.as_str());
    let mut repeat = None;
    let mut text = None;
    let mut condition = None;
    let mut bindings = Vec::new();

    for (name, value) in &element.attributes {
        match directives.classify(name) {
            None => shell.attributes.push((name.clone(), value.clone())),
            Some(DirectiveKind::Repeat) => {
                let path = value.trim();
                repeat = Some(Path::new(if path.is_empty() {
                    crate::path::IDENTITY
                } else {
                    path
                }));
            }
            Some(DirectiveKind::Text { interpolate }) => {
                text = Some(if interpolate {
                    CompiledText::compile(value)
                } else {
                    CompiledText::from_expression(value)
                });
            }
            Some(DirectiveKind::Condition) => {
                let compiled = Condition::compile(value).map_err(|source| JtmlError::Condition {
                    tag: element.tag.clone(),
                    source,
                })?;
                condition = Some(compiled);
            }
            Some(DirectiveKind::Attribute {
                target,
                interpolate,
            }) => bindings.push(AttributeBinding {
                target: target.to_string(),
                value: if interpolate {
                    CompiledText::compile(value)
                } else {
                    CompiledText::from_expression(value)
                },
            }),
        }
    }

    Ok(ElementRenderer {
        shell,
        repeat,
        text,
        condition,
        bindings,
        children: compile_children(&element.children, directives)?,
    })
}
