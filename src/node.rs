use std::fmt;

use crate::error::ParseError;

/// Elements that never carry children and are serialised without a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// The output of a single evaluation. Owned by the caller and independent of
/// the template it was produced from.
pub type Fragment = Vec<Node>;

/// A node of a template or output tree.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Literal text, stored unescaped.
    Text(String),
    /// An element with attributes and children.
    Element(Element),
}

/// An element node: a tag, ordered attributes and ordered children.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text<T: Into<String>>(text: T) -> Self {
        Self::Text(text.into())
    }

    pub fn element<T: Into<String>>(tag: T) -> Element {
        Element::new(tag)
    }

    /// Parses a run of markup into a list of nodes.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` pointing at the offending line and column for
    /// unclosed or mismatched tags.
    ///
    /// # Example
    ///
    /// ```
    /// use jtml::Node;
    ///
    /// let nodes = Node::parse_fragment("<p class=\"lead\">Hi</p>").unwrap();
    /// assert_eq!(nodes[0].to_string(), "<p class=\"lead\">Hi</p>");
    /// ```
    pub fn parse_fragment(markup: &str) -> Result<Vec<Node>, ParseError> {
        crate::parser::parse(markup)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Concatenated text of this node and all of its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl Element {
    pub fn new<T: Into<String>>(tag: T) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child<C: Into<Node>>(mut self, child: C) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attr<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(attr, _)| *attr == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(attr, _)| attr == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Replaces every child with a single text node.
    pub fn set_text<T: Into<String>>(&mut self, text: T) {
        self.children.clear();
        self.children.push(Node::Text(text.into()));
    }

    /// A copy of this element with the same tag and attributes but no children.
    pub fn shell(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }

    pub(crate) fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Serialises a fragment as HTML.
pub fn to_html(fragment: &[Node]) -> String {
    fragment.iter().map(ToString::to_string).collect()
}

fn escape_into(f: &mut fmt::Formatter<'_>, text: &str, quote: bool) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '"' if quote => f.write_str("&quot;")?,
            _ => fmt::Write::write_char(f, ch)?,
        }
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => escape_into(f, text, false),
            Self::Element(element) => fmt::Display::fmt(element, f),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {}=\"", name)?;
            escape_into(f, value, true)?;
            f.write_str("\"")?;
        }
        f.write_str(">")?;

        if self.is_void() {
            return Ok(());
        }

        for child in &self.children {
            fmt::Display::fmt(child, f)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ntest::timeout(100)]
    fn test_display_escapes_text_and_attributes() {
        let node: Node = Node::element("a")
            .with_attr("title", "\"quoted\" & <b>")
            .with_child("1 < 2 & 3 > 2")
            .into();
        assert_eq!(
            node.to_string(),
            "<a title=\"&quot;quoted&quot; &amp; &lt;b&gt;\">1 &lt; 2 &amp; 3 &gt; 2</a>"
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_void_elements_have_no_closing_tag() {
        let node: Node = Node::element("img").with_attr("src", "a.png").into();
        assert_eq!(node.to_string(), "<img src=\"a.png\">");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_set_attr_keeps_position() {
        let mut element = Node::element("div")
            .with_attr("id", "x")
            .with_attr("class", "a");
        element.set_attr("id", "y");
        assert_eq!(
            element.attributes,
            vec![
                ("id".to_string(), "y".to_string()),
                ("class".to_string(), "a".to_string())
            ]
        );
        assert_eq!(element.remove_attr("class").as_deref(), Some("a"));
        assert_eq!(element.remove_attr("class"), None);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_shell_drops_children() {
        let element = Node::element("ul")
            .with_attr("class", "list")
            .with_child(Node::element("li"));
        let shell = element.shell();
        assert_eq!(shell.tag, "ul");
        assert_eq!(shell.attr("class"), Some("list"));
        assert!(shell.children.is_empty());
        assert_eq!(element.children.len(), 1);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_text_content() {
        let node: Node = Node::element("p")
            .with_child("Hello ")
            .with_child(Node::element("b").with_child("World"))
            .into();
        assert_eq!(node.text_content(), "Hello World");
    }
}
