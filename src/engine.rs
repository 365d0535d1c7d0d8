use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::compiler::RendererNode;
use crate::config::Config;
use crate::error::{JtmlError, JtmlResult};
use crate::interface::{JtmlInterface, PathUsage};
use crate::node::{Fragment, Node};
use crate::template::Template;

/// `JtmlEngine` is the primary implementation of the `JtmlInterface` trait,
/// holding a collection of named, compiled templates.
///
/// # Examples
///
/// ```
/// use jtml::{JtmlEngine, JtmlInterface, to_html};
/// use serde_json::json;
///
/// let mut engine = JtmlEngine::new();
/// engine
///     .add_template("greeting", r#"<p jt-text="Hello, {{ name }}!"></p>"#)
///     .unwrap();
///
/// let output = engine.render("greeting", &json!({"name": "World"})).unwrap();
/// assert_eq!(to_html(&output), "<p>Hello, World!</p>");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct JtmlEngine {
    templates: HashMap<String, Template>,
    config: Config,
}

impl JtmlEngine {
    /// Creates a new empty `JtmlEngine` using the default directive spelling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty engine whose templates compile with `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            templates: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Looks up a compiled template.
    pub fn template<N: AsRef<str>>(&self, name: N) -> Option<&Template> {
        self.templates.get(name.as_ref())
    }

    fn insert(&mut self, name: &str, template: Template) {
        debug!(
            template = name,
            renderers = template.renderers().len(),
            "registered template"
        );
        self.templates.insert(name.to_string(), template);
    }

    fn ensure_vacant(&self, name: &str) -> JtmlResult<()> {
        if self.templates.contains_key(name) {
            return Err(JtmlError::TemplateExists {
                template_name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl JtmlInterface for JtmlEngine {
    /// Adds a new template to the engine with the given name and markup.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the template was successfully added
    /// * `Err(JtmlError::TemplateExists)` if a template with the given name already exists
    /// * `Err(JtmlError::Parse)` if the markup is malformed
    /// * `Err(JtmlError::Condition)` if a condition directive is invalid
    fn add_template<N: AsRef<str>, C: AsRef<str>>(&mut self, name: N, content: C) -> JtmlResult<()> {
        let name = name.as_ref();
        self.ensure_vacant(name)?;

        let template = Template::from_markup_with(content.as_ref(), &self.config)?;
        self.insert(name, template);
        Ok(())
    }

    fn add_node<N: AsRef<str>>(&mut self, name: N, root: &Node) -> JtmlResult<()> {
        let name = name.as_ref();
        self.ensure_vacant(name)?;

        let template = Template::compile_with(root, &self.config)?;
        self.insert(name, template);
        Ok(())
    }

    /// Renders the template with the given name against `data`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jtml::{JtmlEngine, JtmlInterface, JtmlError};
    /// use serde_json::json;
    ///
    /// let engine = JtmlEngine::new();
    /// let result = engine.render("missing", &json!({}));
    /// assert!(matches!(result, Err(JtmlError::MissingTemplate { .. })));
    /// ```
    fn render<N: AsRef<str>>(&self, template_name: N, data: &Value) -> JtmlResult<Fragment> {
        let name = template_name.as_ref();
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| JtmlError::MissingTemplate {
                template_name: name.to_string(),
            })?;

        Ok(template.evaluate(data))
    }

    /// Lists the data paths a template reads.
    ///
    /// # Examples
    ///
    /// ```
    /// use jtml::{JtmlEngine, JtmlInterface, PathUsage};
    ///
    /// let mut engine = JtmlEngine::new();
    /// engine
    ///     .add_template("list", r#"<li jt-foreach="items" jt-text="label"></li>"#)
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     engine.paths("list"),
    ///     vec![("items", PathUsage::Repeat), ("label", PathUsage::Text)]
    /// );
    /// ```
    fn paths<T: AsRef<str>>(&self, template_name: T) -> Vec<(&str, PathUsage)> {
        let Some(template) = self.templates.get(template_name.as_ref()) else {
            return vec![];
        };

        let mut paths = Vec::new();
        for renderer in template.renderers() {
            collect_paths(renderer, &mut paths);
        }
        paths
    }
}

fn push_path<'a>(paths: &mut Vec<(&'a str, PathUsage)>, path: &'a str, usage: PathUsage) {
    if !paths.iter().any(|(name, ty)| *name == path && *ty == usage) {
        paths.push((path, usage));
    }
}

fn collect_paths<'a>(renderer: &'a RendererNode, paths: &mut Vec<(&'a str, PathUsage)>) {
    let RendererNode::Element(element) = renderer else {
        return;
    };

    if let Some(condition) = element.condition() {
        push_path(paths, condition.left().as_str(), PathUsage::Condition);
        if let crate::condition::Operand::Path(right) = condition.right() {
            push_path(paths, right.as_str(), PathUsage::Condition);
        }
    }
    if let Some(repeat) = element.repeat() {
        push_path(paths, repeat.as_str(), PathUsage::Repeat);
    }
    for binding in element.bindings() {
        for path in binding.value().paths() {
            push_path(paths, path.as_str(), PathUsage::Attribute);
        }
    }
    if let Some(text) = element.text() {
        for path in text.paths() {
            push_path(paths, path.as_str(), PathUsage::Text);
        }
    }
    for child in element.children() {
        collect_paths(child, paths);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::Directives;
    use crate::node::to_html;

    #[test]
    #[ntest::timeout(100)]
    fn test_duplicate_template() {
        let mut engine = JtmlEngine::new();
        engine.add_template("dup", "<p>one</p>").unwrap();
        let result = engine.add_template("dup", "<p>two</p>");
        assert!(matches!(result, Err(JtmlError::TemplateExists { .. })));

        let result = engine.add_node("dup", &Node::text("x"));
        assert!(matches!(result, Err(JtmlError::TemplateExists { .. })));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_failed_compile_does_not_register() {
        let mut engine = JtmlEngine::new();
        let result = engine.add_template("bad", r#"<p jt-if="a ~ b"></p>"#);
        assert!(matches!(result, Err(JtmlError::Condition { .. })));
        assert!(engine.template("bad").is_none());

        let result = engine.add_template("bad", "<p>");
        assert!(matches!(result, Err(JtmlError::Parse(_))));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_custom_directive_spelling() {
        let config = Config {
            directives: Directives {
                prefix: "x-".to_string(),
                ..Directives::default()
            },
            ..Config::default()
        };
        let mut engine = JtmlEngine::with_config(config);
        engine
            .add_template("list", r#"<li x-foreach="items" x-text="." jt-text="ignored"></li>"#)
            .unwrap();

        let output = engine.render("list", &json!({"items": ["a", "b"]})).unwrap();
        assert_eq!(
            to_html(&output),
            r#"<li jt-text="ignored">a</li><li jt-text="ignored">b</li>"#
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_paths_collects_every_usage() {
        let mut engine = JtmlEngine::new();
        engine
            .add_template(
                "page",
                r#"<section jt-if="user.age gte limits.min">
                    <h1 jt-text="Welcome {{user.name}}"></h1>
                    <a jt-href="user.url" jt-title:var="{{user.name}}"></a>
                    <li jt-foreach="items" jt-text="label"></li>
                    <p jt-text="user.name"></p>
                </section>"#,
            )
            .unwrap();

        assert_eq!(
            engine.paths("page"),
            vec![
                ("user.age", PathUsage::Condition),
                ("limits.min", PathUsage::Condition),
                ("user.name", PathUsage::Text),
                ("user.url", PathUsage::Attribute),
                ("user.name", PathUsage::Attribute),
                ("items", PathUsage::Repeat),
                ("label", PathUsage::Text),
            ]
        );
        assert!(engine.paths("unknown").is_empty());
    }
}
