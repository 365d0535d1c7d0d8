use crate::{
    error::{ParseError, ParseErrorKind},
    node::{Element, Node, VOID_ELEMENTS},
};

type ParseResult<T> = Result<T, ParseError>;

const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// The starting location of the current line
    line_start_pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            pos: 0,
            line: 1,
            line_start_pos: 0,
        }
    }

    #[inline]
    fn current_column(&self) -> usize {
        self.pos - self.line_start_pos + 1
    }

    #[inline]
    fn make_error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line,
            column: self.current_column(),
            kind,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advances past one character, updating line tracking on newlines.
    fn bump(&mut self) -> Option<char> {
        let current = self.current_char()?;
        if current == '\n' {
            self.line += 1;
            self.line_start_pos = self.pos + 1;
        }
        self.pos += current.len_utf8();
        Some(current)
    }

    /// Peek if the remaining input starts with `s`
    fn peek(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    /// Consume `s` if the remaining input starts with it.
    /// Assumes `s` does not contain newlines.
    fn consume(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn consume_whitespace(&mut self) {
        while self.current_char().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    /// Expect `s` to be the start of the remaining input, consume it or return Err.
    fn expect(&mut self, s: &str) -> ParseResult<()> {
        if self.consume(s) {
            return Ok(());
        }
        if self.eof() {
            return Err(self.make_error(ParseErrorKind::unexpected_eof(Some(s))));
        }
        let found: String = self.input[self.pos..].chars().take(10).collect();
        Err(self.make_error(ParseErrorKind::UnexpectedToken {
            expected: format!("'{}'", s),
            found: format!("'{}'", found),
        }))
    }

    /// Consume a run of characters accepted by `accept`.
    fn consume_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.current_char().is_some_and(&accept) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn consume_tag_name(&mut self) -> ParseResult<&'a str> {
        let name =
            self.consume_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'));
        if name.is_empty() {
            return Err(self.make_error(ParseErrorKind::Expected {
                description: "tag name".to_string(),
            }));
        }
        Ok(name)
    }

    /// Whether the input is at the start of markup rather than text.
    fn at_markup(&self) -> bool {
        let mut chars = self.input[self.pos..].chars();
        chars.next() == Some('<')
            && chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
    }

    /// Parses sibling nodes until the closing tag of `open` (or EOF at the top level).
    fn parse_nodes(&mut self, open: Option<&str>) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            if self.eof() {
                if let Some(tag) = open {
                    return Err(
                        self.make_error(ParseErrorKind::unexpected_eof(Some(&format!("</{}>", tag))))
                    );
                }
                return Ok(nodes);
            }

            if self.peek("<!--") {
                self.skip_comment()?;
            } else if self.peek("</") {
                let error_at = (self.line, self.current_column());
                self.expect("</")?;
                let tag = self.consume_tag_name()?;
                self.consume_whitespace();
                self.expect(">")?;

                let kind = match open {
                    Some(open) if open == tag => return Ok(nodes),
                    Some(open) => ParseErrorKind::MismatchedTag {
                        open: open.to_string(),
                        found: tag.to_string(),
                    },
                    None => ParseErrorKind::UnopenedTag {
                        tag: tag.to_string(),
                    },
                };
                return Err(ParseError {
                    line: error_at.0,
                    column: error_at.1,
                    kind,
                });
            } else if self.at_markup() {
                nodes.push(Node::Element(self.parse_element()?));
            } else {
                nodes.push(Node::Text(self.parse_text()));
            }
        }
    }

    fn skip_comment(&mut self) -> ParseResult<()> {
        self.expect("<!--")?;
        while !self.consume("-->") {
            if self.bump().is_none() {
                return Err(self.make_error(ParseErrorKind::unexpected_eof(Some("-->"))));
            }
        }
        Ok(())
    }

    fn parse_text(&mut self) -> String {
        let start = self.pos;
        // A lone '<' that does not open markup is ordinary text.
        self.bump();
        while !self.eof() && !self.at_markup() {
            self.bump();
        }
        decode_entities(&self.input[start..self.pos])
    }

    fn parse_element(&mut self) -> ParseResult<Element> {
        self.expect("<")?;
        let mut element = Element::new(self.consume_tag_name()?);

        loop {
            self.consume_whitespace();
            if self.eof() {
                return Err(self.make_error(ParseErrorKind::unexpected_eof(Some(">"))));
            }
            if self.consume("/>") {
                return Ok(element);
            }
            if self.consume(">") {
                break;
            }
            let (name, value) = self.parse_attribute()?;
            element.attributes.push((name, value));
        }

        if !VOID_ELEMENTS.contains(&element.tag.as_str()) {
            element.children = self.parse_nodes(Some(&element.tag))?;
        }
        Ok(element)
    }

    fn parse_attribute(&mut self) -> ParseResult<(String, String)> {
        let name = self.consume_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'));
        if name.is_empty() {
            return Err(self.make_error(ParseErrorKind::Expected {
                description: "attribute name".to_string(),
            }));
        }

        self.consume_whitespace();
        if !self.consume("=") {
            return Ok((name.to_string(), String::new()));
        }
        self.consume_whitespace();

        let value = match self.current_char() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let value = self.consume_while(|c| c != quote);
                self.expect(&quote.to_string())?;
                value
            }
            Some(_) => self.consume_while(|c| !c.is_whitespace() && c != '>'),
            None => return Err(self.make_error(ParseErrorKind::unexpected_eof(Some("attribute value")))),
        };

        Ok((name.to_string(), decode_entities(value)))
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(index) = rest.find('&') {
        out.push_str(&rest[..index]);
        rest = &rest[index..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parses template markup into a list of top-level nodes.
pub(crate) fn parse(input: &str) -> ParseResult<Vec<Node>> {
    Parser::new(input).parse_nodes(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        node.as_element().expect("expected an element")
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_empty_input() {
        assert_eq!(parse("").unwrap(), vec![]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_text_only() {
        assert_eq!(parse("hello world").unwrap(), vec![Node::text("hello world")]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_nested_elements_and_attributes() {
        let nodes = parse(r#"<ul class="list"><li jt-foreach='items' hidden>x</li></ul>"#).unwrap();
        assert_eq!(nodes.len(), 1);
        let ul = element(&nodes[0]);
        assert_eq!(ul.tag, "ul");
        assert_eq!(ul.attr("class"), Some("list"));

        let li = element(&ul.children[0]);
        assert_eq!(li.attr("jt-foreach"), Some("items"));
        assert_eq!(li.attr("hidden"), Some(""));
        assert_eq!(li.children, vec![Node::text("x")]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_bare_attribute_value() {
        let nodes = parse("<input type=text value=1>").unwrap();
        let input = element(&nodes[0]);
        assert_eq!(input.attr("type"), Some("text"));
        assert_eq!(input.attr("value"), Some("1"));
        assert!(input.children.is_empty());
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_self_closing_and_void() {
        let nodes = parse("<div><span/><br>after</div>").unwrap();
        let div = element(&nodes[0]);
        assert_eq!(div.children.len(), 3);
        assert_eq!(element(&div.children[0]).tag, "span");
        assert_eq!(element(&div.children[1]).tag, "br");
        assert_eq!(div.children[2], Node::text("after"));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_interpolation_in_attribute_survives() {
        let nodes = parse(r#"<a jt-href:var="/users/{{id}}">x</a>"#).unwrap();
        assert_eq!(element(&nodes[0]).attr("jt-href:var"), Some("/users/{{id}}"));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_comments_are_skipped() {
        let nodes = parse("<p><!-- note -->Hi</p>").unwrap();
        assert_eq!(element(&nodes[0]).children, vec![Node::text("Hi")]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_entities_are_decoded() {
        let nodes = parse(r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp;&amp; &unknown;</p>"#).unwrap();
        let p = element(&nodes[0]);
        assert_eq!(p.attr("title"), Some("a \"b\""));
        assert_eq!(p.children, vec![Node::text("1 < 2 && &unknown;")]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_lone_angle_bracket_is_text() {
        let nodes = parse("<p>1 < 2</p>").unwrap();
        assert_eq!(element(&nodes[0]).children, vec![Node::text("1 < 2")]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unclosed_element() {
        let input = "<div><p>text</p>";
        let err = parse(input).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, input.len() + 1);
        assert!(
            matches!(err.kind, ParseErrorKind::UnexpectedEOF { ref expected_what } if expected_what.contains("</div>"))
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_mismatched_tag_reports_position() {
        let input = "<div>\n  <p>text</span>\n</div>";
        let err = parse(input).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 10);
        assert_eq!(
            err.kind,
            ParseErrorKind::MismatchedTag {
                open: "p".to_string(),
                found: "span".to_string()
            }
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unopened_closing_tag() {
        let err = parse("text</p>").unwrap_err();
        assert_eq!(err.column, 5);
        assert!(matches!(err.kind, ParseErrorKind::UnopenedTag { ref tag } if tag == "p"));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unclosed_start_tag() {
        let err = parse("<div class=\"a\"").unwrap_err();
        assert!(
            matches!(err.kind, ParseErrorKind::UnexpectedEOF { ref expected_what } if expected_what.contains('>'))
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_whitespace_text_is_kept() {
        let nodes = parse("<ul>\n  <li>a</li>\n</ul>").unwrap();
        let ul = element(&nodes[0]);
        assert_eq!(ul.children.len(), 3);
        assert_eq!(ul.children[0], Node::text("\n  "));
    }
}
