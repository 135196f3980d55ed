//! Templated-markup renderer
//!
//! Every control skin is a markup string with two distinct placeholder
//! grammars, resolved once at build time against the owning widget's scope:
//!
//! - `$name` / `${name}` - direct property lookup; unknown names substitute
//!   the empty string (templates may be partially specialized by wrappers)
//! - `{expression}` - arithmetic expression with scope properties bound;
//!   syntax errors are construction-time fatal
//!
//! After substitution the text is parsed as an XML fragment and instantiated
//! as scene elements. `<animate>` children become registered engine
//! animations attached to their parent element, so an animation is
//! triggerable the moment the template finishes building.

use std::collections::HashMap;

use crate::animate::{AnimatedAttr, Animation, AnimationHandle, Animations};
use crate::error::TemplateError;
use crate::scene::{format_number, Display, ElementId, Scene};

/// A value in a template scope
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeValue {
    Number(f32),
    Text(String),
}

impl ScopeValue {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f32> for ScopeValue {
    fn from(n: f32) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ScopeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ScopeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Property map a template resolves against
#[derive(Debug, Clone, Default)]
pub struct Scope {
    entries: HashMap<String, ScopeValue>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ScopeValue>) -> &mut Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Builder-style set
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ScopeValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Look up a property
    pub fn get(&self, name: &str) -> Option<&ScopeValue> {
        self.entries.get(name)
    }

    fn number(&self, name: &str) -> Option<f32> {
        self.entries.get(name).and_then(ScopeValue::as_number)
    }
}

/// Result of instantiating a template under a parent element
pub struct Instantiated {
    /// Root element of the new subtree
    pub root: ElementId,
    /// Animations declared by `<animate>` elements, in document order
    pub animations: Vec<AnimationHandle>,
}

/// An immutable markup template
#[derive(Debug, Clone)]
pub struct Template {
    markup: String,
}

impl Template {
    /// Wrap a markup string
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    /// The raw, unresolved markup
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Resolve placeholders, parse, and build the subtree under `parent`
    ///
    /// The template must have exactly one root element. Malformed markup or
    /// a malformed `{expr}` is a fatal construction-time error.
    pub fn instantiate(
        &self,
        scene: &mut Scene,
        animations: &mut Animations,
        parent: ElementId,
        scope: &Scope,
    ) -> Result<Instantiated, TemplateError> {
        let resolved = expand(&self.markup, scope)?;
        let nodes = parse_fragment(&resolved)?;

        let mut roots = nodes.iter().filter_map(MarkupNode::as_element);
        let root = roots
            .next()
            .ok_or_else(|| TemplateError::Markup("template has no root element".into()))?;
        if roots.next().is_some() {
            return Err(TemplateError::Markup(
                "template has more than one root element".into(),
            ));
        }

        let mut handles = Vec::new();
        let root_id = build_element(scene, animations, parent, root, &mut handles);
        Ok(Instantiated {
            root: root_id,
            animations: handles,
        })
    }
}

/// Run both substitution passes without parsing
///
/// Exposed for wrappers that compose templates textually before building.
pub fn expand(markup: &str, scope: &Scope) -> Result<String, TemplateError> {
    let after_tokens = substitute_tokens(markup, scope);
    substitute_expressions(&after_tokens, scope)
}

/// Pass (a): `$name` / `${name}` token substitution
fn substitute_tokens(input: &str, scope: &Scope) -> String {
    let mut out = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '$' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        i += 1;
        let name = if i < chars.len() && chars[i] == '{' {
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != '}' {
                i += 1;
            }
            let name = chars[start..i].iter().collect::<String>();
            if i < chars.len() {
                i += 1; // closing brace
            }
            name
        } else {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            chars[start..i].iter().collect::<String>()
        };
        // Unknown names resolve to the empty string, by design
        if let Some(value) = scope.get(name.trim()) {
            out.push_str(&value.as_text());
        }
    }
    out
}

/// Pass (b): `{expr}` balanced-brace expression substitution
fn substitute_expressions(input: &str, scope: &Scope) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '{' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut depth = 1;
        let mut end = start;
        while end < chars.len() && depth > 0 {
            match chars[end] {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                end += 1;
            }
        }
        if depth > 0 {
            return Err(TemplateError::Expression {
                expr: chars[start..].iter().collect(),
                reason: "unbalanced braces".into(),
            });
        }
        let expr: String = chars[start..end].iter().collect();
        let value = eval_expression(&expr, scope)?;
        out.push_str(&format_number(value));
        i = end + 1;
    }
    Ok(out)
}

// Expression evaluation: + - * /, unary minus, parentheses, numbers,
// scope identifiers. Unknown identifiers evaluate to 0, consistent with the
// permissive token rule.

struct ExprParser<'a> {
    chars: Vec<char>,
    pos: usize,
    scope: &'a Scope,
    source: &'a str,
}

impl<'a> ExprParser<'a> {
    fn new(source: &'a str, scope: &'a Scope) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            scope,
            source,
        }
    }

    fn error(&self, reason: impl Into<String>) -> TemplateError {
        TemplateError::Expression {
            expr: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f32, TemplateError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f32, TemplateError> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.pos += 1;
                    value /= self.factor()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f32, TemplateError> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                if self.peek() != Some(')') {
                    return Err(self.error("missing closing parenthesis"));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let start = self.pos;
                while self
                    .chars
                    .get(self.pos)
                    .map(|c| c.is_ascii_digit() || *c == '.')
                    .unwrap_or(false)
                {
                    self.pos += 1;
                }
                let literal: String = self.chars[start..self.pos].iter().collect();
                literal
                    .parse()
                    .map_err(|_| self.error(format!("bad number literal `{literal}`")))
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let start = self.pos;
                while self
                    .chars
                    .get(self.pos)
                    .map(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .unwrap_or(false)
                {
                    self.pos += 1;
                }
                let name: String = self.chars[start..self.pos].iter().collect();
                Ok(self.scope.number(&name).unwrap_or(0.0))
            }
            Some(c) => Err(self.error(format!("unexpected character `{c}`"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

fn eval_expression(source: &str, scope: &Scope) -> Result<f32, TemplateError> {
    let mut parser = ExprParser::new(source, scope);
    let value = parser.expr()?;
    if parser.peek().is_some() {
        return Err(parser.error("trailing input after expression"));
    }
    Ok(value)
}

// Fragment parsing

#[derive(Debug, Clone)]
enum MarkupNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

impl MarkupNode {
    fn as_element(&self) -> Option<&MarkupNode> {
        match self {
            MarkupNode::Element { .. } => Some(self),
            MarkupNode::Text(t) if t.trim().is_empty() => None,
            MarkupNode::Text(_) => None,
        }
    }
}

struct FragmentParser {
    chars: Vec<char>,
    pos: usize,
}

impl FragmentParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> TemplateError {
        TemplateError::Markup(format!("{} (at offset {})", reason.into(), self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.chars[self.pos..]
            .iter()
            .zip(s.chars())
            .filter(|(a, b)| **a == *b)
            .count()
            == s.chars().count()
    }

    fn consume(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.pos += 1;
        }
    }

    fn nodes(&mut self, closing: Option<&str>) -> Result<Vec<MarkupNode>, TemplateError> {
        let mut out = Vec::new();
        loop {
            if self.pos >= self.chars.len() {
                if let Some(tag) = closing {
                    return Err(self.error(format!("unclosed element `{tag}`")));
                }
                return Ok(out);
            }
            if self.starts_with("<!--") {
                self.comment()?;
                continue;
            }
            if self.starts_with("</") {
                let Some(tag) = closing else {
                    return Err(self.error("unexpected closing tag"));
                };
                self.pos += 2;
                let name = self.name()?;
                if name != tag {
                    return Err(self.error(format!("expected `</{tag}>`, found `</{name}>`")));
                }
                self.skip_ws();
                if !self.consume(">") {
                    return Err(self.error("malformed closing tag"));
                }
                return Ok(out);
            }
            if self.peek() == Some('<') {
                out.push(self.element()?);
                continue;
            }
            let text = self.text();
            if !text.trim().is_empty() {
                out.push(MarkupNode::Text(decode_entities(text.trim())));
            }
        }
    }

    fn comment(&mut self) -> Result<(), TemplateError> {
        self.pos += 4; // "<!--"
        while self.pos < self.chars.len() {
            if self.consume("-->") {
                return Ok(());
            }
            self.pos += 1;
        }
        Err(self.error("unterminated comment"))
    }

    fn text(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.chars.len() && self.peek() != Some('<') {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn name(&mut self) -> Result<String, TemplateError> {
        let start = self.pos;
        while self
            .peek()
            .map(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
            .unwrap_or(false)
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn element(&mut self) -> Result<MarkupNode, TemplateError> {
        self.pos += 1; // '<'
        let tag = self.name()?;
        let mut attrs = Vec::new();

        loop {
            self.skip_ws();
            match self.peek() {
                Some('/') => {
                    if !self.consume("/>") {
                        return Err(self.error("malformed self-closing tag"));
                    }
                    return Ok(MarkupNode::Element {
                        tag,
                        attrs,
                        children: Vec::new(),
                    });
                }
                Some('>') => {
                    self.pos += 1;
                    let children = self.nodes(Some(&tag))?;
                    return Ok(MarkupNode::Element {
                        tag,
                        attrs,
                        children,
                    });
                }
                Some(_) => {
                    let name = self.name()?;
                    self.skip_ws();
                    if !self.consume("=") {
                        return Err(self.error(format!("attribute `{name}` missing `=`")));
                    }
                    self.skip_ws();
                    let quote = match self.peek() {
                        Some(q @ ('"' | '\'')) => q,
                        _ => return Err(self.error(format!("attribute `{name}` missing quote"))),
                    };
                    self.pos += 1;
                    let start = self.pos;
                    while self.pos < self.chars.len() && self.peek() != Some(quote) {
                        self.pos += 1;
                    }
                    if self.pos >= self.chars.len() {
                        return Err(self.error(format!("unterminated value for `{name}`")));
                    }
                    let value: String = self.chars[start..self.pos].iter().collect();
                    self.pos += 1;
                    attrs.push((name, decode_entities(&value)));
                }
                None => return Err(self.error(format!("unclosed element `{tag}`"))),
            }
        }
    }
}

fn parse_fragment(input: &str) -> Result<Vec<MarkupNode>, TemplateError> {
    FragmentParser::new(input).nodes(None)
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Build a parsed element (and its subtree) into the scene
fn build_element(
    scene: &mut Scene,
    animations: &mut Animations,
    parent: ElementId,
    node: &MarkupNode,
    handles: &mut Vec<AnimationHandle>,
) -> ElementId {
    let MarkupNode::Element {
        tag,
        attrs,
        children,
    } = node
    else {
        unreachable!("build_element is only called with elements");
    };

    let id = scene.create_under(parent, tag.clone());
    for (name, value) in attrs {
        if name == "display" {
            let display = if value == "none" {
                Display::None
            } else {
                Display::Inline
            };
            scene.set_display(id, display);
        } else {
            scene.set_attr(id, name.clone(), value.clone());
        }
    }

    for child in children {
        match child {
            MarkupNode::Text(text) => scene.set_text(id, text.clone()),
            MarkupNode::Element { tag, .. } if tag == "animate" => {
                if let Some(handle) = register_animate(animations, id, child) {
                    handles.push(handle);
                }
            }
            MarkupNode::Element { .. } => {
                build_element(scene, animations, id, child, handles);
            }
        }
    }

    id
}

/// Turn an `<animate>` markup element into a registered engine animation
/// targeting its parent element
fn register_animate(
    animations: &mut Animations,
    target: ElementId,
    node: &MarkupNode,
) -> Option<AnimationHandle> {
    let MarkupNode::Element { attrs, .. } = node else {
        return None;
    };
    let attr = |name: &str| -> Option<&str> {
        attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    };

    let Some(animated) = attr("attributeName").and_then(AnimatedAttr::parse) else {
        log::warn!("skipping <animate> with unsupported attributeName");
        return None;
    };
    let from = attr("from").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let to = attr("to").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let duration = attr("dur")
        .map(|v| v.trim_end_matches('s'))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0);

    Some(animations.register(Animation::new(target, animated, from, to, duration)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope::new()
            .with("width", 120.0)
            .with("height", 80.0)
            .with("fill", "steelblue")
    }

    #[test]
    fn test_token_substitution() {
        let s = scope();
        let out = expand("<rect width=\"$width\" fill=\"${fill}\"/>", &s).unwrap();
        assert_eq!(out, "<rect width=\"120\" fill=\"steelblue\"/>");
    }

    #[test]
    fn test_unknown_token_is_empty() {
        let s = scope();
        let out = expand("<rect fill=\"$nope\"/>", &s).unwrap();
        assert_eq!(out, "<rect fill=\"\"/>");
    }

    #[test]
    fn test_expression_substitution() {
        let s = scope();
        let out = expand("<rect rx=\"{height / 2}\" ry=\"{(width + height) * 0.5}\"/>", &s)
            .unwrap();
        assert_eq!(out, "<rect rx=\"40\" ry=\"100\"/>");
    }

    #[test]
    fn test_unknown_identifier_in_expression_is_zero() {
        let s = scope();
        assert_eq!(expand("{missing + 3}", &s).unwrap(), "3");
    }

    #[test]
    fn test_malformed_expression_is_fatal() {
        let s = scope();
        assert!(matches!(
            expand("{width +}", &s),
            Err(TemplateError::Expression { .. })
        ));
        assert!(matches!(
            expand("{width", &s),
            Err(TemplateError::Expression { .. })
        ));
    }

    #[test]
    fn test_instantiate_builds_subtree() {
        let mut scene = Scene::new();
        let mut animations = Animations::new();
        let root = scene.root();
        let template = Template::new(
            "<g><rect x=\"0\" y=\"0\" width=\"$width\" height=\"$height\"/>\
             <text x=\"4\" y=\"12\">Channels</text></g>",
        );

        let built = template
            .instantiate(&mut scene, &mut animations, root, &scope())
            .unwrap();
        assert_eq!(scene.tag(built.root), "g");
        let children = scene.children(built.root).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(scene.attr_f32(children[0], "width"), Some(120.0));
        assert_eq!(scene.text(children[1]), Some("Channels"));
    }

    #[test]
    fn test_instantiate_registers_animate_elements() {
        let mut scene = Scene::new();
        let mut animations = Animations::new();
        let root = scene.root();
        let template = Template::new(
            "<g><animate attributeName=\"opacity\" from=\"0\" to=\"1\" dur=\"0.3s\"/>\
             <animate attributeName=\"opacity\" from=\"1\" to=\"0\" dur=\"0.3s\"/></g>",
        );

        let built = template
            .instantiate(&mut scene, &mut animations, root, &Scope::new())
            .unwrap();
        assert_eq!(built.animations.len(), 2);
        assert_eq!(animations.duration(built.animations[0]), 0.3);
        // Animate elements are engine-side, not scene children
        assert!(scene.children(built.root).is_empty());
    }

    #[test]
    fn test_malformed_markup_is_fatal() {
        let mut scene = Scene::new();
        let mut animations = Animations::new();
        let root = scene.root();
        for bad in ["<g><rect></g>", "<g", "<g></p>", "plain text"] {
            let result = Template::new(bad).instantiate(
                &mut scene,
                &mut animations,
                root,
                &Scope::new(),
            );
            assert!(result.is_err(), "expected `{bad}` to fail");
        }
    }

    #[test]
    fn test_display_attr_maps_to_switch() {
        let mut scene = Scene::new();
        let mut animations = Animations::new();
        let root = scene.root();
        let built = Template::new("<g display=\"none\"><rect width=\"5\" height=\"5\"/></g>")
            .instantiate(&mut scene, &mut animations, root, &Scope::new())
            .unwrap();
        assert_eq!(scene.display(built.root), Display::None);
    }
}
