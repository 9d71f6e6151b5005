//! Markup Composition
//!
//! Pure string builders shared by the helper and its static callers:
//! class lists, inline styles, attribute strings, optional anchors and
//! line joining. Anything that needs escaping takes the escaper explicitly.

use serde_json::{Map, Value};

use crate::data::{is_truthy, to_text};
use crate::escape::Escaper;

pub const DEFAULT_LINE_SEPARATOR: &str = "<br/>";

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "div", "span"];

/// Attribute argument: pre-rendered text or an ordered mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Attrs {
    Raw(String),
    Map(Map<String, Value>),
}

impl Default for Attrs {
    fn default() -> Self {
        Attrs::Raw(String::new())
    }
}

impl From<&str> for Attrs {
    fn from(raw: &str) -> Self {
        Attrs::Raw(raw.to_string())
    }
}

impl From<String> for Attrs {
    fn from(raw: String) -> Self {
        Attrs::Raw(raw)
    }
}

impl From<Map<String, Value>> for Attrs {
    fn from(map: Map<String, Value>) -> Self {
        Attrs::Map(map)
    }
}

impl Attrs {
    /// Mapping values become attributes; anything else is kept as raw text.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Attrs::Map(map),
            other => Attrs::Raw(to_text(&other)),
        }
    }

    pub fn render(&self, escaper: &dyn Escaper) -> String {
        match self {
            Attrs::Raw(raw) => raw.clone(),
            Attrs::Map(map) => attributes_string(escaper, map),
        }
    }

    /// `alt` entry of a mapping, if any.
    pub fn alt(&self) -> Option<&Value> {
        match self {
            Attrs::Map(map) => map.get("alt"),
            Attrs::Raw(_) => None,
        }
    }

    pub fn without(&self, key: &str) -> Attrs {
        match self {
            Attrs::Map(map) => Attrs::Map(
                map.iter()
                    .filter(|(name, _)| name.as_str() != key)
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
            ),
            Attrs::Raw(raw) => Attrs::Raw(raw.clone()),
        }
    }
}

/// Join class descriptors: strings pass through, lists recurse, mappings
/// contribute the keys whose values are truthy. Empty results are dropped.
pub fn class_list(args: &[Value]) -> String {
    join_filtered(args.iter().map(class_fragment))
}

fn class_fragment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => join_filtered(items.iter().map(class_fragment)),
        Value::Object(map) => join_filtered(
            map.iter()
                .filter(|(_, enabled)| is_truthy(Some(*enabled)))
                .map(|(name, _)| name.clone()),
        ),
        _ => String::new(),
    }
}

fn join_filtered(parts: impl Iterator<Item = String>) -> String {
    parts
        .filter(|part| !part.is_empty() && part != "0")
        .collect::<Vec<_>>()
        .join(" ")
}

/// `prop: value;` pairs, skipping `""` and `false`, attribute-escaped.
pub fn style_string(escaper: &dyn Escaper, props: &Map<String, Value>) -> String {
    let styles: Vec<String> = props
        .iter()
        .filter(|(_, value)| !matches!(value, Value::Bool(false)) && value.as_str() != Some(""))
        .map(|(prop, value)| format!("{}: {};", prop, to_text(value)))
        .collect();

    escaper.attr(&styles.join(" "))
}

/// `name="value"` pairs for every entry, in insertion order.
pub fn attributes_string(escaper: &dyn Escaper, attrs: &Map<String, Value>) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, escaper.attr(&to_text(value))))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<tag attrs>` with the separating space only when there are attributes.
pub fn open_tag(tag: &str, attrs: &str) -> String {
    if attrs.is_empty() {
        format!("<{}>", tag)
    } else {
        format!("<{} {}>", tag, attrs)
    }
}

/// A wrapper that is either a link or a plain container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Anchor { open: String },
    Fallback { open: String, close: String },
}

impl Element {
    pub fn open(&self) -> &str {
        match self {
            Element::Anchor { open } | Element::Fallback { open, .. } => open,
        }
    }

    pub fn close(&self) -> &str {
        match self {
            Element::Anchor { .. } => "</a>",
            Element::Fallback { close, .. } => close,
        }
    }

    pub fn wrap(&self, inner: &str) -> String {
        format!("{}{}{}", self.open(), inner, self.close())
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self, Element::Anchor { .. })
    }
}

pub fn maybe_anchor(escaper: &dyn Escaper, link: &str, attrs: &Attrs, fallback_tag: &str) -> Element {
    let attrs = attrs.render(escaper);

    if !link.is_empty() {
        let href = format!("a href=\"{}\"", escaper.url(link));
        return Element::Anchor { open: open_tag(&href, &attrs) };
    }

    Element::Fallback {
        open: open_tag(fallback_tag, &attrs),
        close: format!("</{}>", fallback_tag),
    }
}

/// Drop falsy lines ("" and "0") and join the rest.
pub fn with_line_breaks<S: AsRef<str>>(lines: &[S], separator: &str) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.is_empty() && *line != "0")
        .collect::<Vec<_>>()
        .join(separator)
}

/// Heading-like element. Unknown tags become `div`; content is emitted as given.
pub fn heading(escaper: &dyn Escaper, tag: &str, content: &str, attrs: &Attrs) -> String {
    let tag = if HEADING_TAGS.contains(&tag) { tag } else { "div" };
    format!("{}{}</{}>", open_tag(tag, &attrs.render(escaper)), content, tag)
}

/// Link markup from a string URL or a `{url, title, target}` mapping.
pub fn link(escaper: &dyn Escaper, value: &Value, text: Option<&str>, attrs: &Attrs) -> String {
    match value {
        Value::String(url) => match text {
            Some(text) => format!("<a href=\"{}\">{}</a>", escaper.url(url), text),
            None => String::new(),
        },
        Value::Object(fields) => {
            let url = fields.get("url").filter(|u| is_truthy(Some(*u)));
            let title = fields.get("title").filter(|t| !t.is_null()).map(to_text);
            let (Some(url), Some(text)) = (url, title.or_else(|| text.map(str::to_string))) else {
                return String::new();
            };
            let target = fields.get("target").filter(|t| !t.is_null()).map_or_else(|| "_self".to_string(), to_text);

            let mut head = format!(
                "a href=\"{}\" target=\"{}\"",
                escaper.url(&to_text(url)),
                escaper.attr(&target)
            );
            let extra = attrs.render(escaper);
            if !extra.is_empty() {
                head.push(' ');
                head.push_str(&extra);
            }
            format!("<{}>{}</a>", head, text)
        }
        _ => String::new(),
    }
}
