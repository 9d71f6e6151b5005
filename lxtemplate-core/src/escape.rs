//! Escaping - Context-Specific Output Encoding
//!
//! The helper never encodes anything itself; it dispatches to an injected
//! `Escaper`. `StandardEscaper` is the bundled implementation.

use serde::{Deserialize, Serialize};

/// Output context a value is being written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscapeContext {
    Attr,
    Url,
    Html,
    SafeHtml,
    Js,
    Xml,
}

pub trait Escaper: Send + Sync {
    fn attr(&self, input: &str) -> String;
    fn url(&self, input: &str) -> String;
    fn html(&self, input: &str) -> String;
    /// Keep a safe subset of HTML, drop the rest.
    fn safe_html(&self, input: &str) -> String;
    fn js(&self, input: &str) -> String;
    fn xml(&self, input: &str) -> String;

    fn escape(&self, context: EscapeContext, input: &str) -> String {
        match context {
            EscapeContext::Attr => self.attr(input),
            EscapeContext::Url => self.url(input),
            EscapeContext::Html => self.html(input),
            EscapeContext::SafeHtml => self.safe_html(input),
            EscapeContext::Js => self.js(input),
            EscapeContext::Xml => self.xml(input),
        }
    }
}

const ALLOWED_PROTOCOLS: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "gopher", "nntp", "feed",
    "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "address", "b", "blockquote", "br", "caption", "cite", "code", "dd", "del",
    "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "img", "ins", "li", "mark", "ol", "p", "picture", "pre", "q", "s", "small", "source",
    "span", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u",
    "ul",
];

/// Removed together with their content.
const STRIPPED_BLOCKS: &[&str] = &["script", "style", "iframe", "object"];

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEscaper;

impl StandardEscaper {
    pub fn new() -> Self {
        Self
    }
}

impl Escaper for StandardEscaper {
    fn attr(&self, input: &str) -> String {
        html_escape::encode_quoted_attribute(input).into_owned()
    }

    fn url(&self, input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let cleaned: String = trimmed
            .replace(' ', "%20")
            .chars()
            .filter(|c| is_url_char(*c))
            .collect();

        if let Some(scheme) = scheme_of(&cleaned) {
            if !ALLOWED_PROTOCOLS.contains(&scheme.to_ascii_lowercase().as_str()) {
                return String::new();
            }
        }

        cleaned.replace('&', "&amp;").replace('\'', "&#039;")
    }

    fn html(&self, input: &str) -> String {
        html_escape::encode_quoted_attribute(input).into_owned()
    }

    fn safe_html(&self, input: &str) -> String {
        ammonia::Builder::default()
            .tags(ALLOWED_TAGS.iter().copied().collect())
            .clean_content_tags(STRIPPED_BLOCKS.iter().copied().collect())
            .url_schemes(ALLOWED_PROTOCOLS.iter().copied().collect())
            .link_rel(None)
            .clean(input)
            .to_string()
    }

    fn js(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        for ch in input.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("&quot;"),
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '\r' => {}
                '\n' => out.push_str("\\n"),
                _ => out.push(ch),
            }
        }
        out
    }

    fn xml(&self, input: &str) -> String {
        quick_xml::escape::escape(input).into_owned()
    }
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c)
        || !c.is_ascii()
}

/// Scheme of an absolute URL, `None` for relative ones.
fn scheme_of(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    let candidate = &url[..colon];
    if candidate.contains(['/', '?', '#']) {
        return None;
    }
    Some(candidate)
}
