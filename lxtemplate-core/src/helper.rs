//! Template Helper - Single Entry Point for Templates
//!
//! Owns one data bag plus the injected escaper, media host, options and id
//! prefix. Every accessor comes in two forms: one returns the fragment,
//! the `echo_*` form appends it to the helper's output buffer.

use serde::Serialize;
use serde_json::{Map, Value};
use std::ops::Index;

use crate::config::RenderOptions;
use crate::data::{self, is_truthy, to_text, DataBag, HelperError, EMPTY};
use crate::escape::{EscapeContext, Escaper, StandardEscaper};
use crate::ids::IdPrefix;
use crate::image::ImageRenderer;
use crate::markup::{self, Attrs, Element};
use crate::media::{MediaHost, NoMedia};

static NULL: Value = Value::Null;

pub struct TemplateHelper {
    data: DataBag,
    escaper: Box<dyn Escaper>,
    media: Box<dyn MediaHost>,
    options: RenderOptions,
    id_prefix: IdPrefix,
    output: String,
}

impl TemplateHelper {
    pub fn new(data: DataBag) -> Self {
        Self {
            data,
            escaper: Box::new(StandardEscaper),
            media: Box::new(NoMedia),
            options: RenderOptions::default(),
            id_prefix: IdPrefix::random(),
            output: String::new(),
        }
    }

    /// Build from any JSON value; only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self, HelperError> {
        Ok(Self::new(data::into_bag(value)?))
    }

    /// Build from a serializable struct, one bag key per field.
    pub fn from_serialize<T: Serialize>(source: &T) -> Result<Self, HelperError> {
        Self::from_value(serde_json::to_value(source)?)
    }

    pub fn with_escaper(mut self, escaper: impl Escaper + 'static) -> Self {
        self.escaper = Box::new(escaper);
        self
    }

    pub fn with_media(mut self, media: impl MediaHost + 'static) -> Self {
        self.media = Box::new(media);
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_id_prefix(mut self, prefix: IdPrefix) -> Self {
        self.id_prefix = prefix;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    // --- Data bag ---

    pub fn data(&self) -> &DataBag {
        &self.data
    }

    pub fn set_data(&mut self, data: DataBag) {
        self.data = data;
    }

    pub fn into_data(self) -> DataBag {
        self.data
    }

    /// Resolved value, `None` when any segment is missing.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        data::lookup(&self.data, path, &self.options.path_separator)
    }

    pub fn lookup_with(&self, path: &str, separator: &str) -> Option<&Value> {
        data::lookup(&self.data, path, separator)
    }

    /// Resolved value or `""`.
    pub fn get(&self, path: &str) -> &Value {
        self.lookup(path).unwrap_or(&EMPTY)
    }

    pub fn get_with(&self, path: &str, separator: &str) -> &Value {
        self.lookup_with(path, separator).unwrap_or(&EMPTY)
    }

    /// Path exists, whatever the value (including null, false, 0 and "").
    pub fn has(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    pub fn has_with(&self, path: &str, separator: &str) -> bool {
        self.lookup_with(path, separator).is_some()
    }

    pub fn empty(&self, path: &str) -> bool {
        !is_truthy(self.lookup(path))
    }

    pub fn not_empty(&self, path: &str) -> bool {
        !self.empty(path)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), HelperError> {
        data::set(&mut self.data, key, value.into(), &self.options.path_separator)
    }

    /// Unescaped text form of a value.
    pub fn raw(&self, path: &str) -> String {
        self.lookup(path).map(to_text).unwrap_or_default()
    }

    pub fn echo_raw(&mut self, path: &str) {
        let text = self.raw(path);
        self.echo(&text);
    }

    /// Pretty JSON of one value, or of the whole bag without a path.
    pub fn dump(&self, path: Option<&str>) -> String {
        let rendered = match path.filter(|p| !p.is_empty()) {
            Some(p) => serde_json::to_string_pretty(self.lookup(p).unwrap_or(&NULL)),
            None => serde_json::to_string_pretty(&self.data),
        };
        rendered.unwrap_or_default()
    }

    // --- Output ---

    pub fn echo(&mut self, fragment: &str) {
        self.output.push_str(fragment);
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Drain everything echoed so far.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    // --- Escaping ---

    pub fn escape(&self, context: EscapeContext, path: &str) -> String {
        self.escaper.escape(context, &self.raw(path))
    }

    pub fn echo_escaped(&mut self, context: EscapeContext, path: &str) {
        let text = self.escape(context, path);
        self.echo(&text);
    }

    pub fn attr(&self, path: &str) -> String {
        self.escape(EscapeContext::Attr, path)
    }

    pub fn echo_attr(&mut self, path: &str) {
        self.echo_escaped(EscapeContext::Attr, path);
    }

    pub fn url(&self, path: &str) -> String {
        self.escape(EscapeContext::Url, path)
    }

    pub fn echo_url(&mut self, path: &str) {
        self.echo_escaped(EscapeContext::Url, path);
    }

    pub fn html(&self, path: &str) -> String {
        self.escape(EscapeContext::Html, path)
    }

    pub fn echo_html(&mut self, path: &str) {
        self.echo_escaped(EscapeContext::Html, path);
    }

    pub fn safe_html(&self, path: &str) -> String {
        self.escape(EscapeContext::SafeHtml, path)
    }

    pub fn echo_safe_html(&mut self, path: &str) {
        self.echo_escaped(EscapeContext::SafeHtml, path);
    }

    pub fn js(&self, path: &str) -> String {
        self.escape(EscapeContext::Js, path)
    }

    pub fn echo_js(&mut self, path: &str) {
        self.echo_escaped(EscapeContext::Js, path);
    }

    pub fn xml(&self, path: &str) -> String {
        self.escape(EscapeContext::Xml, path)
    }

    pub fn echo_xml(&mut self, path: &str) {
        self.echo_escaped(EscapeContext::Xml, path);
    }

    // --- Ids ---

    pub fn id(&self, name: &str) -> String {
        self.escaper.attr(&self.id_prefix.apply(name))
    }

    pub fn echo_id(&mut self, name: &str) {
        let id = self.id(name);
        self.echo(&id);
    }

    pub fn id_prefix(&self) -> &str {
        self.id_prefix.as_str()
    }

    pub fn regenerate_id_prefix(&mut self) {
        self.id_prefix = IdPrefix::random();
    }

    // --- Composition (forwarders to `markup`) ---

    pub fn class_list(&self, args: &[Value]) -> String {
        markup::class_list(args)
    }

    pub fn echo_class_list(&mut self, args: &[Value]) {
        let classes = self.class_list(args);
        self.echo(&classes);
    }

    pub fn style(&self, props: &Map<String, Value>) -> String {
        markup::style_string(self.escaper.as_ref(), props)
    }

    pub fn echo_style(&mut self, props: &Map<String, Value>) {
        let style = self.style(props);
        self.echo(&style);
    }

    pub fn attributes(&self, attrs: &Map<String, Value>) -> String {
        markup::attributes_string(self.escaper.as_ref(), attrs)
    }

    pub fn echo_attributes(&mut self, attrs: &Map<String, Value>) {
        let rendered = self.attributes(attrs);
        self.echo(&rendered);
    }

    /// Anchor when `link` is non-empty, otherwise the configured fallback tag.
    pub fn maybe_anchor(&self, link: &str, attrs: &Attrs) -> Element {
        markup::maybe_anchor(self.escaper.as_ref(), link, attrs, &self.options.fallback_tag)
    }

    pub fn maybe_anchor_or(&self, link: &str, attrs: &Attrs, fallback_tag: &str) -> Element {
        markup::maybe_anchor(self.escaper.as_ref(), link, attrs, fallback_tag)
    }

    pub fn with_line_breaks<S: AsRef<str>>(&self, lines: &[S]) -> String {
        markup::with_line_breaks(lines, &self.options.line_separator)
    }

    pub fn echo_with_line_breaks<S: AsRef<str>>(&mut self, lines: &[S]) {
        let joined = self.with_line_breaks(lines);
        self.echo(&joined);
    }

    /// Heading whose content is the raw value at `path`.
    pub fn heading(&self, tag: &str, path: &str, attrs: &Attrs) -> String {
        markup::heading(self.escaper.as_ref(), tag, &self.raw(path), attrs)
    }

    pub fn echo_heading(&mut self, tag: &str, path: &str, attrs: &Attrs) {
        let rendered = self.heading(tag, path, attrs);
        self.echo(&rendered);
    }

    pub fn link(&self, path: &str, text: Option<&str>, attrs: &Attrs) -> String {
        match self.lookup(path) {
            Some(value) => markup::link(self.escaper.as_ref(), value, text, attrs),
            None => String::new(),
        }
    }

    pub fn echo_link(&mut self, path: &str, text: Option<&str>, attrs: &Attrs) {
        let rendered = self.link(path, text, attrs);
        self.echo(&rendered);
    }

    // --- Images ---

    fn images(&self) -> ImageRenderer<'_> {
        ImageRenderer::new(self.escaper.as_ref(), self.media.as_ref())
    }

    pub fn img(&self, path: &str) -> String {
        self.img_sized(path, &self.options.image_size, &Attrs::default())
    }

    pub fn img_sized(&self, path: &str, size: &str, attrs: &Attrs) -> String {
        self.images().img(self.lookup(path), size, attrs)
    }

    pub fn echo_img(&mut self, path: &str) {
        let rendered = self.img(path);
        self.echo(&rendered);
    }

    pub fn responsive_img(&self, path: &str) -> String {
        self.images().responsive(self.lookup(path), &self.options.image_size)
    }

    pub fn echo_responsive_img(&mut self, path: &str) {
        let rendered = self.responsive_img(path);
        self.echo(&rendered);
    }

    pub fn advanced_img(&self, path: &str) -> String {
        self.images().advanced(self.lookup(path), &self.options.image_size, &self.id_prefix)
    }

    pub fn echo_advanced_img(&mut self, path: &str) {
        let rendered = self.advanced_img(path);
        self.echo(&rendered);
    }
}

impl Default for TemplateHelper {
    fn default() -> Self {
        Self::new(DataBag::new())
    }
}

impl TryFrom<Value> for TemplateHelper {
    type Error = HelperError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// `helper["a.b"]`; absent paths index to `null`.
impl Index<&str> for TemplateHelper {
    type Output = Value;

    fn index(&self, path: &str) -> &Value {
        self.lookup(path).unwrap_or(&NULL)
    }
}
