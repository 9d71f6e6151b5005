//! Image Rendering - Plain, Responsive and Advanced
//!
//! Three escalating modes built from bag values:
//! 1. plain `<img>` from an id, a URL or a `{url, alt}` record
//! 2. `<picture>` with one `<source>` per media query
//! 3. a styled container around the picture (sizing, focal point, fit)
//!
//! Missing or malformed data renders as an empty fragment.

use serde_json::{json, Map, Value};

use crate::data::{as_id, is_numeric, is_truthy, to_text};
use crate::escape::Escaper;
use crate::ids::IdPrefix;
use crate::markup::{class_list, open_tag, Attrs};
use crate::media::MediaHost;

pub const DEFAULT_FOCAL: &str = "50%";

/// What image to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageDescriptor {
    Id(u64),
    Url(String),
    Record { url: String, alt: Option<Value> },
}

impl ImageDescriptor {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !is_truthy(Some(value)) {
            return None;
        }
        match value {
            Value::Number(_) => as_id(value).map(ImageDescriptor::Id),
            Value::String(_) if is_numeric(value) => as_id(value).map(ImageDescriptor::Id),
            Value::String(s) => Some(ImageDescriptor::Url(s.clone())),
            Value::Object(fields) => {
                let url = fields.get("url").map(to_text).filter(|u| !u.is_empty())?;
                let alt = fields.get("alt").filter(|a| !a.is_null()).cloned();
                Some(ImageDescriptor::Record { url, alt })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureSource {
    pub img_id: Option<u64>,
    pub media_query: String,
}

impl PictureSource {
    fn from_value(value: &Value) -> Self {
        Self {
            img_id: value.get("img_id").filter(|id| is_truthy(Some(*id))).and_then(as_id),
            media_query: value.get("media_query").map(to_text).unwrap_or_default(),
        }
    }

    /// Media query without a leading `@media `.
    pub fn media(&self) -> &str {
        let query = self.media_query.trim_start();
        query.strip_prefix("@media ").unwrap_or(query)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponsiveImageConfig {
    pub base_img: Option<Value>,
    pub sources: Vec<PictureSource>,
}

impl ResponsiveImageConfig {
    pub fn from_map(group: &Map<String, Value>) -> Self {
        let sources = match group.get("sources") {
            Some(Value::Array(items)) => items.iter().map(PictureSource::from_value).collect(),
            _ => Vec::new(),
        };
        Self {
            base_img: group.get("base_img").filter(|b| !b.is_null()).cloned(),
            sources,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sizing {
    #[default]
    Natural,
    FullWidth,
    FullHeight,
    FullBoth,
}

impl Sizing {
    /// Unknown or missing values mean natural size.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("width-full-height-full") => Sizing::FullBoth,
            Some("width-full-height-auto") => Sizing::FullWidth,
            Some("width-auto-height-full") => Sizing::FullHeight,
            _ => Sizing::Natural,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Sizing::Natural => "",
            Sizing::FullWidth => "lx-img--full-width",
            Sizing::FullHeight => "lx-img--full-height",
            Sizing::FullBoth => "lx-img--full-width lx-img--full-height",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectFit {
    None,
    Contain,
    Cover,
}

impl ObjectFit {
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value.and_then(Value::as_str)? {
            "none" => Some(ObjectFit::None),
            "contain" => Some(ObjectFit::Contain),
            "cover" => Some(ObjectFit::Cover),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    InlineBlock,
    Block,
}

impl Display {
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value.and_then(Value::as_str)? {
            "inline-block" => Some(Display::InlineBlock),
            "block" => Some(Display::Block),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedImageConfig {
    pub picture: ResponsiveImageConfig,
    pub sizing: Sizing,
    pub custom_width: Option<String>,
    pub custom_height: Option<String>,
    pub focal_x: Option<Value>,
    pub focal_y: Option<Value>,
    pub object_fit: Option<ObjectFit>,
    pub display: Option<Display>,
    pub id: Option<String>,
}

impl AdvancedImageConfig {
    pub fn from_map(group: &Map<String, Value>) -> Self {
        let dimension = |key: &str| group.get(key).filter(|v| is_truthy(Some(*v))).map(to_text);
        let present = |key: &str| group.get(key).filter(|v| !v.is_null()).cloned();

        Self {
            picture: ResponsiveImageConfig::from_map(group),
            sizing: Sizing::from_value(group.get("sizing")),
            custom_width: dimension("custom_width"),
            custom_height: dimension("custom_height"),
            focal_x: present("focal_x"),
            focal_y: present("focal_y"),
            object_fit: ObjectFit::from_value(group.get("object_fit")),
            display: Display::from_value(group.get("display")),
            id: dimension("id"),
        }
    }

    /// Either focal coordinate was given explicitly, whatever its value.
    pub fn has_focal(&self) -> bool {
        self.focal_x.is_some() || self.focal_y.is_some()
    }

    pub fn is_constrained(&self) -> bool {
        self.custom_width.is_some() || self.custom_height.is_some()
    }

    pub fn container_classes(&self) -> String {
        let flags = json!({
            "lx-img--constrained": self.is_constrained(),
            "lx-img--cover": self.object_fit == Some(ObjectFit::Cover),
            "lx-img--contain": self.object_fit == Some(ObjectFit::Contain),
            "lx-img--block": self.display == Some(Display::Block),
            "lx-img--inline-block": self.display == Some(Display::InlineBlock),
            "lx-img--has-focal": self.has_focal(),
        });
        class_list(&[json!(["lx-img", self.sizing.class(), flags])])
    }

    /// Custom properties: dimensions when set, focal point always.
    pub fn container_styles(&self) -> String {
        let mut styles = Vec::new();
        if let Some(width) = &self.custom_width {
            styles.push(format!("--width: {}", width));
        }
        if let Some(height) = &self.custom_height {
            styles.push(format!("--height: {}", height));
        }
        styles.push(format!("--focal-x: {}", focal(self.focal_x.as_ref())));
        styles.push(format!("--focal-y: {}", focal(self.focal_y.as_ref())));
        styles.join("; ")
    }
}

fn focal(value: Option<&Value>) -> String {
    match value {
        None => DEFAULT_FOCAL.to_string(),
        Some(v) if is_numeric(v) => format!("{}%", to_text(v)),
        Some(v) => to_text(v),
    }
}

/// Renders image markup with an injected escaper and media host.
pub struct ImageRenderer<'a> {
    escaper: &'a dyn Escaper,
    media: &'a dyn MediaHost,
}

impl<'a> ImageRenderer<'a> {
    pub fn new(escaper: &'a dyn Escaper, media: &'a dyn MediaHost) -> Self {
        Self { escaper, media }
    }

    pub fn img(&self, value: Option<&Value>, size: &str, attrs: &Attrs) -> String {
        let Some(descriptor) = value.and_then(ImageDescriptor::from_value) else {
            tracing::debug!("no image descriptor");
            return String::new();
        };

        let (url, alt) = match descriptor {
            ImageDescriptor::Id(id) => return self.media.render_attachment(id, size, attrs),
            ImageDescriptor::Url(url) => (url, attrs.alt().cloned()),
            ImageDescriptor::Record { url, alt } => (url, alt.or_else(|| attrs.alt().cloned())),
        };
        let alt = alt.as_ref().map(to_text).unwrap_or_default();

        let head = format!(
            "img src=\"{}\" alt=\"{}\"",
            self.escaper.url(&url),
            self.escaper.attr(&alt)
        );
        open_tag(&head, &attrs.without("alt").render(self.escaper))
    }

    pub fn picture_source(&self, source: &PictureSource) -> String {
        let Some(id) = source.img_id else {
            return String::new();
        };
        let Some(image) = self.media.image_src(id, "full") else {
            tracing::debug!(id, "source skipped, attachment lookup failed");
            return String::new();
        };

        let meta = self.media.metadata(id);
        let dims = [image.width, image.height];
        let sizes = self.media.sizes_attr(dims, &image.src, meta.as_ref(), id);
        let srcset = self.media.srcset_attr(dims, &image.src, meta.as_ref(), id);
        let hw = self.media.width_height_attrs(image.width, image.height);

        let head = format!(
            "source media=\"{}\" srcset=\"{}\" sizes=\"{}\"",
            self.escaper.attr(source.media()),
            srcset,
            sizes
        );
        open_tag(&head, &hw)
    }

    pub fn picture(&self, config: &ResponsiveImageConfig, size: &str) -> String {
        let sources: String = config.sources.iter().map(|s| self.picture_source(s)).collect();
        let base = self.img(config.base_img.as_ref(), size, &Attrs::default());
        format!("<picture>{}{}</picture>", sources, base)
    }

    /// `<picture>` for a `{base_img, sources}` group. Values without a
    /// `base_img` fall back to plain image rendering.
    pub fn responsive(&self, value: Option<&Value>, size: &str) -> String {
        let base = value.and_then(|v| v.get("base_img"));
        if !is_truthy(base) && is_truthy(value) {
            return self.img(value, size, &Attrs::default());
        }

        match value {
            Some(Value::Object(group)) => self.picture(&ResponsiveImageConfig::from_map(group), size),
            _ => String::new(),
        }
    }

    pub fn advanced(&self, value: Option<&Value>, size: &str, prefix: &IdPrefix) -> String {
        let group = match value {
            Some(Value::Object(group)) if !group.is_empty() => group,
            Some(other) if is_truthy(Some(other)) => {
                tracing::debug!("advanced image config is not an object");
                return String::new();
            }
            _ => return String::new(),
        };

        let config = AdvancedImageConfig::from_map(group);
        self.container(&config, &self.picture(&config.picture, size), prefix)
    }

    fn container(&self, config: &AdvancedImageConfig, inner: &str, prefix: &IdPrefix) -> String {
        let mut attrs = Vec::new();
        if let Some(id) = &config.id {
            attrs.push(format!("id=\"{}\"", self.escaper.attr(&prefix.apply(id))));
        }
        attrs.push(format!("class=\"{}\"", self.escaper.attr(&config.container_classes())));
        attrs.push(format!("style=\"{}\"", self.escaper.attr(&config.container_styles())));

        format!("{}{}</div>", open_tag("div", &attrs.join(" ")), inner)
    }
}

/// Stylesheet for every class the advanced renderer emits.
pub const ADVANCED_IMG_CSS: &str = r#"
.lx-img {
    --width: auto;
    --height: auto;
    --focal-x: 50%;
    --focal-y: 50%;
    position: relative;
    display: inline-block;
}

.lx-img img {
    max-width: 100%;
    height: auto;
}

.lx-img.lx-img--full-width,
.lx-img.lx-img--full-width img {
    width: 100%;
}

.lx-img.lx-img--full-height,
.lx-img.lx-img--full-height img {
    height: 100%;
}

.lx-img.lx-img--constrained {
    width: var(--width, auto);
    height: var(--height, auto);
}

.lx-img.lx-img--constrained img {
    width: 100%;
    height: 100%;
}

.lx-img.lx-img--cover img {
    object-fit: cover;
}

.lx-img.lx-img--contain img {
    object-fit: contain;
}

.lx-img.lx-img--has-focal img {
    object-position: var(--focal-x, 50%) var(--focal-y, 50%);
}

.lx-img.lx-img--block {
    display: block;
}

.lx-img.lx-img--inline-block {
    display: inline-block;
}

.lx-img picture {
    display: block;
    width: 100%;
    height: 100%;
}

.lx-img source {
    width: 100%;
    height: 100%;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn group(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_descriptor_variants() {
        assert_eq!(ImageDescriptor::from_value(&json!(123)), Some(ImageDescriptor::Id(123)));
        assert_eq!(ImageDescriptor::from_value(&json!("123")), Some(ImageDescriptor::Id(123)));
        assert_eq!(
            ImageDescriptor::from_value(&json!("https://x/a.jpg")),
            Some(ImageDescriptor::Url("https://x/a.jpg".into()))
        );
        assert_eq!(
            ImageDescriptor::from_value(&json!({"id": 1, "url": "/a.jpg", "alt": "A"})),
            Some(ImageDescriptor::Record { url: "/a.jpg".into(), alt: Some(json!("A")) })
        );
        assert_eq!(ImageDescriptor::from_value(&json!(12.0)), Some(ImageDescriptor::Id(12)));
        assert_eq!(ImageDescriptor::from_value(&json!("12.0")), Some(ImageDescriptor::Id(12)));
        assert_eq!(ImageDescriptor::from_value(&json!({"alt": "no url"})), None);
        assert_eq!(ImageDescriptor::from_value(&json!(0)), None);
        assert_eq!(ImageDescriptor::from_value(&json!(["a"])), None);
    }

    #[test]
    fn test_sizing_classes() {
        assert_eq!(Sizing::from_value(Some(&json!("width-full-height-full"))).class(), "lx-img--full-width lx-img--full-height");
        assert_eq!(Sizing::from_value(Some(&json!("width-full-height-auto"))).class(), "lx-img--full-width");
        assert_eq!(Sizing::from_value(Some(&json!("width-auto-height-full"))).class(), "lx-img--full-height");
        assert_eq!(Sizing::from_value(Some(&json!("width-auto-height-auto"))), Sizing::Natural);
        assert_eq!(Sizing::from_value(Some(&json!(7))), Sizing::Natural);
        assert_eq!(Sizing::from_value(None).class(), "");
    }

    #[test]
    fn test_focal_defaults_and_suffix() {
        let config = AdvancedImageConfig::from_map(&group(json!({})));
        assert_eq!(config.container_styles(), "--focal-x: 50%; --focal-y: 50%");
        assert!(!config.container_classes().contains("has-focal"));

        let config = AdvancedImageConfig::from_map(&group(json!({"focal_x": 30, "focal_y": "center"})));
        assert_eq!(config.container_styles(), "--focal-x: 30%; --focal-y: center");
        assert!(config.container_classes().contains("lx-img--has-focal"));
    }

    #[test]
    fn test_has_focal_follows_key_presence() {
        let config = AdvancedImageConfig::from_map(&group(json!({"focal_x": 0})));
        assert!(config.has_focal());
        assert_eq!(config.container_styles(), "--focal-x: 0%; --focal-y: 50%");

        let config = AdvancedImageConfig::from_map(&group(json!({"focal_x": null})));
        assert!(!config.has_focal());
    }

    #[test]
    fn test_container_classes_order() {
        let config = AdvancedImageConfig::from_map(&group(json!({
            "sizing": "width-full-height-full",
            "custom_height": "300px",
            "object_fit": "contain",
            "display": "inline-block"
        })));
        assert_eq!(
            config.container_classes(),
            "lx-img lx-img--full-width lx-img--full-height lx-img--constrained lx-img--contain lx-img--inline-block"
        );
        assert_eq!(config.container_styles(), "--height: 300px; --focal-x: 50%; --focal-y: 50%");
    }

    #[test]
    fn test_media_prefix_stripped() {
        let source = PictureSource { img_id: Some(1), media_query: "@media (min-width: 768px)".into() };
        assert_eq!(source.media(), "(min-width: 768px)");
        let source = PictureSource { img_id: Some(1), media_query: "(max-width: 10px)".into() };
        assert_eq!(source.media(), "(max-width: 10px)");
    }

    #[test]
    fn test_sources_skip_falsy_ids() {
        let config = ResponsiveImageConfig::from_map(&group(json!({
            "base_img": "/a.jpg",
            "sources": [{"img_id": 0, "media_query": "x"}, {"img_id": "12"}, "junk"]
        })));
        assert_eq!(config.sources[0].img_id, None);
        assert_eq!(config.sources[1].img_id, Some(12));
        assert_eq!(config.sources[2].img_id, None);
    }
}
