//! Image Rendering Tests
//!
//! Plain, responsive and advanced images against a fixed media host.

use serde_json::{json, Value};

use lxtemplate_core::{
    Attachment, Attrs, IdPrefix, ImageMetadata, ImageSrc, MediaHost, MediaLibrary, TemplateHelper,
};

/// Every id resolves to an 800x600 image; id 404 is missing.
struct FixedHost;

impl MediaHost for FixedHost {
    fn render_attachment(&self, id: u64, size: &str, _attrs: &Attrs) -> String {
        format!(r#"<img src="attachment-{id}.jpg" class="attachment-{size}">"#)
    }

    fn image_src(&self, id: u64, _size: &str) -> Option<ImageSrc> {
        (id != 404).then(|| ImageSrc { src: format!("attachment-{id}.jpg"), width: 800, height: 600 })
    }

    fn metadata(&self, id: u64) -> Option<ImageMetadata> {
        Some(ImageMetadata { width: 800, height: 600, file: format!("image-{id}.jpg"), sizes: vec![] })
    }

    fn sizes_attr(&self, _dims: [u32; 2], _src: &str, _meta: Option<&ImageMetadata>, _id: u64) -> String {
        "(max-width: 800px) 100vw, 800px".to_string()
    }

    fn srcset_attr(&self, _dims: [u32; 2], _src: &str, _meta: Option<&ImageMetadata>, _id: u64) -> String {
        "image-800.jpg 800w, image-400.jpg 400w".to_string()
    }
}

fn advanced_fixture() -> Value {
    json!({
        "advanced_image": {
            "base_img": {"url": "https://example.com/image.jpg", "alt": "Base image"},
            "sources": [
                {"img_id": 123, "media_query": "(min-width: 768px)"},
                {"img_id": 456, "media_query": "@media (min-width: 1024px)"}
            ],
            "sizing": "width-full-height-auto",
            "custom_width": "800px",
            "custom_height": "600px",
            "object_fit": "cover",
            "display": "block"
        }
    })
}

fn helper(data: Value) -> TemplateHelper {
    TemplateHelper::from_value(data).unwrap().with_media(FixedHost)
}

#[test]
fn img_from_id_delegates_to_host() {
    let t = helper(json!({"img": 123, "img_str": "77"}));
    assert_eq!(t.img("img"), r#"<img src="attachment-123.jpg" class="attachment-full">"#);
    assert_eq!(
        t.img_sized("img_str", "medium", &Attrs::default()),
        r#"<img src="attachment-77.jpg" class="attachment-medium">"#
    );
}

#[test]
fn img_from_record_and_url() {
    let t = helper(json!({
        "record": {"id": 123, "url": "https://picsum.photos/300/300.jpg", "alt": "lorem"},
        "url": "https://picsum.photos/300/300.jpg",
        "no_alt": {"url": "/a.jpg"}
    }));

    assert_eq!(t.img("record"), r#"<img src="https://picsum.photos/300/300.jpg" alt="lorem">"#);
    assert_eq!(t.img("url"), r#"<img src="https://picsum.photos/300/300.jpg" alt="">"#);

    let attrs = Attrs::Map(serde_json::from_value(json!({"alt": "Fallback", "class": "thumb"})).unwrap());
    assert_eq!(t.img_sized("no_alt", "full", &attrs), r#"<img src="/a.jpg" alt="Fallback" class="thumb">"#);
    assert_eq!(t.img_sized("record", "full", &attrs), r#"<img src="https://picsum.photos/300/300.jpg" alt="lorem" class="thumb">"#);
}

#[test]
fn img_absent_or_invalid_is_empty() {
    let t = helper(json!({"zero": 0, "list": ["a"], "flag": true, "no_url": {"alt": "x"}}));
    for key in ["missing", "zero", "list", "flag", "no_url"] {
        assert_eq!(t.img(key), "", "{key}");
    }
}

#[test]
fn responsive_img_renders_sources_then_base() {
    let t = helper(advanced_fixture());
    let output = t.responsive_img("advanced_image");

    assert!(output.starts_with("<picture>"));
    assert!(output.ends_with("</picture>"));
    assert!(output.contains(
        r#"<source media="(min-width: 768px)" srcset="image-800.jpg 800w, image-400.jpg 400w" sizes="(max-width: 800px) 100vw, 800px" width="800" height="600">"#
    ));
    assert!(output.contains(r#"<source media="(min-width: 1024px)""#));
    assert!(output.contains(r#"<img src="https://example.com/image.jpg" alt="Base image">"#));

    let first_source = output.find("<source").unwrap();
    let base = output.find("<img").unwrap();
    assert!(first_source < base);
}

#[test]
fn responsive_img_skips_failed_sources() {
    let t = helper(json!({
        "pic": {
            "base_img": "/base.jpg",
            "sources": [{"img_id": 404, "media_query": "a"}, {"img_id": 0, "media_query": "b"}, {"img_id": 5, "media_query": "c"}]
        }
    }));

    let output = t.responsive_img("pic");
    assert_eq!(output.matches("<source").count(), 1);
    assert!(output.contains(r#"media="c""#));
}

#[test]
fn responsive_img_falls_back_to_plain_img() {
    let t = helper(json!({"foo": "http://x/y.jpg", "bar": {"url": "/b.jpg"}}));
    assert_eq!(t.responsive_img("foo"), t.img("foo"));
    assert_eq!(t.responsive_img("foo"), r#"<img src="http://x/y.jpg" alt="">"#);
    assert_eq!(t.responsive_img("bar"), t.img("bar"));
    assert_eq!(t.responsive_img("missing"), "");
}

#[test]
fn advanced_img_wraps_picture_in_container() {
    let t = helper(advanced_fixture());
    let output = t.advanced_img("advanced_image");

    assert!(output.starts_with(
        r#"<div class="lx-img lx-img--full-width lx-img--constrained lx-img--cover lx-img--block" style="--width: 800px; --height: 600px; --focal-x: 50%; --focal-y: 50%">"#
    ));
    assert!(output.contains("<picture>"));
    assert!(output.contains(r#"<source media="(min-width: 768px)""#));
    assert!(output.contains(r#"src="https://example.com/image.jpg""#));
    assert!(output.contains(r#"alt="Base image""#));
    assert!(!output.contains("has-focal"));
    assert!(output.ends_with("</picture></div>"));
}

#[test]
fn advanced_img_end_to_end() {
    let t = helper(json!({
        "hero": {
            "sizing": "width-full-height-full",
            "custom_width": "500px",
            "object_fit": "cover",
            "display": "block",
            "base_img": {"url": "http://x/i.jpg", "alt": "A"},
            "sources": []
        }
    }));
    let output = t.advanced_img("hero");

    for class in ["lx-img", "lx-img--full-width", "lx-img--full-height", "lx-img--cover", "lx-img--block", "lx-img--constrained"] {
        assert!(output.contains(class), "missing {class}");
    }
    assert!(output.contains("--width: 500px"));
    assert!(!output.contains("--height"));

    let div = output.find("<div").unwrap();
    let picture = output.find("<picture>").unwrap();
    let img = output.find(r#"<img src="http://x/i.jpg" alt="A">"#).unwrap();
    let picture_end = output.find("</picture>").unwrap();
    let div_end = output.find("</div>").unwrap();
    assert!(div < picture && picture < img && img < picture_end && picture_end < div_end);
}

#[test]
fn advanced_img_focal_point() {
    let t = helper(json!({
        "numeric": {"focal_x": 30, "base_img": "/a.jpg"},
        "text": {"focal_y": "top", "base_img": "/a.jpg"}
    }));

    let numeric = t.advanced_img("numeric");
    assert!(numeric.contains("--focal-x: 30%; --focal-y: 50%"));
    assert!(numeric.contains("lx-img--has-focal"));

    let text = t.advanced_img("text");
    assert!(text.contains("--focal-x: 50%; --focal-y: top"));
    assert!(text.contains("lx-img--has-focal"));
}

#[test]
fn advanced_img_container_id_uses_prefix() {
    let t = helper(json!({"pic": {"id": "gallery", "base_img": "/a.jpg"}})).with_id_prefix(IdPrefix::from_seed("abc"));
    assert!(t.advanced_img("pic").starts_with(r#"<div id="ba781-gallery" class="lx-img""#));
}

#[test]
fn advanced_img_absent_or_scalar_is_empty() {
    let t = helper(json!({"empty": {}, "scalar": "http://x/y.jpg"}));
    assert_eq!(t.advanced_img("missing"), "");
    assert_eq!(t.advanced_img("empty"), "");
    assert_eq!(t.advanced_img("scalar"), "");
}

#[test]
fn echo_image_variants() {
    let mut t = helper(json!({"img": "/a.jpg", "pic": {"base_img": "/b.jpg"}}));
    t.echo_img("img");
    t.echo_responsive_img("pic");
    t.echo_advanced_img("pic");
    let output = t.take_output();
    assert!(output.starts_with(r#"<img src="/a.jpg" alt="">"#));
    assert_eq!(output.matches("<picture>").count(), 2);
}

#[test]
fn media_library_backs_picture_sources() {
    let mut library = MediaLibrary::new();
    library.register(Attachment {
        id: 9,
        url: "https://cdn.test/wide.jpg".into(),
        width: 1200,
        height: 600,
        alt: "Wide".into(),
        sizes: vec![],
    });

    let t = TemplateHelper::from_value(json!({
        "pic": {"base_img": 9, "sources": [{"img_id": 9, "media_query": "@media (min-width: 900px)"}]}
    }))
    .unwrap()
    .with_media(library);

    let output = t.responsive_img("pic");
    assert!(output.contains(r#"<source media="(min-width: 900px)" srcset="" sizes="(max-width: 1200px) 100vw, 1200px" width="1200" height="600">"#));
    assert!(output.contains(r#"<img width="1200" height="600" src="https://cdn.test/wide.jpg" class="attachment-full size-full" alt="Wide">"#));
}
