//! Media Host - Attachment Lookup and Responsive Attributes
//!
//! Image URLs, dimensions and srcset/sizes calculation belong to the host
//! platform. The renderer only talks to `MediaHost`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::escape::{Escaper, StandardEscaper};
use crate::markup::{attributes_string, Attrs};

/// Widest candidate included in a generated srcset.
pub const MAX_SRCSET_WIDTH: u32 = 2048;

const RATIO_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to read media library: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid media library: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolved image URL and its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSrc {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub file: String,
    #[serde(default)]
    pub sizes: Vec<ImageSize>,
}

pub trait MediaHost: Send + Sync {
    /// Complete `<img>` markup for an attachment, `""` if unknown.
    fn render_attachment(&self, id: u64, size: &str, attrs: &Attrs) -> String;

    fn image_src(&self, id: u64, size: &str) -> Option<ImageSrc>;

    fn metadata(&self, id: u64) -> Option<ImageMetadata>;

    fn sizes_attr(&self, dims: [u32; 2], src: &str, meta: Option<&ImageMetadata>, id: u64) -> String;

    fn srcset_attr(&self, dims: [u32; 2], src: &str, meta: Option<&ImageMetadata>, id: u64) -> String;

    fn width_height_attrs(&self, width: u32, height: u32) -> String {
        let mut out = Vec::new();
        if width > 0 {
            out.push(format!("width=\"{}\"", width));
        }
        if height > 0 {
            out.push(format!("height=\"{}\"", height));
        }
        out.join(" ")
    }
}

/// Host without any attachments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaHost for NoMedia {
    fn render_attachment(&self, _id: u64, _size: &str, _attrs: &Attrs) -> String {
        String::new()
    }

    fn image_src(&self, _id: u64, _size: &str) -> Option<ImageSrc> {
        None
    }

    fn metadata(&self, _id: u64) -> Option<ImageMetadata> {
        None
    }

    fn sizes_attr(&self, _dims: [u32; 2], _src: &str, _meta: Option<&ImageMetadata>, _id: u64) -> String {
        String::new()
    }

    fn srcset_attr(&self, _dims: [u32; 2], _src: &str, _meta: Option<&ImageMetadata>, _id: u64) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub sizes: Vec<ImageSize>,
}

impl Attachment {
    fn full(&self) -> ImageSrc {
        ImageSrc { src: self.url.clone(), width: self.width, height: self.height }
    }

    fn sized(&self, size: &str) -> ImageSrc {
        self.sizes
            .iter()
            .find(|s| s.name == size)
            .map(|s| ImageSrc { src: s.url.clone(), width: s.width, height: s.height })
            .unwrap_or_else(|| self.full())
    }
}

/// JSON-described attachments acting as the host media library.
pub struct MediaLibrary {
    attachments: BTreeMap<u64, Attachment>,
    escaper: StandardEscaper,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self { attachments: BTreeMap::new(), escaper: StandardEscaper }
    }

    /// Parse a JSON array of attachments.
    pub fn from_json(content: &str) -> Result<Self, LibraryError> {
        let attachments: Vec<Attachment> = serde_json::from_str(content)?;
        let mut library = Self::new();
        for attachment in attachments {
            library.register(attachment);
        }
        Ok(library)
    }

    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let content = fs::read_to_string(path)?;
        let library = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), count = library.attachments.len(), "media library loaded");
        Ok(library)
    }

    pub fn get(&self, id: u64) -> Option<&Attachment> {
        self.attachments.get(&id)
    }

    pub fn list(&self) -> Vec<&Attachment> {
        self.attachments.values().collect()
    }

    pub fn register(&mut self, attachment: Attachment) {
        self.attachments.insert(attachment.id, attachment);
    }
}

impl Default for MediaLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaHost for MediaLibrary {
    fn render_attachment(&self, id: u64, size: &str, attrs: &Attrs) -> String {
        let Some(attachment) = self.get(id) else {
            tracing::debug!(id, "attachment not found");
            return String::new();
        };

        let image = attachment.sized(size);
        let meta = self.metadata(id);
        let dims = [image.width, image.height];

        let mut merged = Map::new();
        if image.width > 0 {
            merged.insert("width".into(), Value::from(image.width));
        }
        if image.height > 0 {
            merged.insert("height".into(), Value::from(image.height));
        }
        merged.insert("src".into(), Value::String(image.src.clone()));
        merged.insert("class".into(), Value::String(format!("attachment-{size} size-{size}")));
        merged.insert("alt".into(), Value::String(attachment.alt.clone()));

        let srcset = self.srcset_attr(dims, &image.src, meta.as_ref(), id);
        if !srcset.is_empty() {
            merged.insert("srcset".into(), Value::String(srcset));
            merged.insert("sizes".into(), Value::String(self.sizes_attr(dims, &image.src, meta.as_ref(), id)));
        }

        let mut raw = String::new();
        match attrs {
            Attrs::Map(extra) => {
                for (name, value) in extra {
                    merged.insert(name.clone(), value.clone());
                }
            }
            Attrs::Raw(text) => raw = text.clone(),
        }

        let attributes: Vec<_> = [attributes_string(&self.escaper, &merged), raw]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();

        format!("<img {}>", attributes.join(" "))
    }

    fn image_src(&self, id: u64, size: &str) -> Option<ImageSrc> {
        self.get(id).map(|a| a.sized(size))
    }

    fn metadata(&self, id: u64) -> Option<ImageMetadata> {
        self.get(id).map(|a| ImageMetadata {
            width: a.width,
            height: a.height,
            file: a.url.clone(),
            sizes: a.sizes.clone(),
        })
    }

    fn sizes_attr(&self, dims: [u32; 2], _src: &str, _meta: Option<&ImageMetadata>, _id: u64) -> String {
        let width = dims[0];
        if width == 0 {
            return String::new();
        }
        format!("(max-width: {width}px) 100vw, {width}px")
    }

    fn srcset_attr(&self, dims: [u32; 2], src: &str, meta: Option<&ImageMetadata>, _id: u64) -> String {
        let Some(meta) = meta else {
            return String::new();
        };
        if dims[0] == 0 || dims[1] == 0 {
            return String::new();
        }
        let ratio = dims[0] as f64 / dims[1] as f64;

        let mut candidates = vec![(src.to_string(), dims[0])];
        let full = (meta.file.clone(), meta.width);
        let others = std::iter::once(full).chain(meta.sizes.iter().filter(|s| s.height > 0).filter_map(|s| {
            let same_ratio = (s.width as f64 / s.height as f64 - ratio).abs() <= RATIO_TOLERANCE;
            same_ratio.then(|| (s.url.clone(), s.width))
        }));

        for (url, width) in others {
            if width <= MAX_SRCSET_WIDTH && !candidates.iter().any(|(u, w)| *u == url || *w == width) {
                candidates.push((url, width));
            }
        }

        if candidates.len() < 2 {
            return String::new();
        }

        candidates
            .iter()
            .map(|(url, width)| format!("{} {}w", self.escaper.url(url), width))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
