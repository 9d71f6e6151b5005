//! LX Template Core - Template Helpers
//!
//! Wraps a nested data bag and renders template fragments from it:
//! escaped values, class lists, inline styles, attribute strings,
//! optional anchors, and `<img>`/`<picture>` markup.
//!
//! # Ground Rules
//! 1. Lookups never fail; absent values render as ""
//! 2. Escaping is injected, never inlined
//! 3. Image data comes from the media host
//! 4. Only top-level keys are writable

pub mod data;
pub mod escape;
pub mod markup;
pub mod media;
pub mod image;
pub mod ids;
pub mod config;
pub mod helper;

pub use data::{DataBag, HelperError};
pub use escape::{EscapeContext, Escaper, StandardEscaper};
pub use markup::{attributes_string, class_list, style_string, with_line_breaks, Attrs, Element};
pub use media::{Attachment, ImageMetadata, ImageSrc, LibraryError, MediaHost, MediaLibrary, NoMedia};
pub use image::{AdvancedImageConfig, ImageDescriptor, ImageRenderer, ResponsiveImageConfig, Sizing, ADVANCED_IMG_CSS};
pub use ids::IdPrefix;
pub use config::{ConfigError, RenderOptions};
pub use helper::TemplateHelper;
