//! Content model and image normalization for article layout.
//!
//! `article-flow` turns the loosely typed JSON a headless content store
//! delivers (rich-text blocks plus a separate image list) into a closed,
//! strongly typed model:
//!
//! - [`document`]: [`ContentBlock`] and inline [`TextRun`] parsing
//! - [`image`]: raw image records normalized into [`ImageDescriptor`]s
//! - [`diagnostic`]: non-fatal degradations reported while normalizing
//!
//! Interleaving blocks and images into layout directives lives in the
//! `article-flow-render` crate.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]
#![forbid(unsafe_code)]

pub mod diagnostic;
pub mod document;
pub mod error;
pub mod image;

pub use diagnostic::{log_diagnostic, DiagnosticSink, LayoutDiagnostic, LogDiagnostics};
pub use document::{
    parse_document, parse_document_str, parse_document_with, BlockKind, ContentBlock, ListFormat,
    TextRun,
};
pub use error::LayoutError;
pub use image::{
    normalize_images, normalize_images_str, normalize_images_with, normalize_records,
    resolve_source_url, FloatSide, ImageDescriptor, ImagePosition, ImageWidth, NormalizeOptions,
    RawImageRecord, WidthScale,
};
