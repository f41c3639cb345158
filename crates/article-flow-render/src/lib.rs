//! Layout directives, interleaving engine, and orchestration for `article-flow`.

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]
#![forbid(unsafe_code)]

mod render_engine;
mod render_ir;
mod render_layout;

pub use article_flow::{
    BlockKind, ContentBlock, FloatSide, ImageDescriptor, ImagePosition, ImageWidth,
    LayoutDiagnostic, LayoutError, WidthScale,
};
pub use render_engine::{PreparedArticle, RenderEngine, RenderEngineOptions};
pub use render_ir::{DirectiveEmitter, LayoutDirective, LayoutSummary};
pub use render_layout::{
    layout_document, layout_document_with, resolve_placement, InsertionCadence, LayoutConfig,
    LayoutEngine, LayoutSession, Placement, ScanState,
};
