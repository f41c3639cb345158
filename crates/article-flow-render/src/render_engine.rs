use article_flow::{
    log_diagnostic, normalize_images_with, parse_document_with, ContentBlock, DiagnosticSink,
    ImageDescriptor, LayoutDiagnostic, LayoutError, NormalizeOptions, WidthScale,
};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::render_ir::{LayoutDirective, LayoutSummary};
use crate::render_layout::{LayoutConfig, LayoutEngine};

type DiagnosticCallback = Arc<Mutex<Box<dyn FnMut(LayoutDiagnostic) + Send + 'static>>>;

/// Render-engine options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderEngineOptions {
    /// Image normalization options (base URL, width vocabulary).
    pub normalize: NormalizeOptions,
    /// Interleaving options.
    pub layout: LayoutConfig,
}

impl RenderEngineOptions {
    /// Options for a content host at `base_url`.
    pub fn for_base_url(base_url: &str) -> Result<Self, LayoutError> {
        Ok(Self {
            normalize: NormalizeOptions::default().with_base_url(base_url)?,
            layout: LayoutConfig::default(),
        })
    }

    pub fn with_width_scale(mut self, width_scale: WidthScale) -> Self {
        self.normalize = self.normalize.with_width_scale(width_scale);
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}

/// A parsed document with its normalized images.
///
/// Owns the inputs so directive lists can borrow from it; lay it out again
/// (e.g. after a locale change) without re-parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreparedArticle {
    blocks: Vec<ContentBlock>,
    images: Vec<ImageDescriptor>,
}

impl PreparedArticle {
    pub fn new(blocks: Vec<ContentBlock>, images: Vec<ImageDescriptor>) -> Self {
        Self { blocks, images }
    }

    /// Parse and normalize JSON values against `base_url`, logging diagnostics.
    pub fn from_json(
        document: &Value,
        images: &Value,
        base_url: &str,
    ) -> Result<Self, LayoutError> {
        RenderEngine::new(RenderEngineOptions::for_base_url(base_url)?).prepare(document, images)
    }

    /// Parse and normalize JSON text against `base_url`, logging diagnostics.
    pub fn from_json_str(
        document: &str,
        images: &str,
        base_url: &str,
    ) -> Result<Self, LayoutError> {
        RenderEngine::new(RenderEngineOptions::for_base_url(base_url)?)
            .prepare_str(document, images)
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    /// Lay out with `cfg`, logging diagnostics.
    pub fn directives(&self, cfg: &LayoutConfig) -> Vec<LayoutDirective<'_>> {
        LayoutEngine::new(*cfg).layout(&self.blocks, &self.images)
    }
}

/// Parse, normalize and lay out articles with one set of options.
#[derive(Clone, Default)]
pub struct RenderEngine {
    opts: RenderEngineOptions,
    layout: LayoutEngine,
    diagnostic_sink: Option<DiagnosticCallback>,
}

impl fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEngine")
            .field("opts", &self.opts)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl RenderEngine {
    pub fn new(opts: RenderEngineOptions) -> Self {
        let layout = LayoutEngine::new(opts.layout);
        Self {
            opts,
            layout,
            diagnostic_sink: None,
        }
    }

    pub fn options(&self) -> &RenderEngineOptions {
        &self.opts
    }

    /// Register or replace the diagnostics sink.
    ///
    /// Diagnostics are always logged; the sink receives them in addition.
    pub fn set_diagnostic_sink<F>(&mut self, sink: F)
    where
        F: FnMut(LayoutDiagnostic) + Send + 'static,
    {
        self.diagnostic_sink = Some(Arc::new(Mutex::new(Box::new(sink))));
    }

    /// Parse the document and normalize the image list.
    pub fn prepare(
        &self,
        document: &Value,
        images: &Value,
    ) -> Result<PreparedArticle, LayoutError> {
        let mut sink = EngineDiagnostics {
            callback: self.diagnostic_sink.as_ref(),
        };
        let blocks = parse_document_with(document, &mut sink)?;
        let images = normalize_images_with(images, &self.opts.normalize, &mut sink)?;
        log::debug!(
            "prepared article: {} block(s), {} image(s)",
            blocks.len(),
            images.len()
        );
        Ok(PreparedArticle { blocks, images })
    }

    /// Parse JSON text, then [`prepare`](Self::prepare).
    pub fn prepare_str(
        &self,
        document: &str,
        images: &str,
    ) -> Result<PreparedArticle, LayoutError> {
        let document: Value = serde_json::from_str(document)
            .map_err(|err| LayoutError::invalid_input("document", err.to_string()))?;
        let images: Value = serde_json::from_str(images)
            .map_err(|err| LayoutError::invalid_input("images", err.to_string()))?;
        self.prepare(&document, &images)
    }

    /// Interleave a prepared article.
    pub fn layout<'a>(&self, article: &'a PreparedArticle) -> Vec<LayoutDirective<'a>> {
        let mut sink = EngineDiagnostics {
            callback: self.diagnostic_sink.as_ref(),
        };
        let directives = self
            .layout
            .layout_with_sink(&article.blocks, &article.images, &mut sink);
        let summary = LayoutSummary::from_directives(&directives);
        log::debug!(
            "laid out article: {} directive(s), {} image(s) placed, {} pair(s), {} clear(s)",
            directives.len(),
            summary.images_placed,
            summary.pairs,
            summary.clears
        );
        directives
    }
}

struct EngineDiagnostics<'s> {
    callback: Option<&'s DiagnosticCallback>,
}

impl DiagnosticSink for EngineDiagnostics<'_> {
    fn report(&mut self, diagnostic: LayoutDiagnostic) {
        log_diagnostic(&diagnostic);
        let Some(callback) = self.callback else {
            return;
        };
        if let Ok(mut callback) = callback.lock() {
            callback(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> Value {
        json!([
            {"type": "paragraph", "children": [{"type": "text", "text": "The company formed up."}]},
            {"type": "paragraph", "children": [{"type": "text", "text": "Pikes were ported."}]},
            {"type": "embed", "children": []}
        ])
    }

    #[test]
    fn prepare_resolves_and_filters() {
        let engine = RenderEngine::new(
            RenderEngineOptions::for_base_url("https://cms.example.org").expect("valid base"),
        );
        let article = engine
            .prepare(
                &sample_document(),
                &json!([
                    {"image": {"url": "/uploads/line.jpg"}, "position": "right"},
                    {"image": {"url": ""}}
                ]),
            )
            .expect("prepare");
        assert_eq!(article.blocks().len(), 2);
        assert_eq!(article.images().len(), 1);
        assert_eq!(
            article.images()[0].source_url,
            "https://cms.example.org/uploads/line.jpg"
        );
    }

    #[test]
    fn sink_receives_every_diagnostic() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut engine = RenderEngine::default();
        let sink_seen = Arc::clone(&seen);
        engine.set_diagnostic_sink(move |d| {
            if let Ok(mut seen) = sink_seen.lock() {
                seen.push(d);
            }
        });

        let article = engine
            .prepare(
                &sample_document(),
                &json!([
                    {"alt": "lost"},
                    {"image": "https://a.example/1.jpg", "pairWithNext": true}
                ]),
            )
            .expect("prepare");
        let directives = engine.layout(&article);
        assert_eq!(directives.len(), 4);

        let seen = seen.lock().expect("lock diagnostics");
        assert_eq!(
            *seen,
            vec![
                LayoutDiagnostic::BlockSkipped {
                    block_index: 2,
                    kind: "embed".into()
                },
                LayoutDiagnostic::ImageDropped {
                    record_index: 0,
                    reason: "missing url"
                },
                LayoutDiagnostic::PairingDowngraded {
                    image_index: 0,
                    reason: "no following image"
                },
            ]
        );
    }

    #[test]
    fn from_json_str_rejects_non_array_images() {
        let err = PreparedArticle::from_json_str("[]", r#"{"image": {}}"#, "").unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidInput {
                input: "images",
                reason: "expected array, got object".into()
            }
        );
        let err = PreparedArticle::from_json_str("[", "[]", "").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn prepared_article_can_be_laid_out_repeatedly() {
        let article = PreparedArticle::from_json(
            &sample_document(),
            &json!([{"image": "/a.jpg"}]),
            "https://cms.example.org/",
        )
        .expect("prepare");
        let cfg = LayoutConfig::default();
        assert_eq!(article.directives(&cfg), article.directives(&cfg));
    }
}
