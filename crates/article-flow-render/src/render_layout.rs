use article_flow::{
    ContentBlock, DiagnosticSink, FloatSide, ImageDescriptor, ImagePosition, LayoutDiagnostic,
    LayoutError, LogDiagnostics,
};
use smallvec::SmallVec;

use crate::render_ir::{DirectiveEmitter, LayoutDirective};

/// Which paragraphs open an insertion opportunity.
///
/// An opportunity sits immediately before paragraph `n` (1-based, counting
/// paragraph blocks only) when `n == first`, or `n > first` and
/// `(n - first)` is a multiple of `interval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InsertionCadence {
    first: usize,
    interval: usize,
}

impl InsertionCadence {
    /// Before paragraphs 2, 4, 6, ...
    pub const EVERY_OTHER_FROM_SECOND: Self = Self {
        first: 2,
        interval: 2,
    };

    pub fn new(first: usize, interval: usize) -> Result<Self, LayoutError> {
        if first == 0 {
            return Err(LayoutError::invalid_config(
                "cadence.first",
                "paragraph numbers start at 1",
            ));
        }
        if interval == 0 {
            return Err(LayoutError::invalid_config(
                "cadence.interval",
                "interval must be at least 1",
            ));
        }
        Ok(Self { first, interval })
    }

    pub fn first(self) -> usize {
        self.first
    }

    pub fn interval(self) -> usize {
        self.interval
    }

    /// Whether an opportunity precedes the `paragraph_number`-th paragraph.
    pub fn is_opportunity(self, paragraph_number: usize) -> bool {
        paragraph_number >= self.first && (paragraph_number - self.first) % self.interval == 0
    }
}

impl Default for InsertionCadence {
    fn default() -> Self {
        Self::EVERY_OTHER_FROM_SECOND
    }
}

/// Layout configuration for one interleaving pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Paragraph cadence for image insertion.
    pub cadence: InsertionCadence,
    /// Append a final `ClearFloat` after the last directive.
    pub trailing_clear: bool,
}

impl LayoutConfig {
    pub fn with_cadence(mut self, cadence: InsertionCadence) -> Self {
        self.cadence = cadence;
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cadence: InsertionCadence::default(),
            trailing_clear: true,
        }
    }
}

/// Mutable state of one pass. Created per pass and never shared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Paragraph blocks seen so far, including the one being scanned.
    pub paragraph_count: usize,
    /// Next image to place; only ever increases.
    pub next_image_index: usize,
    /// Side of the most recent unpaired float that has not been cleared.
    pub last_float_side: FloatSide,
    /// An image pair was emitted since the last clear.
    pub pair_open: bool,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether content could still be overlapped by an earlier image.
    pub fn has_pending_float(&self) -> bool {
        self.last_float_side != FloatSide::None || self.pair_open
    }

    fn cleared(&mut self) {
        self.last_float_side = FloatSide::None;
        self.pair_open = false;
    }
}

/// Outcome of one resolver call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement<'a> {
    /// Images consumed: 2 for a pair, otherwise 1 (0 only past the end).
    pub consumed: usize,
    /// Directives to emit, in order.
    pub directives: SmallVec<[LayoutDirective<'a>; 2]>,
}

/// Decide how to place `images[index]`, looking at most one image ahead.
///
/// Used for both paragraph-aligned opportunities and the end-of-document
/// flush. Never fails; impossible pair requests degrade to single placement
/// and leave the following image for its own opportunity.
pub fn resolve_placement<'a>(
    images: &'a [ImageDescriptor],
    index: usize,
    state: &mut ScanState,
    sink: &mut dyn DiagnosticSink,
) -> Placement<'a> {
    let mut directives = SmallVec::new();
    let Some(current) = images.get(index) else {
        return Placement {
            consumed: 0,
            directives,
        };
    };

    if current.pair_with_next {
        match images.get(index + 1) {
            Some(next) if current.position.is_horizontal_opposite(next.position) => {
                let (left, right) = if current.position == ImagePosition::Left {
                    (current, next)
                } else {
                    (next, current)
                };
                directives.push(LayoutDirective::ClearFloat);
                directives.push(LayoutDirective::RenderImagePair { left, right });
                state.last_float_side = FloatSide::None;
                state.pair_open = true;
                return Placement {
                    consumed: 2,
                    directives,
                };
            }
            Some(_) => sink.report(LayoutDiagnostic::PairingDowngraded {
                image_index: index,
                reason: "following image is not on the opposite side",
            }),
            None => sink.report(LayoutDiagnostic::PairingDowngraded {
                image_index: index,
                reason: "no following image",
            }),
        }
    }

    let side = current.position.float_side();
    // Block-level images never pass a pending float; same-side floats would stack.
    let needs_clear = side == FloatSide::None || side == state.last_float_side;
    if needs_clear {
        directives.push(LayoutDirective::ClearFloat);
        state.cleared();
    }
    directives.push(LayoutDirective::RenderImage {
        image: current,
        is_paired: false,
    });
    state.last_float_side = side;

    Placement {
        consumed: 1,
        directives,
    }
}

/// Deterministic interleaving engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutEngine {
    cfg: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(cfg: LayoutConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> LayoutConfig {
        self.cfg
    }

    /// Interleave `images` into `blocks`, logging diagnostics.
    pub fn layout<'a>(
        &self,
        blocks: &'a [ContentBlock],
        images: &'a [ImageDescriptor],
    ) -> Vec<LayoutDirective<'a>> {
        self.layout_with_sink(blocks, images, &mut LogDiagnostics)
    }

    /// Interleave `images` into `blocks`, reporting diagnostics to `sink`.
    pub fn layout_with_sink<'a>(
        &self,
        blocks: &'a [ContentBlock],
        images: &'a [ImageDescriptor],
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<LayoutDirective<'a>> {
        let mut session = self.start_session(images, blocks.len());
        for block in blocks {
            session.push_block(block, sink);
        }
        session.finish(sink)
    }

    /// Start an incremental pass over `images`; blocks are pushed one at a time.
    pub fn start_session<'a>(
        &self,
        images: &'a [ImageDescriptor],
        block_hint: usize,
    ) -> LayoutSession<'a> {
        // Worst case: a clear before every block and every image, plus the trailing clear.
        let capacity = block_hint * 2 + images.len() * 2 + 1;
        LayoutSession {
            cfg: self.cfg,
            images,
            st: ScanState::new(),
            emitter: DirectiveEmitter::with_capacity(capacity),
        }
    }
}

/// Incremental layout pass.
#[derive(Clone, Debug)]
pub struct LayoutSession<'a> {
    cfg: LayoutConfig,
    images: &'a [ImageDescriptor],
    st: ScanState,
    emitter: DirectiveEmitter<'a>,
}

impl<'a> LayoutSession<'a> {
    pub fn state(&self) -> &ScanState {
        &self.st
    }

    /// Directives emitted so far (without the flush phase or trailing clear).
    pub fn emitted(&self) -> &[LayoutDirective<'a>] {
        self.emitter.as_slice()
    }

    /// Scan one block.
    pub fn push_block(&mut self, block: &'a ContentBlock, sink: &mut dyn DiagnosticSink) {
        match block {
            ContentBlock::Paragraph { .. } => {
                self.st.paragraph_count += 1;
                if self.cfg.cadence.is_opportunity(self.st.paragraph_count) {
                    self.place_next(sink);
                }
            }
            ContentBlock::Heading { .. } => {
                // Pairing resolves at the opportunity, so no pair request is pending here.
                if self.st.has_pending_float() {
                    self.clear();
                }
            }
            ContentBlock::Quote { .. } => self.clear(),
            ContentBlock::List { .. } => {}
        }
        self.emitter.push(LayoutDirective::RenderBlock(block));
    }

    /// Flush unplaced images and close the pass.
    pub fn finish(mut self, sink: &mut dyn DiagnosticSink) -> Vec<LayoutDirective<'a>> {
        let first_image_index = self.st.next_image_index;
        while self.st.next_image_index < self.images.len() {
            self.place_next(sink);
        }
        let count = self.images.len().saturating_sub(first_image_index);
        if count > 0 {
            sink.report(LayoutDiagnostic::FlushPlaced {
                first_image_index,
                count,
            });
        }
        self.emitter.finish(self.cfg.trailing_clear)
    }

    fn place_next(&mut self, sink: &mut dyn DiagnosticSink) {
        if self.st.next_image_index >= self.images.len() {
            return;
        }
        let index = self.st.next_image_index;
        let placement = resolve_placement(self.images, index, &mut self.st, sink);
        self.st.next_image_index += placement.consumed.max(1);
        self.emitter.extend(placement.directives);
    }

    fn clear(&mut self) {
        self.emitter.push(LayoutDirective::ClearFloat);
        self.st.cleared();
    }
}

/// Interleave with the default configuration.
pub fn layout_document<'a>(
    blocks: &'a [ContentBlock],
    images: &'a [ImageDescriptor],
) -> Vec<LayoutDirective<'a>> {
    LayoutEngine::default().layout(blocks, images)
}

/// Interleave with an explicit configuration.
pub fn layout_document_with<'a>(
    blocks: &'a [ContentBlock],
    images: &'a [ImageDescriptor],
    cfg: &LayoutConfig,
) -> Vec<LayoutDirective<'a>> {
    LayoutEngine::new(*cfg).layout(blocks, images)
}
