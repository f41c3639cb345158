use article_flow::{BlockKind, ContentBlock, ImageDescriptor};
use serde::Serialize;

/// One layout instruction for the presentation layer.
///
/// Directives borrow the blocks and descriptors they reference; a directive
/// list never outlives the article it was computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "directive", content = "args", rename_all = "snake_case")]
pub enum LayoutDirective<'a> {
    /// Render one content block in flow.
    RenderBlock(&'a ContentBlock),
    /// Render one image at its declared position.
    RenderImage {
        image: &'a ImageDescriptor,
        is_paired: bool,
    },
    /// Render two images as equal-width columns.
    RenderImagePair {
        left: &'a ImageDescriptor,
        right: &'a ImageDescriptor,
    },
    /// Move following content below every pending float.
    ClearFloat,
}

impl<'a> LayoutDirective<'a> {
    pub fn is_clear(&self) -> bool {
        matches!(self, Self::ClearFloat)
    }

    /// Number of images this directive places (0, 1 or 2).
    pub fn image_count(&self) -> usize {
        match self {
            Self::RenderImage { .. } => 1,
            Self::RenderImagePair { .. } => 2,
            Self::RenderBlock(_) | Self::ClearFloat => 0,
        }
    }

    pub fn block(&self) -> Option<&'a ContentBlock> {
        match *self {
            Self::RenderBlock(block) => Some(block),
            _ => None,
        }
    }

    pub fn block_kind(&self) -> Option<BlockKind> {
        self.block().map(ContentBlock::kind)
    }

    /// Images placed by this directive, left slot first for pairs.
    pub fn images(&self) -> impl Iterator<Item = &'a ImageDescriptor> {
        let (first, second) = match *self {
            Self::RenderImage { image, .. } => (Some(image), None),
            Self::RenderImagePair { left, right } => (Some(left), Some(right)),
            Self::RenderBlock(_) | Self::ClearFloat => (None, None),
        };
        first.into_iter().chain(second)
    }
}

/// Ordered accumulator for directives.
///
/// Performs no decisions; it only records what the scanner and resolver
/// emit and closes the pass.
#[derive(Clone, Debug, Default)]
pub struct DirectiveEmitter<'a> {
    directives: Vec<LayoutDirective<'a>>,
}

impl<'a> DirectiveEmitter<'a> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            directives: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, directive: LayoutDirective<'a>) {
        self.directives.push(directive);
    }

    pub fn extend<I>(&mut self, directives: I)
    where
        I: IntoIterator<Item = LayoutDirective<'a>>,
    {
        self.directives.extend(directives);
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Directives emitted so far.
    pub fn as_slice(&self) -> &[LayoutDirective<'a>] {
        &self.directives
    }

    /// Close the pass. With `trailing_clear` a final [`LayoutDirective::ClearFloat`]
    /// is appended unconditionally so no float leaks into following page content.
    pub fn finish(mut self, trailing_clear: bool) -> Vec<LayoutDirective<'a>> {
        if trailing_clear {
            self.directives.push(LayoutDirective::ClearFloat);
        }
        self.directives
    }
}

/// Counts over a directive list, for previews and diagnostics output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LayoutSummary {
    /// `RenderBlock` directives.
    pub blocks: usize,
    /// Single `RenderImage` directives.
    pub single_images: usize,
    /// `RenderImagePair` directives.
    pub pairs: usize,
    /// `ClearFloat` directives.
    pub clears: usize,
    /// Images placed in total (singles + 2 per pair).
    pub images_placed: usize,
}

impl LayoutSummary {
    pub fn from_directives(directives: &[LayoutDirective<'_>]) -> Self {
        let mut summary = Self::default();
        for directive in directives {
            match directive {
                LayoutDirective::RenderBlock(_) => summary.blocks += 1,
                LayoutDirective::RenderImage { .. } => summary.single_images += 1,
                LayoutDirective::RenderImagePair { .. } => summary.pairs += 1,
                LayoutDirective::ClearFloat => summary.clears += 1,
            }
            summary.images_placed += directive.image_count();
        }
        summary
    }
}
