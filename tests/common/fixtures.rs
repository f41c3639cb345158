use article_flow::{ContentBlock, ImageDescriptor, ImagePosition};
use serde_json::Value;

pub const ARTICLE_FIXTURE: &str = "tests/fixtures/article.json";
pub const IMAGES_FIXTURE: &str = "tests/fixtures/images.json";
pub const FIXTURE_BASE_URL: &str = "https://cms.example.org";

pub fn read_fixture(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {}", path, e))
}

pub fn load_json(path: &str) -> Value {
    serde_json::from_str(&read_fixture(path)).unwrap_or_else(|e| panic!("parse {}: {}", path, e))
}

/// Small deterministic generator so synthetic articles stay reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed ^ 0x9E37_79B9_7F4A_7C15)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) as u32
    }

    pub fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }
}

/// Mixed block sequence: mostly paragraphs, with headings, lists and quotes.
pub fn synthetic_blocks(rng: &mut Lcg, len: usize) -> Vec<ContentBlock> {
    (0..len)
        .map(|idx| match rng.below(10) {
            0 => ContentBlock::heading(2, format!("Section {}", idx)),
            1 => ContentBlock::list(article_flow::ListFormat::Unordered, ["a", "b"]),
            2 => ContentBlock::quote(format!("Quote {}", idx)),
            _ => ContentBlock::paragraph(format!("Paragraph {}", idx)),
        })
        .collect()
}

/// Images with random positions; roughly one in three requests pairing.
pub fn synthetic_images(rng: &mut Lcg, len: usize) -> Vec<ImageDescriptor> {
    (0..len)
        .map(|idx| {
            let position = match rng.below(4) {
                0 => ImagePosition::Left,
                1 => ImagePosition::Right,
                2 => ImagePosition::Center,
                _ => ImagePosition::Full,
            };
            ImageDescriptor::new(format!("https://cms.example.org/{}.jpg", idx), position)
                .with_pair_with_next(rng.below(3) == 0)
        })
        .collect()
}

pub fn paragraphs(count: usize) -> Vec<ContentBlock> {
    (1..=count)
        .map(|n| ContentBlock::paragraph(format!("P{}", n)))
        .collect()
}
