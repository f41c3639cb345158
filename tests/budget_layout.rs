mod common;

use article_flow::LayoutDiagnostic;
use article_flow_render::{LayoutEngine, PreparedArticle};
use common::budget_alloc::BudgetAlloc;
use common::fixtures::{
    read_fixture, synthetic_blocks, synthetic_images, Lcg, ARTICLE_FIXTURE, FIXTURE_BASE_URL,
    IMAGES_FIXTURE,
};

const LONG_ARTICLE_BLOCKS: usize = 2_000;
const LONG_ARTICLE_IMAGES: usize = 400;
// The directive vector is sized once up front for the worst case (about 113KiB
// here) and a pass allocates nothing per block.
const LAYOUT_PASS_BUDGET_BYTES: usize = 160 * 1024;
const LAYOUT_PASS_MAX_ALLOCS: usize = 8;
// Fixture prep peaks well below this; it is a guardrail for the JSON boundary.
const FIXTURE_PREPARE_BUDGET_BYTES: usize = 256 * 1024;

#[global_allocator]
static ALLOC: BudgetAlloc = BudgetAlloc::new();

// Single test per binary so no concurrent test thread skews the counters.
#[test]
fn layout_and_prepare_stay_under_budget() {
    let mut rng = Lcg::new(7);
    let blocks = synthetic_blocks(&mut rng, LONG_ARTICLE_BLOCKS);
    let images = synthetic_images(&mut rng, LONG_ARTICLE_IMAGES);
    let engine = LayoutEngine::default();

    let (out, usage) = ALLOC.measure(|| {
        engine.layout_with_sink(&blocks, &images, &mut |_: LayoutDiagnostic| {})
    });
    assert!(out.len() > LONG_ARTICLE_BLOCKS);
    assert!(
        usage.peak_bytes <= LAYOUT_PASS_BUDGET_BYTES,
        "layout pass peak over budget: {} bytes ({:.1}KB), budget: {}KB",
        usage.peak_bytes,
        usage.peak_kib(),
        LAYOUT_PASS_BUDGET_BYTES / 1024
    );
    assert!(
        usage.allocs <= LAYOUT_PASS_MAX_ALLOCS,
        "layout pass reallocated: {} allocations",
        usage.allocs
    );
    println!(
        "layout blocks={} images={} directives={} peak_kib={:.1} allocs={}",
        blocks.len(),
        images.len(),
        out.len(),
        usage.peak_kib(),
        usage.allocs
    );
    drop(out);

    let document = read_fixture(ARTICLE_FIXTURE);
    let image_json = read_fixture(IMAGES_FIXTURE);
    let (article, usage) = ALLOC.measure(|| {
        PreparedArticle::from_json_str(&document, &image_json, FIXTURE_BASE_URL)
            .unwrap_or_else(|e| panic!("prepare fixtures: {}", e))
    });
    assert_eq!(article.images().len(), 5);
    assert!(
        usage.peak_bytes <= FIXTURE_PREPARE_BUDGET_BYTES,
        "prepare peak over budget: {} bytes ({:.1}KB), budget: {}KB",
        usage.peak_bytes,
        usage.peak_kib(),
        FIXTURE_PREPARE_BUDGET_BYTES / 1024
    );
    println!(
        "prepare fixture={} peak_kib={:.1} allocs={}",
        ARTICLE_FIXTURE,
        usage.peak_kib(),
        usage.allocs
    );
}
