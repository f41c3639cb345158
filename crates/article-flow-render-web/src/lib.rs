//! Static HTML backend for `article-flow-render`.
//!
//! Maps a directive list onto article markup. Floats, pairs and clears are
//! expressed as CSS classes; [`STYLESHEET`] gives them their meaning.

use article_flow::{ContentBlock, ImageDescriptor, ImagePosition, ImageWidth, ListFormat, TextRun};
use article_flow_render::LayoutDirective;

/// Current crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stylesheet for the classes emitted by [`render_html`].
pub const STYLESHEET: &str = r#"
.af-article { max-width: 46rem; margin: 0 auto; line-height: 1.6; }
.af-article::after { content: ""; display: table; clear: both; }
.af-clear { clear: both; }
.af-image { margin: 0 0 1rem; }
.af-image img { display: block; width: 100%; height: auto; }
.af-image figcaption { font-size: 0.85em; color: #675f50; padding-top: 0.35rem; }
.af-left { float: left; margin-right: 1.25rem; }
.af-right { float: right; margin-left: 1.25rem; }
.af-center { margin-left: auto; margin-right: auto; }
.af-full { width: 100%; }
.af-rounded img { border-radius: 0.5rem; }
.af-shadow img { box-shadow: 0 4px 14px rgba(28, 21, 9, 0.14); }
.af-w-30 { width: 30%; }
.af-w-40 { width: 40%; }
.af-w-50 { width: 50%; }
.af-w-60 { width: 60%; }
.af-w-100 { width: 100%; }
.af-w-small { width: 33%; }
.af-w-medium { width: 50%; }
.af-w-large { width: 75%; }
.af-pair { display: flex; gap: 1.25rem; margin: 0 0 1rem; }
.af-pair > .af-image { flex: 1 1 0; width: auto; margin: 0; }
"#;

/// Render directives as an `<article>` fragment.
pub fn render_html(directives: &[LayoutDirective<'_>]) -> String {
    let mut out = String::with_capacity(directives.len() * 96);
    out.push_str("<article class=\"af-article\">\n");
    for directive in directives {
        match *directive {
            LayoutDirective::RenderBlock(block) => push_block(&mut out, block),
            LayoutDirective::RenderImage { image, is_paired } => {
                push_figure(&mut out, image, is_paired)
            }
            LayoutDirective::RenderImagePair { left, right } => {
                out.push_str("<div class=\"af-pair\">\n");
                push_figure(&mut out, left, true);
                push_figure(&mut out, right, true);
                out.push_str("</div>\n");
            }
            LayoutDirective::ClearFloat => out.push_str("<div class=\"af-clear\"></div>\n"),
        }
    }
    out.push_str("</article>\n");
    out
}

/// Render a standalone page embedding [`STYLESHEET`].
pub fn render_page(title: &str, directives: &[LayoutDirective<'_>]) -> String {
    let body = render_html(directives);
    let mut out = String::with_capacity(body.len() + STYLESHEET.len() + 256);
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\" />\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    out.push_str("<title>");
    out.push_str(&html_escape::encode_text(title));
    out.push_str("</title>\n<style>");
    out.push_str(STYLESHEET);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&body);
    out.push_str("</body>\n</html>\n");
    out
}

fn push_block(out: &mut String, block: &ContentBlock) {
    match block {
        ContentBlock::Paragraph { children } => {
            out.push_str("<p>");
            push_runs(out, children);
            out.push_str("</p>\n");
        }
        ContentBlock::Heading { level, children } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{}>", level));
            push_runs(out, children);
            out.push_str(&format!("</h{}>\n", level));
        }
        ContentBlock::List { format, items } => {
            let tag = match format {
                ListFormat::Ordered => "ol",
                ListFormat::Unordered => "ul",
            };
            out.push_str(&format!("<{}>\n", tag));
            for item in items {
                out.push_str("<li>");
                push_runs(out, item);
                out.push_str("</li>\n");
            }
            out.push_str(&format!("</{}>\n", tag));
        }
        ContentBlock::Quote { children } => {
            out.push_str("<blockquote>");
            push_runs(out, children);
            out.push_str("</blockquote>\n");
        }
    }
}

fn push_runs(out: &mut String, runs: &[TextRun]) {
    for run in runs {
        let mut close: Vec<&str> = Vec::new();
        if let Some(href) = run.link.as_deref() {
            out.push_str("<a href=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(href));
            out.push_str("\">");
            close.push("</a>");
        }
        for (on, open, end) in [
            (run.bold, "<strong>", "</strong>"),
            (run.italic, "<em>", "</em>"),
            (run.underline, "<u>", "</u>"),
            (run.strikethrough, "<s>", "</s>"),
            (run.code, "<code>", "</code>"),
        ] {
            if on {
                out.push_str(open);
                close.push(end);
            }
        }
        out.push_str(&html_escape::encode_text(&run.text));
        for end in close.iter().rev() {
            out.push_str(end);
        }
    }
}

fn figure_classes(image: &ImageDescriptor, is_paired: bool) -> String {
    let mut classes = String::from("af-image");
    if !is_paired {
        classes.push_str(match image.position {
            ImagePosition::Left => " af-left",
            ImagePosition::Right => " af-right",
            ImagePosition::Center => " af-center",
            ImagePosition::Full => " af-full",
        });
        if image.position != ImagePosition::Full {
            classes.push(' ');
            classes.push_str(&width_class(image.width));
        }
    }
    if image.rounded {
        classes.push_str(" af-rounded");
    }
    if image.shadow {
        classes.push_str(" af-shadow");
    }
    classes
}

fn width_class(width: ImageWidth) -> String {
    match width {
        ImageWidth::Percent(percent) => format!("af-w-{}", percent),
        ImageWidth::Small => "af-w-small".to_string(),
        ImageWidth::Medium => "af-w-medium".to_string(),
        ImageWidth::Large => "af-w-large".to_string(),
    }
}

fn push_figure(out: &mut String, image: &ImageDescriptor, is_paired: bool) {
    out.push_str("<figure class=\"");
    out.push_str(&figure_classes(image, is_paired));
    out.push_str("\"><img src=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(&image.source_url));
    out.push_str("\" alt=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(&image.alt_text));
    out.push_str("\" loading=\"lazy\" />");
    if image.show_caption {
        if let Some(caption) = image.caption.as_deref().filter(|c| !c.trim().is_empty()) {
            out.push_str("<figcaption>");
            out.push_str(&html_escape::encode_text(caption));
            out.push_str("</figcaption>");
        }
    }
    out.push_str("</figure>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_text_is_escaped() {
        let block = ContentBlock::paragraph("Fish & <chips>");
        let html = render_html(&[LayoutDirective::RenderBlock(&block)]);
        assert!(html.contains("<p>Fish &amp; &lt;chips&gt;</p>"));
    }

    #[test]
    fn marks_and_links_nest_inside_out() {
        let block = ContentBlock::Paragraph {
            children: vec![TextRun {
                text: "orders".to_string(),
                bold: true,
                italic: true,
                link: Some("https://a.example/?q=1&r=\"2\"".to_string()),
                ..TextRun::default()
            }],
        };
        let html = render_html(&[LayoutDirective::RenderBlock(&block)]);
        assert!(html.contains(
            "<a href=\"https://a.example/?q=1&amp;r=&quot;2&quot;\"><strong><em>orders</em></strong></a>"
        ));
    }

    #[test]
    fn single_image_carries_float_and_width_classes() {
        let image = ImageDescriptor::new("https://a.example/1.jpg", ImagePosition::Right)
            .with_width(ImageWidth::Percent(40))
            .with_alt_text("Pike square")
            .with_caption("Drill at dawn");
        let html = render_html(&[LayoutDirective::RenderImage {
            image: &image,
            is_paired: false,
        }]);
        assert!(html.contains(
            "<figure class=\"af-image af-right af-w-40 af-rounded af-shadow\"><img src=\"https://a.example/1.jpg\" alt=\"Pike square\""
        ));
        assert!(html.contains("<figcaption>Drill at dawn</figcaption>"));
    }

    #[test]
    fn hidden_caption_and_flags_are_honoured() {
        let mut image = ImageDescriptor::new("https://a.example/1.jpg", ImagePosition::Full)
            .with_caption("not shown");
        image.show_caption = false;
        image.rounded = false;
        image.shadow = false;
        let html = render_html(&[LayoutDirective::RenderImage {
            image: &image,
            is_paired: false,
        }]);
        assert!(html.contains("<figure class=\"af-image af-full\">"));
        assert!(!html.contains("figcaption"));
    }

    #[test]
    fn pair_and_clear_markup() {
        let left = ImageDescriptor::new("https://a.example/l.jpg", ImagePosition::Left);
        let right = ImageDescriptor::new("https://a.example/r.jpg", ImagePosition::Right);
        let html = render_html(&[
            LayoutDirective::ClearFloat,
            LayoutDirective::RenderImagePair {
                left: &left,
                right: &right,
            },
        ]);
        let clear = html.find("af-clear").expect("clear");
        let pair = html.find("af-pair").expect("pair");
        let l = html.find("l.jpg").expect("left image");
        let r = html.find("r.jpg").expect("right image");
        assert!(clear < pair && pair < l && l < r);
        assert!(!html.contains("af-left"));
    }

    #[test]
    fn lists_and_headings() {
        let blocks = [
            ContentBlock::heading(3, "Kit"),
            ContentBlock::list(ListFormat::Ordered, ["helmet", "pike"]),
        ];
        let directives: Vec<_> = blocks.iter().map(LayoutDirective::RenderBlock).collect();
        let html = render_html(&directives);
        assert!(html.contains("<h3>Kit</h3>"));
        assert!(html.contains("<ol>\n<li>helmet</li>\n<li>pike</li>\n</ol>"));
    }

    #[test]
    fn page_embeds_stylesheet_and_escaped_title() {
        let html = render_page("A & B", &[]);
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains(".af-clear { clear: both; }"));
    }
}
