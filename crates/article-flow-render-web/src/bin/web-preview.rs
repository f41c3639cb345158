use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use article_flow::{LayoutDiagnostic, WidthScale};
use article_flow_render::{
    InsertionCadence, LayoutConfig, LayoutDirective, LayoutSummary, RenderEngine,
    RenderEngineOptions,
};
use article_flow_render_web::render_page;
use serde::Serialize;

const DEFAULT_DOCUMENT_PATH: &str = "tests/fixtures/article.json";
const DEFAULT_IMAGES_PATH: &str = "tests/fixtures/images.json";
const DEFAULT_OUT_PATH: &str = "target/web-preview/article.html";
const BASE_URL_ENV: &str = "ARTICLE_FLOW_BASE_URL";

#[derive(Clone, Debug)]
struct Args {
    document_path: String,
    images_path: String,
    base_url: String,
    out_path: Option<String>,
    cadence_first: usize,
    cadence_interval: usize,
    named_widths: bool,
    json: bool,
}

#[derive(Serialize)]
struct JsonDump<'a> {
    summary: LayoutSummary,
    diagnostics: &'a [LayoutDiagnostic],
    directives: &'a [LayoutDirective<'a>],
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args, env::var(BASE_URL_ENV).ok())?;

    let cadence = InsertionCadence::new(cli.cadence_first, cli.cadence_interval)
        .map_err(|e| e.to_string())?;
    let width_scale = if cli.named_widths {
        WidthScale::Named
    } else {
        WidthScale::Percent
    };
    let opts = RenderEngineOptions::for_base_url(&cli.base_url)
        .map_err(|e| e.to_string())?
        .with_width_scale(width_scale)
        .with_layout(LayoutConfig::default().with_cadence(cadence));

    let diagnostics = Arc::new(Mutex::new(Vec::new()));
    let mut engine = RenderEngine::new(opts);
    let sink = Arc::clone(&diagnostics);
    engine.set_diagnostic_sink(move |d| {
        if let Ok(mut seen) = sink.lock() {
            seen.push(d);
        }
    });

    let document = read_file(&cli.document_path)?;
    let images = read_file(&cli.images_path)?;
    let article = engine
        .prepare_str(&document, &images)
        .map_err(|e| e.to_string())?;
    let directives = engine.layout(&article);
    let summary = LayoutSummary::from_directives(&directives);
    let diagnostics = diagnostics
        .lock()
        .map_err(|_| "diagnostics lock poisoned".to_string())?
        .clone();

    let payload = if cli.json {
        let dump = JsonDump {
            summary,
            diagnostics: &diagnostics,
            directives: &directives,
        };
        serde_json::to_string_pretty(&dump).map_err(|e| e.to_string())?
    } else {
        render_page(&page_title(&cli.document_path), &directives)
    };

    let out_path = match (cli.out_path.as_deref(), cli.json) {
        (Some(path), _) => path,
        (None, true) => {
            println!("{}", payload);
            return Ok(());
        }
        (None, false) => DEFAULT_OUT_PATH,
    };
    if out_path.is_empty() {
        return Err("--out must not be empty".to_string());
    }
    if let Some(parent) = Path::new(out_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    std::fs::write(out_path, payload).map_err(|e| e.to_string())?;

    println!(
        "wrote preview to {} (blocks={}, images={}, pairs={}, clears={}, diagnostics={})",
        out_path,
        summary.blocks,
        summary.images_placed,
        summary.pairs,
        summary.clears,
        diagnostics.len(),
    );
    Ok(())
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {}", path, e))
}

fn page_title(document_path: &str) -> String {
    let stem = Path::new(document_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("article");
    format!("{} - article-flow preview", stem)
}

fn parse_args(args: Vec<String>, env_base_url: Option<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let has_positional_document = args.get(1).is_some_and(|v| !v.starts_with("--"));

    let mut cfg = Args {
        document_path: if has_positional_document {
            args[1].clone()
        } else {
            DEFAULT_DOCUMENT_PATH.to_string()
        },
        images_path: DEFAULT_IMAGES_PATH.to_string(),
        base_url: env_base_url.unwrap_or_default(),
        out_path: None,
        cadence_first: InsertionCadence::default().first(),
        cadence_interval: InsertionCadence::default().interval(),
        named_widths: false,
        json: false,
    };

    let mut i = if has_positional_document { 2usize } else { 1usize };
    while i < args.len() {
        match args[i].as_str() {
            "--images" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--images requires a value".to_string())?;
                cfg.images_path = v.clone();
                i += 2;
            }
            "--base-url" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--base-url requires a value".to_string())?;
                cfg.base_url = v.clone();
                i += 2;
            }
            "--out" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--out requires a value".to_string())?;
                cfg.out_path = Some(v.clone());
                i += 2;
            }
            "--cadence-first" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--cadence-first requires a value".to_string())?;
                cfg.cadence_first = v
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --cadence-first value '{}'", v))?;
                i += 2;
            }
            "--cadence-interval" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--cadence-interval requires a value".to_string())?;
                cfg.cadence_interval = v
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --cadence-interval value '{}'", v))?;
                i += 2;
            }
            "--named-widths" => {
                cfg.named_widths = true;
                i += 1;
            }
            "--json" => {
                cfg.json = true;
                i += 1;
            }
            "--help" | "-h" => return Err("help requested".to_string()),
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"web-preview - static HTML preview for article-flow layouts

USAGE:
  cargo run -p article-flow-render-web --bin web-preview -- [document.json] [options]

OPTIONS:
  --images <file>             image list JSON (default: tests/fixtures/images.json)
  --base-url <url>            content host for relative image URLs
                              (default: $ARTICLE_FLOW_BASE_URL, else none)
  --out <file>                output path (default: target/web-preview/article.html,
                              or stdout with --json)
  --cadence-first <n>         first paragraph preceded by an image (default: 2)
  --cadence-interval <n>      paragraphs between opportunities (default: 2)
  --named-widths              default widths use small/medium/large
  --json                      dump summary, diagnostics and directives as JSON
"#
}
