//! # sitesift CLI Application
//!
//! Command-line front end for the crawler, the segmenter and the OCR line
//! grouper.
//!
//! ## Subcommands
//!
//! - `crawl`: Crawl a site breadth-first and print the blocks of every page
//! - `segment`: Run the segmenter on a local HTML file
//! - `ocr`: Send an image to the configured OCR service and print its lines
//!
//! Process settings (`MAX_DEPTH`, `REQUEST_TIMEOUT`, `CRAWL_CONCURRENCY`,
//! `OCR_API_URL`, `OCR_MODEL`, `OCR_LANG`) are read once at startup.

mod telemetry;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use sitesift::AppConfig;
use sitesift::crawler::{CrawledPage, Crawler, CrawlerConfig};
use sitesift::ocr::OcrClient;
use sitesift::segmenter::{SegmenterConfig, extract_content_blocks};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Crawl a website and extract clean title/content blocks", long_about = None)]
struct Cli {
    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl a website and extract content blocks from every page
    Crawl(CrawlArgs),

    /// Extract content blocks from a local HTML file
    Segment(SegmentArgs),

    /// Group the text of an image into lines using the OCR service
    Ocr(OcrArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL
    #[arg(required = true)]
    url: String,

    /// Crawl depth (defaults to MAX_DEPTH, never more than 5)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Number of concurrent requests (defaults to CRAWL_CONCURRENCY)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Maximum number of pages to fetch
    #[arg(short = 'p', long)]
    max_pages: Option<usize>,

    /// CSS selectors to exclude (comma-separated, replaces the defaults)
    #[arg(short, long)]
    exclude: Option<String>,

    /// Save the result to this file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (json|text)
    #[arg(short, long, default_value = "json", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// HTML file to segment, or '-' for stdin
    #[arg(required = true)]
    file: String,

    /// Output format (json|text)
    #[arg(short, long, default_value = "json", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct OcrArgs {
    /// Image file to recognize
    #[arg(required = true)]
    image: PathBuf,
}

#[derive(Serialize)]
struct CrawlOutput<'a> {
    depth: u32,
    count: usize,
    pages: &'a [CrawledPage],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = telemetry::init_tracing_subscriber(cli.log_dir.as_deref())?;

    let config = AppConfig::from_env().context("failed to read configuration")?;

    match cli.command {
        Commands::Crawl(args) => crawl_command(&config, args).await?,
        Commands::Segment(args) => segment_command(args).await?,
        Commands::Ocr(args) => ocr_command(&config, args).await?,
    }

    Ok(())
}

#[instrument(skip(config))]
async fn crawl_command(config: &AppConfig, args: CrawlArgs) -> anyhow::Result<()> {
    let mut builder = CrawlerConfig::from_app(config, args.depth).max_pages(args.max_pages);
    if let Some(concurrency) = args.concurrency {
        builder = builder.concurrency(concurrency);
    }
    if let Some(exclude) = &args.exclude {
        builder = builder.exclude_selectors(
            exclude
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        );
    }
    let crawler_config = builder.build();
    let depth = crawler_config.max_depth;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; finishing pages in flight");
                cancel.cancel();
            }
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(format!("Crawling {} (depth {})...", args.url, depth));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let crawler = Crawler::new(crawler_config)?;
    let report = crawler.crawl_with_cancellation(&args.url, cancel).await?;

    spinner.finish_with_message(format!(
        "Crawled {} pages ({} skipped){}",
        report.stats.pages_crawled,
        report.stats.pages_skipped,
        if report.cancelled { ", cancelled" } else { "" }
    ));

    let rendered = match args.format.as_str() {
        "text" => render_pages_text(&report.pages),
        _ => serde_json::to_string_pretty(&CrawlOutput {
            depth,
            count: report.pages.len(),
            pages: &report.pages,
        })?,
    };

    match args.output {
        Some(output_file) => {
            tokio::fs::write(&output_file, rendered).await?;
            info!("Saved crawl result to {}", output_file.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

#[instrument]
async fn segment_command(args: SegmentArgs) -> anyhow::Result<()> {
    let html = if args.file == "-" {
        use tokio::io::AsyncReadExt;
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(&args.file)
            .await
            .with_context(|| format!("failed to read {}", args.file))?
    };

    let blocks = extract_content_blocks(&html, &SegmenterConfig::default());

    match args.format.as_str() {
        "text" => {
            for block in &blocks {
                println!("## {}\n{}\n", block.title, block.content);
            }
        }
        _ => println!("{}", serde_json::to_string_pretty(&blocks)?),
    }

    Ok(())
}

#[instrument(skip(config))]
async fn ocr_command(config: &AppConfig, args: OcrArgs) -> anyhow::Result<()> {
    let client = OcrClient::new(config.ocr.clone())?;
    let lines = client.ocr_image(&args.image).await?;

    let json_response = serde_json::json!({ "lines": lines });
    println!("{}", serde_json::to_string_pretty(&json_response)?);

    Ok(())
}

fn render_pages_text(pages: &[CrawledPage]) -> String {
    let mut out = String::new();
    for page in pages {
        out.push_str(&format!("# {} (depth {})\n\n", page.url, page.depth));
        for block in &page.blocks {
            out.push_str(&format!("## {}\n{}\n\n", block.title, block.content));
        }
    }
    out
}
