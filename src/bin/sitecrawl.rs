//! CLI entry point (§6), grounded on `crul/__main__.py`'s docopt usage and `main`/
//! `main_crawl`/`main_replay` split.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;
use url::Url;

use sitecrawl::core::{Crawler, CrawlerBuilder, Page};
use sitecrawl::error::CrawlError;
use sitecrawl::output::{write_json, write_sitemap, write_text};
use sitecrawl::replay;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
enum OutputFormat {
    #[default]
    Json,
    Text,
    Sitemap,
}

/// A single-site, concurrency-bounded, politeness-aware web crawler.
#[derive(Debug, Parser)]
#[command(name = "sitecrawl", version, about)]
struct Cli {
    /// The seed URL to crawl from. Omit when using `--replay`.
    url: Option<Url>,

    /// Load previously-scraped pages from a newline-delimited JSON file instead of
    /// crawling the network.
    #[arg(short = 'r', long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Traverse at most this many hops from the seed.
    #[arg(short = 'd', long, default_value_t = 100)]
    depth: usize,

    /// Number of concurrent fetch workers.
    #[arg(short = 'w', long, default_value_t = 4)]
    workers: usize,

    /// Minimum seconds between requests to the site. Overrides any `Crawl-Delay` found
    /// in `robots.txt`.
    #[arg(short = 't', long)]
    delay: Option<f64>,

    /// Disallow a path from being crawled. May be given multiple times.
    #[arg(short = 'i', long = "disallow", value_name = "PATH")]
    disallow: Vec<String>,

    /// Don't bother checking robots.txt.
    #[arg(long)]
    yolo: bool,

    /// Follow links that point off-site.
    #[arg(long)]
    allow_external: bool,

    /// The user-agent sent with every request.
    #[arg(short = 'A', long, default_value = "sitecrawl/1.0 (+https://github.com/example/sitecrawl)")]
    user_agent: String,

    /// Output format.
    #[arg(value_enum, long, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log to the given file in addition to (or instead of) stderr.
    #[arg(short = 'l', long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress non-error logging to stderr.
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), CrawlError> {
    let cli = Cli::parse();
    init_logging(&cli);

    let pages = match (&cli.url, &cli.replay) {
        (_, Some(replay_file)) => {
            let reader = BufReader::new(File::open(replay_file)?);
            replay::read_pages(reader)?
        }
        (Some(url), None) => run_crawl(&cli, url.clone()).await?,
        (None, None) => {
            eprintln!("error: either a seed <url> or --replay <file> is required");
            std::process::exit(2);
        }
    };

    render(&cli, &pages)
}

async fn run_crawl(cli: &Cli, seed: Url) -> Result<Vec<Page>, CrawlError> {
    let mut builder = CrawlerBuilder::new()
        .with_max_depth(cli.depth)
        .with_num_workers(cli.workers)
        .with_robots(!cli.yolo)
        .with_disallow(cli.disallow.clone())
        .with_allow_external(cli.allow_external)
        .with_user_agent(&cli.user_agent);
    if let Some(delay) = cli.delay {
        builder = builder.with_delay_seconds(delay);
    }

    let crawler = builder.build()?;
    let mut handle = crawler.crawl(seed).await?;

    let mut pages = Vec::new();
    while let Some(event) = handle.next().await {
        match event {
            Ok(page) => pages.push(page),
            Err(err) => tracing::error!(error = %err, "crawl worker terminated with an error"),
        }
    }
    Ok(pages)
}

fn render(cli: &Cli, pages: &[Page]) -> Result<(), CrawlError> {
    let stdout = io::stdout();
    let lock = stdout.lock();
    match cli.format {
        OutputFormat::Json => write_json(lock, pages),
        OutputFormat::Text => write_text(lock, pages),
        OutputFormat::Sitemap => write_sitemap(lock, pages),
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if let Some(log_file) = &cli.log_file {
        if let Ok(file) = File::create(log_file) {
            builder.with_writer(std::sync::Mutex::new(file)).init();
            return;
        }
    }

    if cli.quiet {
        return;
    }

    builder.init();
}
