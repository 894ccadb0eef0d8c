//! Pageflow CLI
//!
//! Paginates a saved document and writes it back with automatic page breaks.
//! The main interface is through WASM bindings.

use anyhow::{Context, Result};
use clap::Parser;
use pageflow::{CheckOutcome, Config, Editor, SystemClock};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pageflow")]
#[command(about = "Insert automatic page breaks into a saved document", long_about = None)]
struct Cli {
    /// Document markup to paginate
    input: PathBuf,

    /// JSON configuration (page geometry and pagination timings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the paginated document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Drop existing automatic page breaks before paginating
    #[arg(long)]
    reflow: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Config::from_json(&json).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => Config::default(),
    };

    let html = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let mut editor = Editor::from_html(&html, config, SystemClock)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    info!(blocks = editor.document().block_count(), "document loaded");

    if cli.reflow {
        let removed = editor.remove_automatic_breaks()?;
        info!(removed, "removed automatic page breaks");
    }

    let inserted = paginate(&mut editor);
    let pages = editor.pagination().total_pages;
    info!(inserted, pages, "pagination finished");

    let out = editor.to_html();
    match &cli.output {
        Some(path) => {
            fs::write(path, out).with_context(|| format!("writing {}", path.display()))?;
        }
        None => print!("{out}"),
    }
    eprintln!("{pages} page(s)");
    Ok(())
}

/// Run explicit checks until every page fits. Each insertion adds one block,
/// so the document size bounds the loop.
fn paginate(editor: &mut Editor) -> usize {
    let mut inserted = 0;
    let limit = editor.document().block_count();
    for _ in 0..=limit {
        match editor.check_page_overflow() {
            CheckOutcome::Inserted { .. } => inserted += 1,
            CheckOutcome::OversizedBlock { position } => {
                warn!(%position, "block is taller than a page, leaving it in place");
                break;
            }
            CheckOutcome::GuardRejected { position } => {
                warn!(%position, "page break already near the overflow, stopping");
                break;
            }
            _ => break,
        }
    }
    inserted
}
