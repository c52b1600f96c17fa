use anyhow::Result;
use clap::Parser;
use log::warn;
use mdreader::app::ReaderApp;
use mdreader::book::{BookConfig, DEFAULT_CHAPTER, DEFAULT_SUMMARY_FILE};
use mdreader::ui::{OutputFormat, TerminalRuntime};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdreader")]
#[command(about = "Reads a markdown book laid out by its SUMMARY.md", long_about = None)]
struct Args {
    /// Book root; chapter paths are resolved against it
    #[arg(default_value = "book")]
    root: PathBuf,

    /// Manifest file name inside the book root
    #[arg(long, default_value = DEFAULT_SUMMARY_FILE)]
    summary: String,

    /// Chapter opened when the manifest links none
    #[arg(long, default_value = DEFAULT_CHAPTER)]
    default_chapter: String,

    /// Chapter to open instead of the first one
    #[arg(short, long)]
    chapter: Option<String>,

    /// Move to the chapter after the opened one
    #[arg(long, conflicts_with = "previous")]
    next: bool,

    /// Move to the chapter before the opened one
    #[arg(long)]
    previous: bool,

    /// Wrap width for rendered text
    #[arg(short, long, default_value_t = 80)]
    width: usize,

    /// Print the book data as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = BookConfig {
        root: args.root,
        summary_file: args.summary,
        default_chapter: args.default_chapter,
    };
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let mut app = ReaderApp::new(config, TerminalRuntime::new(args.width, format));
    app.open_book()?;
    if let Some(chapter) = args.chapter.as_deref() {
        app.open_chapter(chapter)?;
    }
    if args.next && !app.open_next()? {
        warn!("already at the last chapter");
    }
    if args.previous && !app.open_previous()? {
        warn!("already at the first chapter");
    }

    app.run()
}
