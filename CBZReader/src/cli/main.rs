//! cbzread - command line front end for CBZReader
//!
//! `info` lists the pages of an archive, `cover` extracts its cover image and
//! `read` drives a reading session from stdin, saving progress on quit.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use cbzreader::progress::ProgressStore;
use cbzreader::reader::LoadOutcome;
use cbzreader::session::input::ReaderCommand;
use cbzreader::session::layout::visible_pages;
use cbzreader::session::FullscreenRequest;
use cbzreader::store::JsonFileStore;
use cbzreader::{
    extract_pages, select_cover, ArchiveSource, FileSource, FullscreenPlatform, ReadingMode,
    ReadingSession, Reader, TicketRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "cbzread")]
#[command(version)]
#[command(about = "Read CBZ comic archives from the terminal", long_about = None)]
#[command(after_help = "Reading commands:\n  \
  n / p          next / previous page\n  \
  g N            go to page N\n  \
  home / end     first / last page\n  \
  m MODE         vertical-scroll, single-page or two-page\n  \
  d              flip reading direction\n  \
  i              toggle inverted colors\n  \
  z N            zoom to N percent\n  \
  f              toggle fullscreen\n  \
  q              save progress and quit")]
struct Cli {
    /// Persisted state file (defaults to $CBZREADER_STATE_PATH or the temp dir)
    #[arg(long, value_name = "PATH", global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List pages in reading order
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Write the cover image to OUT
    Cover {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "OUT")]
        out: PathBuf,
    },
    /// Read interactively
    Read {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Library series id; progress is only saved for library volumes
        #[arg(long, value_name = "ID")]
        series: Option<String>,
        /// Volume id (defaults to the file name)
        #[arg(long, value_name = "ID")]
        volume: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Info { file } => show_info(&file),
        Command::Cover { file, out } => write_cover(&file, &out),
        Command::Read {
            file,
            series,
            volume,
        } => {
            let store = match cli.state {
                Some(path) => JsonFileStore::open(path),
                None => JsonFileStore::open_default(),
            };
            read(&file, series, volume, store)
        }
    }
}

fn show_info(file: &Path) -> Result<()> {
    let source = FileSource::new(file);
    let bytes = source.read_bytes()?;
    let pages = extract_pages(&bytes)?;

    println!("{}: {} pages", source.name(), pages.len());
    for page in &pages {
        let format = page.format.map(|f| f.as_str()).unwrap_or("?");
        println!(
            "{:>4}  {:<40} {:>10}  {:<4}  {}x{}",
            page.index + 1,
            page.name,
            format_size(page.data.len() as u64),
            format,
            page.width,
            page.height
        );
    }
    Ok(())
}

fn write_cover(file: &Path, out: &Path) -> Result<()> {
    let bytes = FileSource::new(file).read_bytes()?;
    let Some(cover) = select_cover(&bytes) else {
        bail!("No cover image found in {}", file.display());
    };

    std::fs::write(out, &cover).with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Wrote {} ({})", out.display(), format_size(cover.len() as u64));
    Ok(())
}

/// Fullscreen for a terminal: requests succeed and are reported back on the
/// next poll, the way a windowing system reports its status asynchronously.
#[derive(Default)]
struct TerminalScreen {
    reported: Option<bool>,
}

impl TerminalScreen {
    fn take_status(&mut self) -> Option<bool> {
        self.reported.take()
    }
}

impl FullscreenPlatform for TerminalScreen {
    fn request(&mut self, request: FullscreenRequest) -> cbzreader::Result<()> {
        self.reported = Some(request == FullscreenRequest::Enter);
        Ok(())
    }
}

fn read(
    file: &Path,
    series: Option<String>,
    volume: Option<String>,
    mut store: JsonFileStore,
) -> Result<()> {
    let mut reader = Reader::new(TicketRegistry::new());
    let mut screen = TerminalScreen::default();

    let source = FileSource::new(file);
    match reader.open_volume(&source, volume, series) {
        LoadOutcome::Installed { pages: 0, .. } => bail!("No images found in {}", source.name()),
        LoadOutcome::Installed { .. } => {}
        LoadOutcome::Failed(message) => bail!(message),
        LoadOutcome::Superseded => return Ok(()),
    }

    if let Some(last) = store.last_session()? {
        tracing::debug!("Previous session: {}/{}", last.series_id, last.volume_id);
    }
    reader.restore_saved_state(&store, &store)?;

    // Status line on every settled change
    let _status = reader.subscribe(|session: &ReadingSession| {
        if !session.is_loading() && !session.is_empty() {
            println!("{}", status_line(session));
        }
    });

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            continue;
        };
        let argument = words.next();

        let command = match (word, argument) {
            ("n", _) => Some(ReaderCommand::NextPage),
            ("p", _) => Some(ReaderCommand::PrevPage),
            ("home", _) => Some(ReaderCommand::FirstPage),
            ("end", _) => Some(ReaderCommand::LastPage),
            ("d", _) => Some(ReaderCommand::ToggleDirection),
            ("i", _) => Some(ReaderCommand::ToggleInvert),
            ("f", _) => Some(ReaderCommand::ToggleFullscreen),
            ("q", _) => Some(ReaderCommand::Exit),
            ("m", Some(mode)) => match ReadingMode::parse(mode) {
                Some(mode) => Some(ReaderCommand::SetMode(mode)),
                None => {
                    eprintln!("Unknown mode '{}'", mode);
                    None
                }
            },
            ("g", Some(page)) => {
                match page_index(page) {
                    Some(index) => {
                        reader.go_to_page(index);
                    }
                    None => eprintln!("Not a page number: {}", page),
                }
                None
            }
            ("z", Some(level)) => {
                match level.parse::<u32>() {
                    Ok(level) => reader.set_zoom(level),
                    Err(_) => eprintln!("Not a zoom level: {}", level),
                }
                None
            }
            _ => {
                eprintln!("Unknown command '{}'", line.trim());
                None
            }
        };

        if let Some(command) = command {
            if reader.dispatch(command, &mut screen) {
                break;
            }
        }
        if let Some(active) = screen.take_status() {
            reader.on_fullscreen_change(active);
        }
    }

    reader.save_preferences(&mut store)?;
    if let Some(snapshot) = reader.close(&mut store)? {
        println!(
            "Saved progress: page {} of {}",
            snapshot.page + 1,
            snapshot.total_pages
        );
    }
    Ok(())
}

/// 0-based page index for a 1-based page number typed by the user
fn page_index(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().map(|page| page.saturating_sub(1))
}

fn status_line(session: &ReadingSession) -> String {
    let visible: Vec<String> = visible_pages(session)
        .iter()
        .map(|i| (i + 1).to_string())
        .collect();
    let pages = if session.reading_mode().is_paged() {
        visible.join("|")
    } else {
        format!("{}", session.current_page() + 1)
    };

    let mut flags = Vec::new();
    if session.invert_colors() {
        flags.push("inverted");
    }
    if session.is_fullscreen() {
        flags.push("fullscreen");
    }

    format!(
        "[{}] page {} of {}  {} {} {}% {}",
        session.volume_name().unwrap_or("-"),
        pages,
        session.total_pages(),
        session.reading_mode().as_str(),
        session.reading_direction().as_str(),
        session.zoom_level(),
        flags.join(" ")
    )
}

/// Format byte size in human-readable form.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MiB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KiB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
