//! Command-line front end shared by the `chapters` binary.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum, error::ErrorKind};

use crate::catalog::write_manifest;
use crate::config::{LoadPolicy, ReaderConfig};
use crate::heuristics::format_with_commas;
use crate::metrics::alignment_coverage;
use crate::session::ReaderSession;
use crate::transport::{FsTransport, Transport};
use crate::utils::{normalize_inline_whitespace, truncate_title};

const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Auto,
    Windowed,
    Full,
}

impl From<PolicyArg> for LoadPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Auto => LoadPolicy::Auto,
            PolicyArg::Windowed => LoadPolicy::AlwaysWindowed,
            PolicyArg::Full => LoadPolicy::AlwaysFull,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "chapters",
    disable_help_subcommand = true,
    about = "Browse chapter datasets and compare edited stories with their raw source",
    after_help = "Set RUST_LOG=chapters=debug for detailed discovery and alignment logs."
)]
struct ChaptersCli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a library directory and write its manifest.
    Index {
        #[arg(long, value_name = "PATH", help = "Library root containing stories/ and raw/")]
        root: PathBuf,
    },
    /// List discovered stories.
    List {
        #[command(flatten)]
        library: LibraryArgs,
    },
    /// Print the chapters of a story.
    Read {
        #[command(flatten)]
        library: LibraryArgs,
        #[arg(help = "Story file reference, e.g. my_story_edit.yaml")]
        story: String,
        #[arg(long, default_value_t = 0, help = "Additional windows to load after the first")]
        more: usize,
        #[arg(long, help = "Load every chapter regardless of size class")]
        all: bool,
    },
    /// Align a story against its raw counterpart.
    Compare {
        #[command(flatten)]
        library: LibraryArgs,
        #[arg(help = "Story file reference, e.g. my_story_edit.yaml")]
        story: String,
        #[arg(long, help = "Align every chapter instead of the first window")]
        all: bool,
    },
}

#[derive(Debug, Args)]
struct LibraryArgs {
    #[arg(long, value_name = "PATH", help = "Library root on the local filesystem")]
    root: Option<PathBuf>,
    #[arg(
        long = "base-url",
        value_name = "URL",
        conflicts_with = "root",
        help = "Library base URL served over HTTP"
    )]
    base_url: Option<String>,
    #[arg(
        long = "batch-size",
        default_value_t = crate::constants::loader::DEFAULT_BATCH_SIZE,
        value_parser = parse_positive_usize,
        help = "Chapters exposed per window"
    )]
    batch_size: usize,
    #[arg(long, value_enum, default_value = "auto", help = "Windowing policy")]
    policy: PolicyArg,
    #[arg(
        long = "timeout-secs",
        default_value_t = crate::constants::comparison::RAW_FETCH_TIMEOUT.as_secs(),
        help = "Upper bound for fetching a raw pool"
    )]
    timeout_secs: u64,
}

impl LibraryArgs {
    fn config(&self) -> ReaderConfig {
        ReaderConfig {
            batch_size: self.batch_size,
            load_policy: self.policy.into(),
            raw_fetch_timeout: Duration::from_secs(self.timeout_secs),
            ..ReaderConfig::default()
        }
    }

    fn transport(&self, config: &ReaderConfig) -> Result<Arc<dyn Transport>, Box<dyn Error>> {
        if let Some(base_url) = &self.base_url {
            return http_transport(base_url, config);
        }
        match &self.root {
            Some(root) => Ok(Arc::new(FsTransport::new(root.clone()))),
            None => Err("a library location is required (--root or --base-url)".into()),
        }
    }

    fn open(&self) -> Result<ReaderSession, Box<dyn Error>> {
        let config = self.config();
        let transport = self.transport(&config)?;
        let mut session = ReaderSession::new(transport, config)?;
        let catalog = session.refresh_catalog();
        if let Some(err) = &catalog.error {
            eprintln!("warning: {err}");
        }
        Ok(session)
    }
}

#[cfg(feature = "http")]
fn http_transport(base_url: &str, config: &ReaderConfig) -> Result<Arc<dyn Transport>, Box<dyn Error>> {
    Ok(Arc::new(crate::transport::HttpTransport::new(
        base_url,
        config.raw_fetch_timeout,
    )))
}

#[cfg(not(feature = "http"))]
fn http_transport(_base_url: &str, _config: &ReaderConfig) -> Result<Arc<dyn Transport>, Box<dyn Error>> {
    Err("this build has no HTTP support; enable the `http` feature".into())
}

/// Run the `chapters` CLI with arguments excluding the program name.
pub fn run<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<ChaptersCli, _>(std::iter::once("chapters".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    match cli.command {
        Command::Index { root } => run_index(root),
        Command::List { library } => run_list(&library),
        Command::Read {
            library,
            story,
            more,
            all,
        } => run_read(&library, &story, more, all),
        Command::Compare {
            library,
            story,
            all,
        } => run_compare(&library, &story, all),
    }
}

fn run_index(root: PathBuf) -> Result<(), Box<dyn Error>> {
    let (path, manifest) = write_manifest(&root, &ReaderConfig::default())?;
    println!(
        "Indexed {} stories ({} raw datasets) into {}",
        manifest.stories.len(),
        manifest.raw_count,
        path.display()
    );
    Ok(())
}

fn run_list(library: &LibraryArgs) -> Result<(), Box<dyn Error>> {
    let session = library.open()?;
    let catalog = session.catalog();
    println!(
        "=== {} stories via {} ===",
        catalog.len(),
        catalog.strategy.as_deref().unwrap_or("none")
    );
    for story in &catalog.stories {
        let raw_marker = if story.has_raw_counterpart { " [raw]" } else { "" };
        println!("{}{}  ({})", story.display_title, raw_marker, story.file_ref);
        if let Some(description) = &story.description {
            println!("    {description}");
        }
    }
    Ok(())
}

fn run_read(library: &LibraryArgs, story: &str, more: usize, all: bool) -> Result<(), Box<dyn Error>> {
    let mut session = library.open()?;
    session.select(story)?;
    if all {
        session.load_all();
    } else {
        for _ in 0..more {
            if session.request_more().is_empty() {
                break;
            }
        }
    }
    for chapter in session.visible() {
        println!(
            "[{}] {}: {}",
            chapter.id,
            chapter.title,
            truncate_title(&normalize_inline_whitespace(&chapter.content), PREVIEW_CHARS)
        );
    }
    if let Some(window) = session.window() {
        println!(
            "--- {} of {} chapters loaded ({} remaining) ---",
            format_with_commas(window.loaded_count),
            format_with_commas(window.total_count),
            format_with_commas(window.remaining())
        );
    }
    Ok(())
}

fn run_compare(library: &LibraryArgs, story: &str, all: bool) -> Result<(), Box<dyn Error>> {
    let mut session = library.open()?;
    session.select(story)?;
    if all {
        session.load_all();
    }
    session.compare()?;
    for (chapter, result) in session.paired() {
        let raw = result
            .raw_record
            .as_ref()
            .map(|record| record.id.as_str())
            .unwrap_or("-");
        println!("{:<10} {} -> {}", result.tier.label(), chapter.id, raw);
    }
    if let Some(coverage) = session.report().and_then(|report| alignment_coverage(&report.summary)) {
        println!(
            "--- {} of {} chapters matched ({:.1}%, {:.1}% confident) ---",
            format_with_commas(coverage.matched),
            format_with_commas(coverage.total),
            coverage.match_rate * 100.0,
            coverage.confident_rate * 100.0
        );
        for share in coverage.per_tier {
            println!("  {:<10} {:>6} ({:.1}%)", share.tier.label(), share.count, share.share * 100.0);
        }
    }
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let value = raw
        .parse::<usize>()
        .map_err(|_| format!("expected a positive integer, got '{raw}'"))?;
    if value == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|arg| arg.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn help_is_not_an_error() {
        assert!(run(args(&["--help"])).is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = run(args(&["list", "--root", ".", "--batch-size", "0"])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn list_requires_a_library_location() {
        assert!(run(args(&["list"])).is_err());
    }

    #[test]
    fn index_then_compare_over_a_directory() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("stories")).unwrap();
        fs::create_dir_all(root.join("raw")).unwrap();
        fs::write(
            root.join("stories/tale_edit.yaml"),
            "- id: Chapter_1\n  title: One\n  content: edited\n",
        )
        .unwrap();
        fs::write(
            root.join("raw/tale.yaml"),
            "- id: chapter 1\n  title: One\n  content: raw\n",
        )
        .unwrap();
        let root_arg = root.to_string_lossy().to_string();

        run(args(&["index", "--root", &root_arg])).unwrap();
        assert!(root.join("stories/index.json").is_file());
        run(args(&["list", "--root", &root_arg])).unwrap();
        run(args(&["read", "--root", &root_arg, "tale_edit.yaml", "--all"])).unwrap();
        run(args(&["compare", "--root", &root_arg, "tale_edit.yaml"])).unwrap();
        assert!(run(args(&["compare", "--root", &root_arg, "missing.yaml"])).is_err());
    }

    #[test]
    fn positive_usize_parser() {
        assert_eq!(parse_positive_usize("3"), Ok(3));
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_usize("x").is_err());
    }
}
