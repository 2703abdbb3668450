use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inkcrawl_archive::{DirArchive, Library};
use inkcrawl_client::{BlockingFetcher, ImageRsDecoder};
use inkcrawl_core::crawl::{CrawlOptions, crawl};
use inkcrawl_core::models::ComicSpec;
use inkcrawl_core::traits::Archive;
use inkcrawl_core::Comic;

#[derive(Parser)]
#[command(name = "inkcrawl", version, about = "Webcomic scraper and archiver")]
struct Cli {
    /// Library directory holding the comic archives
    #[arg(short, long, env = "INKCRAWL_LIBRARY", default_value = "comics")]
    library: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a comic from a JSON spec file, or continue a stored one
    Scrape {
        /// Path to a comic spec file, or the title of a stored comic
        spec_or_comic: String,

        /// Maximum number of pages to scrape
        #[arg(short, long)]
        pages: Option<u32>,

        /// Start from this page instead of the stored position
        #[arg(short, long)]
        startpage: Option<String>,

        /// Discard any existing archive for this comic and start over
        #[arg(short, long, default_value_t = false)]
        overwrite: bool,
    },

    /// Continue scraping the most recently scraped comic
    Resume {
        /// Maximum number of pages to scrape
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// List the stored comics
    List {
        /// Only show titles starting with this prefix
        prefix: Option<String>,
    },

    /// Show metadata and crawl progress for a stored comic
    Info {
        /// Title of the stored comic
        comic: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("inkcrawl=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let library = Library::new(cli.library);

    match cli.command {
        Commands::Scrape {
            spec_or_comic,
            pages,
            startpage,
            overwrite,
        } => cmd_scrape(&library, &spec_or_comic, pages, startpage, overwrite),
        Commands::Resume { pages } => {
            let title = library
                .last_comic()?
                .context("No comic has been scraped yet. Run `inkcrawl scrape` first.")?;
            let comic = Comic::open(DirArchive::open(library.comic_dir(&title))?)?;
            run_crawl(&library, comic, CrawlOptions {
                start_override: None,
                pages,
            })
        }
        Commands::List { prefix } => cmd_list(&library, prefix.as_deref()),
        Commands::Info { comic } => cmd_info(&library, &comic),
    }
}

fn cmd_scrape(
    library: &Library,
    spec_or_comic: &str,
    pages: Option<u32>,
    startpage: Option<String>,
    overwrite: bool,
) -> Result<()> {
    let options = CrawlOptions {
        start_override: startpage,
        pages,
    };

    let spec_path = Path::new(spec_or_comic);
    if spec_path.is_file() {
        let spec = load_spec(spec_path)?;
        let comic = if library.contains(&spec.title) && !overwrite {
            tracing::info!(title = %spec.title, "Comic already stored, continuing it");
            Comic::open(DirArchive::open(library.comic_dir(&spec.title))?)?
        } else {
            let fetcher = BlockingFetcher::new().context("Failed to create HTTP client")?;
            let archive = DirArchive::create(library.comic_dir(&spec.title))?;
            Comic::create(archive, &spec, &fetcher, &ImageRsDecoder)?
        };
        run_crawl(library, comic, options)
    } else if library.contains(spec_or_comic) {
        if overwrite {
            bail!(
                "--overwrite needs a spec file to recreate {spec_or_comic:?} from; \
                 only the stored comic was given"
            );
        }
        let comic = Comic::open(DirArchive::open(library.comic_dir(spec_or_comic))?)?;
        run_crawl(library, comic, options)
    } else {
        bail!("{spec_or_comic:?} is neither a spec file nor a stored comic")
    }
}

/// Load a spec file, resolving its side-file paths relative to its directory.
fn load_spec(path: &Path) -> Result<ComicSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file: {}", path.display()))?;
    let mut spec: ComicSpec =
        serde_json::from_str(&text).context("Invalid JSON in spec file")?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    spec.description_file = spec
        .description_file
        .map(|p| resolve_side_file(base, &p))
        .transpose()?;
    spec.cover_file = spec
        .cover_file
        .map(|p| resolve_side_file(base, &p))
        .transpose()?;
    Ok(spec)
}

fn resolve_side_file(base: &Path, relative: &str) -> Result<String> {
    let path = base.join(relative);
    if !path.is_file() {
        bail!("Side file not found: {}", path.display());
    }
    Ok(path.to_string_lossy().into_owned())
}

fn run_crawl(library: &Library, mut comic: Comic<DirArchive>, options: CrawlOptions) -> Result<()> {
    let fetcher = BlockingFetcher::new().context("Failed to create HTTP client")?;
    let interrupt = AtomicBool::new(false);

    let outcome = crawl(&mut comic, &fetcher, &ImageRsDecoder, &options, &interrupt)
        .map_err(|e| anyhow::anyhow!(e))?;

    library.set_last_comic(&comic.metadata().title)?;

    println!(
        "{}: {} ({} pages, {} images, last page: {})",
        comic.metadata().title,
        outcome.reason,
        outcome.pages_scraped,
        outcome.images_added,
        if outcome.last_page.is_empty() {
            "none"
        } else {
            &outcome.last_page
        },
    );
    Ok(())
}

fn cmd_list(library: &Library, prefix: Option<&str>) -> Result<()> {
    let mut titles = library.comics()?;
    if let Some(prefix) = prefix {
        titles.retain(|t| t.starts_with(prefix));
    }
    if titles.is_empty() {
        println!("No comics stored in {}", library.root().display());
        return Ok(());
    }
    let last = library.last_comic()?;
    for title in &titles {
        let marker = if last.as_deref() == Some(title) {
            " *"
        } else {
            ""
        };
        println!("{title}{marker}");
    }
    Ok(())
}

fn cmd_info(library: &Library, title: &str) -> Result<()> {
    let archive = DirArchive::open(library.comic_dir(title))?;
    let comic = Comic::open(archive)?;
    let metadata = comic.metadata();
    let progress = comic.progress();

    println!("{}", metadata.title);
    println!("  authors:     {}", metadata.authors.join(", "));
    println!("  start page:  {}", metadata.start_page);
    println!(
        "  created:     {}",
        metadata.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(desc) = &metadata.description_ref {
        println!("  description: {desc}");
    }
    if let Some(cover) = &metadata.cover_ref {
        println!("  cover:       {cover}");
    }
    println!("  images:      {}", progress.last_index);
    println!(
        "  last page:   {}",
        if progress.last_page.is_empty() {
            "none"
        } else {
            &progress.last_page
        }
    );
    println!("  link rule:   {}", progress.link_identifier);
    println!("  image rule:  {}", progress.image_identifier);

    let images = comic
        .archive()
        .list()?
        .into_iter()
        .filter(|m| m.starts_with("image"))
        .count();
    println!("  files:       {images} archived images");
    Ok(())
}
