use clap::{Parser, Subcommand};
use folio::config;
use folio::output;
use folio::site::Site;
use folio::types::{CollectionKind, ContentDocument, DocumentView};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Content ingestion for markdown blogs and project portfolios")]
#[command(long_about = "\
Content ingestion for markdown blogs and project portfolios

Your filesystem is the data source. Each collection root holds one directory
per category and one markdown file per document; file stems become slugs.

Content structure:

  content/
  ├── posts/
  │   ├── rust/                    # Category \"rust\"
  │   │   ├── ownership.md         # Document rust/ownership
  │   │   └── async/pinning.md     # Nested category, not routable
  │   ├── _drafts/                 # Leading \"_\" or \".\" = ignored
  │   └── stray.md                 # Outside any category = ignored
  └── projects/
      └── cli/folio-cli.md

Metadata resolution (first available wins):
  Publish date:  front matter date → last git commit date → today
  Author:        structured author → author name → last git commit author → default
  Title:         front matter title → first # heading → slug

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Config file; a missing file means stock defaults
    #[arg(long, default_value = "folio.toml", global = true)]
    config: PathBuf,

    /// Never consult git history for missing metadata
    #[arg(long, global = true)]
    no_history: bool,

    #[command(subcommand)]
    command: Command,
}

/// Which document a command is about.
#[derive(clap::Args, Clone)]
struct Target {
    /// Document slug (case-insensitive)
    slug: String,

    /// Category, to disambiguate equal slugs
    #[arg(long)]
    category: Option<String>,

    /// Collection to search
    #[arg(long, value_enum, default_value_t = Collection::Posts)]
    collection: Collection,
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum Collection {
    Posts,
    Projects,
}

impl From<Collection> for CollectionKind {
    fn from(c: Collection) -> Self {
        match c {
            Collection::Posts => CollectionKind::Posts,
            Collection::Projects => CollectionKind::Projects,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List every document of both collections
    Scan {
        /// Print documents as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Show one document with its outline
    Show {
        #[command(flatten)]
        target: Target,
        /// Print the document as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// List routable category/slug pairs
    Paths {
        #[arg(long, value_enum, default_value_t = Collection::Posts)]
        collection: Collection,
    },
    /// Rank documents of the other collection by relatedness
    Related {
        #[command(flatten)]
        target: Target,
        /// Maximum number of results (defaults to related.limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Build both collections and report skipped files and warnings
    Check,
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

#[derive(Serialize)]
struct ScanJson<'a> {
    posts: &'a [ContentDocument],
    projects: &'a [ContentDocument],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Scan { json } => {
            let site = load_site(&cli)?;
            if *json {
                let all = ScanJson {
                    posts: site.posts().all(),
                    projects: site.projects().all(),
                };
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                output::print_scan_output(&site);
            }
        }
        Command::Show { target, json } => {
            let site = load_site(&cli)?;
            let view = find(&site, target)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                output::print_document(&view);
            }
        }
        Command::Paths { collection } => {
            let site = load_site(&cli)?;
            let paths = site.collection((*collection).into()).all_paths();
            output::print_paths(&paths);
        }
        Command::Related { target, limit } => {
            let site = load_site(&cli)?;
            let view = find(&site, target)?;
            let related = site.related_to(view.document, *limit);
            output::print_related(view.document, &related);
        }
        Command::Check => {
            let site = load_site(&cli)?;
            output::print_check_output(&site);
            let report = site.report();
            if !report.is_clean() {
                return Err(format!(
                    "{} warnings, {} skipped files",
                    report.warnings.len(),
                    report.skipped.len()
                )
                .into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for command output and JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config, apply environment and flag overrides, build both collections.
fn load_site(cli: &Cli) -> Result<Site, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    config.apply_env(|key| std::env::var(key).ok());
    if cli.no_history {
        config.history.enabled = false;
    }
    Ok(Site::load(&config))
}

fn find<'a>(site: &'a Site, target: &Target) -> Result<DocumentView<'a>, String> {
    let kind = CollectionKind::from(target.collection);
    site.collection(kind)
        .by_slug(&target.slug, target.category.as_deref())
        .ok_or_else(|| match &target.category {
            Some(category) => format!("no {kind} document {category}/{}", target.slug),
            None => format!("no {kind} document with slug {}", target.slug),
        })
}
