use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use feedkit::feed::{FeedDumpService, LocalFilesystem, Reader};
use feedkit::item::reader::ItemInterface;
use feedkit::routing::LinkGenerator;
use feedkit::store::JsonEntityManager;
use feedkit::{Config, FeedManager, RouteTable};

#[derive(Parser, Debug)]
#[command(name = "feedkit", version, about = "Render and read RSS/Atom feeds")]
struct Args {
    /// Configuration file
    #[arg(long, global = true, value_name = "FILE", default_value = "feedkit.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate (dump) a feed in an XML file
    Dump(DumpArgs),

    /// Print the entries of a local feed document
    Read {
        /// Path to an RSS or Atom file
        source: String,
    },
}

#[derive(clap::Args, Debug)]
struct DumpArgs {
    /// Host used to generate absolute links (e.g. example.com)
    host: String,

    /// Feed name defined in the configuration
    #[arg(long)]
    name: String,

    /// Entity to use to generate the feed
    #[arg(long)]
    entity: String,

    /// Defines feed filename
    #[arg(long)]
    filename: String,

    /// Order field to sort entities by
    #[arg(long = "order-by", alias = "orderBy")]
    order_by: Option<String>,

    /// Sort direction, ASC or DESC
    #[arg(long)]
    direction: Option<String>,

    /// Formatter to use
    #[arg(long, default_value = "rss")]
    format: String,

    /// Maximum number of entities to retrieve
    #[arg(long)]
    limit: Option<usize>,

    /// Directory holding `<entity>.json` files
    #[arg(long, value_name = "DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Directory the feed file is written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    root_dir: PathBuf,
}

/// Hydration target for `read`.
#[derive(Debug, Default)]
struct Entry {
    title: String,
    link: String,
    date: Option<DateTime<Utc>>,
}

impl ItemInterface for Entry {
    fn set_feed_item_title(&mut self, title: String) {
        self.title = title;
    }

    fn set_feed_item_description(&mut self, _description: String) {}

    fn set_feed_item_link(&mut self, link: String) {
        self.link = link;
    }

    fn set_feed_item_pub_date(&mut self, date: Option<DateTime<Utc>>) {
        self.date = date;
    }
}

fn dump(config: &Config, args: DumpArgs) -> Result<()> {
    let router: Arc<dyn LinkGenerator> =
        Arc::new(RouteTable::new(&args.host).with_routes(config.routes.clone()));

    let manager = FeedManager::from_config(config, Some(Arc::clone(&router)));
    let entities = JsonEntityManager::new(&args.data_dir, Some(router));

    println!(
        "Start dumping \"{}\" feed from \"{}\" entity...",
        args.name, args.entity
    );

    let mut service = FeedDumpService::new(manager, entities, LocalFilesystem);
    service
        .set_name(&args.name)
        .set_entity(&args.entity)
        .set_filename(&args.filename)
        .set_format(&args.format)
        .set_limit(args.limit)
        .set_order_by(args.order_by)
        .set_direction(args.direction)
        .set_root_dir(&args.root_dir);

    let path = service
        .dump()
        .with_context(|| format!("Failed to dump feed '{}'", args.name))?;

    println!("done!");
    println!("Feed has been dumped and located in \"{}\"", path.display());
    Ok(())
}

fn read(source: &str) -> Result<()> {
    let mut reader = Reader::new();
    let entries: Vec<Entry> = reader
        .load(source)
        .with_context(|| format!("Failed to load feed '{}'", source))?
        .populate()?;

    if let Ok(feed) = reader.get() {
        if let Some(title) = &feed.title {
            println!("{}", title);
        }
    }

    for entry in &entries {
        let date = entry
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}  {}", date, entry.title);
        if !entry.link.is_empty() {
            println!("    {}", entry.link);
        }
    }

    tracing::debug!(entries = entries.len(), "Read complete");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;

    match args.command {
        Command::Dump(dump_args) => dump(&config, dump_args),
        Command::Read { source } => read(&source),
    }
}
