//! mtgdecks - decklist ingestion CLI
//!
//! ## Usage
//!
//! ```text
//! mtgdecks [--catalog-dir DIR] [--offline] <COMMAND>
//!
//! Commands:
//!   parse <FILE>            Parse an Arena-format decklist and print it
//!   scrape <URL> <BODY>     Run the adapter registered for URL over a saved page body
//!   find <NAME>             Resolve one card reference
//!   fetch                   Download the catalog snapshot if it is missing
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `mtgdecks=info`).

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mtgdecks::{
    CardCatalog, CardQuery, CatalogPaths, Deck, DeckMetadata, InMemorySeenUrls, Resolver,
    ResolverConfig, ScraperRegistry, ScryfallClient, parse_strict, to_arena, to_forge, to_json,
};

#[derive(Parser, Debug)]
#[command(name = "mtgdecks", version, about = "Magic: The Gathering decklist ingestion")]
struct Cli {
    /// Directory holding default_cards.json and sets.json.
    #[arg(long, global = true, default_value = ".mtgdecks")]
    catalog_dir: PathBuf,

    /// Never query the remote card service.
    #[arg(long, global = true)]
    offline: bool,

    /// Minimum pause between remote calls, in milliseconds.
    #[arg(long, global = true)]
    min_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an Arena-format decklist file.
    Parse {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Output::Arena)]
        output: Output,
        /// Deck name stored in the metadata.
        #[arg(long)]
        name: Option<String>,
        /// Format name; commander-style formats require 100 cards.
        #[arg(long)]
        format: Option<String>,
    },

    /// Scrape a saved page body with the adapter registered for its URL.
    Scrape {
        url: String,
        body: PathBuf,
        #[arg(long, value_enum, default_value_t = Output::Json)]
        output: Output,
    },

    /// Resolve one card.
    Find {
        name: String,
        #[arg(long)]
        set: Option<String>,
        #[arg(long)]
        number: Option<String>,
        /// Treat the name as a non-English printed name.
        #[arg(long)]
        foreign: bool,
    },

    /// Download whichever catalog file is missing.
    Fetch,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Arena,
    ArenaExtended,
    Forge,
    Json,
}

fn resolver_config(cli: &Cli) -> ResolverConfig {
    let mut config = ResolverConfig {
        allow_remote: !cli.offline,
        ..ResolverConfig::default()
    };
    if let Some(ms) = cli.min_delay_ms {
        config.remote.min_delay = std::time::Duration::from_millis(ms);
    }
    config
}

fn load_resolver(cli: &Cli) -> Result<Resolver> {
    let config = resolver_config(cli);
    let paths = CatalogPaths::in_dir(&cli.catalog_dir);
    let catalog = if cli.offline {
        CardCatalog::from_files(&paths.cards, Some(&paths.sets))
    } else {
        let client = ScryfallClient::new(config.remote.clone())?;
        CardCatalog::load_or_fetch(&paths, &client)
    }
    .with_context(|| format!("loading catalog from {}", cli.catalog_dir.display()))?;
    Ok(Resolver::with_config(Arc::new(catalog), config)?)
}

fn render(deck: &Deck, output: Output) -> Result<String> {
    Ok(match output {
        Output::Arena => to_arena(deck, false),
        Output::ArenaExtended => to_arena(deck, true),
        Output::Forge => to_forge(deck),
        Output::Json => to_json(deck)?,
    })
}

fn print_summary(deck: &Deck) {
    info!(
        cards = deck.len(),
        sideboard = deck.sideboard().len(),
        colors = %deck.color_identity(),
        archetype = %deck.archetype(),
        theme = deck.theme().unwrap_or("-"),
        price_usd = deck.total_price_usd(),
        "deck built"
    );
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Parse {
            file,
            output,
            name,
            format,
        } => {
            let resolver = load_resolver(&cli)?;
            let text = fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut metadata = DeckMetadata::default();
            metadata.name = name.clone();
            metadata.format = format.clone();
            let deck = parse_strict(&resolver, text.lines(), metadata)?;
            print_summary(&deck);
            print!("{}", render(&deck, *output)?);
        }
        Command::Scrape { url, body, output } => {
            let resolver = load_resolver(&cli)?;
            let body = fs::read_to_string(body)
                .with_context(|| format!("reading {}", body.display()))?;
            let registry = ScraperRegistry::with_defaults();
            let seen = InMemorySeenUrls::new();
            let Some(deck) = registry.scrape(&resolver, &seen, url, &body)? else {
                bail!("no adapter registered for {url}");
            };
            print_summary(&deck);
            print!("{}", render(&deck, *output)?);
        }
        Command::Find {
            name,
            set,
            number,
            foreign,
        } => {
            let resolver = load_resolver(&cli)?;
            let mut query = CardQuery::named(name.as_str()).foreign(*foreign);
            if let (Some(set), Some(number)) = (set, number) {
                query = query.with_printing(set.as_str(), number.as_str());
            }
            let card = resolver.find_card(&query)?;
            println!(
                "{} ({}) {} {}",
                card.name,
                card.set_code.to_ascii_uppercase(),
                card.collector_number,
                card.id
            );
        }
        Command::Fetch => {
            let config = resolver_config(&cli);
            if cli.offline {
                bail!("fetch needs network access; drop --offline");
            }
            fs::create_dir_all(&cli.catalog_dir)
                .with_context(|| format!("creating {}", cli.catalog_dir.display()))?;
            let client = ScryfallClient::new(config.remote)?;
            let catalog = CardCatalog::load_or_fetch(&CatalogPaths::in_dir(&cli.catalog_dir), &client)?;
            println!("{} cards, {} sets", catalog.len(), catalog.sets().count());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mtgdecks=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
