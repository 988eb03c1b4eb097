use std::sync::Arc;

use clap::{Parser, Subcommand};
use pricedb_core::{AppConfig, Domain, NameTable};
use tracing_subscriber::EnvFilter;

mod runs;
mod scrape;


#[derive(Debug, Parser)]
#[command(name = "pricedb-cli")]
#[command(about = "Price database command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run one scrape cycle for a single domain
    Scrape {
        /// assets, cars, motorcycles, or a catalog kind (mobile, pc, ...)
        domain: Domain,
        /// First list page for page-addressable sources
        #[arg(long, default_value_t = 1)]
        start_page: u32,
        /// Page budget; defaults to `PRICEDB_DEFAULT_MAX_PAGES`
        #[arg(long)]
        max_pages: Option<u32>,
    },
    /// Run one scrape cycle for every configured domain
    ScrapeAll {
        #[arg(long)]
        max_pages: Option<u32>,
        /// Domains scraped at the same time
        #[arg(long, default_value_t = 2)]
        parallel: usize,
    },
    /// Inspect scrape run history
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
    /// Manage tracked assets
    Assets {
        #[command(subcommand)]
        command: AssetsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Subcommand)]
enum RunsCommands {
    List {
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long)]
        domain: Option<Domain>,
    },
}

#[derive(Debug, Subcommand)]
enum AssetsCommands {
    /// Flag an asset for monitoring, or clear the flag with `--off`
    Monitor {
        symbol: String,
        #[arg(long)]
        off: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("pricedb-cli: no command given, see --help");
        return Ok(());
    };

    let config = pricedb_core::load_app_config()?;
    init_tracing(&config.log_level);

    let pool =
        pricedb_db::connect_pool(&config.database_url, pricedb_db::PoolConfig::from_app_config(&config))
            .await?;

    match command {
        Commands::Db { command } => run_db(&pool, command).await?,
        Commands::Scrape {
            domain,
            start_page,
            max_pages,
        } => {
            let names = load_names(&config)?;
            let max_pages = max_pages.unwrap_or(config.default_max_pages);
            scrape::run_scrape(&config, pool, names, domain, start_page, max_pages).await?;
        }
        Commands::ScrapeAll {
            max_pages,
            parallel,
        } => {
            let names = load_names(&config)?;
            let max_pages = max_pages.unwrap_or(config.default_max_pages);
            scrape::run_scrape_all(&config, pool, names, max_pages, parallel).await?;
        }
        Commands::Runs {
            command: RunsCommands::List { limit, domain },
        } => runs::list_runs(&pool, domain, limit).await?,
        Commands::Assets {
            command: AssetsCommands::Monitor { symbol, off },
        } => {
            pricedb_db::set_asset_monitored(&pool, &symbol, !off).await?;
            println!("{symbol}: monitored = {}", !off);
        }
    }

    Ok(())
}

async fn run_db(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            pricedb_db::ping(pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = pricedb_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

fn init_tracing(fallback_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Loads the static display-name table. A missing file is not an error.
fn load_names(config: &AppConfig) -> anyhow::Result<Arc<NameTable>> {
    match pricedb_core::load_name_table(&config.asset_names_path)? {
        Some(table) => {
            tracing::info!(entries = table.len(), "asset name table loaded");
            Ok(Arc::new(table))
        }
        None => {
            tracing::warn!(
                path = %config.asset_names_path.display(),
                "asset name table not found, using source titles only"
            );
            Ok(Arc::new(NameTable::default()))
        }
    }
}
