mod import;

use clap::{Parser, Subcommand};
use sanctum_import::MemoryContactStore;
use tracing_subscriber::EnvFilter;

use crate::import::ImportArgs;

#[derive(Debug, Parser)]
#[command(name = "sanctum-cli")]
#[command(about = "Sanctum CRM command line interface")]
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
    /// Import contacts from a CSV file
    Import(ImportArgs),
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => {
            let pool = connect().await?;
            match command {
                DbCommands::Ping => {
                    sanctum_db::health_check(&pool).await?;
                    println!("database reachable");
                }
                DbCommands::Migrate => {
                    let applied = sanctum_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        Some(Commands::Import(args)) => {
            if args.dry_run {
                import::run_import(MemoryContactStore::new(), &args).await?;
            } else {
                let pool = connect().await?;
                import::run_import(sanctum_db::PgContactStore::new(pool), &args).await?;
            }
        }
        None => println!("sanctum-cli: run with --help to list commands"),
    }

    Ok(())
}

async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = sanctum_core::load_app_config()?;
    let pool_config = sanctum_db::PoolConfig::from_app_config(&config);
    let pool = sanctum_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
