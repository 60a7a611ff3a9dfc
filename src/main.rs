//! grocer-compare - Grocery price comparison across Australian stores
//!
//! Searches Coles, Woolworths, and ALDI AU product APIs concurrently
//! and groups matching products into cross-store price comparisons.

use anyhow::Result;
use clap::{Parser, Subcommand};
use grocer_compare::category::Category;
use grocer_compare::commands::{SearchCommand, ServeCommand};
use grocer_compare::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "grocer-compare",
    version,
    about = "Grocery price comparison across Coles, Woolworths, and ALDI AU",
    long_about = "Searches the Coles, Woolworths, and ALDI AU product APIs concurrently, ranks offers against the query, and groups matching products into cross-store price comparisons."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every store and compare prices
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Maximum number of comparison groups (1-60)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Restrict results to one category
        #[arg(long, default_value = "all")]
        category: Category,
    },

    /// Run the HTTP API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Bind port
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// List known product categories
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    config.format = cli.format;

    match cli.command {
        Commands::Search { query, limit, category } => {
            let cmd = SearchCommand::new(config);
            let output = cmd.execute(&query, limit, category).await?;
            println!("{}", output);
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let cmd = ServeCommand::new(config);
            cmd.execute().await?;
        }

        Commands::Categories => {
            println!("Known categories:\n");

            for category in Category::all() {
                if *category == Category::All {
                    println!("{:<12} matches every category", category.tag());
                } else {
                    println!("{}", category.tag());
                }
            }
        }
    }

    Ok(())
}
