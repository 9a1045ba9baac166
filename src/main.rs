//! CLI entry point for folio-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Personal portfolio and blog server backed by Markdown/MDX files", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts or tags
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show a single post
    Show {
        /// Slug of the post
        slug: String,

        /// Print the Markdown body instead of rendered HTML
        #[arg(long)]
        raw: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Slug to use instead of the slugified title
        #[arg(short, long)]
        slug: Option<String>,

        /// Create an .mdx file instead of .md
        #[arg(long)]
        mdx: bool,
    },

    /// Start the site server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Reload open pages when content changes
        #[arg(short, long)]
        watch: bool,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List { r#type, json } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::list::run(&folio, &r#type, json)?;
        }

        Commands::Show { slug, raw } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::show::run(&folio, &slug, raw)?;
        }

        Commands::New { title, slug, mdx } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            folio_rs::commands::new::run(&folio, &title, slug.as_deref(), mdx)?;
        }

        Commands::Serve {
            port,
            ip,
            watch,
            open,
        } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            tracing::info!(
                "Starting server at http://{}:{} ({:?})",
                ip,
                port,
                folio.config.environment
            );
            folio_rs::server::start(&folio, &ip, port, watch, open).await?;
        }

        Commands::Version => {
            println!("folio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
