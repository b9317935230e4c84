use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jit_remote::config::Config;
use jit_remote::server::{AppState, create_router};
use jit_remote::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "jit-remote")]
#[command(about = "Remote repository server for jit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and database
    Init {
        /// Configuration file (TOML)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Start the server
    Serve {
        /// Configuration file (TOML)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn run_init(config: Config) -> anyhow::Result<()> {
    let data_dir = &config.server.data_dir;
    fs::create_dir_all(data_dir)?;

    let db_path = config.server.db_path();
    let existed = db_path.exists();

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    if existed {
        println!("Database already initialized at {}", db_path.display());
    } else {
        println!("Initialized database at {}", db_path.display());
    }

    Ok(())
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let db_path = config.server.db_path();
    if !db_path.exists() {
        bail!(
            "Database not found at {}. Run 'jit-remote init' first.",
            db_path.display()
        );
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let state = Arc::new(AppState::new(Arc::new(store), &config.auth)?);

    let app = create_router(state);
    let addr = config.server.socket_addr()?;

    if config.auth.rotate_refresh_tokens {
        info!("Refresh tokens are rotated on use");
    }
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jit_remote=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { config, data_dir } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(data_dir) = data_dir {
                config.server.data_dir = data_dir;
            }
            run_init(config)?;
        }
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.server.data_dir = data_dir;
            }
            run_serve(config).await?;
        }
    }

    Ok(())
}
