use clap::{Parser, Subcommand};
use curelink::admin::{self, AdminCommands};
use curelink::config::{Config, LogFormat};
use curelink::error::AppResult;
use curelink::server;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// curelink - URL shortener with per-user API keys
#[derive(Parser, Debug)]
#[command(name = "curelink")]
#[command(version)]
#[command(about = "URL shortener with per-user API keys", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server
    Server {
        /// Host to bind to (overrides SERVER_HOST env var)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT env var)
        #[arg(long)]
        port: Option<u16>,

        /// Do not run migrations on startup
        #[arg(long)]
        skip_migrations: bool,
    },

    /// Administrative commands
    Admin {
        #[command(subcommand)]
        admin_command: AdminCommands,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_tracing(config.log.format);

    match cli.command {
        Commands::Server {
            host,
            port,
            skip_migrations,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);

            // Re-compute base_url after CLI overrides unless BASE_URL was given
            let mut config = config;
            if !config.url.base_url_explicit {
                config.url.base_url = format!("http://{}:{}", host, port);
            }

            server::run_server(config, addr, !skip_migrations).await
        }
        Commands::Admin { admin_command } => admin::run(config, admin_command).await,
    }
}
