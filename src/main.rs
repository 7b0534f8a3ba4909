//! Face registry service entry point.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use face_registry::api::{create_router, AppState};
use face_registry::config::Config;
use face_registry::metrics;
use face_registry::profile::{JsonFileStore, ProfileStore};
use face_registry::utils::shutdown_signal;
use face_registry::ServiceError;

/// Facial-landmark profile registry.
#[derive(Parser, Debug)]
#[command(name = "face-registry")]
#[command(about = "HTTP service for enrolling and verifying facial-landmark profiles")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Profile store file (overrides DATA_FILE).
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Profile store file (overrides DATA_FILE).
        #[arg(long)]
        data_file: Option<PathBuf>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print every enrolled profile.
    List {
        /// Profile store file (overrides DATA_FILE).
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    let mut config = Config::load().map_err(ServiceError::from)?;

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("face_registry=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    let fmt_layer = if config.log_json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::List { data_file }) => {
            if let Some(path) = data_file.or(args.data_file) {
                config.data_file = path;
            }
            cmd_list(&config).await
        }
        Some(Command::Serve { port, data_file }) => {
            apply_overrides(&mut config, port.or(args.port), data_file.or(args.data_file));
            cmd_serve(config).await
        }
        None => {
            apply_overrides(&mut config, args.port, args.data_file);
            cmd_serve(config).await
        }
    }
}

fn apply_overrides(config: &mut Config, port: Option<u16>, data_file: Option<PathBuf>) {
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(path) = data_file {
        config.data_file = path;
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("FACE REGISTRY - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(ServiceError::InvalidConfig(e).into());
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Data File: {}", config.data_file.display());
    println!("  Log Level: {}", config.rust_log);
    println!("  JSON Logs: {}", config.log_json);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print every enrolled profile id with its landmark count.
async fn cmd_list(config: &Config) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.data_file);
    let profiles = store.load().await.map_err(ServiceError::from)?;

    println!("{} profile(s) in {}", profiles.len(), config.data_file.display());
    for profile in &profiles {
        println!(
            "  {:<32} {} landmarks",
            profile.user_id,
            profile.face_data.landmarks.len()
        );
    }

    Ok(())
}

/// Run the HTTP service until a shutdown signal arrives.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(ServiceError::InvalidConfig(e).into());
    }

    let handle = metrics::install_recorder()?;
    metrics::init_metrics();

    let store = JsonFileStore::open(&config.data_file).await.map_err(|e| {
        error!("Failed to open profile store: {}", e);
        ServiceError::from(e)
    })?;
    info!("Profile store: {}", store.path().display());

    let app_state = AppState::new(store).with_metrics(handle);
    let router = create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.map_err(ServiceError::from)?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServiceError::from)?;

    info!("Server stopped");
    Ok(())
}
