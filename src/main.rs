use std::sync::Arc;

use clap::{Parser, Subcommand};
use customer_manager::api::{ApiBody, ApiClient, ApiError, PersistentCookieJar};
use customer_manager::config::{ApiConfig, ConfigError, ProxyConfig, StorageConfig, StubConfig};
use customer_manager::dev::DevError;
use customer_manager::dev::stub_backend::StubBackend;
use customer_manager::session::SessionController;
use customer_manager::shell::run_shell;
use customer_manager::storage::FileStore;
use serde::Serialize;
use tokio::io::BufReader;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Dev(#[from] DevError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "customer-manager", about = "Customer records client and local dev tooling")]
struct Cli {
    /// Backend origin; empty means the local dev proxy.
    #[arg(long, global = true, env = "CUSTOMER_API_BASE")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the backend health endpoint.
    Health,
    /// List customers.
    List,
    /// Show one customer.
    Get { id: i64 },
    /// Interactive session with login, CRUD and logout.
    Shell,
    /// Forward `/api/*` to the backend.
    Proxy {
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the in-memory stub backend.
    Stub {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long, env = "STUB_USERNAME", default_value = "admin")]
        username: String,
        #[arg(long, env = "STUB_PASSWORD", default_value = "admin")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let api_config = cli
        .base_url
        .as_deref()
        .map_or_else(ApiConfig::from_env, ApiConfig::new);

    match cli.command {
        Command::Health => {
            let body = ApiClient::new(&api_config)?.health().await?;
            print_body(&body)
        }
        Command::List => print_json(&ApiClient::new(&api_config)?.list_customers().await?),
        Command::Get { id } => print_json(&ApiClient::new(&api_config)?.get_customer(id).await?),
        Command::Shell => run_interactive(&api_config).await,
        Command::Proxy { target, port } => {
            let mut config = ProxyConfig::from_env()?;
            if let Some(target) = target {
                config.target = target.trim_end_matches('/').to_owned();
            }
            if let Some(port) = port {
                config.port = port;
            }
            Ok(customer_manager::dev::proxy::serve(&config).await?)
        }
        Command::Stub { port, username, password } => {
            let mut config = StubConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            tracing::info!(%username, "stub backend seeded");
            Ok(StubBackend::new([(username, password)]).serve(&config).await?)
        }
    }
}

async fn run_interactive(api_config: &ApiConfig) -> Result<(), CliError> {
    let storage = StorageConfig::from_env();
    let store = Arc::new(FileStore::new(storage.dir));
    let jar = Arc::new(PersistentCookieJar::load(store.clone()));
    let session = SessionController::start(ApiClient::with_cookie_jar(api_config, jar)?, store);
    let input = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    run_shell(&session, input, &mut out).await?;
    Ok(())
}

fn print_body(body: &ApiBody) -> Result<(), CliError> {
    match body {
        ApiBody::Empty => println!("ok"),
        ApiBody::Json(value) => print_json(value)?,
        ApiBody::Text(text) => println!("{text}"),
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
