use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use order_lifecycle::cache::QueryCache;
use order_lifecycle::client::{BackendError, HttpOrderBackend, OrderBackend};
use order_lifecycle::config::ClientConfig;
use order_lifecycle::core::{OrderResponse, OrderStatus, TransitionTable};
use order_lifecycle::effects::{LogNotifier, StatusTransitionCommand, TransitionControl};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "order-status")]
#[command(about = "Inspect and change order statuses", long_about = None)]
struct Cli {
    /// TOML client config. Without it, ORDER_API_* environment variables are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the statuses an order in STATUS can move to
    Transitions { status: String },

    /// Show an order's status and its offered transitions
    Show { order_id: Uuid },

    /// Move an order to STATUS
    Set { order_id: Uuid, status: OrderStatus },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => ClientConfig::from_env().context("failed to load config from environment"),
    }
}

/// Prefer the backend's table; fall back to the builtin one.
async fn load_table(backend: &dyn OrderBackend) -> TransitionTable {
    match backend.fetch_transitions().await {
        Ok(entries) => match TransitionTable::from_wire(&entries) {
            Ok(table) => {
                tracing::info!("using transition table served by the backend");
                table
            }
            Err(error) => {
                tracing::warn!(%error, "backend transition table rejected, using builtin table");
                TransitionTable::builtin()
            }
        },
        Err(BackendError::Unsupported) => TransitionTable::builtin(),
        Err(error) => {
            tracing::warn!(%error, "could not fetch transition table, using builtin table");
            TransitionTable::builtin()
        }
    }
}

fn print_options(options: &[OrderStatus]) {
    if options.is_empty() {
        println!("  (no transitions)");
    }
    for status in options {
        println!("  {:<10} {}", status.label(), status.as_str());
    }
}

struct Session {
    backend: Arc<HttpOrderBackend>,
    cache: Arc<QueryCache>,
    command: Arc<StatusTransitionCommand<HttpOrderBackend>>,
}

impl Session {
    async fn connect(config: &ClientConfig) -> Result<Self> {
        let backend = Arc::new(HttpOrderBackend::new(config)?);
        let table = Arc::new(load_table(backend.as_ref()).await);
        let cache = Arc::new(QueryCache::new());
        let command = Arc::new(StatusTransitionCommand::new(
            Arc::clone(&backend),
            Arc::clone(&cache),
            Arc::new(LogNotifier),
            table,
        ));
        Ok(Self {
            backend,
            cache,
            command,
        })
    }

    async fn control(
        &self,
        order_id: Uuid,
    ) -> Result<(OrderResponse, TransitionControl<HttpOrderBackend>)> {
        let order = self
            .cache
            .fetch_order(self.backend.as_ref(), order_id)
            .await
            .with_context(|| format!("failed to fetch order {order_id}"))?;
        let control = TransitionControl::new(Arc::clone(&self.command), &order);
        Ok((order, control))
    }
}

/// Table for `transitions`. Without `--config` a missing or invalid
/// environment config falls back to the builtin table.
async fn table_for(
    config: Option<&PathBuf>,
    loaded: Result<ClientConfig>,
) -> Result<TransitionTable> {
    match loaded {
        Ok(loaded) => Ok(load_table(&HttpOrderBackend::new(&loaded)?).await),
        Err(error) if config.is_none() => {
            tracing::warn!(
                error = %format!("{error:#}"),
                "no usable client config, using builtin table"
            );
            Ok(TransitionTable::builtin())
        }
        Err(error) => Err(error),
    }
}

async fn transitions(config: Option<&PathBuf>, status: &str) -> Result<ExitCode> {
    let table = table_for(config, load_config(config)).await?;
    println!("{status} ->");
    print_options(table.valid_transitions_for(status));
    Ok(ExitCode::SUCCESS)
}

async fn show(session: &Session, order_id: Uuid) -> Result<ExitCode> {
    let (order, control) = session.control(order_id).await?;

    println!("{} ({})", order.order_number, order.id);
    println!("status: {} ({})", order.status.label(), order.status);
    print_options(control.options());
    Ok(ExitCode::SUCCESS)
}

async fn set(session: &Session, order_id: Uuid, status: OrderStatus) -> Result<ExitCode> {
    let (order, control) = session.control(order_id).await?;

    match control.select(status).await {
        Ok(_) => {
            println!(
                "{}: {} -> {}",
                order.order_number,
                order.status,
                control.displayed_status()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            eprintln!("{}: {error}", order.order_number);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Transitions { status } => transitions(cli.config.as_ref(), &status).await,
        Commands::Show { order_id } => {
            let session = Session::connect(&load_config(cli.config.as_ref())?).await?;
            show(&session, order_id).await
        }
        Commands::Set { order_id, status } => {
            let session = Session::connect(&load_config(cli.config.as_ref())?).await?;
            set(&session, order_id, status).await
        }
    }
}
