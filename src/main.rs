use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tenant_ledger::config::{generate_default_config, Config};
use tenant_ledger::ledger::Ledger;
use tenant_ledger::model::{Tenant, TenantId};
use tenant_ledger::{logging, report, HttpLedgerClient, LedgerApi};

#[derive(Parser, Debug)]
#[command(name = "tenant-ledger", version, about = "Browse tenants and their transaction ledgers")]
struct Cli {
    /// Base URL of the property management API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (defaults to the platform config dir, then ./tenant-ledger.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive dashboard (default)
    Dashboard,
    /// Print the tenant directory
    Tenants,
    /// Print one tenant's ledger and totals
    Ledger {
        /// Tenant id as listed by `tenants`
        tenant_id: TenantId,
    },
    /// Print a default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Command::Dashboard);
    if let Command::InitConfig = command {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = Config::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(timeout) = cli.timeout {
        config.api.request_timeout_secs = timeout;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    match command {
        Command::Dashboard => run_dashboard(config).await,
        Command::Tenants => {
            logging::init_stderr(&config.logging);
            let client = HttpLedgerClient::new(&config.api)?;
            let tenants = client.list_tenants().await.context("Failed to load tenants")?;
            print!("{}", report::tenant_table(&tenants));
            Ok(())
        }
        Command::Ledger { tenant_id } => {
            logging::init_stderr(&config.logging);
            let client = HttpLedgerClient::new(&config.api)?;
            print_ledger(&client, tenant_id).await
        }
        Command::InitConfig => Ok(()),
    }
}

async fn print_ledger(client: &HttpLedgerClient, tenant_id: TenantId) -> Result<()> {
    let tenants = client.list_tenants().await.context("Failed to load tenants")?;
    let tenant = tenants
        .into_iter()
        .find(|t| t.id == tenant_id)
        .unwrap_or_else(|| Tenant {
            id: tenant_id,
            name: format!("Tenant #{}", tenant_id),
            unit: "?".to_string(),
        });

    let transactions = client
        .list_transactions(tenant_id)
        .await
        .with_context(|| format!("Failed to load ledger for tenant {}", tenant_id))?;

    print!("{}", report::ledger_report(&tenant, &Ledger::new(transactions)));
    Ok(())
}

#[cfg(feature = "tui")]
async fn run_dashboard(config: Config) -> Result<()> {
    use std::sync::Arc;
    use tenant_ledger::{ui, Dashboard};
    use tracing::info;

    let log_path = logging::init_file(&config.logging)?;
    let client = HttpLedgerClient::new(&config.api)?;
    info!(
        "Starting dashboard against {} (logging to {:?})",
        client.base_url(),
        log_path
    );

    // Leave the terminal usable if anything panics while the UI owns it
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        default_hook(panic);
    }));

    let api: Arc<dyn LedgerApi> = Arc::new(client);
    let (dashboard, events) = Dashboard::new(api);
    ui::run_ui(dashboard, events).await?;

    info!("Dashboard closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
async fn run_dashboard(_config: Config) -> Result<()> {
    anyhow::bail!(
        "TUI mode not available. Rebuild with `--features tui`, or use the `tenants` and `ledger` subcommands"
    )
}
