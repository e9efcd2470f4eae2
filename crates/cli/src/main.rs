use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    skein_orchestrator::{KeyStore, Orchestrator, Request, Response, ServiceHandle},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "skein", about = "Skein — cross-page action discovery and chain replay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Directory holding skein.toml and the API key (defaults to the
    /// standard config directory).
    #[arg(long, global = true, env = "SKEIN_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a page's actions through a hidden session.
    Scan {
        url: String,
        /// Perform this action (JSON from a previous scan) before scanning,
        /// previewing what lies behind it.
        #[arg(long)]
        drill: Option<String>,
    },
    /// Replay an action chain from a JSON file (an array of actions).
    Chain { file: PathBuf },
    /// Scan a page and run its labels through the suggestion service.
    Enhance { url: String },
    /// Manage the suggestion-service API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Print whether a key is stored.
    Get,
    /// Store a key.
    Set { key: String },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_thread_ids(false).with_ansi(true))
            .init();
    }
}

/// Print a response as pretty JSON and translate failure into the exit code.
fn finish(response: &Response) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli, service: ServiceHandle) -> anyhow::Result<()> {
    match cli.command {
        Commands::Scan { url, drill } => {
            let action = drill
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .map_err(|e| anyhow::anyhow!("invalid --drill action: {e}"))?;
            let response = service.send(Request::ScanFutureActions { url, action }).await;
            finish(&response)
        },
        Commands::Chain { file } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
            let chain = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("invalid chain file: {e}"))?;
            let response = service.send(Request::ExecuteChain { chain }).await;
            finish(&response)
        },
        Commands::Enhance { url } => {
            let scan = service
                .send(Request::ScanFutureActions { url: url.clone(), action: None })
                .await;
            if !scan.success {
                return finish(&scan);
            }
            let actions = scan.actions.unwrap_or_default();
            let response = service.send(Request::EnhanceActions { actions, url }).await;
            finish(&response)
        },
        Commands::Key { action } => match action {
            KeyAction::Get => {
                let response = service.send(Request::GetApiKey).await;
                // Don't echo the key itself to the terminal.
                let stored = response.api_key.is_some();
                println!("{}", if stored { "a key is stored" } else { "no key stored" });
                Ok(())
            },
            KeyAction::Set { key } => {
                let response = service.send(Request::SetApiKey { api_key: key }).await;
                finish(&response)
            },
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = skein_config::discover_and_load(cli.config_dir.as_deref());
    let key_dir = cli
        .config_dir
        .clone()
        .or_else(skein_config::config_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    debug!(key_dir = %key_dir.display(), "resolved config directory");

    let service = skein_orchestrator::spawn(Orchestrator::new(config, KeyStore::new(&key_dir)));
    run(cli, service).await
}
