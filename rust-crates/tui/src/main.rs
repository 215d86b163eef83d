use color_eyre::eyre::{
    Result,
    eyre,
};
use std::path::PathBuf;
use tamagosui_chain::{
    deployment::{
        self,
        DeploymentEnv,
        DeploymentStore,
    },
    http::HttpLedger,
    ledger::Signer,
    local::LocalLedger,
    signer::KeySigner,
    types::ObjectId,
};
use tamagosui_client::actions::AppController;

mod app;
mod ui;
mod wallets;

pub const DEFAULT_DEVNET_GATEWAY_URL: &str = "https://gateway.devnet.tamagosui.io";
pub const DEFAULT_TESTNET_GATEWAY_URL: &str = "https://gateway.testnet.tamagosui.io";

const LOCAL_STARTING_GAS: u64 = 1_000_000;

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: tamagosui [--local | --devnet | --testnet] [--rpc-url <url>]\n\
         [--wallet <name>] [--wallet-dir <path>] [--watch-only]\n\
         \n\
         Flags:\n\
           --local             Play against an in-process ledger (no network)\n\
           --devnet            Connect to the devnet gateway (default {})\n\
           --testnet           Connect to the testnet gateway (default {})\n\
           --rpc-url <url>     Override the gateway URL for the selected network\n\
           --wallet <name>     Keystore wallet to unlock for signing\n\
           --wallet-dir <path> Override wallet directory (defaults to ~/.tamagosui/wallets)\n\
           --watch-only        Read-only mode; actions are disabled",
        DEFAULT_DEVNET_GATEWAY_URL, DEFAULT_TESTNET_GATEWAY_URL,
    );
    std::process::exit(0);
}

enum NetworkTarget {
    Local,
    Devnet { url: String },
    Testnet { url: String },
}

struct AppConfig {
    network: NetworkTarget,
    wallet_name: Option<String>,
    wallet_dir: Option<String>,
    watch_only: bool,
}

fn parse_cli_args() -> Result<AppConfig> {
    #[derive(Clone, Copy)]
    enum NetworkFlag {
        Local,
        Devnet,
        Testnet,
    }

    let mut args = std::env::args().skip(1);
    let mut network_flag: Option<NetworkFlag> = None;
    let mut custom_url: Option<String> = None;
    let mut wallet_name: Option<String> = None;
    let mut wallet_dir: Option<String> = None;
    let mut watch_only = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--local" | "--devnet" | "--testnet" => {
                if network_flag.is_some() {
                    return Err(eyre!(
                        "Multiple network flags provided; choose one of --local/--devnet/--testnet"
                    ));
                }
                network_flag = Some(match arg.as_str() {
                    "--local" => NetworkFlag::Local,
                    "--devnet" => NetworkFlag::Devnet,
                    _ => NetworkFlag::Testnet,
                });
            }
            "--rpc-url" => {
                let url = args
                    .next()
                    .ok_or_else(|| eyre!("--rpc-url requires a URL argument"))?;
                if custom_url.is_some() {
                    return Err(eyre!("--rpc-url may only be specified once"));
                }
                if network_flag.is_none() {
                    return Err(eyre!(
                        "--rpc-url must follow a network flag (--devnet/--testnet)"
                    ));
                }
                custom_url = Some(url);
            }
            "--wallet" => {
                let name = args
                    .next()
                    .ok_or_else(|| eyre!("--wallet requires a wallet name"))?;
                if wallet_name.is_some() {
                    return Err(eyre!("--wallet may only be specified once"));
                }
                wallet_name = Some(name);
            }
            "--wallet-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--wallet-dir requires a path argument"))?;
                if wallet_dir.is_some() {
                    return Err(eyre!("--wallet-dir may only be specified once"));
                }
                wallet_dir = Some(dir);
            }
            "--watch-only" => watch_only = true,
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    let network = match network_flag {
        None => {
            return Err(eyre!(
                "Select a network with --local, --devnet, or --testnet"
            ));
        }
        Some(NetworkFlag::Local) => {
            if custom_url.is_some() {
                return Err(eyre!("--rpc-url has no effect with --local"));
            }
            NetworkTarget::Local
        }
        Some(NetworkFlag::Devnet) => NetworkTarget::Devnet {
            url: custom_url.unwrap_or_else(|| DEFAULT_DEVNET_GATEWAY_URL.to_string()),
        },
        Some(NetworkFlag::Testnet) => NetworkTarget::Testnet {
            url: custom_url.unwrap_or_else(|| DEFAULT_TESTNET_GATEWAY_URL.to_string()),
        },
    };

    Ok(AppConfig {
        network,
        wallet_name,
        wallet_dir,
        watch_only,
    })
}

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "tamagosui-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

fn unlock_signer(config: &AppConfig) -> Result<Option<KeySigner>> {
    if config.watch_only {
        return Ok(None);
    }
    let Some(name) = config.wallet_name.as_deref() else {
        return Err(eyre!(
            "Specify --wallet <name> to select a wallet, or pass --watch-only"
        ));
    };
    let dir: PathBuf = wallets::resolve_wallet_dir(config.wallet_dir.as_deref())?;
    let descriptor = wallets::find_wallet(&dir, name)?;
    Ok(Some(wallets::unlock_wallet(&descriptor)?))
}

fn format_missing_deployment(env: DeploymentEnv, url: &str, store: &DeploymentStore) -> String {
    let mut message = format!("No deployment recorded for {env} at {url}.");
    message.push_str(&format!(
        "\nDeployment records file: {}",
        store.path().display()
    ));
    message.push_str(
        "\n\nRecord a published package for this network before connecting.",
    );
    message
}

async fn run_remote(
    env: DeploymentEnv,
    url: String,
    signer: Option<KeySigner>,
    watch_only: bool,
    label: &str,
) -> Result<()> {
    let store = DeploymentStore::new(env)?;
    let record = store
        .latest_for_network(&url)?
        .ok_or_else(|| eyre!(format_missing_deployment(env, &url, &store)))?;
    let clock_id = record
        .clock_id
        .as_deref()
        .map(str::parse::<ObjectId>)
        .transpose()
        .map_err(|err| eyre!("Deployment record contains an invalid clock id: {err:?}"))?
        .unwrap_or_else(ObjectId::zeroed);
    tracing::info!(package = %record.package_id, %url, "using recorded deployment");

    let ledger = HttpLedger::new(&url)?;
    let controller = AppController::new(ledger, signer, clock_id);
    app::run_app(controller, label.to_string(), watch_only).await
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _log_guard = init_tracing();
    deployment::ensure_structure()?;
    let config = parse_cli_args()?;
    let signer = unlock_signer(&config)?;
    let watch_only = signer.is_none();

    match config.network {
        NetworkTarget::Local => {
            tracing::info!("starting against an in-process ledger");
            let ledger = LocalLedger::new();
            if let Some(signer) = &signer {
                ledger.faucet(signer.address(), LOCAL_STARTING_GAS);
            }
            let controller = AppController::new(ledger, signer, ObjectId::zeroed());
            app::run_app(controller, "local".to_string(), watch_only).await
        }
        NetworkTarget::Devnet { url } => {
            tracing::info!("connecting to devnet at {url}");
            run_remote(DeploymentEnv::Dev, url, signer, watch_only, "devnet").await
        }
        NetworkTarget::Testnet { url } => {
            tracing::info!("connecting to testnet at {url}");
            run_remote(DeploymentEnv::Test, url, signer, watch_only, "testnet").await
        }
    }
}
