//! Tally terminal client.
//!
//! Two run modes:
//!
//! - `tally --local` runs against an in-process chain with an ephemeral
//!   wallet. Nothing survives exit. Good for trying the UI.
//! - `tally --rpc-url <URL> --package <ADDR>` runs against a real chain
//!   endpoint. The wallet key lives in a file under the user config dir
//!   and is created on first connect.

mod app;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};
use crossterm::event::{Event, KeyEventKind};
use tracing_subscriber::EnvFilter;

use tally_core::{Address, ChainClient, MemoryChain, RpcChainClient, SessionConfig, TodoSession, Wallet};

use app::App;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Todo lists kept on a Move-style chain")]
struct Args {
    /// Chain JSON-RPC endpoint
    #[arg(long, env = "TALLY_RPC_URL")]
    rpc_url: Option<String>,

    /// Address of the published todo package (required with --rpc-url)
    #[arg(long, env = "TALLY_PACKAGE")]
    package: Option<String>,

    /// Run against an in-process chain with an ephemeral wallet
    #[arg(long)]
    local: bool,

    /// Wallet key file (defaults to the user config dir)
    #[arg(long, env = "TALLY_WALLET")]
    wallet: Option<PathBuf>,

    /// Append debug logs to this file (the TUI owns the terminal)
    #[arg(long, env = "TALLY_DEBUG_LOG")]
    debug_log: Option<PathBuf>,
}

/// Package address served by the in-process chain in local mode.
const LOCAL_PACKAGE: [u8; 32] = [0x02; 32];

fn default_wallet_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("tally").join("wallet.key"))
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.debug_log {
        let file = std::fs::File::create(path)
            .wrap_err_with(|| format!("cannot open debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tally=debug,tally_core=debug".into()),
            )
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let mut app = match (args.local, args.rpc_url) {
        (false, Some(rpc_url)) => {
            let Some(package) = args.package.as_deref() else {
                bail!("--package is required with --rpc-url");
            };
            let package = Address::parse(package).wrap_err("invalid --package address")?;
            let wallet_path = args
                .wallet
                .or_else(default_wallet_path)
                .ok_or_else(|| color_eyre::eyre::eyre!("no config dir; pass --wallet"))?;

            let chain: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(rpc_url));
            let session = TodoSession::new(chain, SessionConfig { package });
            App::new(session, Some(wallet_path))
        }
        _ => {
            // In-process chain, ephemeral identity, connected from the start.
            let package = Address::from_bytes(&LOCAL_PACKAGE);
            let chain: Arc<dyn ChainClient> = Arc::new(MemoryChain::new(package.clone()));
            let mut session = TodoSession::new(chain, SessionConfig { package });
            session
                .connect(Wallet::generate())
                .await
                .wrap_err("failed to start local session")?;
            App::new(session, None)
        }
    };

    // Crossterm's blocking reader runs on its own thread; the async loop
    // below only ever waits on the channel.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        match crossterm::event::read() {
            Ok(event) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app, &mut rx).await;
    ratatui::restore();
    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<Event>,
) -> color_eyre::Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let Some(event) = events.recv().await else {
            return Ok(());
        };
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key).await;
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
