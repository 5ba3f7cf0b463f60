//! Partyline - terminal chat hub
//!
//! Hosts (or dials) a TLS-encrypted chat hub and drives the terminal
//! interface. Logging goes to a file because stdout belongs to the TUI.

use std::fs::File;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use partyline_app::{App, Runtime};
use partyline_core::ContactDirectory;
use partyline_net::{tls, Hub};

/// Terminal chat hub with TLS transport
#[derive(Parser, Debug)]
#[command(name = "partyline")]
#[command(about = "Terminal chat hub: encrypted sessions, contact routing")]
#[command(version)]
struct Args {
    /// Port to listen on in hosting mode
    #[arg(short, long, default_value_t = partyline_net::DEFAULT_PORT)]
    port: u16,

    /// TLS certificate chain (PEM), required for hosting
    #[arg(long)]
    cert: Option<PathBuf>,

    /// TLS private key (PEM), required for hosting
    #[arg(long)]
    key: Option<PathBuf>,

    /// Generate a throwaway self-signed certificate instead
    #[arg(long)]
    self_signed: bool,

    /// Dial a remote hub (HOST:PORT) instead of hosting
    #[arg(long)]
    connect: Option<String>,

    /// CA certificate (PEM) to trust in connect mode
    #[arg(long)]
    ca: Option<PathBuf>,

    /// Contact directory file
    #[arg(long, default_value = "contacts.json")]
    contacts: PathBuf,

    /// Log file (stdout is the TUI)
    #[arg(long, default_value = "partyline.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    tracing::info!("Starting Partyline");

    let (hub, hub_events) = Hub::new();

    if let Some(addr) = &args.connect {
        let ca = args
            .ca
            .as_deref()
            .ok_or("connect mode requires --ca CERT_PEM")?;
        let connector = tls::client_config(ca)?;
        let server_name = addr.rsplit_once(':').map_or(addr.as_str(), |(host, _)| host);
        hub.connect(addr, connector, server_name).await?;
    } else {
        let acceptor = if args.self_signed {
            tls::self_signed()?.0
        } else {
            match (&args.cert, &args.key) {
                (Some(cert), Some(key)) => tls::server_config(cert, key)?,
                _ => return Err("hosting requires --cert and --key (or --self-signed)".into()),
            }
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
        hub.listen(addr, acceptor).await?;
    }

    let contacts = ContactDirectory::load(&args.contacts);
    let app = App::new(contacts, 1);

    let runtime = Runtime::new(hub, hub_events, app, args.contacts.clone())?;
    runtime.run().await?;

    Ok(())
}
