//! ttlkv Daemon - RPC and HTTP front ends for the TTL key-value store

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info};
use ttlkv::{Reclaimer, Store, StoreConfig};
use ttlkvd::{http, rpc, CommandHandler};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RPC bind address
    #[arg(long, env = "TTLKV_RPC_BIND", default_value = "127.0.0.1:1234")]
    rpc_bind: String,

    /// HTTP bind address
    #[arg(long, env = "TTLKV_HTTP_BIND", default_value = "127.0.0.1:6060")]
    http_bind: String,

    /// Seconds between sweeps of expired keys
    #[arg(short, long, env = "TTLKV_RECLAIM_INTERVAL", default_value_t = 10)]
    reclaim_interval: u64,

    /// Health check mode (for Docker)
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    // Health check
    if args.health {
        match TcpStream::connect(&args.rpc_bind).await {
            Ok(_) => {
                println!("OK");
                std::process::exit(0);
            }
            Err(_) => {
                eprintln!("FAILED");
                std::process::exit(1);
            }
        }
    }

    let config =
        StoreConfig::new().with_reclaim_interval(Duration::from_secs(args.reclaim_interval));
    config.validate()?;

    info!("Starting ttlkv daemon v{}", env!("CARGO_PKG_VERSION"));
    info!("Reclaim interval: {}s", args.reclaim_interval);

    let store = Arc::new(Store::new());
    let mut reclaimer = Reclaimer::spawn(Arc::clone(&store), config.reclaim_interval);
    let handler = CommandHandler::new(Arc::clone(&store));

    let rpc_listener = TcpListener::bind(&args.rpc_bind)
        .await
        .with_context(|| format!("Failed to bind RPC listener on {}", args.rpc_bind))?;
    info!("RPC server listening on {}", args.rpc_bind);

    let http_listener = TcpListener::bind(&args.http_bind)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", args.http_bind))?;
    info!("HTTP server listening on {}", args.http_bind);

    let (shutdown_tx, _) = broadcast::channel(1);

    let rpc_task = tokio::spawn(rpc::serve(
        rpc_listener,
        handler.clone(),
        shutdown_tx.subscribe(),
    ));

    let http_shutdown = shutdown_tx.subscribe();
    let http_task = tokio::spawn(async move {
        if let Err(e) = http::serve(http_listener, handler, http_shutdown).await {
            error!("HTTP server error: {}", e);
        }
    });

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║          ttlkv Server Ready!                                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("\n📡 RPC (newline-delimited JSON over TCP): {}", args.rpc_bind);
    println!(
        "   {{\"id\":1,\"method\":\"Store.Set\",\"params\":{{\"key\":\"foo\",\"value\":\"bar\",\"ttl\":60}}}}"
    );
    println!("\n🌐 HTTP: http://{}", args.http_bind);
    println!(
        "   curl -X POST -H 'Content-Type: application/json' -d '{{\"key\":\"foo\",\"value\":\"bar\",\"ttl\":60}}' http://{}/set",
        args.http_bind
    );
    println!("   curl 'http://{}/get?key=foo'", args.http_bind);
    println!("   curl -X DELETE 'http://{}/delete?key=foo'", args.http_bind);
    println!("\n🛑 Press Ctrl+C to stop\n");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
        }
        stopped = reclaimer.stopped() => {
            // The reclaimer never exits on its own; this is a broken invariant
            stopped?;
            anyhow::bail!("Reclaimer exited unexpectedly");
        }
    }

    let _ = shutdown_tx.send(());
    let _ = rpc_task.await;
    let _ = http_task.await;
    reclaimer.shutdown().await?;

    let stats = store.stats();
    info!(
        keys = store.len(),
        sets = stats.sets(),
        hits = stats.hits(),
        misses = stats.misses(),
        lazy_expirations = stats.lazy_expirations(),
        reclaimed = stats.reclaimed(),
        "Shutdown complete (hit ratio {:.2})",
        stats.hit_ratio()
    );

    Ok(())
}
