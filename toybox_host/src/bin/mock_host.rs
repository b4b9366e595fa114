use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use toybox_host::{EditorLoop, NetworkThread, ParamStore, WS_ADDR};
use tracing_subscriber::EnvFilter;

/// Serves the editor bridge over WebSocket with in-memory parameters, so a UI
/// build can run outside a plug-in host.
#[derive(Parser, Debug)]
#[command(name = "mock_host", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "TOYBOX_WS_ADDR", default_value = WS_ADDR)]
    addr: String,

    /// Write the bound address to this file once listening.
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Exit after this many milliseconds.
    #[arg(long)]
    run_for_ms: Option<u64>,

    /// Editor loop period.
    #[arg(long, default_value_t = 33)]
    tick_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let (in_tx, in_rx) = bounded(toybox_host::INBOUND_CAP);
    let (out_tx, out_rx) = bounded(toybox_host::OUTBOUND_CAP);

    let net = NetworkThread::spawn_with_addr(&args.addr, in_tx, out_rx)
        .with_context(|| format!("failed to listen on {}", args.addr))?;

    if let Some(path) = &args.addr_file {
        fs::write(path, net.listen_addr().to_string())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    println!("mock_host listening on ws://{}", net.listen_addr());

    let params = ParamStore::new();
    let mut editor = EditorLoop::new(in_rx, out_tx);
    let tick = Duration::from_millis(args.tick_ms.max(1));
    let run_for = args.run_for_ms.map(Duration::from_millis);

    let start = Instant::now();
    loop {
        editor.tick(&params);
        thread::sleep(tick);
        if let Some(max) = run_for {
            if start.elapsed() >= max {
                break;
            }
        }
    }

    net.shutdown();
    Ok(())
}
