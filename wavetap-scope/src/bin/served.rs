//! Streaming daemon: read the pipe, forward batches to a TCP client.

use tokio::signal::unix::{self, SignalKind};
use tokio_util::{
    sync::CancellationToken,
    task::TaskTracker,
};

use wavetap_scope::config::Config;
use wavetap_scope::server;
use wavetap_scope::tracing::{self, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing::init();
    let config = Config::load()?;

    let running = CancellationToken::new();
    let tracker = TaskTracker::new();
    tracker.spawn(server::task(
        config.server.listen,
        config.pipe.path.clone(),
        config.server.batch_bytes,
        running.clone(),
    ));
    tracker.close();
    info!("Started.");

    let mut sigint = unix::signal(SignalKind::interrupt())?;
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }

    trace!("Shutting down.");
    running.cancel();

    tracker.wait().await;
    info!("Exiting.");
    Ok(())
}
