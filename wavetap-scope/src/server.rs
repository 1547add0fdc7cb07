//! Pipe-to-TCP batch forwarder.
//!
//! Reads the named pipe and forwards its byte stream to one TCP client at a
//! time in fixed-size batches. Bytes are forwarded verbatim; this side never
//! parses samples.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::pipe;
use crate::tracing::prelude::*;

/// Bytes accumulated before each send: 2000 samples.
pub const DEFAULT_BATCH_BYTES: usize = 4000;

/// Task for serving pipe data over TCP.
pub async fn task(
    listen: SocketAddr,
    pipe_path: PathBuf,
    batch_bytes: usize,
    running: CancellationToken,
) {
    trace!("Server task started.");
    if let Err(err) = run(listen, &pipe_path, batch_bytes, &running).await {
        error!("Server stopped: {err}");
    }
    trace!("Server task finished.");
}

async fn run(
    listen: SocketAddr,
    pipe_path: &Path,
    batch_bytes: usize,
    running: &CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(listen).await?;
    info!("Waiting for TCP connection on {listen}.");

    loop {
        let (mut client, peer) = tokio::select! {
            _ = running.cancelled() => return Ok(()),
            accepted = listener.accept() => accepted?,
        };
        info!("Connected to {peer}.");

        // Blocks until the sampler has the write end open.
        let path = pipe_path.to_owned();
        let pipe = tokio::select! {
            _ = running.cancelled() => return Ok(()),
            opened = tokio::task::spawn_blocking(move || pipe::open_reader(&path)) => {
                match opened {
                    Ok(opened) => tokio::fs::File::from_std(opened?),
                    Err(err) => return Err(Error::Pipe(format!("pipe open task: {err}"))),
                }
            }
        };
        match forward(pipe, &mut client, batch_bytes, running).await {
            Ok(()) => info!("Stream to {peer} ended."),
            Err(err) => warn!("Client {peer} dropped: {err}"),
        }

        if running.is_cancelled() {
            return Ok(());
        }
    }
}

/// Accumulate pipe bytes and flush whole batches to the client.
///
/// Returns on pipe EOF (the sampler exited) or cancellation. A partial
/// batch left in the buffer at that point is dropped; clients only ever
/// see full batches.
async fn forward(
    mut pipe: impl AsyncRead + Unpin,
    client: &mut (impl AsyncWrite + Unpin),
    batch_bytes: usize,
    running: &CancellationToken,
) -> Result<()> {
    let mut chunk = vec![0u8; batch_bytes];
    let mut buffer = BytesMut::with_capacity(batch_bytes * 2);

    loop {
        let n = tokio::select! {
            _ = running.cancelled() => return Ok(()),
            read = pipe.read(&mut chunk) => read?,
        };
        if n == 0 {
            debug!("Pipe writer went away.");
            return Ok(());
        }

        buffer.extend_from_slice(&chunk[..n]);
        if buffer.len() >= batch_bytes {
            client.write_all(&buffer).await?;
            buffer.clear();
        }
    }
}
