//! The acquisition loop.
//!
//! One tight blocking loop on a dedicated thread: pull a sample from the
//! source, push two bytes into the pipe, repeat. There is no buffering on
//! this side; the pipe is the only queue.

use std::io::Write;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::source::SampleSource;
use crate::tracing::prelude::*;

/// Entry point for the sampler thread.
pub fn task(
    mut source: Box<dyn SampleSource + Send>,
    mut writer: impl Write,
    running: CancellationToken,
) {
    trace!("Sampler started.");
    if let Err(err) = run(source.as_mut(), &mut writer, &running) {
        error!("Acquisition stopped: {err}");
    }
    trace!("Sampler stopped.");
}

/// One sample in, two little-endian bytes out, until cancelled.
///
/// Any source or pipe error ends the loop; a write fails with EPIPE when
/// the reader goes away, and there is no reconnect.
pub fn run(
    source: &mut dyn SampleSource,
    writer: &mut impl Write,
    running: &CancellationToken,
) -> Result<()> {
    while !running.is_cancelled() {
        let sample = source.next_sample()?;
        writer.write_all(&sample.to_le_bytes())?;
    }
    Ok(())
}
