//! Acquisition daemon: bit-bang the converter, stream samples into the pipe.

use tokio::signal::unix::{self, SignalKind};
use tokio_util::{
    sync::CancellationToken,
    task::TaskTracker,
};

use wavetap_scope::config::{Config, SourceKind};
use wavetap_scope::source::{self, SampleSource, SineSource};
use wavetap_scope::tracing::{self, prelude::*};
use wavetap_scope::{pipe, sampler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing::init();
    let config = Config::load()?;

    let source: Box<dyn SampleSource + Send> = match config.source.kind {
        SourceKind::Gpio => Box::new(source::open_gpio_source()?),
        SourceKind::Sine => {
            let sine = &config.source.sine;
            Box::new(SineSource::new(
                sine.frequency,
                sine.sample_rate,
                sine.amplitude,
            ))
        }
    };

    pipe::create(&config.pipe.path)?;
    info!("Waiting for a pipe reader on {}.", config.pipe.path.display());
    let writer = pipe::open_writer(&config.pipe.path)?;

    let running = CancellationToken::new();
    let tracker = TaskTracker::new();
    let token = running.clone();
    let mut acquisition = tracker.spawn_blocking(move || sampler::task(source, writer, token));
    tracker.close();
    info!("Started.");

    let mut sigint = unix::signal(SignalKind::interrupt())?;
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        _ = &mut acquisition => {},
    }

    trace!("Shutting down.");
    running.cancel();

    tracker.wait().await;
    info!("Exiting.");
    Ok(())
}
