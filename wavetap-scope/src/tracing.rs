//! Tracing setup shared by the wavetap binaries.
//!
//! Binaries call [`init`] once at startup to install a subscriber. Everything
//! else imports `crate::tracing::prelude::*` for the usual `trace!()` through
//! `error!()` macros.

use std::env;
use time::OffsetDateTime;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{format::Writer, time::FormatTime},
    prelude::*,
};

pub mod prelude {
    #[allow(unused_imports)]
    pub use tracing::{trace, debug, info, warn, error};
}

use prelude::*;

/// Install the process-wide subscriber.
///
/// Under systemd (detected via JOURNAL_STREAM) events go to journald, which
/// adds its own timestamps. Everywhere else they go to stdout.
pub fn init() {
    if env::var("JOURNAL_STREAM").is_ok() {
        match tracing_journald::layer() {
            Ok(layer) => tracing_subscriber::registry().with(layer).init(),
            Err(_) => {
                init_stdout();
                warn!("Could not connect to journald, logging to stdout.");
            }
        }
    } else {
        init_stdout();
    }
}

// Stdout subscriber. RUST_LOG selects the filter; the default level is INFO
// rather than tracing's usual ERROR so the daemons say what they're doing.
fn init_stdout() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_timer(ClockTime))
        .init();
}

// Short wall-clock timestamps. Falls back to UTC when the local offset is
// unavailable (e.g. in a container without tz data).
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = OffsetDateTime::now_local().unwrap_or(OffsetDateTime::now_utc());
        let stamp = now
            .format(time::macros::format_description!("[hour]:[minute]:[second]"))
            .map_err(|_| std::fmt::Error)?;
        write!(w, "{stamp}")
    }
}
