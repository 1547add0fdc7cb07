//! Named pipe plumbing between the sampler and the server.
//!
//! The sampler holds the write end for its whole lifetime; the server opens
//! the read end per client. Both opens use normal blocking FIFO semantics:
//! each side waits until the other end exists.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use nix::errno::Errno;
use nix::sys::stat::Mode;
use nix::unistd;

use crate::error::{Error, Result};

/// Where the two daemons meet unless configured otherwise.
pub const DEFAULT_PATH: &str = "/tmp/adc_data_pipe";

/// Create the FIFO if it doesn't already exist.
///
/// Mode 0666 so the sampler and server don't have to share a user. A
/// pre-existing FIFO is fine; a pre-existing regular file is not.
pub fn create(path: &Path) -> Result<()> {
    match unistd::mkfifo(path, Mode::from_bits_truncate(0o666)) {
        Ok(()) => Ok(()),
        Err(Errno::EEXIST) => {
            if std::fs::metadata(path)?.file_type().is_fifo() {
                Ok(())
            } else {
                Err(Error::Pipe(format!(
                    "{} exists and is not a FIFO",
                    path.display()
                )))
            }
        }
        Err(err) => Err(Error::Pipe(format!(
            "mkfifo {}: {err}",
            path.display()
        ))),
    }
}

/// Open the write end. Blocks until a reader has the other end.
pub fn open_writer(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().write(true).open(path)?)
}

/// Open the read end. Blocks until a writer has the other end.
pub fn open_reader(path: &Path) -> Result<File> {
    Ok(File::open(path)?)
}
