//! Domain types shared across the crate.

pub mod sample;

pub use sample::{decode_stream, RawSample};
