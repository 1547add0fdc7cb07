//! Offline dissector for raw wavetap captures.
//!
//! A capture is whatever came out of the pipe, dumped to a file
//! (`cat /tmp/adc_data_pipe > capture.bin` or a saved TCP stream): bare
//! little-endian `u16` samples, nothing else. This prints waveform
//! statistics, frequency estimates, and optionally the first triggered
//! waveform.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;

use wavetap_scope::spectrum;
use wavetap_scope::trigger::{self, Slope, TriggerCapture};
use wavetap_scope::types::{decode_stream, RawSample};

#[derive(Parser)]
#[command(name = "wavetap-dissect", version, about)]
struct Args {
    /// Capture file of little-endian u16 samples
    capture: PathBuf,

    /// Sample rate the capture was taken at, in Hz
    #[arg(long, default_value_t = 30_000.0)]
    sample_rate: f64,

    /// Extract the first waveform crossing the trigger level on this slope
    #[arg(long, value_enum)]
    trigger: Option<SlopeArg>,

    /// Trigger level in counts
    #[arg(long, default_value_t = trigger::DEFAULT_THRESHOLD)]
    level: u16,

    /// Also hex-dump the first bytes of the file
    #[arg(long)]
    raw: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SlopeArg {
    Rising,
    Falling,
}

impl From<SlopeArg> for Slope {
    fn from(arg: SlopeArg) -> Self {
        match arg {
            SlopeArg::Rising => Slope::Rising,
            SlopeArg::Falling => Slope::Falling,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let bytes = std::fs::read(&args.capture)
        .with_context(|| format!("read {}", args.capture.display()))?;
    let samples = decode_stream(&bytes);
    if samples.is_empty() {
        bail!("{}: no complete samples", args.capture.display());
    }

    println!(
        "{}",
        format!(
            "{}: {} samples, {:.3} s at {} Hz",
            args.capture.display(),
            samples.len(),
            samples.len() as f64 / args.sample_rate,
            args.sample_rate,
        )
        .bold()
    );
    if bytes.len() % RawSample::WIRE_BYTES != 0 {
        println!("{}", "  trailing odd byte ignored (truncated capture?)".yellow());
    }
    if args.raw {
        let head = &bytes[..bytes.len().min(32)];
        println!("  head: {}", hex::encode(head));
    }

    let suspect = samples.iter().filter(|s| s.out_of_range()).count();
    if suspect > 0 {
        println!(
            "{}",
            format!("  {suspect} words above full scale (noise or desync?)").red()
        );
    }

    let stats = spectrum::stats(&samples).expect("capture is non-empty");
    println!("  min  {}", stats.min);
    println!("  max  {}", stats.max);
    println!(
        "  mean {:.1} counts, Vpp {:.3} V",
        stats.mean_counts,
        stats.peak_to_peak_volts()
    );
    println!("  suggested trigger level: {} counts", stats.suggested_trigger());

    match spectrum::dominant_frequency(&samples, args.sample_rate) {
        Some(freq) => println!("  dominant frequency: {}", format!("{freq:.1} Hz").green()),
        None => println!("  dominant frequency: {}", "none (flat capture)".yellow()),
    }
    if let Some(freq) = spectrum::zero_crossing_frequency(&samples, args.sample_rate) {
        println!("  mean-crossing estimate: {freq:.1} Hz");
    }

    if let Some(slope) = args.trigger {
        dissect_triggered(&samples, slope.into(), args.level);
    }

    Ok(())
}

/// Run the stream through the edge trigger and report the first capture.
fn dissect_triggered(samples: &[RawSample], slope: Slope, level: u16) {
    let mut capture = TriggerCapture::new(
        slope,
        level,
        trigger::DEFAULT_PRE_SAMPLES,
        trigger::DEFAULT_POST_SAMPLES,
    );
    for (i, &sample) in samples.iter().enumerate() {
        if let Some(wave) = capture.push(sample) {
            let stats = spectrum::stats(&wave).expect("captured waveform is non-empty");
            println!(
                "{}",
                format!("  triggered waveform ending at sample {i}:").bold()
            );
            println!(
                "    {} samples, {} .. {} counts, Vpp {:.3} V",
                wave.len(),
                stats.min.counts(),
                stats.max.counts(),
                stats.peak_to_peak_volts()
            );
            return;
        }
    }
    println!(
        "{}",
        format!("  no {slope:?}-edge crossing of {level} counts").yellow()
    );
}
