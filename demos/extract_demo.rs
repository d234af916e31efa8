//! Extract the standard features from a generated piece and print them.
//!
//! Usage:
//!   cargo run --example extract_demo
//!   cargo run --example extract_demo -- path/to/config.toml
//!
//! Set `RUST_LOG=debug` to see catalog and builder decisions.

use std::{env, fs};

use symfeat::{Event, EventStream, ExtractionConfig, FeatureValue, FeatureValues, Session};
use tracing_subscriber::EnvFilter;

/// Sixteen bars of rising arpeggios on two channels with a tempo change
/// halfway through.
fn generated_piece() -> EventStream {
    const TICKS_PER_BEAT: u16 = 480;
    let mut stream = EventStream::new(TICKS_PER_BEAT);
    let chord = [0u8, 4, 7, 12];
    let step = TICKS_PER_BEAT as i64 / 2;

    for bar in 0..16i64 {
        let bar_start = bar * 4 * TICKS_PER_BEAT as i64;
        if bar == 8 {
            stream.push(Event::tempo(bar_start, 400_000));
        }
        let root = 48 + (bar % 8) as u8 * 2;
        stream.push(Event::note_on(bar_start, 1, root - 12, 90));
        for (i, interval) in chord.iter().chain(chord.iter().rev()).enumerate() {
            let tick = bar_start + i as i64 * step;
            let velocity = 60 + (i as u8 * 7) % 40;
            stream.push(Event::note_on(tick, 0, root + interval, velocity));
            stream.push(Event::note_off(tick + step - 10, 0, root + interval));
        }
        stream.push(Event::note_off(bar_start + 4 * TICKS_PER_BEAT as i64 - 1, 1, root - 12));
    }
    stream.events.sort_by_key(|e| e.time);
    stream
}

fn format_value(value: &FeatureValue) -> String {
    match value.values() {
        None => "unavailable".to_string(),
        Some([single]) => format!("{single:.3}"),
        Some(values) if values.len() > 6 => format!("[{} values]", values.len()),
        Some(values) => {
            let parts: Vec<String> = values.iter().map(|v| format!("{v:.2}")).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Failed to read {}: {}", path, e);
                std::process::exit(1);
            });
            ExtractionConfig::from_toml_str(&text).unwrap_or_else(|e| {
                eprintln!("Invalid config {}: {}", path, e);
                std::process::exit(1);
            })
        }
        None => ExtractionConfig::default(),
    };

    let session = Session::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to set up extraction: {}", e);
        std::process::exit(1);
    });

    let stream = generated_piece();
    let matrix = session.extract(&stream).unwrap_or_else(|e| {
        eprintln!("Extraction failed: {}", e);
        std::process::exit(1);
    });

    println!("Events:   {}", stream.len());
    println!("Windows:  {}", matrix.window_count());
    println!("Features: {}", matrix.len());
    println!();

    for entry in matrix.entries() {
        println!("{}", entry.name());
        match entry.values() {
            Some(FeatureValues::Single(value)) => println!("  piece    {}", format_value(value)),
            Some(FeatureValues::Windowed(values)) => {
                for (i, value) in values.iter().enumerate() {
                    println!("  window {:<2} {}", i, format_value(value));
                }
                if let Some(mean) = matrix.overall_average(entry.name()) {
                    println!("  mean     {}", format_value(&mean));
                }
            }
            None => {
                if let Some(err) = entry.error() {
                    println!("  failed: {}", err);
                }
            }
        }
    }
}
