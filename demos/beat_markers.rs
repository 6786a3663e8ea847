//! Example: Print beat markers of a WAV file
//!
//! Usage: `cargo run --example beat_markers -- <file.wav>`

use liveclip_sync::{detect_beat_markers_with_config, load_wav_mono, BeatConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: beat_markers <file.wav>");
            std::process::exit(1);
        }
    };

    let (samples, sample_rate) = load_wav_mono(&path)?;
    let config = BeatConfig::default();
    let markers = detect_beat_markers_with_config(&samples, sample_rate, &config);

    println!(
        "{}: {:.2}s @ {} Hz, {} markers",
        path,
        samples.len() as f32 / sample_rate as f32,
        sample_rate,
        markers.len()
    );
    for pair in markers.windows(2) {
        println!("  {:8.3}s  (+{:.3}s)", pair[0], pair[1] - pair[0]);
    }
    if let Some(last) = markers.last() {
        println!("  {:8.3}s", last);
    }

    Ok(())
}
