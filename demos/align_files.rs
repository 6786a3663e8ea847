//! Example: Align a video clip's audio against a master recording
//!
//! Usage: `cargo run --example align_files -- <video.wav> <master.wav> [max_shift_seconds]`
//!
//! Set `RUST_LOG=debug` to see the pipeline stages.

use liveclip_sync::{
    estimate_sync_candidates, load_wav_mono, SyncError, DEFAULT_CANDIDATE_LIMIT,
    DEFAULT_MAX_SHIFT_SECONDS,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <video.wav> <master.wav> [max_shift_seconds]", args[0]);
        std::process::exit(1);
    }

    let max_shift = match args.get(3) {
        Some(value) => value.parse::<f32>()?,
        None => DEFAULT_MAX_SHIFT_SECONDS,
    };

    let (video, video_rate) = load_wav_mono(&args[1])?;
    let (master, master_rate) = load_wav_mono(&args[2])?;
    if video_rate != master_rate {
        return Err(SyncError::InvalidParameter(format!(
            "sample rates differ ({} Hz vs {} Hz), resample first",
            video_rate, master_rate
        ))
        .into());
    }

    let candidates = estimate_sync_candidates(
        &video,
        &master,
        video_rate,
        max_shift,
        DEFAULT_CANDIDATE_LIMIT,
    )?;

    println!("Sync candidates (max shift {:.1}s):", max_shift);
    if candidates.is_empty() {
        println!("  none, inputs too short to overlap");
    }
    for (rank, c) in candidates.iter().enumerate() {
        println!(
            "  #{} lag {:+.3}s  score {:.3} (amp {:.3}, vocal {:.3})  ratio {:.2}{}",
            rank + 1,
            c.lag_seconds,
            c.score,
            c.amp_score,
            c.vocal_score,
            c.score_ratio,
            if c.injected { "  [end anchor]" } else { "" }
        );
    }

    Ok(())
}
