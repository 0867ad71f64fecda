use camrec::{RecorderConfig, RecordingSession};
use std::env;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    camrec::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: camrec <host> <user> <password> [segment-minutes]");
        std::process::exit(1);
    }

    let mut config = RecorderConfig::new(&args[1], &args[2], &args[3]);
    if let Some(minutes) = args.get(4) {
        let minutes: u64 = minutes.parse().map_err(|_| {
            format!("segment-minutes must be a positive integer, got '{}'", minutes)
        })?;
        if minutes == 0 {
            eprintln!("segment-minutes must be at least 1");
            std::process::exit(1);
        }
        config = config.with_segment_duration(Duration::from_secs(minutes * 60));
    }

    let session = RecordingSession::start(config)?;

    let stop = session.stop_handle();
    ctrlc::set_handler(move || {
        log::info!("Interrupt received, stopping after the current frame");
        stop.stop();
    })?;

    match session.wait() {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Recording session failed: {}", e);
            std::process::exit(1);
        }
    }
}
