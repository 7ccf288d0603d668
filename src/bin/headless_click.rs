// Headless click track: plays for a fixed time without the UI

use clap::Parser;
use rudiment_metronome::{
    AudioEngine, Command, LookaheadTimer, MetronomeConfig, PracticeSession, Tempo,
    create_click_channel,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const FRAME_INTERVAL: Duration = Duration::from_millis(5);

/// Longest run accepted on the command line
const MAX_SECONDS: f64 = 3600.0;

#[derive(Parser, Debug)]
#[command(name = "headless_click")]
#[command(about = "Play the click track for a fixed time without the UI", long_about = None)]
struct Args {
    /// Tempo in beats per minute (default: saved settings)
    #[arg(long, value_parser = parse_bpm)]
    bpm: Option<f64>,

    /// Run length in seconds
    #[arg(long, default_value_t = 10.0, value_parser = parse_seconds)]
    seconds: f64,
}

fn parse_bpm(arg: &str) -> Result<f64, String> {
    let bpm: f64 = arg.parse().map_err(|_| format!("'{}' is not a number", arg))?;
    if !(Tempo::MIN_BPM..=Tempo::MAX_BPM).contains(&bpm) {
        return Err(format!(
            "tempo must be between {} and {} BPM",
            Tempo::MIN_BPM,
            Tempo::MAX_BPM
        ));
    }
    Ok(bpm)
}

fn parse_seconds(arg: &str) -> Result<f64, String> {
    let seconds: f64 = arg.parse().map_err(|_| format!("'{}' is not a number", arg))?;
    if !(seconds > 0.0 && seconds <= MAX_SECONDS) {
        return Err(format!("run length must be in (0, {}] seconds", MAX_SECONDS));
    }
    Ok(seconds)
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("rudiment_metronome=info,headless_click=info"),
    )
    .init();

    let args = Args::parse();
    let config = MetronomeConfig::load_or_default();

    let (click_tx, click_rx) = create_click_channel(config.click_queue_capacity);
    let audio_engine = match AudioEngine::new(click_rx) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let mut dropped = audio_engine.dropped_clicks();

    let mut session = PracticeSession::new(audio_engine.clock(), click_tx, &config);
    if let Some(bpm) = args.bpm {
        session.apply(Command::SetBpm(bpm)).ok();
    }
    if let Err(e) = session.apply(Command::Start) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    let deadline = session.scheduler().start_time() + args.seconds;

    let session = Arc::new(Mutex::new(session));
    let mut timer = match LookaheadTimer::spawn(Arc::clone(&session)) {
        Ok(timer) => timer,
        Err(e) => {
            log::error!("Could not start the lookahead timer: {}", e);
            std::process::exit(1);
        }
    };

    let mut last_beat = None;
    loop {
        {
            let Ok(mut session) = session.lock() else {
                break;
            };
            let now = session.scheduler().current_time();
            if now >= deadline {
                break;
            }
            let frame = session.frame();
            if frame.beat_index.is_some() && frame.beat_index != last_beat {
                log::info!("Beat {} ({:.3}s)", frame.beat_index.map_or(0, |b| b + 1), now);
                last_beat = frame.beat_index;
            }
        }
        dropped.report();
        std::thread::sleep(FRAME_INTERVAL);
    }
    timer.stop();

    let summary = session.lock().ok().and_then(|mut session| session.stop());
    if let Some(summary) = summary {
        match summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("{}", e),
        }
    }
    dropped.report();
}
