use rudiment_metronome::ui::app::MetronomeApp;
use rudiment_metronome::{
    AudioEngine, LookaheadTimer, MetronomeConfig, PracticeSession, create_click_channel,
};
use std::sync::{Arc, Mutex};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("rudiment_metronome=info"),
    )
    .init();

    log::info!("=== Rudiment Metronome ===");

    let config = MetronomeConfig::load_or_default();

    // Clicks flow one way: practice session -> audio callback
    let (click_tx, click_rx) = create_click_channel(config.click_queue_capacity);

    log::info!("Audio engine initialisation...");
    let audio_engine = match AudioEngine::new(click_rx) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };

    let session = Arc::new(Mutex::new(PracticeSession::new(
        audio_engine.clock(),
        click_tx,
        &config,
    )));

    // Clicks are queued from the timer thread; the UI only renders
    let timer = match LookaheadTimer::spawn(Arc::clone(&session)) {
        Ok(timer) => timer,
        Err(e) => {
            log::error!("Could not start the lookahead timer: {}", e);
            return;
        }
    };
    let dropped = audio_engine.dropped_clicks();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 360.0])
            .with_title("Rudiment Metronome"),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Rudiment Metronome",
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(MetronomeApp::new(session, timer, dropped, config)))
        }),
    ) {
        log::error!("UI error: {}", e);
    }

    // The stream must outlive the UI
    drop(audio_engine);
}
