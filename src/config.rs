// Configuration - Persistent user settings (RON file in the platform config dir)

use crate::sequencer::rudiment::PatternLibrary;
use crate::sequencer::scheduler::{SchedulerTiming, TempoChangePolicy};
use crate::sequencer::sync::SyncTuning;
use crate::sequencer::timeline::{SubdivisionKind, Tempo, TimeSignature};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "rudiment-metronome";
const CONFIG_FILE_NAME: &str = "config.ron";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No configuration directory available on this platform")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Lookahead and render-sync timing, in milliseconds / beat fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub lookahead_interval_ms: f64,
    pub schedule_ahead_ms: f64,
    pub start_latency_ms: f64,
    pub sync_epsilon_ms: f64,
    pub swap_window: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lookahead_interval_ms: 25.0,
            schedule_ahead_ms: 100.0,
            start_latency_ms: 100.0,
            sync_epsilon_ms: 20.0,
            swap_window: 0.1,
        }
    }
}

impl TimingConfig {
    pub fn scheduler_timing(&self) -> SchedulerTiming {
        SchedulerTiming {
            lookahead_interval: self.lookahead_interval_ms.max(1.0) / 1000.0,
            schedule_ahead: self.schedule_ahead_ms.max(1.0) / 1000.0,
            start_latency: self.start_latency_ms.max(0.0) / 1000.0,
        }
    }

    pub fn sync_tuning(&self) -> SyncTuning {
        SyncTuning {
            epsilon: self.sync_epsilon_ms.max(0.0) / 1000.0,
            swap_window: self.swap_window.clamp(0.0, 1.0),
        }
    }
}

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetronomeConfig {
    pub bpm: f64,
    pub volume: f32,
    /// Catalog name, e.g. "4/4" or "6/8"
    pub time_signature: String,
    pub audio_subdivision: SubdivisionKind,
    pub visual_subdivision: SubdivisionKind,
    pub rudiment_id: String,
    pub tempo_change: TempoChangePolicy,
    pub timing: TimingConfig,
    /// Capacity of the click queue to the audio thread
    pub click_queue_capacity: usize,
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            bpm: 100.0,
            volume: 0.7,
            time_signature: "4/4".to_string(),
            audio_subdivision: SubdivisionKind::Quarter,
            visual_subdivision: SubdivisionKind::Sixteenth,
            rudiment_id: "single-stroke-roll".to_string(),
            tempo_change: TempoChangePolicy::NextBeat,
            timing: TimingConfig::default(),
            click_queue_capacity: 256,
        }
    }
}

impl MetronomeConfig {
    /// Default config file location
    pub fn default_path() -> ConfigResult<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location. Missing or unreadable files yield defaults.
    pub fn load_or_default() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(e) => {
                log::warn!("{}, using default settings", e);
                return Self::default();
            }
        };
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Settings loaded from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and sanitize a config file
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = ron::from_str(&text)?;
        Ok(config.sanitized())
    }

    /// Save to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Write as pretty RON, creating parent directories
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Clamp ranges and replace unknown catalog references with defaults
    pub fn sanitized(mut self) -> Self {
        self.bpm = Tempo::new(self.bpm).bpm();
        self.volume = if self.volume.is_nan() {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0)
        };
        if TimeSignature::from_name(&self.time_signature).is_none() {
            log::warn!("Unknown time signature '{}', using 4/4", self.time_signature);
            self.time_signature = TimeSignature::four_four().name.to_string();
        }
        if PatternLibrary::find(&self.rudiment_id).is_none() {
            let fallback = PatternLibrary::get_or_default(&self.rudiment_id);
            log::warn!("Unknown rudiment '{}', using {}", self.rudiment_id, fallback.id);
            self.rudiment_id = fallback.id.to_string();
        }
        self.click_queue_capacity = self.click_queue_capacity.max(16);
        self
    }

    /// Resolved time signature (4/4 when the name is unknown)
    pub fn time_signature(&self) -> TimeSignature {
        TimeSignature::from_name(&self.time_signature).unwrap_or_default()
    }
}
