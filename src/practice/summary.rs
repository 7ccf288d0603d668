// Session summary - What a finished practice run hands to the statistics store

use serde::{Deserialize, Serialize};

/// Raw facts of one practice run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Tempo active when the run ended
    pub bpm: f64,
    pub duration_seconds: f64,
}

impl SessionSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// External statistics store.
/// Consumes a finished session and returns the updated score.
pub trait ScoreRecorder {
    fn record_session(&mut self, summary: &SessionSummary) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json() {
        let summary = SessionSummary {
            bpm: 96.0,
            duration_seconds: 30.5,
        };
        let json = summary.to_json().unwrap();
        assert_eq!(json, r#"{"bpm":96.0,"duration_seconds":30.5}"#);

        let parsed: SessionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }
}
