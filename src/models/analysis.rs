//! Low-level audio analysis of a track.

use serde::{Deserialize, Serialize};

/// Structure and musical content of a track, precise to the audio sample.
///
/// Many values carry a `confidence` between 0.0 and 1.0; low values are
/// speculative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioAnalysis {
    /// Track-level summary.
    #[serde(default)]
    pub track: AnalysisSummary,

    #[serde(default)]
    pub bars: Vec<TimeInterval>,

    #[serde(default)]
    pub beats: Vec<TimeInterval>,

    /// The smallest rhythmic units.
    #[serde(default)]
    pub tatums: Vec<TimeInterval>,

    #[serde(default)]
    pub sections: Vec<Section>,

    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl AudioAnalysis {
    /// The section playing at `seconds`, if any.
    pub fn section_at(&self, seconds: f64) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| seconds >= s.start && seconds < s.start + s.duration)
    }
}

/// Track-level values of an [`AudioAnalysis`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSummary {
    /// Length in seconds.
    #[serde(default)]
    pub duration: f64,

    #[serde(default)]
    pub loudness: f64,

    /// Estimated tempo in BPM.
    #[serde(default)]
    pub tempo: f64,

    #[serde(default)]
    pub time_signature: i32,

    /// Pitch class, -1 when no key was detected.
    #[serde(default)]
    pub key: i32,

    /// 1 for major, 0 for minor.
    #[serde(default)]
    pub mode: i32,

    #[serde(default)]
    pub end_of_fade_in: f64,

    #[serde(default)]
    pub start_of_fade_out: f64,
}

/// A bar, beat or tatum.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimeInterval {
    /// Offset from the start of the track, in seconds.
    pub start: f64,
    pub duration: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// A large variation in rhythm or timbre, e.g. chorus or verse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub start: f64,
    pub duration: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub loudness: f64,
    #[serde(default)]
    pub tempo: f64,
    #[serde(default)]
    pub key: i32,
    #[serde(default)]
    pub mode: i32,
    #[serde(default)]
    pub time_signature: i32,
}

/// A short sound of roughly constant timbre.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub duration: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub loudness_start: f64,
    #[serde(default)]
    pub loudness_max: f64,
    #[serde(default)]
    pub loudness_max_time: f64,
    /// Relative dominance of the 12 pitch classes.
    #[serde(default)]
    pub pitches: Vec<f64>,
    #[serde(default)]
    pub timbre: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_find_section() {
        let analysis: AudioAnalysis = serde_json::from_str(
            r#"{
                "meta": {"analyzer_version": "4.0.0"},
                "track": {"duration": 207.95, "tempo": 118.2, "key": 2, "mode": 1, "time_signature": 4},
                "bars": [{"start": 0.06, "duration": 2.02, "confidence": 0.46}],
                "sections": [
                    {"start": 0.0, "duration": 6.97, "confidence": 1.0, "tempo": 113.2},
                    {"start": 6.97, "duration": 23.1, "confidence": 0.78, "tempo": 118.2}
                ],
                "segments": [{"start": 0.0, "duration": 0.14, "pitches": [1.0, 0.2], "timbre": [0.0]}]
            }"#,
        )
        .unwrap();
        assert_eq!(analysis.track.key, 2);
        assert_eq!(analysis.bars.len(), 1);
        assert_eq!(analysis.section_at(10.0).map(|s| s.tempo), Some(118.2));
        assert!(analysis.section_at(500.0).is_none());
        assert_eq!(analysis.segments[0].pitches.len(), 2);
    }
}
