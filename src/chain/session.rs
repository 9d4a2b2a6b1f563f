use serde::{Deserialize, Serialize};

use crate::params::{self, MicPreset};

use super::handles::HandleTable;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Stopped,
    Running,
}

/// The logical values the user has dialed in. These survive chain rebuilds
/// and are what gets written to `settings.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub mic_gain: f32,
    pub global_gain: f32,
    pub requested_delay_ms: f32,
    pub feedback_enabled: bool,
    pub mic_preset: MicPreset,
    pub pitch_ratio: f32,
    pub pitch_mix: f32,
    pub noise_suppression_enabled: bool,
    pub preferred_input_device_id: i32, // -1 = system default
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            mic_gain: 1.0,
            global_gain: 1.0,
            requested_delay_ms: 0.0,
            feedback_enabled: false,
            mic_preset: MicPreset::Neutral,
            pitch_ratio: 1.0,
            pitch_mix: 0.0,
            noise_suppression_enabled: false,
            preferred_input_device_id: -1,
        }
    }
}

impl ChainSettings {
    /// Pin every numeric field back into range, e.g. after loading a hand-edited file.
    pub fn saturated(mut self) -> Self {
        self.mic_gain = params::clamp_gain(self.mic_gain);
        self.global_gain = params::clamp_global_gain(self.global_gain);
        self.requested_delay_ms = params::clamp_delay_requested(self.requested_delay_ms);
        self.pitch_ratio = params::clamp_pitch_ratio(self.pitch_ratio);
        self.pitch_mix = params::clamp_mix(self.pitch_mix);
        if self.preferred_input_device_id < -1 {
            self.preferred_input_device_id = -1;
        }
        self
    }

    /// DAF is audible only with feedback on and a non-zero requested delay.
    pub fn daf_active(&self) -> bool {
        self.feedback_enabled && self.requested_delay_ms > 0.0
    }
}

/// Live controller state: lifecycle phase, the node handles of the current
/// build and the stored logical values.
#[derive(Clone, Debug, Default)]
pub struct ChainSession {
    pub phase: Phase,
    pub handles: HandleTable,
    pub settings: ChainSettings,
}

impl ChainSession {
    pub fn new(settings: ChainSettings) -> Self {
        Self {
            phase: Phase::Stopped,
            handles: HandleTable::new(),
            settings: settings.saturated(),
        }
    }

    /// Back to an empty, stopped session; stored values are kept.
    pub fn reset(&mut self) {
        self.phase = Phase::Stopped;
        self.handles.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturated_pins_out_of_range_values() {
        let s = ChainSettings {
            mic_gain: 9.0,
            global_gain: 0.0,
            requested_delay_ms: 999.0,
            pitch_ratio: 3.0,
            pitch_mix: -1.0,
            preferred_input_device_id: -42,
            ..ChainSettings::default()
        }
        .saturated();
        assert_eq!(s.mic_gain, 2.0);
        assert_eq!(s.global_gain, 0.5);
        assert_eq!(s.requested_delay_ms, 300.0);
        assert_eq!(s.pitch_ratio, 1.2);
        assert_eq!(s.pitch_mix, 0.0);
        assert_eq!(s.preferred_input_device_id, -1);
    }

    #[test]
    fn daf_active_needs_feedback_and_delay() {
        let mut s = ChainSettings::default();
        assert!(!s.daf_active());
        s.requested_delay_ms = 100.0;
        assert!(!s.daf_active());
        s.feedback_enabled = true;
        assert!(s.daf_active());
        s.requested_delay_ms = 0.0;
        assert!(!s.daf_active());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: ChainSettings = serde_json::from_str(r#"{ "mic_preset": "Dynamic" }"#).unwrap();
        assert_eq!(s.mic_preset, MicPreset::Dynamic);
        assert_eq!(s.global_gain, 1.0);
        assert_eq!(s.preferred_input_device_id, -1);
    }

    #[test]
    fn reset_keeps_settings() {
        let mut session = ChainSession::new(ChainSettings { mic_gain: 1.5, ..ChainSettings::default() });
        session.phase = Phase::Running;
        session.reset();
        assert_eq!(session.phase, Phase::Stopped);
        assert_eq!(session.handles.live_count(), 0);
        assert_eq!(session.settings.mic_gain, 1.5);
    }
}
