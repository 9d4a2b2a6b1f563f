// Value ranges and derived parameters for the feedback chain.
// Everything here is a pure function: no engine, no state.

use serde::{Deserialize, Serialize};

pub const MIC_GAIN_MIN: f32 = 0.0;
pub const MIC_GAIN_MAX: f32 = 2.0;
pub const GLOBAL_GAIN_MIN: f32 = 0.5;
pub const GLOBAL_GAIN_MAX: f32 = 2.0;
pub const COMBINED_GAIN_MAX: f32 = 3.0;

// what the user asks for vs. what the delay node gets while DAF is audible
pub const DELAY_REQUESTED_MAX_MS: f32 = 300.0;
pub const DELAY_EFFECTIVE_MIN_MS: f32 = 60.0;
pub const DELAY_EFFECTIVE_MAX_MS: f32 = 220.0;

pub const PITCH_RATIO_MIN: f32 = 0.8;
pub const PITCH_RATIO_MAX: f32 = 1.2;

const GATE_ON_THRESHOLD: f32 = 0.035;
const GATE_ON_ATTENUATION: f32 = 0.10;

/// Pins `v` into `[lo, hi]`. NaN lands on `lo` so it never reaches the engine.
#[inline]
fn saturate(v: f32, lo: f32, hi: f32) -> f32 {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}

pub fn clamp_gain(g: f32) -> f32 {
    saturate(g, MIC_GAIN_MIN, MIC_GAIN_MAX)
}

pub fn clamp_global_gain(g: f32) -> f32 {
    saturate(g, GLOBAL_GAIN_MIN, GLOBAL_GAIN_MAX)
}

/// Gain actually applied to the gain node: `clamp(local * global, 0, 3)`.
pub fn combined_gain(local: f32, global: f32) -> f32 {
    saturate(local * global, 0.0, COMBINED_GAIN_MAX)
}

pub fn clamp_delay_requested(ms: f32) -> f32 {
    saturate(ms, 0.0, DELAY_REQUESTED_MAX_MS)
}

/// Delay time sent to the engine while DAF is audible. Anything under the
/// floor is pulled up to 60 ms rather than treated as "no delay".
pub fn effective_delay(ms: f32) -> f32 {
    saturate(ms, DELAY_EFFECTIVE_MIN_MS, DELAY_EFFECTIVE_MAX_MS)
}

pub fn semitones_to_ratio(semitones: f32) -> f32 {
    2.0_f32.powf(semitones / 12.0)
}

/// Inverse of [`semitones_to_ratio`], used to seed the semitone slider from a stored ratio.
pub fn ratio_to_semitones(ratio: f32) -> f32 {
    if ratio > 0.0 { 12.0 * ratio.log2() } else { 0.0 }
}

pub fn clamp_pitch_ratio(r: f32) -> f32 {
    saturate(r, PITCH_RATIO_MIN, PITCH_RATIO_MAX)
}

pub fn clamp_mix(m: f32) -> f32 {
    saturate(m, 0.0, 1.0)
}

/// Voicing presets for the microphone path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MicPreset {
    #[default]
    Neutral,
    Smooth,
    Dynamic,
}

impl MicPreset {
    pub fn next(self) -> Self {
        match self {
            MicPreset::Neutral => MicPreset::Smooth,
            MicPreset::Smooth => MicPreset::Dynamic,
            MicPreset::Dynamic => MicPreset::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MicPreset::Neutral => "Neutral",
            MicPreset::Smooth => "Smooth",
            MicPreset::Dynamic => "Dynamic",
        }
    }
}

pub fn preset_gain(preset: MicPreset) -> f32 {
    match preset {
        MicPreset::Neutral => 1.0,
        MicPreset::Smooth => 0.8,
        MicPreset::Dynamic => 1.3,
    }
}

/// `(feedback, mix)` for the delay node while DAF is audible.
pub fn preset_delay_feedback_mix(preset: MicPreset) -> (f32, f32) {
    match preset {
        MicPreset::Neutral => (0.0, 0.60),
        MicPreset::Smooth => (0.0, 0.45),
        MicPreset::Dynamic => (0.0, 0.80),
    }
}

/// Threshold/attenuation pair for the noise gate. Off is a pass-through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseGateParams {
    pub threshold: f32,
    pub attenuation: f32,
}

pub fn noise_gate_params(enabled: bool) -> NoiseGateParams {
    if enabled {
        NoiseGateParams { threshold: GATE_ON_THRESHOLD, attenuation: GATE_ON_ATTENUATION }
    } else {
        NoiseGateParams { threshold: 0.0, attenuation: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn gain_clamps_saturate_at_bounds() {
        for g in [-100.0, -0.1, 0.0, 0.7, 2.0, 2.5, 1e9, f32::INFINITY, f32::NEG_INFINITY] {
            let c = clamp_gain(g);
            assert!((0.0..=2.0).contains(&c), "clamp_gain({g}) = {c}");
        }
        assert_eq!(clamp_gain(-3.0), 0.0);
        assert_eq!(clamp_gain(7.0), 2.0);
        assert_eq!(clamp_global_gain(0.1), 0.5);
        assert_eq!(clamp_global_gain(9.0), 2.0);
        assert_eq!(clamp_gain(f32::NAN), 0.0);
    }

    #[test]
    fn combined_gain_is_clamped_product() {
        let locals = [0.0, 0.4, 1.0, 1.3, 2.0];
        let globals = [0.5, 1.0, 1.5, 2.0];
        for l in locals {
            for g in globals {
                assert_eq!(combined_gain(l, g), (l * g).clamp(0.0, 3.0));
            }
        }
        assert_eq!(combined_gain(2.0, 2.0), 3.0);
    }

    #[test]
    fn delay_ranges() {
        assert_eq!(clamp_delay_requested(-5.0), 0.0);
        assert_eq!(clamp_delay_requested(120.0), 120.0);
        assert_eq!(clamp_delay_requested(1000.0), 300.0);

        for ms in [0.0, 10.0, 59.0, 60.0, 120.0, 220.0, 221.0, 300.0] {
            let e = effective_delay(clamp_delay_requested(ms));
            assert!((60.0..=220.0).contains(&e));
        }
        assert_eq!(effective_delay(30.0), 60.0);
        assert_eq!(effective_delay(250.0), 220.0);
    }

    #[test]
    fn semitone_conversion() {
        assert!((semitones_to_ratio(0.0) - 1.0).abs() < EPS);
        assert!((semitones_to_ratio(12.0) - 2.0).abs() < EPS);
        assert!((semitones_to_ratio(-12.0) - 0.5).abs() < EPS);
        assert!((ratio_to_semitones(semitones_to_ratio(3.0)) - 3.0).abs() < 1e-3);
        assert_eq!(ratio_to_semitones(0.0), 0.0);
    }

    #[test]
    fn pitch_ratio_saturates() {
        assert_eq!(clamp_pitch_ratio(0.1), 0.8);
        assert_eq!(clamp_pitch_ratio(5.0), 1.2);
        assert_eq!(clamp_pitch_ratio(semitones_to_ratio(6.0)), 1.2);
        assert_eq!(clamp_pitch_ratio(semitones_to_ratio(-6.0)), 0.8);
        assert_eq!(clamp_pitch_ratio(1.05), 1.05);
    }

    #[test]
    fn mix_clamps() {
        assert_eq!(clamp_mix(-1.0), 0.0);
        assert_eq!(clamp_mix(0.3), 0.3);
        assert_eq!(clamp_mix(4.0), 1.0);
    }

    #[test]
    fn preset_tables() {
        assert_eq!(preset_gain(MicPreset::Neutral), 1.0);
        assert_eq!(preset_gain(MicPreset::Smooth), 0.8);
        assert_eq!(preset_gain(MicPreset::Dynamic), 1.3);
        assert_eq!(preset_delay_feedback_mix(MicPreset::Neutral), (0.0, 0.60));
        assert_eq!(preset_delay_feedback_mix(MicPreset::Smooth), (0.0, 0.45));
        assert_eq!(preset_delay_feedback_mix(MicPreset::Dynamic), (0.0, 0.80));
        assert_eq!(MicPreset::Dynamic.next(), MicPreset::Neutral);
    }

    #[test]
    fn noise_gate_table() {
        assert_eq!(noise_gate_params(true), NoiseGateParams { threshold: 0.035, attenuation: 0.10 });
        assert_eq!(noise_gate_params(false), NoiseGateParams { threshold: 0.0, attenuation: 1.0 });
    }
}
