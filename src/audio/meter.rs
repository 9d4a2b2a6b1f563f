use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::frame::StereoFrame;

// Per-block peak smoothing for the input meter.
const SMOOTHING: f32 = 0.8;

/// Input level shared between the input callback (writer) and the control
/// side (reader). The f32 is stored as bits so neither side takes a lock.
#[derive(Clone, Default)]
pub struct LevelMeter {
    bits: Arc<AtomicU32>,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn reset(&self) {
        self.bits.store(0f32.to_bits(), Ordering::Relaxed);
    }

    /// Fold one block's peak into the smoothed level.
    pub fn update(&self, frames: &[StereoFrame]) {
        let peak = frames.iter().fold(0.0f32, |p, f| p.max(f.peak()));
        let smoothed = self.get() * SMOOTHING + peak * (1.0 - SMOOTHING);
        self.bits.store(smoothed.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_rises_toward_peak_and_resets() {
        let meter = LevelMeter::new();
        assert_eq!(meter.get(), 0.0);
        let block = [StereoFrame::mono(0.5), StereoFrame { left: 0.1, right: -1.0 }];
        meter.update(&block);
        assert!((meter.get() - 0.2).abs() < 1e-6);
        for _ in 0..100 {
            meter.update(&block);
        }
        assert!((meter.get() - 1.0).abs() < 1e-3);

        let reader = meter.clone();
        meter.reset();
        assert_eq!(reader.get(), 0.0);
    }
}
