// Sits between the TUI and the chain controller: turns semantic input events
// into controller calls and snapshots everything the screen shows.

use crate::audio::{InputDevice, describe};
use crate::chain::ChainController;
use crate::engine_api::AudioEngine;
use crate::params;
use crate::shared::{DisplayState, InputEvent, Page, Row};

// FAF slider range; the ratio clamp saturates well inside it
pub const SEMITONES_MIN: f32 = -6.0;
pub const SEMITONES_MAX: f32 = 6.0;

pub struct Middle<E: AudioEngine> {
    pub chain: ChainController<E>,
    page: Page,
    row: usize,
    semitones: f32, // slider value; the controller only keeps the ratio
    devices: Vec<InputDevice>,
    status: String,
}

impl<E: AudioEngine> Middle<E> {
    pub fn new(chain: ChainController<E>, devices: Vec<InputDevice>) -> Self {
        let semitones = params::ratio_to_semitones(chain.pitch_ratio()).round();
        Self {
            chain,
            page: Page::default(),
            row: 0,
            semitones,
            devices,
            status: String::new(),
        }
    }

    pub fn start_chain(&mut self) {
        match self.chain.start() {
            Ok(()) => self.status = "Running".to_string(),
            Err(e) => self.status = format!("Audio unavailable: {e}"),
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        log::debug!(target: "middle", "{event:?}");
        match event {
            InputEvent::Quit => {}
            InputEvent::ToggleRunning => {
                if self.chain.is_running() {
                    self.chain.stop();
                    self.status = "Stopped".to_string();
                } else {
                    self.start_chain();
                }
            }
            InputEvent::NextPage => {
                self.page = self.page.next();
                self.row = 0;
            }
            InputEvent::MoveSelection(delta) => {
                let len = self.page.rows().len() as i32;
                self.row = (self.row as i32 + delta).rem_euclid(len) as usize;
            }

            InputEvent::AdjustDelay(delta) => {
                let ms = self.chain.requested_delay_ms() + delta;
                self.chain.set_requested_delay_ms(ms);
            }
            InputEvent::ToggleFeedback => {
                let on = !self.chain.feedback_enabled();
                self.chain.set_feedback_enabled(on);
            }
            InputEvent::CyclePreset => {
                let next = self.chain.mic_preset().next();
                self.chain.set_mic_preset(next);
            }
            InputEvent::AdjustMicGain(delta) => {
                let g = self.chain.mic_gain() + delta;
                self.chain.set_mic_gain(g);
            }
            InputEvent::AdjustSemitones(delta) => {
                self.semitones = (self.semitones + delta).clamp(SEMITONES_MIN, SEMITONES_MAX);
                self.chain.set_pitch_semitones(self.semitones);
            }
            InputEvent::AdjustPitchMix(delta) => {
                let m = self.chain.pitch_mix() + delta;
                self.chain.set_pitch_mix(m);
            }
            InputEvent::AdjustGlobalGain(delta) => {
                let g = self.chain.global_gain() + delta;
                self.chain.set_global_gain(g);
            }
            InputEvent::ToggleNoiseSuppression => {
                let on = !self.chain.noise_suppression_enabled();
                self.chain.set_noise_suppression_enabled(on);
            }
            InputEvent::CycleInputDevice(dir) => {
                let id = self.cycle_device(dir);
                let was_running = self.chain.is_running();
                self.chain.set_preferred_input_device_id(id);
                if was_running && !self.chain.is_running() {
                    self.status = "Audio unavailable on that device".to_string();
                }
            }
        }
    }

    // -1 (system default) followed by every enumerated device, wrapping
    fn cycle_device(&self, dir: i32) -> i32 {
        let ids: Vec<i32> = std::iter::once(-1).chain(self.devices.iter().map(|d| d.id)).collect();
        let current = self.chain.preferred_input_device_id();
        let pos = ids.iter().position(|&id| id == current).unwrap_or(0) as i32;
        ids[(pos + dir).rem_euclid(ids.len() as i32) as usize]
    }

    fn format_row(&self, row: Row) -> String {
        let c = &self.chain;
        match row {
            Row::Delay => match c.effective_delay_ms() {
                Some(eff) if eff != c.requested_delay_ms() => {
                    format!("{:.0} ms (playing {:.0} ms)", c.requested_delay_ms(), eff)
                }
                _ => format!("{:.0} ms", c.requested_delay_ms()),
            },
            Row::Feedback => on_off(c.feedback_enabled()),
            Row::Preset => c.mic_preset().label().to_string(),
            Row::MicGain => format!("{:.1}x (effective {:.2}x)", c.mic_gain(), c.effective_gain()),
            Row::PitchSemitones => format!("{:+.0} st (ratio {:.3})", self.semitones, c.pitch_ratio()),
            Row::PitchMix => format!("{:.0}%", c.pitch_mix() * 100.0),
            Row::GlobalGain => format!("{:.1}x", c.global_gain()),
            Row::NoiseSuppression => on_off(c.noise_suppression_enabled()),
            Row::InputDevice => describe(&self.devices, c.preferred_input_device_id()),
        }
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            page: self.page,
            selected_row: self.row,
            running: self.chain.is_running(),
            daf_active: self.chain.effective_delay_ms().is_some(),
            rows: self.page.rows().iter().map(|&r| (r, self.format_row(r))).collect(),
            input_level: self.chain.input_level(),
            status: self.status.clone(),
        }
    }
}

fn on_off(on: bool) -> String {
    if on { "On".to_string() } else { "Off".to_string() }
}
