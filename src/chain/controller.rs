use crate::engine_api::{AudioEngine, EngineResult, NodeHandle, NodeKind, NodeParam};
use crate::params::{self, MicPreset};

use super::session::{ChainSession, ChainSettings, Phase};

/// Owns the feedback chain for one audio session.
///
/// Setters always update the stored value and only push to the engine when
/// the node for that role exists, so they are valid in any phase. `start`
/// and `stop` are the only calls that touch the handle table; `&mut self`
/// keeps them from overlapping with anything else.
pub struct ChainController<E: AudioEngine> {
    engine: E,
    session: ChainSession,
}

impl<E: AudioEngine> ChainController<E> {
    pub fn new(engine: E) -> Self {
        Self::with_settings(engine, ChainSettings::default())
    }

    pub fn with_settings(engine: E, settings: ChainSettings) -> Self {
        Self { engine, session: ChainSession::new(settings) }
    }

    // ── Lifecycle ─────────────────────────────────────────────────

    /// Build the chain. A no-op if already running. On failure the session is
    /// back to stopped with no handles and the engine error is returned.
    pub fn start(&mut self) -> EngineResult {
        if self.session.phase == Phase::Running {
            log::info!(target: "chain", "start: already running, handles={:?}", self.session.handles);
            return Ok(());
        }

        let mut engine_started = false;
        match self.build_chain(&mut engine_started) {
            Ok(()) => {
                self.session.phase = Phase::Running;
                log::info!(
                    target: "chain",
                    "chain running with {}/4 nodes: {:?}",
                    self.session.handles.live_count(),
                    self.session.handles
                );
                Ok(())
            }
            Err(e) => {
                log::error!(target: "chain", "start failed: {e}");
                if engine_started {
                    if let Err(stop_err) = self.engine.stop() {
                        log::warn!(target: "chain", "stop after failed start: {stop_err}");
                    }
                }
                self.session.reset();
                Err(e)
            }
        }
    }

    fn build_chain(&mut self, engine_started: &mut bool) -> EngineResult {
        let device = self.session.settings.preferred_input_device_id;
        self.engine.set_preferred_input_device_id(device);
        self.engine.start()?;
        *engine_started = true;
        self.engine.clear_chain()?;

        for kind in NodeKind::BUILD_ORDER {
            let handle = self.engine.add_node(kind.engine_name())?;
            if !handle.is_valid() {
                log::warn!(
                    target: "chain",
                    "engine has no '{}' node, {:?} disabled",
                    kind.engine_name(),
                    kind
                );
            }
            self.session.handles.set(kind, handle);
        }

        self.apply_combined_gain();
        self.apply_noise_suppression();
        self.push(NodeParam::DelayTimeMs, self.session.settings.requested_delay_ms);
        self.apply_delay_mix();
        self.push(NodeParam::PitchRatio, self.session.settings.pitch_ratio);
        self.push(NodeParam::PitchMix, self.session.settings.pitch_mix);
        Ok(())
    }

    /// Tear the chain down. A no-op if already stopped. Local state is reset
    /// even when the engine refuses to stop.
    pub fn stop(&mut self) {
        if self.session.phase == Phase::Stopped {
            return;
        }
        log::info!(target: "chain", "stopping chain");
        if let Err(e) = self.engine.stop() {
            log::warn!(target: "chain", "engine stop failed, resetting anyway: {e}");
        }
        self.session.reset();
    }

    // ── Gain ──────────────────────────────────────────────────────

    pub fn set_mic_gain(&mut self, gain: f32) {
        let clamped = params::clamp_gain(gain);
        self.session.settings.mic_gain = clamped;
        log::debug!(target: "chain", "mic gain {gain} -> {clamped}");
        self.apply_combined_gain();
    }

    pub fn set_global_gain(&mut self, gain: f32) {
        let clamped = params::clamp_global_gain(gain);
        self.session.settings.global_gain = clamped;
        log::debug!(target: "chain", "global gain {gain} -> {clamped}");
        self.apply_combined_gain();
    }

    fn apply_combined_gain(&self) {
        self.push(NodeParam::Gain, self.effective_gain());
    }

    // ── Noise gate ────────────────────────────────────────────────

    pub fn set_noise_suppression_enabled(&mut self, enabled: bool) {
        self.session.settings.noise_suppression_enabled = enabled;
        log::debug!(target: "chain", "noise suppression {enabled}");
        self.apply_noise_suppression();
    }

    fn apply_noise_suppression(&self) {
        let gate = params::noise_gate_params(self.session.settings.noise_suppression_enabled);
        self.push(NodeParam::GateThreshold, gate.threshold);
        self.push(NodeParam::GateAttenuation, gate.attenuation);
    }

    // ── DAF ───────────────────────────────────────────────────────

    /// Store the slider value and push it straight to the delay node so the
    /// change is heard at once, then settle feedback/mix.
    pub fn set_requested_delay_ms(&mut self, ms: f32) {
        let clamped = params::clamp_delay_requested(ms);
        self.session.settings.requested_delay_ms = clamped;
        log::debug!(target: "chain", "requested delay {ms} -> {clamped} ms");
        self.push(NodeParam::DelayTimeMs, clamped);
        self.apply_delay_mix();
    }

    pub fn set_feedback_enabled(&mut self, enabled: bool) {
        self.session.settings.feedback_enabled = enabled;
        log::debug!(target: "chain", "feedback {enabled}");
        self.apply_delay_mix();
    }

    /// Selecting a preset overwrites the mic gain and re-derives the delay
    /// mix. The requested delay is left alone.
    pub fn set_mic_preset(&mut self, preset: MicPreset) {
        self.session.settings.mic_preset = preset;
        self.session.settings.mic_gain = params::preset_gain(preset);
        log::info!(target: "chain", "mic preset {:?}, gain {}", preset, self.session.settings.mic_gain);
        self.apply_combined_gain();
        self.apply_delay_mix();
    }

    /// Decides whether DAF is audible. Re-run after any change to feedback,
    /// requested delay or preset.
    fn apply_delay_mix(&self) {
        if !self.session.handles.is_valid(NodeKind::Delay) {
            return;
        }
        let settings = &self.session.settings;
        if !settings.daf_active() {
            log::debug!(target: "chain", "DAF off (feedback={}, delay={} ms)", settings.feedback_enabled, settings.requested_delay_ms);
            self.push(NodeParam::DelayFeedback, 0.0);
            self.push(NodeParam::DelayMix, 0.0);
            return;
        }

        let effective = params::effective_delay(settings.requested_delay_ms);
        let (feedback, mix) = params::preset_delay_feedback_mix(settings.mic_preset);
        log::debug!(target: "chain", "DAF on: {effective} ms, feedback {feedback}, mix {mix}");
        self.push(NodeParam::DelayTimeMs, effective);
        self.push(NodeParam::DelayFeedback, feedback);
        self.push(NodeParam::DelayMix, mix);
    }

    // ── FAF ───────────────────────────────────────────────────────

    pub fn set_pitch_semitones(&mut self, semitones: f32) {
        self.set_pitch_ratio(params::semitones_to_ratio(semitones));
    }

    pub fn set_pitch_ratio(&mut self, ratio: f32) {
        let clamped = params::clamp_pitch_ratio(ratio);
        self.session.settings.pitch_ratio = clamped;
        log::debug!(target: "chain", "pitch ratio {ratio} -> {clamped}");
        self.push(NodeParam::PitchRatio, clamped);
    }

    pub fn set_pitch_mix(&mut self, mix: f32) {
        let clamped = params::clamp_mix(mix);
        self.session.settings.pitch_mix = clamped;
        log::debug!(target: "chain", "pitch mix {mix} -> {clamped}");
        self.push(NodeParam::PitchMix, clamped);
    }

    // ── Input ─────────────────────────────────────────────────────

    /// Switching device while running rebuilds the whole chain; handles are
    /// not carried across devices.
    pub fn set_preferred_input_device_id(&mut self, device_id: i32) {
        let device_id = device_id.max(-1);
        if self.session.settings.preferred_input_device_id == device_id {
            return;
        }
        self.session.settings.preferred_input_device_id = device_id;
        self.engine.set_preferred_input_device_id(device_id);
        log::info!(target: "chain", "preferred input device -> {device_id}");

        if self.session.phase == Phase::Running {
            self.stop();
            if let Err(e) = self.start() {
                log::error!(target: "chain", "rebuild after device switch failed: {e}");
            }
        }
    }

    pub fn input_level(&self) -> f32 {
        let level = self.engine.input_level();
        if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) }
    }

    /// Re-apply a whole set of stored values through the regular setters.
    /// The preset goes first since it overwrites the mic gain.
    pub fn apply_settings(&mut self, settings: &ChainSettings) {
        let s = settings.clone().saturated();
        self.set_mic_preset(s.mic_preset);
        self.set_mic_gain(s.mic_gain);
        self.set_global_gain(s.global_gain);
        self.set_noise_suppression_enabled(s.noise_suppression_enabled);
        self.set_requested_delay_ms(s.requested_delay_ms);
        self.set_feedback_enabled(s.feedback_enabled);
        self.set_pitch_ratio(s.pitch_ratio);
        self.set_pitch_mix(s.pitch_mix);
        self.set_preferred_input_device_id(s.preferred_input_device_id);
    }

    // ── Getters ───────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn is_running(&self) -> bool {
        self.session.phase == Phase::Running
    }

    pub fn handle(&self, kind: NodeKind) -> NodeHandle {
        self.session.handles.get(kind)
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.session.settings
    }

    pub fn mic_gain(&self) -> f32 {
        self.session.settings.mic_gain
    }

    pub fn global_gain(&self) -> f32 {
        self.session.settings.global_gain
    }

    pub fn effective_gain(&self) -> f32 {
        params::combined_gain(self.session.settings.mic_gain, self.session.settings.global_gain)
    }

    pub fn requested_delay_ms(&self) -> f32 {
        self.session.settings.requested_delay_ms
    }

    /// Delay the engine is playing right now, `None` while DAF is off.
    pub fn effective_delay_ms(&self) -> Option<f32> {
        let s = &self.session.settings;
        s.daf_active().then(|| params::effective_delay(s.requested_delay_ms))
    }

    pub fn feedback_enabled(&self) -> bool {
        self.session.settings.feedback_enabled
    }

    pub fn mic_preset(&self) -> MicPreset {
        self.session.settings.mic_preset
    }

    pub fn pitch_ratio(&self) -> f32 {
        self.session.settings.pitch_ratio
    }

    pub fn pitch_mix(&self) -> f32 {
        self.session.settings.pitch_mix
    }

    pub fn noise_suppression_enabled(&self) -> bool {
        self.session.settings.noise_suppression_enabled
    }

    pub fn preferred_input_device_id(&self) -> i32 {
        self.session.settings.preferred_input_device_id
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn push(&self, param: NodeParam, value: f32) {
        let node = self.session.handles.get(param.kind());
        if node.is_valid() {
            self.engine.set_param(node, param.id(), value);
        }
    }
}

impl<E: AudioEngine> Drop for ChainController<E> {
    fn drop(&mut self) {
        self.stop();
    }
}
