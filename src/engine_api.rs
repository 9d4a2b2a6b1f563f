// The narrow command surface the chain controller drives. Whatever runs the
// real-time audio (the cpal engine in `audio/`, or the recording fake in tests)
// sits behind `AudioEngine`; the controller never touches samples.

use std::fmt;

pub type EngineResult<T = ()> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("audio engine unavailable: {0}")]
    Unavailable(String),
    #[error("audio engine already running")]
    AlreadyRunning,
    #[error("audio engine not running")]
    NotRunning,
}

/// Opaque node index handed out by the engine. Negative means "not present"
/// (the engine has no factory for the requested kind, or the chain is torn down).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(i32);

impl NodeHandle {
    pub const NONE: NodeHandle = NodeHandle(-1);

    pub const fn from_raw(raw: i32) -> Self {
        if raw < 0 { Self::NONE } else { Self(raw) }
    }

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    pub fn index(self) -> Option<usize> {
        self.is_valid().then_some(self.0 as usize)
    }
}

impl Default for NodeHandle {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeHandle({})", self.0)
        } else {
            f.write_str("NodeHandle(none)")
        }
    }
}

/// The four roles in the feedback chain, in build order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Gain,
    NoiseGate,
    Delay,
    PitchShiftMix,
}

impl NodeKind {
    pub const BUILD_ORDER: [NodeKind; 4] =
        [NodeKind::Gain, NodeKind::NoiseGate, NodeKind::Delay, NodeKind::PitchShiftMix];

    /// Factory key the engine registers this kind under.
    pub fn engine_name(self) -> &'static str {
        match self {
            NodeKind::Gain => "gain",
            NodeKind::NoiseGate => "noise_gate",
            NodeKind::Delay => "delay",
            NodeKind::PitchShiftMix => "faf_pitch",
        }
    }

    pub fn params(self) -> &'static [NodeParam] {
        match self {
            NodeKind::Gain => &[NodeParam::Gain],
            NodeKind::NoiseGate => &[NodeParam::GateThreshold, NodeParam::GateAttenuation],
            NodeKind::Delay => &[NodeParam::DelayTimeMs, NodeParam::DelayFeedback, NodeParam::DelayMix],
            NodeKind::PitchShiftMix => &[NodeParam::PitchRatio, NodeParam::PitchMix],
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            NodeKind::Gain => 0,
            NodeKind::NoiseGate => 1,
            NodeKind::Delay => 2,
            NodeKind::PitchShiftMix => 3,
        }
    }
}

/// Every numeric parameter of every node kind. The id is the per-kind index
/// the engine expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeParam {
    Gain,
    GateThreshold,
    GateAttenuation,
    DelayTimeMs,
    DelayFeedback,
    DelayMix,
    PitchRatio,
    PitchMix,
}

impl NodeParam {
    pub fn kind(self) -> NodeKind {
        match self {
            NodeParam::Gain => NodeKind::Gain,
            NodeParam::GateThreshold | NodeParam::GateAttenuation => NodeKind::NoiseGate,
            NodeParam::DelayTimeMs | NodeParam::DelayFeedback | NodeParam::DelayMix => NodeKind::Delay,
            NodeParam::PitchRatio | NodeParam::PitchMix => NodeKind::PitchShiftMix,
        }
    }

    /// Position of this parameter in its kind's list.
    pub fn id(self) -> i32 {
        self.kind().params().iter().position(|p| *p == self).unwrap_or(0) as i32
    }
}

/// Commands into a real-time audio engine.
///
/// Lifecycle calls may fail; the engine is not assumed to be idempotent, so
/// callers guard against double start/stop themselves. `set_param` is one-way:
/// an unknown or stale handle must be ignored, never a crash.
pub trait AudioEngine {
    fn start(&mut self) -> EngineResult;

    fn stop(&mut self) -> EngineResult;

    /// Remove every node before a rebuild.
    fn clear_chain(&mut self) -> EngineResult;

    /// Instantiate a node by factory key. An unknown key yields a negative
    /// handle, not an error.
    fn add_node(&mut self, kind_name: &str) -> EngineResult<NodeHandle>;

    fn set_param(&self, node: NodeHandle, param_id: i32, value: f32);

    /// Instantaneous input amplitude. Nominally [0,1], not guaranteed.
    fn input_level(&self) -> f32;

    /// Hint only; -1 selects the system default.
    fn set_preferred_input_device_id(&mut self, device_id: i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_raw_handles_collapse_to_none() {
        assert_eq!(NodeHandle::from_raw(-7), NodeHandle::NONE);
        assert!(!NodeHandle::from_raw(-1).is_valid());
        assert_eq!(NodeHandle::from_raw(3).index(), Some(3));
        assert_eq!(NodeHandle::default(), NodeHandle::NONE);
    }

    #[test]
    fn param_ids_match_engine_tables() {
        assert_eq!(NodeParam::Gain.id(), 0);
        assert_eq!(NodeParam::GateThreshold.id(), 0);
        assert_eq!(NodeParam::GateAttenuation.id(), 1);
        assert_eq!(NodeParam::DelayTimeMs.id(), 0);
        assert_eq!(NodeParam::DelayFeedback.id(), 1);
        assert_eq!(NodeParam::DelayMix.id(), 2);
        assert_eq!(NodeParam::PitchRatio.id(), 0);
        assert_eq!(NodeParam::PitchMix.id(), 1);
        for kind in NodeKind::BUILD_ORDER {
            assert!(kind.params().iter().all(|p| p.kind() == kind));
        }
    }
}
