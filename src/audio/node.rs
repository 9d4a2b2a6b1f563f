use super::frame::StereoFrame;

pub const GAIN_PARAM_GAIN: i32 = 0;
const GAIN_MAX: f32 = 3.0;

// A processing stage living on the audio thread. Parameters arrive as
// (id, value) pairs; ids a node doesn't know are ignored.
pub trait DspNode: Send {
    fn name(&self) -> &'static str;
    fn set_param(&mut self, id: i32, value: f32);
    fn process(&mut self, buf: &mut [StereoFrame]);
}

/// Factory keyed by the names the controller asks for. Kinds without an
/// implementation here come back as `None` and the controller runs without them.
pub fn create_node(kind_name: &str) -> Option<Box<dyn DspNode>> {
    match kind_name {
        "gain" => Some(Box::new(GainNode::new())),
        _ => None,
    }
}

//gain
pub struct GainNode {
    gain: f32,
}

impl GainNode {
    pub fn new() -> Self {
        Self { gain: 1.0 }
    }
}

impl DspNode for GainNode {
    fn name(&self) -> &'static str {
        "gain"
    }

    fn set_param(&mut self, id: i32, value: f32) {
        if id == GAIN_PARAM_GAIN && !value.is_nan() {
            self.gain = value.clamp(0.0, GAIN_MAX);
        }
    }

    fn process(&mut self, buf: &mut [StereoFrame]) {
        let g = self.gain;
        for f in buf.iter_mut() {
            f.left *= g;
            f.right *= g;
        }
    }
}
