use std::collections::VecDeque;

use crossbeam_channel::Receiver;

use super::frame::StereoFrame;
use super::node::DspNode;

pub const MAX_NODES: usize = 16; // hard cap so adding nodes never reallocates in the callback
const SCRATCH_FRAMES: usize = 1024;
const MAX_PENDING_FRAMES: usize = 48_000 / 4; // ~250ms of mic backlog before we start dropping

/// Control-side requests for the audio thread.
pub enum ChainCommand {
    Clear,
    Add(Box<dyn DspNode>),
    SetParam { index: usize, param_id: i32, value: f32 },
}

/// The node chain as the output callback sees it: mic frames in, processed
/// frames out. Everything it needs is allocated up front.
pub struct ChainProcessor {
    nodes: Vec<Box<dyn DspNode>>,
    pending: VecDeque<StereoFrame>,
    scratch: Box<[StereoFrame]>,
    input_rx: Option<Receiver<Vec<StereoFrame>>>,
}

impl ChainProcessor {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(MAX_NODES),
            pending: VecDeque::with_capacity(MAX_PENDING_FRAMES),
            scratch: vec![StereoFrame::zero(); SCRATCH_FRAMES].into_boxed_slice(),
            input_rx: None,
        }
    }

    pub fn set_input_rx(&mut self, rx: Receiver<Vec<StereoFrame>>) {
        self.input_rx = Some(rx);
    }

    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn handle_cmd(&mut self, cmd: ChainCommand) {
        match cmd {
            ChainCommand::Clear => self.nodes.clear(),
            ChainCommand::Add(node) => {
                if self.nodes.len() < MAX_NODES {
                    self.nodes.push(node);
                }
            }
            ChainCommand::SetParam { index, param_id, value } => {
                // stale indices from a previous build land here; ignore them
                if let Some(node) = self.nodes.get_mut(index) {
                    node.set_param(param_id, value);
                }
            }
        }
    }

    /// Move whatever the input callback produced into the pending queue,
    /// dropping the oldest frames if the output side has fallen behind.
    pub fn drain_input(&mut self) {
        let Some(rx) = &self.input_rx else { return };
        while let Ok(block) = rx.try_recv() {
            for frame in block {
                if self.pending.len() == MAX_PENDING_FRAMES {
                    self.pending.pop_front();
                }
                self.pending.push_back(frame);
            }
        }
    }

    /// Fill an interleaved output buffer. Channel 0 gets left, every other
    /// channel gets right.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for chunk in out.chunks_mut(channels * SCRATCH_FRAMES) {
            let n_frames = chunk.len() / channels;
            let frames = &mut self.scratch[..n_frames];
            for f in frames.iter_mut() {
                *f = self.pending.pop_front().unwrap_or_default();
            }
            for node in self.nodes.iter_mut() {
                node.process(frames);
            }
            for (dst, f) in chunk.chunks_exact_mut(channels).zip(frames.iter()) {
                dst[0] = f.left;
                for s in dst[1..].iter_mut() {
                    *s = f.right;
                }
            }
        }
    }
}
