use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::engine_api::{AudioEngine, EngineError, EngineResult, NodeHandle};

mod devices;
mod engine;
mod frame;
mod meter;
mod node;

pub use devices::{InputDevice, describe, list_input_devices};
use frame::StereoFrame;

use engine::{ChainCommand, ChainProcessor, MAX_NODES};
use meter::LevelMeter;

const COMMAND_QUEUE: usize = 1024;
const INPUT_QUEUE: usize = 256;

struct Streams {
    _output: cpal::Stream,
    _input: Option<cpal::Stream>, // None when no mic available
}

/// Mic-monitoring engine on top of cpal. The mic is routed through the node
/// chain to the default output device; the chain itself lives on the output
/// callback and is driven over a lock-free command queue.
pub struct CpalEngine {
    preferred_input: i32,
    cmd_tx: Option<Sender<ChainCommand>>,
    streams: Option<Streams>,
    level: LevelMeter,
    node_count: usize,
}

impl CpalEngine {
    pub fn new() -> Self {
        Self {
            preferred_input: -1,
            cmd_tx: None,
            streams: None,
            level: LevelMeter::new(),
            node_count: 0,
        }
    }

    fn send(&self, cmd: ChainCommand) -> EngineResult {
        let tx = self.cmd_tx.as_ref().ok_or(EngineError::NotRunning)?;
        tx.try_send(cmd)
            .map_err(|e| EngineError::Unavailable(format!("command queue: {e}")))
    }
}

impl AudioEngine for CpalEngine {
    fn start(&mut self) -> EngineResult {
        if self.streams.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| unavailable("no default output device"))?;
        let config = device.default_output_config().map_err(unavailable)?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(unavailable("unsupported sample format (only f32 supported for now)"));
        }
        let sample_rate = config.sample_rate();
        let channels = config.channels() as usize;

        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded::<ChainCommand>(COMMAND_QUEUE);
        let (input_tx, input_rx) = crossbeam_channel::bounded::<Vec<StereoFrame>>(INPUT_QUEUE);

        let output = build_output_stream(&device, &config.into(), cmd_rx, input_rx, channels)?;
        output.play().map_err(unavailable)?;

        let input = devices::input_device(&host, self.preferred_input)
            .and_then(|d| try_build_input_stream(&d, sample_rate, input_tx, self.level.clone()));
        if input.is_none() {
            log::warn!(target: "audio", "no usable input device, monitoring disabled");
        }

        log::info!(
            target: "audio",
            "started: output '{}' ({channels} ch), preferred input {}",
            devices::device_name(&device),
            self.preferred_input
        );
        self.cmd_tx = Some(cmd_tx);
        self.streams = Some(Streams { _output: output, _input: input });
        self.node_count = 0;
        Ok(())
    }

    fn stop(&mut self) -> EngineResult {
        let streams = self.streams.take().ok_or(EngineError::NotRunning)?;
        drop(streams);
        self.cmd_tx = None;
        self.node_count = 0;
        self.level.reset();
        log::info!(target: "audio", "stopped");
        Ok(())
    }

    fn clear_chain(&mut self) -> EngineResult {
        self.send(ChainCommand::Clear)?;
        self.node_count = 0;
        Ok(())
    }

    fn add_node(&mut self, kind_name: &str) -> EngineResult<NodeHandle> {
        let Some(node) = node::create_node(kind_name) else {
            log::debug!(target: "audio", "no factory for '{kind_name}'");
            return Ok(NodeHandle::NONE);
        };
        if self.node_count >= MAX_NODES {
            log::warn!(target: "audio", "node chain full, '{kind_name}' not added");
            return Ok(NodeHandle::NONE);
        }
        log::debug!(target: "audio", "adding '{}' at {}", node.name(), self.node_count);
        self.send(ChainCommand::Add(node))?;
        let handle = NodeHandle::from_raw(self.node_count as i32);
        self.node_count += 1;
        Ok(handle)
    }

    fn set_param(&self, node: NodeHandle, param_id: i32, value: f32) {
        let (Some(index), Some(tx)) = (node.index(), self.cmd_tx.as_ref()) else {
            return;
        };
        let _ = tx.try_send(ChainCommand::SetParam { index, param_id, value });
    }

    fn input_level(&self) -> f32 {
        self.level.get()
    }

    fn set_preferred_input_device_id(&mut self, device_id: i32) {
        // picked up on the next start
        self.preferred_input = device_id;
    }
}

fn unavailable(e: impl std::fmt::Display) -> EngineError {
    EngineError::Unavailable(e.to_string())
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<ChainCommand>,
    input_rx: Receiver<Vec<StereoFrame>>,
    channels: usize,
) -> EngineResult<cpal::Stream> {
    let mut chain = ChainProcessor::new();
    chain.set_input_rx(input_rx);

    let err_fn = |err| log::error!(target: "audio", "output stream error: {err}");

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                while let Ok(cmd) = rx.try_recv() {
                    chain.handle_cmd(cmd);
                }
                chain.drain_input();
                chain.render_interleaved(data, channels);
            },
            err_fn,
            None,
        )
        .map_err(unavailable)
}

// ── Input stream ──────────────────────────────────────────────────

fn try_build_input_stream(
    device: &cpal::Device,
    target_sample_rate: cpal::SampleRate,
    tx: Sender<Vec<StereoFrame>>,
    level: LevelMeter,
) -> Option<cpal::Stream> {
    let supported = device.default_input_config().ok()?;
    let mut stream_config: cpal::StreamConfig = supported.into();
    stream_config.sample_rate = target_sample_rate;

    let in_channels = stream_config.channels as usize;

    let err_fn = |err| log::error!(target: "audio", "input stream error: {err}");

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                let frames: Vec<StereoFrame> = if in_channels <= 1 {
                    data.iter().map(|&s| StereoFrame::mono(s)).collect()
                } else {
                    data.chunks_exact(in_channels)
                        .map(|c| StereoFrame { left: c[0], right: c[1] })
                        .collect()
                };
                level.update(&frames);
                let _ = tx.try_send(frames);
            },
            err_fn,
            None,
        )
        .map_err(|e| log::warn!(target: "audio", "could not open input '{}': {e}", devices::device_name(device)))
        .ok()?;

    if let Err(e) = stream.play() {
        log::warn!(target: "audio", "could not start input stream: {e}");
        return None;
    }

    Some(stream)
}
