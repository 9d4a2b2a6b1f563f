//! Recording engine for controller tests.
//!
//! Every call is appended to an operation log so tests can assert on exactly
//! what reached the engine and in what order. Handles are handed out
//! sequentially per build, the way a real node chain indexes its nodes.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::engine_api::{AudioEngine, EngineError, EngineResult, NodeHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineOp {
    Start,
    Stop,
    ClearChain,
    AddNode { kind: String, handle: NodeHandle },
    SetParam { node: NodeHandle, param_id: i32, value: f32 },
    SetPreferredInputDevice(i32),
}

pub struct TestEngine {
    ops: Mutex<Vec<EngineOp>>,
    unsupported: HashSet<String>,
    fail_start: bool,
    fail_stop: bool,
    fail_add_node: bool,
    next_index: i32,
    pub level: f32,
}

impl TestEngine {
    pub fn new() -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            unsupported: HashSet::new(),
            fail_start: false,
            fail_stop: false,
            fail_add_node: false,
            next_index: 0,
            level: 0.0,
        }
    }

    /// Treat `kind` as a node type the engine has no factory for.
    pub fn without_kind(mut self, kind: &str) -> Self {
        self.unsupported.insert(kind.to_string());
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn failing_add_node(mut self) -> Self {
        self.fail_add_node = true;
        self
    }

    pub fn operations(&self) -> Vec<EngineOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn count<F: Fn(&EngineOp) -> bool>(&self, f: F) -> usize {
        self.ops.lock().unwrap().iter().filter(|op| f(op)).count()
    }

    /// All `(param_id, value)` pairs pushed to `node`, oldest first.
    pub fn params_for(&self, node: NodeHandle) -> Vec<(i32, f32)> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter_map(|op| match op {
                EngineOp::SetParam { node: n, param_id, value } if *n == node => Some((*param_id, *value)),
                _ => None,
            })
            .collect()
    }

    /// Most recent value pushed for `param_id` on `node`.
    pub fn last_param(&self, node: NodeHandle, param_id: i32) -> Option<f32> {
        self.params_for(node)
            .into_iter()
            .rev()
            .find(|(id, _)| *id == param_id)
            .map(|(_, v)| v)
    }

    fn record(&self, op: EngineOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl AudioEngine for TestEngine {
    fn start(&mut self) -> EngineResult {
        self.record(EngineOp::Start);
        if self.fail_start {
            return Err(EngineError::Unavailable("no input device".into()));
        }
        Ok(())
    }

    fn stop(&mut self) -> EngineResult {
        self.record(EngineOp::Stop);
        if self.fail_stop {
            return Err(EngineError::NotRunning);
        }
        Ok(())
    }

    fn clear_chain(&mut self) -> EngineResult {
        self.record(EngineOp::ClearChain);
        self.next_index = 0;
        Ok(())
    }

    fn add_node(&mut self, kind_name: &str) -> EngineResult<NodeHandle> {
        if self.fail_add_node {
            return Err(EngineError::Unavailable("node allocation failed".into()));
        }
        let handle = if self.unsupported.contains(kind_name) {
            NodeHandle::NONE
        } else {
            let h = NodeHandle::from_raw(self.next_index);
            self.next_index += 1;
            h
        };
        self.record(EngineOp::AddNode { kind: kind_name.to_string(), handle });
        Ok(handle)
    }

    fn set_param(&self, node: NodeHandle, param_id: i32, value: f32) {
        self.record(EngineOp::SetParam { node, param_id, value });
    }

    fn input_level(&self) -> f32 {
        self.level
    }

    fn set_preferred_input_device_id(&mut self, device_id: i32) {
        self.record(EngineOp::SetPreferredInputDevice(device_id));
    }
}
