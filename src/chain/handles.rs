use crate::engine_api::{NodeHandle, NodeKind};

/// Which engine node currently plays each role. Valid for one chain build;
/// `invalidate_all` drops every handle at once on teardown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandleTable {
    slots: [NodeHandle; 4],
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: NodeKind) -> NodeHandle {
        self.slots[kind.slot()]
    }

    pub fn set(&mut self, kind: NodeKind, handle: NodeHandle) {
        self.slots[kind.slot()] = handle;
    }

    pub fn is_valid(&self, kind: NodeKind) -> bool {
        self.get(kind).is_valid()
    }

    pub fn invalidate_all(&mut self) {
        self.slots = [NodeHandle::NONE; 4];
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|h| h.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let table = HandleTable::new();
        for kind in NodeKind::BUILD_ORDER {
            assert!(!table.is_valid(kind));
        }
        assert_eq!(table.live_count(), 0);
    }

    #[test]
    fn set_and_invalidate() {
        let mut table = HandleTable::new();
        table.set(NodeKind::Gain, NodeHandle::from_raw(0));
        table.set(NodeKind::Delay, NodeHandle::from_raw(2));
        assert_eq!(table.get(NodeKind::Delay), NodeHandle::from_raw(2));
        assert!(!table.is_valid(NodeKind::NoiseGate));
        assert_eq!(table.live_count(), 2);

        table.invalidate_all();
        assert_eq!(table.live_count(), 0);
        assert_eq!(table.get(NodeKind::Gain), NodeHandle::NONE);
    }
}
