//! Debug-info recording.
//!
//! The back-end records the debug events a native emitter needs (procedure
//! scopes and parameter variables bound to their stack slots) and leaves
//! metadata encoding to the consumer. Nothing is recorded at
//! [`DebugLevel::None`].

use jolt_llvm::ValueId;

use crate::options::DebugLevel;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DebugEvent {
    OpenScope { name: String },
    CloseScope,
    /// A formal parameter. `arg` is 1-based and counts the receiver.
    Parameter { name: String, arg: u32, slot: ValueId },
}

#[derive(Clone, Debug, Default)]
pub struct DebugInfo {
    level: DebugLevel,
    depth: usize,
    events: Vec<DebugEvent>,
}

impl DebugInfo {
    pub fn new(level: DebugLevel) -> Self {
        Self {
            level,
            depth: 0,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.level != DebugLevel::None
    }

    pub fn open_scope(&mut self, name: &str) {
        if self.is_enabled() {
            self.depth += 1;
            self.events.push(DebugEvent::OpenScope {
                name: name.to_owned(),
            });
        }
    }

    pub fn close_scope(&mut self) {
        if self.is_enabled() && self.depth > 0 {
            self.depth -= 1;
            self.events.push(DebugEvent::CloseScope);
        }
    }

    pub fn declare_parameter(&mut self, name: &str, arg: u32, slot: ValueId) {
        if self.is_enabled() {
            self.events.push(DebugEvent::Parameter {
                name: name.to_owned(),
                arg,
                slot,
            });
        }
    }

    /// Currently open scopes.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn events(&self) -> &[DebugEvent] {
        &self.events
    }
}
