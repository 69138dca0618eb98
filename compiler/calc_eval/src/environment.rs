//! Scope stack for script bindings.
//!
//! Frame 0 is the ambient frame shared by top-level statements, loops and
//! conditionals. Comprehensions push one frame for their whole evaluation.
//! Below all frames sits the read-only table of global names.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::builtins::lookup_global;
use crate::errors::{name_not_found, EvalResult};
use crate::Value;

/// A single frame of bindings.
type Frame = FxHashMap<String, Value>;

/// Stack of binding frames, innermost last.
#[derive(Clone, Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// A stack holding only the empty ambient frame.
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the innermost frame; the ambient frame is never popped.
    #[inline]
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Look a name up innermost first, then in the global names.
    pub fn get(&self, name: &str) -> EvalResult<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).cloned())
            .or_else(|| lookup_global(name))
            .ok_or_else(|| name_not_found(name))
    }

    /// Bind in the innermost frame.
    #[inline]
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    /// Remove from the innermost frame only.
    pub fn delete(&mut self, name: &str) -> EvalResult<()> {
        self.frames
            .last_mut()
            .and_then(|frame| frame.remove(name))
            .map(|_| ())
            .ok_or_else(|| name_not_found(name))
    }

    /// Whether any frame binds `name`. Global names do not count.
    pub fn contains(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains_key(name))
    }

    /// Bindings of the ambient frame, sorted by name.
    pub fn bindings(&self) -> BTreeMap<String, Value> {
        self.frames
            .first()
            .map(|frame| {
                frame
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
