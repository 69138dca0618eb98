//! RAII-style frame guards for comprehension scopes.
//!
//! [`ScopedInterpreter`] pushes a frame when created and pops it when
//! dropped, so the frame is discarded on success, on an error returned
//! through `?`, and during unwinding.
//!
//! The guard holds `&mut Interpreter` and implements `Deref`/`DerefMut`, so
//! the body keeps calling interpreter methods directly.
//!
//! # Usage
//!
//! ```text
//! interpreter.with_env_scope(|scoped| {
//!     scoped.assign(target, item)?;
//!     scoped.eval(elt)
//! })
//! ```

use std::ops::{Deref, DerefMut};

use super::Interpreter;

/// Guard that pops the frame it pushed when dropped.
pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.scope.pop();
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push a frame that lives as long as the returned guard.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        self.scope.push();
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` inside a fresh frame.
    pub fn with_env_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }
}

#[cfg(test)]
#[expect(
    clippy::semicolon_if_nothing_returned,
    reason = "test code: relaxed style for readability"
)]
