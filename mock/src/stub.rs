//! Recording stubs and the sandbox that owns them.
//!
//! A [`Stub`] is a cheap, cloneable handle: every clone observes the same
//! call history and programmed outcome, so a test can grab a stub out of the
//! tree, program it, hand the tree to code under test and then inspect the
//! calls.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use webext_schema_mock::Sandbox;
//!
//! let mut sandbox = Sandbox::new();
//! let get = sandbox.stub();
//! get.returns(json!({ "id": 1 }));
//!
//! assert_eq!(get.call(&[json!("tab")]).unwrap(), json!({ "id": 1 }));
//! assert_eq!(get.call_count(), 1);
//!
//! sandbox.reset();
//! assert_eq!(get.call_count(), 0);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

/// Failure produced by a stub programmed with [`Stub::rejects`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StubError {
    /// The stub was programmed to reject.
    #[error("stub rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
enum Outcome {
    #[default]
    Undefined,
    Returns(Value),
    Rejects(String),
}

#[derive(Debug, Default)]
struct StubState {
    calls: Vec<Vec<Value>>,
    outcome: Outcome,
}

/// Recording callable substitute for an API function.
///
/// Unprogrammed stubs return `Value::Null` (the host's `undefined`).
#[derive(Clone, Default)]
pub struct Stub {
    state: Arc<Mutex<StubState>>,
}

impl Stub {
    /// Creates a detached stub. Stubs created through a [`Sandbox`] are
    /// additionally reset with it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a call and returns the programmed outcome.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Rejected`] if the stub was programmed with
    /// [`rejects`](Self::rejects).
    pub fn call(&self, args: &[Value]) -> Result<Value, StubError> {
        let mut state = self.state.lock();
        state.calls.push(args.to_vec());
        match &state.outcome {
            Outcome::Undefined => Ok(Value::Null),
            Outcome::Returns(value) => Ok(value.clone()),
            Outcome::Rejects(reason) => Err(StubError::Rejected(reason.clone())),
        }
    }

    /// Programs the value every subsequent call returns.
    pub fn returns(&self, value: Value) -> &Self {
        self.state.lock().outcome = Outcome::Returns(value);
        self
    }

    /// Programs every subsequent call to fail with `reason`.
    pub fn rejects(&self, reason: impl Into<String>) -> &Self {
        self.state.lock().outcome = Outcome::Rejects(reason.into());
        self
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Returns `true` if the stub was called at least once.
    pub fn called(&self) -> bool {
        self.call_count() > 0
    }

    /// Arguments of every recorded call, oldest first.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.state.lock().calls.clone()
    }

    /// Arguments of the most recent call.
    pub fn last_call(&self) -> Option<Vec<Value>> {
        self.state.lock().calls.last().cloned()
    }

    /// Clears recorded calls, keeping the programmed outcome.
    pub fn reset_history(&self) {
        self.state.lock().calls.clear();
    }

    /// Clears the programmed outcome, keeping recorded calls.
    pub fn reset_behavior(&self) {
        self.state.lock().outcome = Outcome::Undefined;
    }

    /// Clears both history and behavior.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.calls.clear();
        state.outcome = Outcome::Undefined;
    }

    /// Returns `true` if both handles refer to the same stub.
    pub fn ptr_eq(&self, other: &Stub) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Stub")
            .field("call_count", &state.calls.len())
            .field("outcome", &state.outcome)
            .finish()
    }
}

/// Registry of every stub created for one tree.
#[derive(Debug, Default)]
pub struct Sandbox {
    stubs: Vec<Stub>,
}

impl Sandbox {
    /// Creates an empty sandbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stub registered with this sandbox.
    pub fn stub(&mut self) -> Stub {
        let stub = Stub::new();
        self.stubs.push(stub.clone());
        stub
    }

    /// Number of stubs created through this sandbox.
    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    /// Returns `true` if no stub was created.
    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    /// Resets history and behavior of every stub.
    pub fn reset(&self) {
        self.stubs.iter().for_each(Stub::reset);
    }

    /// Clears recorded calls of every stub.
    pub fn reset_history(&self) {
        self.stubs.iter().for_each(Stub::reset_history);
    }

    /// Clears programmed outcomes of every stub.
    pub fn reset_behavior(&self) {
        self.stubs.iter().for_each(Stub::reset_behavior);
    }
}
