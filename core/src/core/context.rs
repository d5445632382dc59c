// skein_core/src/core/context.rs

//! The shared context a step executes against.
//!
//! A `Context` is a cheaply cloneable handle to a string-keyed slot map
//! behind `parking_lot::RwLock`, plus the "last value" slot that task
//! invocations scope around their call. Chains reach it through `get`/`set`
//! steps and through the `&Context` argument every step function receives.
//!
//! IMPORTANT: guards are internal to each method; no lock is ever held
//! while user code runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::value::Value;

#[derive(Clone, Default)]
pub struct Context {
  inner: Arc<RwLock<ContextInner>>,
}

#[derive(Default)]
struct ContextInner {
  slots: HashMap<String, Value>,
  last_value: Option<Value>,
}

impl Context {
  pub fn new() -> Self {
    Context::default()
  }

  /// Reads slot `name`, cloning the stored value.
  pub fn get(&self, name: &str) -> Option<Value> {
    self.inner.read().slots.get(name).cloned()
  }

  pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
    self.inner.write().slots.insert(name.into(), value.into());
  }

  pub fn remove(&self, name: &str) -> Option<Value> {
    self.inner.write().slots.remove(name)
  }

  /// The pipeline value of the task invocation currently running against
  /// this context, if any. Set for the synchronous extent of a bound task
  /// call and restored afterwards.
  pub fn last_value(&self) -> Option<Value> {
    self.inner.read().last_value.clone()
  }

  pub(crate) fn swap_last_value(&self, value: Option<Value>) -> Option<Value> {
    std::mem::replace(&mut self.inner.write().last_value, value)
  }

  /// Identity comparison: two handles to the same underlying context.
  pub fn same(&self, other: &Context) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl PartialEq for Context {
  fn eq(&self, other: &Self) -> bool {
    self.same(other)
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let guard = self.inner.read();
    f.debug_struct("Context")
      .field("slots", &guard.slots)
      .field("last_value", &guard.last_value)
      .finish()
  }
}
