// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use std::sync::Arc;

use parking_lot::Mutex;
use skein::{done, step, Receiver, Step, StepResult, Value};
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Ordered execution log shared with recorder steps ---

#[derive(Clone, Default)]
pub struct CallLog {
  entries: Arc<Mutex<Vec<Value>>>,
}

impl CallLog {
  pub fn new() -> Self {
    CallLog::default()
  }

  pub fn record(&self, value: impl Into<Value>) {
    self.entries.lock().push(value.into());
  }

  pub fn entries(&self) -> Vec<Value> {
    self.entries.lock().clone()
  }

  pub fn ints(&self) -> Vec<i64> {
    self
      .entries
      .lock()
      .iter()
      .filter_map(|value| match value {
        Value::Int(n) => Some(*n),
        _ => None,
      })
      .collect()
  }

  pub fn strs(&self) -> Vec<String> {
    self
      .entries
      .lock()
      .iter()
      .filter_map(|value| match value {
        Value::Str(text) => Some(text.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }

  /// A step that records `label` and yields it as the next chain value.
  pub fn will_call(&self, label: impl Into<Value>) -> Step {
    let log = self.clone();
    let label = label.into();
    step(move |_ctx, _value| {
      log.record(label.clone());
      done(label.clone())
    })
  }

  /// A step that records the incoming value and passes it on unchanged.
  pub fn capture(&self) -> Step {
    let log = self.clone();
    step(move |_ctx, value| {
      log.record(value.clone());
      done(value)
    })
  }
}

// --- Receiver recording method invocations (for apply/call tests) ---

#[derive(Default)]
pub struct SpyReceiver {
  pub calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl SpyReceiver {
  pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
    self.calls.lock().clone()
  }
}

impl Receiver for SpyReceiver {
  fn invoke(&self, method: &str, args: &[Value]) -> StepResult {
    self.calls.lock().push((method.to_string(), args.to_vec()));
    done(args.first().cloned().unwrap_or(Value::Null))
  }
}

/// Wraps a spy into an object value plus a handle for assertions.
pub fn spy_object() -> (Arc<SpyReceiver>, Value) {
  let spy = Arc::new(SpyReceiver::default());
  let object: Arc<dyn Receiver> = spy.clone();
  (spy, Value::Object(object))
}
