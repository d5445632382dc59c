// skein_core/src/error.rs

//! Error types: `SkeinError` for protocol misuse of the chaining surface,
//! `Fault` for failures flowing through a chain's completion pipeline.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::value::Value;

/// Misuse of the chaining protocol. These are programmer errors, not step
/// failures: they never travel down a chain as a rejection.
///
/// `NoActiveFrame` is returned as an `Err` from frame-dependent entry points
/// (`inherit`, `load_parent_*`). The block-stack variants are raised as
/// panics from the offending operation, because continuing with a corrupted
/// block stack would silently misroute every later step.
#[derive(Debug, Error)]
pub enum SkeinError {
  #[error("no active execution frame")]
  NoActiveFrame,

  #[error("end() closed a conditional block that was never opened")]
  UnbalancedEnd,

  #[error("or_next_if() has no preceding next_if() on this chain")]
  DanglingOrNextIf,
}

pub type SkeinResult<T, E = SkeinError> = std::result::Result<T, E>;

/// The failure reason carried by a rejected [`Completion`](crate::Completion).
///
/// A fault is a domain value first: `handle` steps receive the reason as
/// their input, and equality (used by tests and by `next_case`-style
/// comparisons) considers the reason only. An optional `anyhow` source is
/// kept for faults wrapping external errors, so the full cause chain stays
/// reachable through `std::error::Error::source`.
#[derive(Debug, Clone)]
pub struct Fault {
  reason: Value,
  source: Option<Arc<anyhow::Error>>,
}

impl Fault {
  pub fn new(reason: impl Into<Value>) -> Self {
    Fault {
      reason: reason.into(),
      source: None,
    }
  }

  pub fn msg(text: impl Into<String>) -> Self {
    Fault::new(Value::Str(text.into()))
  }

  /// A fault carrying both a reason value and the external error it wraps.
  pub fn wrap(reason: impl Into<Value>, source: anyhow::Error) -> Self {
    Fault {
      reason: reason.into(),
      source: Some(Arc::new(source)),
    }
  }

  pub fn reason(&self) -> &Value {
    &self.reason
  }

  pub fn into_reason(self) -> Value {
    self.reason
  }
}

impl fmt::Display for Fault {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "step failed: {:?}", self.reason)
  }
}

impl std::error::Error for Fault {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    self
      .source
      .as_deref()
      .map(|err| AsRef::<dyn std::error::Error>::as_ref(err))
  }
}

// Reason-only equality: the wrapped source is diagnostic context, not
// identity.
impl PartialEq for Fault {
  fn eq(&self, other: &Self) -> bool {
    self.reason == other.reason
  }
}

impl From<Value> for Fault {
  fn from(reason: Value) -> Self {
    Fault::new(reason)
  }
}

impl From<&str> for Fault {
  fn from(text: &str) -> Self {
    Fault::new(Value::Str(text.to_string()))
  }
}

impl From<String> for Fault {
  fn from(text: String) -> Self {
    Fault::new(Value::Str(text))
  }
}

impl From<anyhow::Error> for Fault {
  fn from(err: anyhow::Error) -> Self {
    let reason = Value::Str(format!("{err:#}"));
    Fault {
      reason,
      source: Some(Arc::new(err)),
    }
  }
}

// Lets step closures use `?` on frame-dependent entry points.
impl From<SkeinError> for Fault {
  fn from(err: SkeinError) -> Self {
    let reason = Value::Str(err.to_string());
    Fault {
      reason,
      source: Some(Arc::new(anyhow::Error::new(err))),
    }
  }
}
