// skein_core/src/core/value.rs

//! The dynamically-shaped value that chains carry between steps.
//!
//! A chain threads one current value through its steps. The value space is
//! a closed tagged enum rather than `dyn Any` so that conditions can judge
//! truthiness, `next_case` can compare for equality, and fork/join can
//! collect results into a plain list, all without downcasting.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::completion::Completion;
use crate::core::step::StepResult;

/// Method-dispatch seam for `apply`/`call`.
///
/// A receiver is any shared object exposing named methods to the chain. The
/// invoked method behaves exactly like a step body: it may yield a value,
/// pass the input through, hand back a completion, or fail.
pub trait Receiver: Send + Sync {
  fn invoke(&self, method: &str, args: &[Value]) -> StepResult;
}

/// A value travelling down a chain.
///
/// Two variants deserve a note:
/// - `Deferred` carries a completion as inert data. It is produced by
///   `seed`, which deliberately bypasses completion detection so callers
///   can hand a completion to the first step as a plain value.
/// - `Seed` is the one-shot starting-value marker. Every step receives its
///   input unseeded; a skipped step leaves the seeded value untouched.
#[derive(Clone, Default)]
pub enum Value {
  #[default]
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  List(Vec<Value>),
  Map(BTreeMap<String, Value>),
  Object(Arc<dyn Receiver>),
  Deferred(Completion),
  Seed(Box<Value>),
}

impl Value {
  /// Strips one `Seed` layer, if present.
  pub fn unseed(self) -> Value {
    match self {
      Value::Seed(inner) => *inner,
      other => other,
    }
  }

  /// Truthiness used by the branch machine: `Null`, zero numbers and the
  /// empty string are false, every other value (including empty lists and
  /// maps) is true. A seeded value judges its payload.
  pub fn is_truthy(&self) -> bool {
    match self {
      Value::Null => false,
      Value::Bool(flag) => *flag,
      Value::Int(n) => *n != 0,
      Value::Float(x) => *x != 0.0,
      Value::Str(text) => !text.is_empty(),
      Value::List(_) | Value::Map(_) | Value::Object(_) | Value::Deferred(_) => true,
      Value::Seed(inner) => inner.is_truthy(),
    }
  }

  pub fn object(receiver: impl Receiver + 'static) -> Value {
    Value::Object(Arc::new(receiver))
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => write!(f, "Null"),
      Value::Bool(flag) => write!(f, "{flag}"),
      Value::Int(n) => write!(f, "{n}"),
      Value::Float(x) => write!(f, "{x}"),
      Value::Str(text) => write!(f, "{text:?}"),
      Value::List(items) => f.debug_list().entries(items).finish(),
      Value::Map(entries) => f.debug_map().entries(entries).finish(),
      Value::Object(_) => write!(f, "Object(..)"),
      Value::Deferred(completion) => write!(f, "Deferred({completion:?})"),
      Value::Seed(inner) => f.debug_tuple("Seed").field(inner).finish(),
    }
  }
}

/// Structural equality for data, identity for objects and completions.
/// `Int` and `Float` compare numerically.
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Float(a), Value::Float(b)) => a == b,
      (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::List(a), Value::List(b)) => a == b,
      (Value::Map(a), Value::Map(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
      (Value::Deferred(a), Value::Deferred(b)) => a.same(b),
      (Value::Seed(a), Value::Seed(b)) => a == b,
      _ => false,
    }
  }
}

impl From<bool> for Value {
  fn from(flag: bool) -> Self {
    Value::Bool(flag)
  }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self {
    Value::Int(i64::from(n))
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Value::Int(n)
  }
}

impl From<f64> for Value {
  fn from(x: f64) -> Self {
    Value::Float(x)
  }
}

impl From<&str> for Value {
  fn from(text: &str) -> Self {
    Value::Str(text.to_string())
  }
}

impl From<String> for Value {
  fn from(text: String) -> Self {
    Value::Str(text)
  }
}

impl From<Vec<Value>> for Value {
  fn from(items: Vec<Value>) -> Self {
    Value::List(items)
  }
}

impl From<BTreeMap<String, Value>> for Value {
  fn from(entries: BTreeMap<String, Value>) -> Self {
    Value::Map(entries)
  }
}

impl From<Completion> for Value {
  fn from(completion: Completion) -> Self {
    Value::Deferred(completion)
  }
}
