// skein_core/src/core/step.rs

//! Step arguments and step results.
//!
//! Anything appended to a chain is a [`Step`]: a literal value, a
//! completion to wait on, or a function of the current value. The tag is
//! chosen by the producer; the engine never sniffs a value's shape to
//! decide whether it is awaitable.

use std::sync::Arc;

use crate::core::completion::Completion;
use crate::core::context::Context;
use crate::core::value::Value;
use crate::error::Fault;

/// A step function: receives the bound context and the (unseeded) current
/// value, and yields a [`StepResult`].
pub type StepFn = Arc<dyn Fn(&Context, Value) -> StepResult + Send + Sync>;

/// One unit of work appended to a chain.
#[derive(Clone)]
pub enum Step {
  /// A literal: becomes the chain's next value as-is.
  Literal(Value),
  /// A completion: the chain waits for it and continues with its outcome.
  Deferred(Completion),
  /// A function invoked inside an execution frame.
  Func(StepFn),
}

impl Step {
  pub fn func<F>(f: F) -> Step
  where
    F: Fn(&Context, Value) -> StepResult + Send + Sync + 'static,
  {
    Step::Func(Arc::new(f))
  }

  pub(crate) fn kind(&self) -> &'static str {
    match self {
      Step::Literal(_) => "literal",
      Step::Deferred(_) => "deferred",
      Step::Func(_) => "func",
    }
  }
}

impl From<Value> for Step {
  fn from(value: Value) -> Self {
    Step::Literal(value)
  }
}

impl From<Completion> for Step {
  fn from(completion: Completion) -> Self {
    Step::Deferred(completion)
  }
}

impl From<bool> for Step {
  fn from(flag: bool) -> Self {
    Step::Literal(Value::Bool(flag))
  }
}

impl From<i64> for Step {
  fn from(n: i64) -> Self {
    Step::Literal(Value::Int(n))
  }
}

impl From<&str> for Step {
  fn from(text: &str) -> Self {
    Step::Literal(Value::Str(text.to_string()))
  }
}

impl From<String> for Step {
  fn from(text: String) -> Self {
    Step::Literal(Value::Str(text))
  }
}

/// What a step function produced.
pub enum StepOutput {
  /// An explicit value: becomes the chain's next value.
  Done(Value),
  /// Nothing: the previous value passes through unchanged.
  Pass,
  /// A completion the chain must wait on before continuing.
  Wait(Completion),
  /// A continuation to run against the same input (trampolined by the
  /// engine until a non-`Continue` output is produced).
  Continue(StepFn),
}

pub type StepResult = Result<StepOutput, Fault>;

/// Shorthand for [`Step::func`].
pub fn step<F>(f: F) -> Step
where
  F: Fn(&Context, Value) -> StepResult + Send + Sync + 'static,
{
  Step::func(f)
}

pub fn done(value: impl Into<Value>) -> StepResult {
  Ok(StepOutput::Done(value.into()))
}

pub fn pass() -> StepResult {
  Ok(StepOutput::Pass)
}

pub fn wait_on(completion: &Completion) -> StepResult {
  Ok(StepOutput::Wait(completion.clone()))
}

pub fn continue_with<F>(f: F) -> StepResult
where
  F: Fn(&Context, Value) -> StepResult + Send + Sync + 'static,
{
  Ok(StepOutput::Continue(Arc::new(f)))
}
