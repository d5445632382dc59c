// skein_core/src/service.rs

//! The root entry point: a cheap-clone facade owning one engine (scheduler
//! plus frame stack). All chains built through one `Skein` share that
//! engine; independent `Skein` instances are fully isolated.

use std::sync::Arc;

use crate::chain::{Chain, Task};
use crate::core::completion::Completion;
use crate::core::context::Context;
use crate::core::step::{Step, StepResult};
use crate::core::value::Value;
use crate::engine::scheduler::Scheduler;
use crate::engine::Engine;
use crate::error::{Fault, SkeinError, SkeinResult};

#[derive(Clone)]
pub struct Skein {
  engine: Engine,
}

impl Skein {
  pub fn new() -> Self {
    Skein {
      engine: Engine::new(),
    }
  }

  // --- Completion construction ---

  /// Normalizes a value into a completion. A [`Value::Deferred`] unwraps to
  /// the completion it carries; anything else becomes an inline success, so
  /// purely synchronous pipelines never touch the scheduler.
  pub fn confer(&self, value: impl Into<Value>) -> Completion {
    match value.into() {
      Value::Deferred(completion) => completion,
      value => Completion::of(value),
    }
  }

  /// An inline completion already failed with `reason`.
  pub fn reject(&self, reason: impl Into<Fault>) -> Completion {
    Completion::failed(reason.into())
  }

  /// A pending completion dispatched through this engine's scheduler.
  /// Settle it with [`Completion::resolve`] or [`Completion::fail`].
  pub fn pending(&self) -> Completion {
    Completion::pending(self.engine.scheduler())
  }

  // --- Chain entry points ---

  fn fresh(&self) -> Chain {
    Chain::root(&self.engine, Completion::of(Value::Null))
  }

  /// Starts a chain whose first step receives `value` as-is, even when it
  /// is completion-shaped.
  pub fn seed(&self, value: impl Into<Value>) -> Chain {
    Chain::root(
      &self.engine,
      Completion::of(Value::Seed(Box::new(value.into()))),
    )
  }

  /// Starts a chain with a success-path step.
  pub fn next(&self, step: impl Into<Step>) -> Chain {
    self.fresh().next(step)
  }

  /// Starts a chain with a success-path step under an explicit context.
  pub fn next_with(&self, step: impl Into<Step>, ctx: &Context) -> Chain {
    self.fresh().next_with(step, ctx)
  }

  /// Starts a chain with a conditional block.
  pub fn next_if(&self, cond: impl Into<Step>) -> Chain {
    self.fresh().next_if(cond)
  }

  /// Starts a chain loading context slot `name`.
  pub fn get(&self, name: impl Into<String>) -> Chain {
    self.fresh().get(name)
  }

  /// Starts a chain storing its current value into context slot `name`.
  pub fn set(&self, name: impl Into<String>) -> Chain {
    self.fresh().set(name)
  }

  /// Starts a chain pushing `values` onto its data stack.
  pub fn push(&self, values: Vec<Value>) -> Chain {
    self.fresh().push(values)
  }

  /// Wraps `fun` into a reusable task bound to `receiver`.
  pub fn task<F>(&self, receiver: &Context, fun: F) -> Task
  where
    F: Fn(&Context, &[Value]) -> StepResult + Send + Sync + 'static,
  {
    Task::new(self.engine.clone(), receiver.clone(), Arc::new(fun))
  }

  // --- Frame inheritance ---

  /// A fresh chain sharing the invoking frame's data stack. Mutations are
  /// visible to the parent chain. Only meaningful while a step is running.
  pub fn load_parent_stack(&self) -> SkeinResult<Chain> {
    let (_, _, stack) = self
      .engine
      .frame_status()
      .ok_or(SkeinError::NoActiveFrame)?;
    Ok(Chain::with_stack(
      &self.engine,
      Completion::of(Value::Null),
      stack,
    ))
  }

  /// A fresh chain seeded with the invoking frame's status: its value on
  /// the success path, a rejection carrying the fault reason on an error
  /// tick.
  pub fn load_parent_status(&self) -> SkeinResult<Chain> {
    let (value, is_error, _) = self
      .engine
      .frame_status()
      .ok_or(SkeinError::NoActiveFrame)?;
    Ok(Chain::root(&self.engine, status_completion(value, is_error)))
  }

  /// A fresh chain adopting both the invoking frame's status and its data
  /// stack.
  pub fn load_parent(&self) -> SkeinResult<Chain> {
    let (value, is_error, stack) = self
      .engine
      .frame_status()
      .ok_or(SkeinError::NoActiveFrame)?;
    Ok(Chain::with_stack(
      &self.engine,
      status_completion(value, is_error),
      stack,
    ))
  }

  /// Alias for [`load_parent`](Skein::load_parent).
  pub fn inherit(&self) -> SkeinResult<Chain> {
    self.load_parent()
  }

  // --- Scheduler controls ---

  /// Drains the scheduler's job queue.
  pub fn run_until_idle(&self) {
    self.engine.scheduler().run_until_idle();
  }

  /// Moves virtual time forward, firing due timers.
  pub fn advance(&self, delta: u64) {
    self.engine.scheduler().advance(delta);
  }

  /// Current virtual time.
  pub fn now(&self) -> u64 {
    self.engine.scheduler().now()
  }

  /// A handle to this engine's scheduler.
  pub fn scheduler(&self) -> Scheduler {
    self.engine.scheduler().clone()
  }
}

impl Default for Skein {
  fn default() -> Self {
    Skein::new()
  }
}

fn status_completion(value: Value, is_error: bool) -> Completion {
  if is_error {
    Completion::failed(Fault::new(value))
  } else {
    Completion::of(Value::Seed(Box::new(value)))
  }
}
