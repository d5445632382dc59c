// skein_core/src/chain/task.rs

//! The reusable task wrapper.
//!
//! A [`Task`] fixes a function to a receiver context once; [`Task::bind`]
//! then curries arguments into a [`Step`] usable anywhere a step is. When
//! the bound step runs, the function executes against the receiver (never
//! the caller's context) inside a nested frame that inherits the invoking
//! frame's error status and data stack, so `load_parent_status` and
//! `load_parent_stack` see through the task boundary. For the duration of
//! the call the receiver's last-value slot holds the unseeded pipeline
//! input.

use std::sync::Arc;

use crate::core::completion::{Outcome, Resolution};
use crate::core::context::Context;
use crate::core::step::{done, pass, Step, StepOutput, StepResult};
use crate::core::value::Value;
use crate::engine::Engine;

/// The function shape a task wraps: receiver context plus the bound
/// argument list.
pub type TaskFn = Arc<dyn Fn(&Context, &[Value]) -> StepResult + Send + Sync>;

#[derive(Clone)]
pub struct Task {
  engine: Engine,
  receiver: Context,
  fun: TaskFn,
}

impl Task {
  pub(crate) fn new(engine: Engine, receiver: Context, fun: TaskFn) -> Self {
    Task {
      engine,
      receiver,
      fun,
    }
  }

  /// Curries `args` into a bound step.
  ///
  /// Within the bound call, forks the function opens fold into the bound
  /// step's own result, so the surrounding step joins on them as usual.
  /// The function may also hand back a continuation
  /// ([`StepOutput::Continue`]), which receives the pipeline input
  /// directly.
  pub fn bind(&self, args: Vec<Value>) -> Step {
    let engine = self.engine.clone();
    let receiver = self.receiver.clone();
    let fun = Arc::clone(&self.fun);
    Step::func(move |_caller, value| {
      let input = value.unseed();
      let (is_error, host_stack) = engine.frame_heritage();
      let saved = receiver.swap_last_value(Some(input.clone()));

      let body_fun = Arc::clone(&fun);
      let body_args = args.clone();
      let body = Step::func(move |ctx, _value| (*body_fun)(ctx, &body_args));

      let resolution = engine.tick(&receiver, body, input, is_error, &host_stack);
      receiver.swap_last_value(saved);

      match resolution {
        Resolution::Keep => pass(),
        Resolution::Settle(Outcome::Success(value)) => done(value),
        Resolution::Settle(Outcome::Failure(fault)) => Err(fault),
        Resolution::Follow(completion) => Ok(StepOutput::Wait(completion)),
      }
    })
  }

  /// Convenience for [`bind`](Task::bind) with no arguments.
  pub fn bind0(&self) -> Step {
    self.bind(Vec::new())
  }
}
