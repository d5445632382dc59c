// skein_core/src/engine/mod.rs

//! The execution engine: the frame stack, the `tick` step invoker, and the
//! fold that turns chains spawned during a step into the step's result.

pub mod scheduler;

pub(crate) mod frame;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{event, span, Level};

use crate::core::completion::{Completion, Outcome, Resolution};
use crate::core::context::Context;
use crate::core::step::{Step, StepOutput};
use crate::core::value::Value;
use crate::engine::frame::Frame;
use crate::engine::scheduler::Scheduler;
use crate::error::Fault;

/// The designated owner of all execution state: the scheduler and the frame
/// stack. Every chain operation carries an `Engine` handle instead of
/// consulting process-wide globals, so independent engines never observe
/// each other's frames.
#[derive(Clone)]
pub(crate) struct Engine {
  shared: Arc<EngineShared>,
}

struct EngineShared {
  scheduler: Scheduler,
  frames: Mutex<Vec<Frame>>,
}

/// What a step function's trampoline finally produced.
enum Produced {
  Value(Value),
  Nothing,
  Waiting(Completion),
}

impl Engine {
  pub(crate) fn new() -> Self {
    Engine {
      shared: Arc::new(EngineShared {
        scheduler: Scheduler::new(),
        frames: Mutex::new(Vec::new()),
      }),
    }
  }

  pub(crate) fn scheduler(&self) -> &Scheduler {
    &self.shared.scheduler
  }

  /// Registers a freshly constructed chain into the current frame, if one
  /// is active. This is how a step's forks are discovered.
  pub(crate) fn adopt(&self, chain: &crate::chain::Chain) {
    if let Some(top) = self.shared.frames.lock().last_mut() {
      top.spawned.push(chain.clone());
    }
  }

  /// The context of the current frame, inherited by entry points called
  /// without an explicit context.
  pub(crate) fn ambient_ctx(&self) -> Option<Context> {
    self.shared.frames.lock().last().map(|frame| frame.ctx.clone())
  }

  /// Snapshot of the current frame for `load_parent_*`: (value, is_error,
  /// data-stack handle).
  pub(crate) fn frame_status(&self) -> Option<(Value, bool, Arc<Mutex<Vec<Value>>>)> {
    self
      .shared
      .frames
      .lock()
      .last()
      .map(|frame| (frame.value.clone(), frame.is_error, Arc::clone(&frame.stack)))
  }

  /// The (is_error, data stack) pair a nested invocation inherits from the
  /// current frame. Falls back to a clean slate outside any frame.
  pub(crate) fn frame_heritage(&self) -> (bool, Arc<Mutex<Vec<Value>>>) {
    match self.shared.frames.lock().last() {
      Some(frame) => (frame.is_error, Arc::clone(&frame.stack)),
      None => (false, Arc::new(Mutex::new(Vec::new()))),
    }
  }

  /// Invokes one step and folds in whatever it spawned.
  ///
  /// Literals and deferred completions short-circuit without a frame. A
  /// function runs inside a fresh frame; while it yields
  /// [`StepOutput::Continue`] the continuation is invoked against the same
  /// input in the same frame. When the synchronous extent ends the frame is
  /// popped and its spawned chains are folded:
  ///
  /// - no children: the function's own output stands. `Pass` keeps the
  ///   previous chain value, except on an error tick where it resolves to
  ///   success `Null` (a recovery handler that yields nothing recovers).
  /// - one child: that chain's completion replaces the output.
  /// - several children: a join of all of them replaces the output; the
  ///   join fails with the first child failure.
  ///
  /// A function that fails wins over anything it spawned; the spawned
  /// chains keep running detached.
  pub(crate) fn tick(
    &self,
    ctx: &Context,
    step: Step,
    input: Value,
    is_error: bool,
    host_stack: &Arc<Mutex<Vec<Value>>>,
  ) -> Resolution {
    let kind = step.kind();
    let fun = match step {
      Step::Literal(value) => return Resolution::Settle(Outcome::Success(value)),
      Step::Deferred(completion) => return Resolution::Follow(completion),
      Step::Func(fun) => fun,
    };

    let tick_span = span!(Level::TRACE, "tick", kind, is_error);
    let _tick_span_guard = tick_span.enter();

    self.shared.frames.lock().push(Frame {
      ctx: ctx.clone(),
      value: input.clone(),
      is_error,
      spawned: Vec::new(),
      stack: Arc::clone(host_stack),
    });

    let mut current = fun;
    let produced: Result<Produced, Fault> = loop {
      match (*current)(ctx, input.clone()) {
        Ok(StepOutput::Continue(next)) => current = next,
        Ok(StepOutput::Done(value)) => break Ok(Produced::Value(value)),
        Ok(StepOutput::Pass) => break Ok(Produced::Nothing),
        Ok(StepOutput::Wait(completion)) => break Ok(Produced::Waiting(completion)),
        Err(fault) => break Err(fault),
      }
    };

    let spawned = match self.shared.frames.lock().pop() {
      Some(frame) => frame.spawned,
      None => Vec::new(),
    };

    match produced {
      Err(fault) => {
        event!(Level::DEBUG, fault = %fault, detached = spawned.len(), "step failed");
        Resolution::Settle(Outcome::Failure(fault))
      }
      Ok(produced) => {
        let mut completions: Vec<Completion> =
          spawned.iter().map(crate::chain::Chain::completion).collect();
        match completions.len() {
          0 => match produced {
            Produced::Value(value) => Resolution::Settle(Outcome::Success(value)),
            Produced::Waiting(completion) => Resolution::Follow(completion),
            Produced::Nothing => {
              if is_error {
                Resolution::Settle(Outcome::Success(Value::Null))
              } else {
                Resolution::Keep
              }
            }
          },
          1 => Resolution::Follow(completions.swap_remove(0)),
          children => {
            event!(Level::DEBUG, children, "joining spawned chains");
            Resolution::Follow(Completion::join(&self.shared.scheduler, completions))
          }
        }
      }
    }
  }
}
