// skein_core/src/chain/ops.rs

//! Ordinary chain operations: success-path and failure-path steps, method
//! invocation on the current value, context and data-stack access, timed
//! suspension, and per-element fan-out.

use std::sync::Arc;

use crate::chain::Chain;
use crate::core::completion::{Completion, Outcome, Resolution};
use crate::core::context::Context;
use crate::core::step::{done, pass, Step};
use crate::core::value::Value;
use crate::error::Fault;

impl Chain {
  /// Appends a success-path step. While the chain is skipped the value
  /// passes through untouched and the step never runs.
  pub fn next(self, step: impl Into<Step>) -> Self {
    self.next_impl(step.into(), None)
  }

  /// Like [`next`](Chain::next), with an explicit context for the step.
  pub fn next_with(self, step: impl Into<Step>, ctx: &Context) -> Self {
    self.next_impl(step.into(), Some(ctx.clone()))
  }

  pub(crate) fn next_impl(self, step: Step, ctx: Option<Context>) -> Self {
    let ctx = self.ambient_or(ctx);
    let state = Arc::clone(&self.state);
    let engine = self.engine.clone();
    self.rebind(move |completion| {
      completion.then(move |value| {
        if state.is_skipped() {
          return Resolution::Keep;
        }
        let stack = state.stack_handle();
        engine.tick(&ctx, step, value.unseed(), false, &stack)
      })
    });
    self
  }

  /// Appends a failure-path step. Its input is the fault reason and it runs
  /// as an error tick: yielding nothing resolves the chain to success
  /// `Null`, so later handlers do not see the fault again. While skipped,
  /// the same rejection is re-raised unchanged for later handlers.
  pub fn handle(self, step: impl Into<Step>) -> Self {
    self.handle_impl(step.into(), None)
  }

  /// Like [`handle`](Chain::handle), with an explicit context.
  pub fn handle_with(self, step: impl Into<Step>, ctx: &Context) -> Self {
    self.handle_impl(step.into(), Some(ctx.clone()))
  }

  fn handle_impl(self, step: Step, ctx: Option<Context>) -> Self {
    let ctx = self.ambient_or(ctx);
    let state = Arc::clone(&self.state);
    let engine = self.engine.clone();
    self.rebind(move |completion| {
      completion.react(move |outcome| {
        let fault = match outcome {
          Outcome::Success(_) => return Resolution::Keep,
          Outcome::Failure(fault) => fault,
        };
        if state.is_skipped() {
          return Resolution::Keep;
        }
        let stack = state.stack_handle();
        engine.tick(&ctx, step, fault.into_reason(), true, &stack)
      })
    });
    self
  }

  /// Appends a step that runs on both paths. On success it behaves like
  /// [`next`](Chain::next). On failure it runs as an error tick for its
  /// side effect, the chain waits on whatever it produced, and the original
  /// fault is re-raised regardless; `always` can never mask a failure.
  pub fn always(self, step: impl Into<Step>) -> Self {
    self.always_impl(step.into(), None)
  }

  /// Like [`always`](Chain::always), with an explicit context.
  pub fn always_with(self, step: impl Into<Step>, ctx: &Context) -> Self {
    self.always_impl(step.into(), Some(ctx.clone()))
  }

  fn always_impl(self, step: Step, ctx: Option<Context>) -> Self {
    let ctx = self.ambient_or(ctx);
    let state = Arc::clone(&self.state);
    let engine = self.engine.clone();
    self.rebind(move |completion| {
      completion.react(move |outcome| {
        if state.is_skipped() {
          return Resolution::Keep;
        }
        let stack = state.stack_handle();
        match outcome {
          Outcome::Success(value) => engine.tick(&ctx, step, value.unseed(), false, &stack),
          Outcome::Failure(fault) => {
            let reason = fault.reason().clone();
            match engine.tick(&ctx, step, reason, true, &stack) {
              Resolution::Follow(side) => Resolution::Follow(
                side.react(move |_| Resolution::Settle(Outcome::Failure(fault))),
              ),
              _ => Resolution::Settle(Outcome::Failure(fault)),
            }
          }
        }
      })
    });
    self
  }

  /// Replaces the chain's value with `Seed(value)`, so the next step
  /// receives `value` as-is even when it is completion-shaped.
  pub fn seed(self, value: impl Into<Value>) -> Self {
    self.next_impl(
      Step::Literal(Value::Seed(Box::new(value.into()))),
      None,
    )
  }

  /// Invokes method `method` on the current value with `args`. The current
  /// value must be an [`Object`](Value::Object).
  pub fn apply(self, method: impl Into<String>, args: Vec<Value>) -> Self {
    let method = method.into();
    self.next_impl(
      Step::func(move |_ctx, value| match value {
        Value::Object(receiver) => receiver.invoke(&method, &args),
        other => Err(Fault::new(format!("no method `{method}` on {other:?}"))),
      }),
      None,
    )
  }

  /// Argument-slice form of [`apply`](Chain::apply).
  pub fn call(self, method: impl Into<String>, args: &[Value]) -> Self {
    self.apply(method, args.to_vec())
  }

  /// Loads context slot `name` as the chain's next value (`Null` when the
  /// slot is absent).
  pub fn get(self, name: impl Into<String>) -> Self {
    let name = name.into();
    self.next_impl(
      Step::func(move |ctx, _value| done(ctx.get(&name).unwrap_or(Value::Null))),
      None,
    )
  }

  /// Stores the current value into context slot `name` and passes it
  /// through.
  pub fn set(self, name: impl Into<String>) -> Self {
    let name = name.into();
    self.next_impl(
      Step::func(move |ctx, value| {
        ctx.set(name.clone(), value.clone());
        done(value)
      }),
      None,
    )
  }

  /// Pushes `values` onto the chain's data stack; an empty `values` pushes
  /// the current value instead. The chain value passes through.
  pub fn push(self, values: Vec<Value>) -> Self {
    let stack = self.state.stack_handle();
    self.next_impl(
      Step::func(move |_ctx, value| {
        let mut entries = stack.lock();
        if values.is_empty() {
          entries.push(value);
        } else {
          entries.extend(values.iter().cloned());
        }
        drop(entries);
        pass()
      }),
      None,
    )
  }

  /// Pops the top of the data stack as the chain's next value (`Null` when
  /// the stack is empty).
  pub fn pop(self) -> Self {
    let stack = self.state.stack_handle();
    self.next_impl(
      Step::func(move |_ctx, _value| {
        let popped = stack.lock().pop().unwrap_or(Value::Null);
        done(popped)
      }),
      None,
    )
  }

  /// Pops the top of the data stack into context slot `name`; the chain
  /// value passes through.
  pub fn pop_into(self, name: impl Into<String>) -> Self {
    let name = name.into();
    let stack = self.state.stack_handle();
    self.next_impl(
      Step::func(move |ctx, value| {
        let popped = stack.lock().pop().unwrap_or(Value::Null);
        ctx.set(name.clone(), popped);
        done(value)
      }),
      None,
    )
  }

  /// Suspends the chain for `delay` scheduler time units, then resumes with
  /// the same value. Failures pass through undelayed.
  ///
  /// This attaches to the completion pipeline directly: the delay applies
  /// even while the chain is skipped, a timer inserted inside a dead block
  /// still runs when time advances.
  pub fn wait(self, delay: u64) -> Self {
    let engine = self.engine.clone();
    self.rebind(move |completion| {
      completion.then(move |value| {
        let timer = Completion::pending(engine.scheduler());
        let resolved = timer.clone();
        engine
          .scheduler()
          .schedule_after(delay, move || resolved.resolve(value));
        Resolution::Follow(timer)
      })
    });
    self
  }

  /// Permanently stops this chain: every later step on it is skipped.
  /// A success-path control step; chains forked from earlier steps are
  /// unaffected, and in-flight work already scheduled still settles.
  pub fn exit(self) -> Self {
    let state = Arc::clone(&self.state);
    self.rebind(move |completion| {
      completion.then(move |_value| {
        if !state.is_skipped() {
          state.mark_exited();
        }
        Resolution::Keep
      })
    });
    self
  }

  /// Spawns one chain per element of the current value (a
  /// [`List`](Value::List)), each settled with its element and appending
  /// `step`. The spawned chains register with the running frame, so the
  /// enclosing step's continuation waits on all of them.
  pub fn fork_each(self, step: impl Into<Step>) -> Self {
    self.fork_each_impl(step.into(), None)
  }

  /// Like [`fork_each`](Chain::fork_each), with an explicit context.
  pub fn fork_each_with(self, step: impl Into<Step>, ctx: &Context) -> Self {
    self.fork_each_impl(step.into(), Some(ctx.clone()))
  }

  fn fork_each_impl(self, step: Step, ctx: Option<Context>) -> Self {
    let engine = self.engine.clone();
    self.next_impl(
      Step::func(move |ctx, value| match value {
        Value::List(items) => {
          for item in items {
            Chain::root(&engine, Completion::of(item)).next_impl(step.clone(), Some(ctx.clone()));
          }
          pass()
        }
        other => Err(Fault::new(format!("fork_each expects a list, got {other:?}"))),
      }),
      ctx,
    )
  }
}
