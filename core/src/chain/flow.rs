// skein_core/src/chain/flow.rs

//! The branch/skip machine: `next_if`/`or_next_if`/`end` and their sugar.
//!
//! Each chain carries a stack of [`Block`] markers. A `next_if` pushes one
//! marker, its matching `end()` pops it; nesting is strictly LIFO. Steps
//! between them run only while every enclosing marker is `Taken`. An
//! `or_next_if` replaces the top marker: once an arm of an alternation has
//! run, the marker turns `Sealed` and no later arm may activate.
//!
//! Conditions are [`Step`]s, so a literal boolean, a function of the
//! current value, or a completion all work. A condition evaluated inside a
//! dead region (outer skipped block, or after `exit()`) is not run at all;
//! the new block opens `Skipped` directly, which keeps condition side
//! effects from leaking out of dead code.

use std::sync::Arc;

use crate::chain::{Block, Chain, ChainState};
use crate::core::completion::{Outcome, Resolution};
use crate::core::context::Context;
use crate::core::step::{done, Step};
use crate::core::value::Value;
use crate::engine::Engine;
use crate::error::SkeinError;

impl Chain {
  /// Opens a conditional block; following steps run only if `cond` holds.
  pub fn next_if(self, cond: impl Into<Step>) -> Self {
    self.branch(Some(cond.into()), None, false)
  }

  /// Like [`next_if`](Chain::next_if), with an explicit context for the
  /// condition.
  pub fn next_if_with(self, cond: impl Into<Step>, ctx: &Context) -> Self {
    self.branch(Some(cond.into()), Some(ctx.clone()), false)
  }

  /// Opens a conditional block on the truthiness of the current value
  /// itself.
  pub fn next_if_value(self) -> Self {
    self.branch(None, None, false)
  }

  /// Opens a conditional block; following steps run only if `cond` does
  /// not hold.
  pub fn next_unless(self, cond: impl Into<Step>) -> Self {
    self.branch(Some(cond.into()), None, true)
  }

  /// Opens a conditional block comparing the current value to `expected`.
  pub fn next_case(self, expected: impl Into<Value>) -> Self {
    self.branch(Some(case_step(expected.into())), None, false)
  }

  /// Alternation arm: activates only if no earlier arm of this block did.
  pub fn or_next_if(self, cond: impl Into<Step>) -> Self {
    self.or_branch(cond.into(), None, false)
  }

  /// Like [`or_next_if`](Chain::or_next_if), with an explicit context.
  pub fn or_next_if_with(self, cond: impl Into<Step>, ctx: &Context) -> Self {
    self.or_branch(cond.into(), Some(ctx.clone()), false)
  }

  /// Unconditional alternation arm (`or_next_if(true)`).
  pub fn or_next(self) -> Self {
    self.or_branch(Step::from(true), None, false)
  }

  /// Negated alternation arm.
  pub fn or_next_unless(self, cond: impl Into<Step>) -> Self {
    self.or_branch(cond.into(), None, true)
  }

  /// Alternation arm comparing the current value to `expected`.
  pub fn or_next_case(self, expected: impl Into<Value>) -> Self {
    self.or_branch(case_step(expected.into()), None, false)
  }

  /// Closes the innermost conditional block. Must balance the matching
  /// `next_if`; an unbalanced `end()` panics rather than corrupting the
  /// block stack.
  pub fn end(self) -> Self {
    let state = Arc::clone(&self.state);
    self.rebind(move |completion| {
      completion.react(move |_outcome| {
        if state.pop_block().is_none() {
          panic!("chain misuse: {}", SkeinError::UnbalancedEnd);
        }
        Resolution::Keep
      })
    });
    self
  }

  fn branch(self, cond: Option<Step>, ctx: Option<Context>, negate: bool) -> Self {
    let ctx = self.ambient_or(ctx);
    let state = Arc::clone(&self.state);
    let engine = self.engine.clone();
    self.rebind(move |completion| {
      completion.react(move |outcome| {
        let value = match outcome {
          Outcome::Failure(fault) => {
            // A failed chain still opens the block, closed, so the
            // matching end() balances.
            state.push_block(Block::Skipped);
            return Resolution::Settle(Outcome::Failure(fault));
          }
          Outcome::Success(value) => value,
        };
        if state.is_skipped() {
          state.push_block(Block::Skipped);
          return Resolution::Keep;
        }
        let cond = match cond {
          Some(cond) => cond,
          None => {
            let taken = value.unseed().is_truthy() != negate;
            state.push_block(marker(taken));
            return Resolution::Keep;
          }
        };
        judge(&engine, &ctx, cond, value, negate, Arc::clone(&state))
      })
    });
    self
  }

  fn or_branch(self, cond: Step, ctx: Option<Context>, negate: bool) -> Self {
    let ctx = self.ambient_or(ctx);
    let state = Arc::clone(&self.state);
    let engine = self.engine.clone();
    self.rebind(move |completion| {
      completion.react(move |outcome| {
        let previous = match state.pop_block() {
          Some(block) => block,
          None => panic!("chain misuse: {}", SkeinError::DanglingOrNextIf),
        };
        let value = match outcome {
          Outcome::Failure(fault) => {
            state.push_block(Block::Skipped);
            return Resolution::Settle(Outcome::Failure(fault));
          }
          Outcome::Success(value) => value,
        };
        match previous {
          // An arm already ran; seal the alternation.
          Block::Taken | Block::Sealed => {
            state.push_block(Block::Sealed);
            Resolution::Keep
          }
          Block::Skipped => {
            // With the old marker popped, is_skipped() now reflects the
            // enclosing state: stay inert inside a dead region.
            if state.is_skipped() {
              state.push_block(Block::Skipped);
              Resolution::Keep
            } else {
              judge(&engine, &ctx, cond, value, negate, Arc::clone(&state))
            }
          }
        }
      })
    });
    self
  }
}

fn marker(taken: bool) -> Block {
  if taken {
    Block::Taken
  } else {
    Block::Skipped
  }
}

fn case_step(expected: Value) -> Step {
  Step::func(move |_ctx, value| done(value == expected))
}

/// Evaluates a condition step against the (unseeded) current value and
/// pushes the resulting marker. A condition that yields nothing reads as
/// false. Condition failure opens the block closed and re-raises. After an
/// asynchronous condition the chain value is restored to the pre-condition
/// value.
fn judge(
  engine: &Engine,
  ctx: &Context,
  cond: Step,
  value: Value,
  negate: bool,
  state: Arc<ChainState>,
) -> Resolution {
  let stack = state.stack_handle();
  match engine.tick(ctx, cond, value.clone().unseed(), false, &stack) {
    Resolution::Settle(Outcome::Success(verdict)) => {
      state.push_block(marker(verdict.is_truthy() != negate));
      Resolution::Keep
    }
    Resolution::Keep => {
      state.push_block(marker(negate));
      Resolution::Keep
    }
    Resolution::Settle(Outcome::Failure(fault)) => {
      state.push_block(Block::Skipped);
      Resolution::Settle(Outcome::Failure(fault))
    }
    Resolution::Follow(pending) => {
      let original = value;
      Resolution::Follow(pending.react(move |verdict_outcome| match verdict_outcome {
        Outcome::Success(verdict) => {
          state.push_block(marker(verdict.is_truthy() != negate));
          Resolution::Settle(Outcome::Success(original))
        }
        Outcome::Failure(fault) => {
          state.push_block(Block::Skipped);
          Resolution::Settle(Outcome::Failure(fault))
        }
      }))
    }
  }
}
