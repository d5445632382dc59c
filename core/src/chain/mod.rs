// skein_core/src/chain/mod.rs

//! The sequencing handle callers build pipelines on.
//!
//! A [`Chain`] owns a current completion (replaced by every chaining
//! operation), a stack of conditional-block markers, a sticky exit flag,
//! and a shared data stack. Operations live in sibling modules: ordinary
//! steps in `ops`, the branch/skip machine in `flow`, the reusable task
//! wrapper in `task`.

mod flow;
mod ops;
mod task;

pub use task::{Task, TaskFn};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::completion::Completion;
use crate::core::context::Context;
use crate::core::value::Value;
use crate::engine::Engine;

/// Marker for one open conditional block.
///
/// `Taken`: the block's condition held, its steps run. `Skipped`: the
/// condition did not hold (or the block opened inside a dead region), its
/// steps pass values through. `Sealed`: an earlier arm of this alternation
/// already ran, every later `or_next_if` arm stays inert until `end()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Block {
  Taken,
  Skipped,
  Sealed,
}

pub(crate) struct ChainState {
  completion: Mutex<Completion>,
  blocks: Mutex<Vec<Block>>,
  exited: AtomicBool,
  stack: Arc<Mutex<Vec<Value>>>,
}

impl ChainState {
  fn new(completion: Completion, stack: Arc<Mutex<Vec<Value>>>) -> Self {
    ChainState {
      completion: Mutex::new(completion),
      blocks: Mutex::new(Vec::new()),
      exited: AtomicBool::new(false),
      stack,
    }
  }

  /// True when steps on this chain must pass values through untouched:
  /// after `exit()`, or inside a block whose marker is not `Taken`.
  pub(crate) fn is_skipped(&self) -> bool {
    self.exited.load(Ordering::Relaxed)
      || matches!(
        self.blocks.lock().last(),
        Some(Block::Skipped | Block::Sealed)
      )
  }

  pub(crate) fn push_block(&self, block: Block) {
    self.blocks.lock().push(block);
  }

  pub(crate) fn pop_block(&self) -> Option<Block> {
    self.blocks.lock().pop()
  }

  pub(crate) fn mark_exited(&self) {
    self.exited.store(true, Ordering::Relaxed);
  }

  pub(crate) fn stack_handle(&self) -> Arc<Mutex<Vec<Value>>> {
    Arc::clone(&self.stack)
  }
}

/// A chain of steps. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Chain {
  pub(crate) engine: Engine,
  pub(crate) state: Arc<ChainState>,
}

impl Chain {
  /// A chain with a fresh data stack, registered into the current frame if
  /// one is active.
  pub(crate) fn root(engine: &Engine, completion: Completion) -> Chain {
    Chain::with_stack(engine, completion, Arc::new(Mutex::new(Vec::new())))
  }

  /// A chain adopting an existing data stack (shared, not copied).
  pub(crate) fn with_stack(
    engine: &Engine,
    completion: Completion,
    stack: Arc<Mutex<Vec<Value>>>,
  ) -> Chain {
    let chain = Chain {
      engine: engine.clone(),
      state: Arc::new(ChainState::new(completion, stack)),
    };
    chain.engine.adopt(&chain);
    chain
  }

  /// The chain's current completion handle.
  pub fn completion(&self) -> Completion {
    self.state.completion.lock().clone()
  }

  /// The settled outcome of the chain so far, if any.
  pub fn outcome(&self) -> Option<crate::core::completion::Outcome> {
    self.completion().outcome()
  }

  /// Snapshot of the chain's data stack, bottom first.
  pub fn stack(&self) -> Vec<Value> {
    self.state.stack.lock().clone()
  }

  /// Replaces the chain's completion with a derivation of the current one.
  /// The rebuild closure runs without the slot lock held, because on the
  /// inline fast path it executes step code on the spot.
  pub(crate) fn rebind(&self, rebuild: impl FnOnce(Completion) -> Completion) {
    let current = self.state.completion.lock().clone();
    let next = rebuild(current);
    *self.state.completion.lock() = next;
  }

  /// Resolves the context for a new operation: explicit argument, else the
  /// active frame's context, else a fresh empty context.
  pub(crate) fn ambient_or(&self, ctx: Option<Context>) -> Context {
    ctx
      .or_else(|| self.engine.ambient_ctx())
      .unwrap_or_default()
  }
}
