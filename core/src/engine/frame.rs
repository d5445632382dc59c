// skein_core/src/engine/frame.rs

//! The bookkeeping record for one in-flight step invocation.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::chain::Chain;
use crate::core::context::Context;
use crate::core::value::Value;

/// One entry on the engine's frame stack.
///
/// A frame lives exactly for the synchronous extent of a step invocation:
/// pushed before the step function runs, popped when it returns. Chains
/// constructed while a frame is current register themselves into `spawned`;
/// the engine folds them into the step's effective result when the frame
/// closes.
pub(crate) struct Frame {
  /// The context the step executes against. Entry points called inside the
  /// step without an explicit context inherit it.
  pub(crate) ctx: Context,
  /// The step's (unseeded) input value.
  pub(crate) value: Value,
  /// True when this invocation runs on the failure path (`handle`, or the
  /// failure half of `always`). `value` is then the fault reason.
  pub(crate) is_error: bool,
  /// Chains opened during this frame, in creation order.
  pub(crate) spawned: Vec<Chain>,
  /// The data stack of the chain whose step is running; adopted by
  /// `load_parent_stack`/`inherit`.
  pub(crate) stack: Arc<Mutex<Vec<Value>>>,
}
