// src/lib.rs

//! Skein: a deterministic task-chaining engine for Rust.
//!
//! Skein lets you compose a pipeline of steps (literal values, functions,
//! or asynchronous completions) into a single ordered execution, with
//! features like:
//!  - Success-path, failure-path, and both-path steps (`next`, `handle`,
//!    `always`) with explicit error propagation.
//!  - Nested conditional blocks and alternation (`next_if`, `or_next_if`,
//!    `end`) plus a sticky per-chain `exit`.
//!  - Fork/join: chains opened inside a running step are discovered by the
//!    engine and the step's continuation waits on all of them.
//!  - Scoped shared state: per-chain data stacks, shared contexts, and
//!    parent-frame inheritance for chains opened inside steps.
//!  - A cooperative scheduler with virtual time: synchronous pipelines run
//!    in attachment order with no pumping, asynchronous ones are driven
//!    explicitly and deterministically.

// Declare modules according to the planned structure
pub mod chain;
pub mod core;
pub mod engine;
pub mod error;
pub mod service;

// --- Re-exports for the Public API ---

// Core types that users will interact with frequently
pub use crate::core::completion::{Completion, Outcome, Resolution};
pub use crate::core::context::Context;
pub use crate::core::step::{
  continue_with, done, pass, step, wait_on, Step, StepFn, StepOutput, StepResult,
};
pub use crate::core::value::{Receiver, Value};

// The sequencing handle and the reusable task wrapper
pub use crate::chain::{Chain, Task, TaskFn};

// The cooperative scheduler (virtual time, explicit pumping)
pub use crate::engine::scheduler::Scheduler;

pub use crate::error::{Fault, SkeinError, SkeinResult};

// The root entry-point service
pub use crate::service::Skein;

/*
    Core workflow:
    1. Create a `Skein` (one engine: scheduler + frame stack).
    2. Build chains from its entry points: `skein.seed(v)`, `skein.next(step)`,
       `skein.next_if(cond)`, ...
    3. Append operations fluently; each one derives the chain's completion.
    4. Inside a step, open further chains through the same `Skein`: they
       register as forks of the running step and the step's continuation
       waits on all of them.
    5. For asynchronous work, hand out `skein.pending()` completions and
       drive them with `skein.run_until_idle()` / `skein.advance(ms)`.
*/
