// skein_core/src/core/completion.rs

//! The one-shot success/failure cell everything else is built on.
//!
//! A [`Completion`] settles at most once, to [`Outcome::Success`] or
//! [`Outcome::Failure`]. Reactions map the settled outcome to a
//! [`Resolution`] for a derived completion.
//!
//! Completions come in two shapes:
//!
//! - **Inline**: born settled. Attaching a reaction runs it immediately, on
//!   the caller's stack. Chains built from literals and synchronous step
//!   functions compose only inline completions, so a fully synchronous
//!   pipeline executes in attachment order with no scheduler involvement.
//!   Callers can assert on its outcome without pumping anything.
//! - **Queued**: born pending against a [`Scheduler`]. Reactions attached
//!   before settlement are dispatched through the scheduler's queue at
//!   settlement, in attachment order. Reactions attached after settlement
//!   are dispatched through the queue as well, never on the attaching
//!   caller's stack.

use std::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{event, Level};

use crate::core::value::Value;
use crate::engine::scheduler::Scheduler;
use crate::error::Fault;

/// The terminal state of a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  Success(Value),
  Failure(Fault),
}

impl Outcome {
  pub fn is_success(&self) -> bool {
    matches!(self, Outcome::Success(_))
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, Outcome::Failure(_))
  }
}

/// What a reaction decides for its derived completion.
pub enum Resolution {
  /// Preserve the parent outcome unchanged.
  Keep,
  /// Settle with an explicit outcome.
  Settle(Outcome),
  /// Adopt another completion's eventual outcome.
  Follow(Completion),
}

type Reaction = Box<dyn FnOnce(Outcome) + Send>;

enum State {
  Pending(Vec<Reaction>),
  Done(Outcome),
}

enum Body {
  Inline(Outcome),
  Queued {
    scheduler: Scheduler,
    state: Mutex<State>,
  },
}

#[derive(Clone)]
pub struct Completion {
  inner: Arc<Body>,
}

impl Completion {
  pub(crate) fn settled(outcome: Outcome) -> Self {
    Completion {
      inner: Arc::new(Body::Inline(outcome)),
    }
  }

  /// An inline completion already succeeded with `value`.
  pub fn of(value: impl Into<Value>) -> Self {
    Completion::settled(Outcome::Success(value.into()))
  }

  /// An inline completion already failed with `fault`.
  pub fn failed(fault: impl Into<Fault>) -> Self {
    Completion::settled(Outcome::Failure(fault.into()))
  }

  /// A pending completion whose reactions dispatch through `scheduler`.
  pub fn pending(scheduler: &Scheduler) -> Self {
    Completion {
      inner: Arc::new(Body::Queued {
        scheduler: scheduler.clone(),
        state: Mutex::new(State::Pending(Vec::new())),
      }),
    }
  }

  /// Settles with a success value. Later settle attempts are ignored.
  pub fn resolve(&self, value: impl Into<Value>) {
    self.settle(Outcome::Success(value.into()));
  }

  /// Settles with a failure. Later settle attempts are ignored.
  pub fn fail(&self, fault: impl Into<Fault>) {
    self.settle(Outcome::Failure(fault.into()));
  }

  pub fn is_settled(&self) -> bool {
    self.outcome().is_some()
  }

  /// The settled outcome, if any.
  pub fn outcome(&self) -> Option<Outcome> {
    match &*self.inner {
      Body::Inline(outcome) => Some(outcome.clone()),
      Body::Queued { state, .. } => match &*state.lock() {
        State::Done(outcome) => Some(outcome.clone()),
        State::Pending(_) => None,
      },
    }
  }

  /// Handle identity: both point at the same cell.
  pub fn same(&self, other: &Completion) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }

  pub(crate) fn settle(&self, outcome: Outcome) {
    let (scheduler, reactions) = match &*self.inner {
      // An inline completion is settled from birth.
      Body::Inline(_) => return,
      Body::Queued { scheduler, state } => {
        let mut guard = state.lock();
        let reactions = match &mut *guard {
          State::Done(_) => return,
          State::Pending(list) => mem::take(list),
        };
        *guard = State::Done(outcome.clone());
        (scheduler.clone(), reactions)
      }
    };
    event!(
      Level::TRACE,
      reactions = reactions.len(),
      success = outcome.is_success(),
      "completion settled"
    );
    for reaction in reactions {
      let settled = outcome.clone();
      scheduler.enqueue(move || reaction(settled));
    }
  }

  /// Attaches a raw reaction. Inline completions run it on the spot; queued
  /// ones dispatch it through their scheduler once (or since) settled.
  pub(crate) fn on_settle(&self, f: impl FnOnce(Outcome) + Send + 'static) {
    match &*self.inner {
      Body::Inline(outcome) => f(outcome.clone()),
      Body::Queued { scheduler, state } => {
        let mut slot: Option<Reaction> = Some(Box::new(f));
        let settled = {
          let mut guard = state.lock();
          match &mut *guard {
            State::Pending(list) => {
              if let Some(reaction) = slot.take() {
                list.push(reaction);
              }
              None
            }
            State::Done(outcome) => Some(outcome.clone()),
          }
        };
        if let Some(outcome) = settled {
          if let Some(reaction) = slot {
            scheduler.enqueue(move || reaction(outcome));
          }
        }
      }
    }
  }

  /// Derives a completion from this one through a reaction.
  ///
  /// On an inline parent the reaction runs immediately and the derivation
  /// collapses: `Keep` hands back the parent, `Follow` hands back the
  /// followed completion. On a queued parent a fresh pending completion is
  /// returned and wired up through `on_settle`.
  pub(crate) fn react(&self, f: impl FnOnce(Outcome) -> Resolution + Send + 'static) -> Completion {
    match &*self.inner {
      Body::Inline(outcome) => match f(outcome.clone()) {
        Resolution::Keep => self.clone(),
        Resolution::Settle(next) => Completion::settled(next),
        Resolution::Follow(other) => other,
      },
      Body::Queued { scheduler, .. } => {
        let derived = Completion::pending(scheduler);
        let target = derived.clone();
        self.on_settle(move |outcome| match f(outcome.clone()) {
          Resolution::Keep => target.settle(outcome),
          Resolution::Settle(next) => target.settle(next),
          Resolution::Follow(other) => {
            other.on_settle(move |followed| target.settle(followed));
          }
        });
        derived
      }
    }
  }

  /// Success reaction; a failure passes through untouched.
  pub fn then(&self, f: impl FnOnce(Value) -> Resolution + Send + 'static) -> Completion {
    self.react(|outcome| match outcome {
      Outcome::Success(value) => f(value),
      Outcome::Failure(_) => Resolution::Keep,
    })
  }

  /// Failure reaction; a success passes through untouched.
  pub fn rescue(&self, f: impl FnOnce(Fault) -> Resolution + Send + 'static) -> Completion {
    self.react(|outcome| match outcome {
      Outcome::Success(_) => Resolution::Keep,
      Outcome::Failure(fault) => f(fault),
    })
  }

  /// Runs on either path. On success the callback's resolution applies as
  /// in `then`. On failure the callback runs for its side effect (waiting
  /// on a followed completion if it yields one) and the original fault is
  /// re-raised regardless of what the callback produced.
  pub fn finally(&self, f: impl FnOnce() -> Resolution + Send + 'static) -> Completion {
    self.react(|outcome| match outcome {
      Outcome::Success(_) => match f() {
        Resolution::Keep => Resolution::Keep,
        other => other,
      },
      Outcome::Failure(fault) => match f() {
        Resolution::Follow(side) => {
          Resolution::Follow(side.react(move |_| Resolution::Settle(Outcome::Failure(fault))))
        }
        _ => Resolution::Settle(Outcome::Failure(fault)),
      },
    })
  }

  /// Aggregates many completions: succeeds with the list of values in the
  /// order given once every part succeeds, fails with the first failure.
  ///
  /// When every part is already settled the join settles inline, so a fan
  /// of synchronous children never forces the enclosing pipeline through
  /// the scheduler.
  pub(crate) fn join(scheduler: &Scheduler, parts: Vec<Completion>) -> Completion {
    if parts.iter().all(Completion::is_settled) {
      let mut values = Vec::with_capacity(parts.len());
      for part in &parts {
        match part.outcome() {
          Some(Outcome::Success(value)) => values.push(value),
          Some(Outcome::Failure(fault)) => return Completion::settled(Outcome::Failure(fault)),
          // Checked settled above.
          None => {}
        }
      }
      return Completion::settled(Outcome::Success(Value::List(values)));
    }

    let joined = Completion::pending(scheduler);
    let remaining = Arc::new(Mutex::new(parts.len()));
    let slots = Arc::new(Mutex::new(vec![Value::Null; parts.len()]));
    for (index, part) in parts.into_iter().enumerate() {
      let joined = joined.clone();
      let remaining = Arc::clone(&remaining);
      let slots = Arc::clone(&slots);
      part.on_settle(move |outcome| match outcome {
        Outcome::Success(value) => {
          slots.lock()[index] = value;
          let all_done = {
            let mut left = remaining.lock();
            *left -= 1;
            *left == 0
          };
          if all_done {
            let values = mem::take(&mut *slots.lock());
            joined.settle(Outcome::Success(Value::List(values)));
          }
        }
        // First failure wins; settle() ignores the rest.
        Outcome::Failure(fault) => joined.settle(Outcome::Failure(fault)),
      });
    }
    joined
  }
}

impl fmt::Debug for Completion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.outcome() {
      Some(Outcome::Success(value)) => write!(f, "Completion(success: {value:?})"),
      Some(Outcome::Failure(fault)) => write!(f, "Completion(failure: {fault})"),
      None => write!(f, "Completion(pending)"),
    }
  }
}
