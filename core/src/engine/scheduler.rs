// skein_core/src/engine/scheduler.rs

//! The cooperative scheduler: a FIFO job queue plus a virtual-time timer
//! queue.
//!
//! Nothing here spawns threads or reads wall clocks. Queued completions
//! dispatch their reactions through [`Scheduler::enqueue`]; `wait` steps
//! arm timers through [`Scheduler::schedule_after`]. The embedding drives
//! everything explicitly with [`run_until_idle`](Scheduler::run_until_idle)
//! and [`advance`](Scheduler::advance), which makes interleavings
//! reproducible in tests.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{event, Level};

pub(crate) type Job = Box<dyn FnOnce() + Send>;

#[derive(Clone)]
pub struct Scheduler {
  inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
  queue: Mutex<VecDeque<Job>>,
  timers: Mutex<Vec<Timer>>,
  now: Mutex<u64>,
  next_ticket: Mutex<u64>,
}

struct Timer {
  due: u64,
  // Insertion order; breaks ties between timers due at the same instant.
  ticket: u64,
  job: Job,
}

impl Scheduler {
  pub fn new() -> Self {
    Scheduler {
      inner: Arc::new(SchedulerInner {
        queue: Mutex::new(VecDeque::new()),
        timers: Mutex::new(Vec::new()),
        now: Mutex::new(0),
        next_ticket: Mutex::new(0),
      }),
    }
  }

  /// Appends a job to the microtask queue.
  pub(crate) fn enqueue(&self, job: impl FnOnce() + Send + 'static) {
    self.inner.queue.lock().push_back(Box::new(job));
  }

  /// Arms a timer `delay` virtual time units from now.
  pub(crate) fn schedule_after(&self, delay: u64, job: impl FnOnce() + Send + 'static) {
    let due = *self.inner.now.lock() + delay;
    let ticket = {
      let mut counter = self.inner.next_ticket.lock();
      let ticket = *counter;
      *counter += 1;
      ticket
    };
    event!(Level::TRACE, due, ticket, "timer armed");
    self.inner.timers.lock().push(Timer {
      due,
      ticket,
      job: Box::new(job),
    });
  }

  /// Drains the microtask queue, including jobs enqueued while draining.
  /// Timers are untouched; see [`advance`](Scheduler::advance).
  pub fn run_until_idle(&self) {
    loop {
      let job = self.inner.queue.lock().pop_front();
      match job {
        Some(job) => job(),
        None => break,
      }
    }
  }

  /// Moves virtual time forward by `delta`, firing every timer that comes
  /// due (in due-then-insertion order) and draining the microtask queue
  /// after each.
  pub fn advance(&self, delta: u64) {
    self.run_until_idle();
    let target = *self.inner.now.lock() + delta;
    loop {
      let next = {
        let mut timers = self.inner.timers.lock();
        let position = timers
          .iter()
          .enumerate()
          .filter(|(_, timer)| timer.due <= target)
          .min_by_key(|(_, timer)| (timer.due, timer.ticket))
          .map(|(position, _)| position);
        position.map(|position| timers.swap_remove(position))
      };
      match next {
        Some(timer) => {
          {
            let mut now = self.inner.now.lock();
            if timer.due > *now {
              *now = timer.due;
            }
          }
          event!(Level::DEBUG, due = timer.due, "timer fired");
          (timer.job)();
          self.run_until_idle();
        }
        None => break,
      }
    }
    *self.inner.now.lock() = target;
  }

  /// Current virtual time.
  pub fn now(&self) -> u64 {
    *self.inner.now.lock()
  }

  /// True when no job is queued. Armed timers do not count; they only run
  /// under [`advance`](Scheduler::advance).
  pub fn is_idle(&self) -> bool {
    self.inner.queue.lock().is_empty()
  }
}

impl Default for Scheduler {
  fn default() -> Self {
    Scheduler::new()
  }
}
