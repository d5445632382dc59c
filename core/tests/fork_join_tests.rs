// tests/fork_join_tests.rs
mod common;

use common::*;
use skein::{done, pass, step, Outcome, Skein, Value};

#[test]
fn fork_each_fans_out_over_a_list_synchronously() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  let chain = skein
    .seed(Value::List(vec![
      Value::Int(1),
      Value::Int(2),
      Value::Int(3),
    ]))
    .fork_each(step(|_ctx, value| match value {
      Value::Int(n) => done(n * 2),
      other => done(other),
    }))
    .next(log.capture());

  // The enclosing step folded all three forks into one joined list.
  assert_eq!(
    log.entries(),
    vec![Value::List(vec![
      Value::Int(2),
      Value::Int(4),
      Value::Int(6),
    ])]
  );
  assert!(chain.outcome().is_some());
}

#[test]
fn fork_each_waits_on_forks_spawned_by_forks() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  let sk_fork = skein.clone();
  let log_fork = log.clone();
  skein
    .seed(Value::List(vec![Value::Int(1), Value::Int(2)]))
    .fork_each(step(move |_ctx, value| {
      // Each fork opens its own delayed chain; folding is transitive.
      sk_fork.seed(value).wait(10).next(log_fork.capture());
      pass()
    }))
    .next(log.will_call("after"));

  assert!(log.is_empty());
  skein.advance(10);
  assert_eq!(log.ints(), vec![1, 2]);
  assert_eq!(log.strs(), vec!["after"]);
}

#[test]
fn parent_continuation_is_a_strict_barrier() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  let sk_fork = skein.clone();
  let log_fork = log.clone();
  skein
    .next(step(move |_ctx, _value| {
      sk_fork.seed(1i64).wait(30).next(log_fork.capture());
      sk_fork.seed(2i64).wait(10).next(log_fork.capture());
      sk_fork.seed(3i64).wait(20).next(log_fork.capture());
      pass()
    }))
    .next(log.will_call("after"));

  skein.advance(10);
  assert_eq!(log.ints(), vec![2]);
  assert!(log.strs().is_empty());

  skein.advance(20);
  // Children completed in timer order; the continuation observed them all.
  assert_eq!(log.ints(), vec![2, 3, 1]);
  assert_eq!(log.strs(), vec!["after"]);
}

#[test]
fn a_single_spawned_chain_replaces_the_step_result() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  let sk_inner = skein.clone();
  skein
    .next(step(move |_ctx, _value| {
      sk_inner.next(step(|_ctx, _value| done("child")));
      done("own result")
    }))
    .next(log.capture());

  assert_eq!(log.strs(), vec!["child"]);
}

#[test]
fn join_fails_with_the_first_child_failure() {
  setup_tracing();
  let skein = Skein::new();
  let errors = CallLog::new();
  let after = CallLog::new();

  let sk_inner = skein.clone();
  skein
    .next(step(move |_ctx, _value| {
      sk_inner.next(step(|_ctx, _value| done("fine")));
      sk_inner.next(step(|_ctx, _value| Err("broken child".into())));
      pass()
    }))
    .next(after.capture())
    .handle(errors.capture());

  assert!(after.is_empty());
  assert_eq!(errors.strs(), vec!["broken child"]);
}

#[test]
fn fork_each_rejects_non_list_values() {
  setup_tracing();
  let skein = Skein::new();
  let errors = CallLog::new();

  let chain = skein
    .seed("not a list")
    .fork_each(step(|_ctx, value| done(value)))
    .handle(errors.capture());

  assert_eq!(errors.len(), 1);
  assert!(matches!(
    chain.outcome(),
    Some(Outcome::Success(_))
  ));
}

#[test]
fn failing_step_wins_over_spawned_chains() {
  setup_tracing();
  let skein = Skein::new();
  let fork_log = CallLog::new();
  let errors = CallLog::new();

  let sk_inner = skein.clone();
  let fork_inner = fork_log.clone();
  skein
    .next(step(move |_ctx, _value| {
      sk_inner.next(fork_inner.will_call("detached"));
      Err("step exploded".into())
    }))
    .handle(errors.capture());

  // The spawned chain still ran, but the failure propagated.
  assert_eq!(fork_log.strs(), vec!["detached"]);
  assert_eq!(errors.strs(), vec!["step exploded"]);
}
