// tests/flow_control_tests.rs
mod common;

use common::*;
use skein::{done, pass, step, Skein, Value};

#[test]
fn next_if_may_open_a_chain() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein.next_if(true).next(log.will_call(1));

  assert_eq!(log.ints(), vec![1]);
}

#[test]
fn next_if_false_skips_until_end() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(log.will_call(1))
    .next_if(false)
    .next(log.will_call(2))
    .next(log.will_call(3))
    .end()
    .next(log.will_call(4));

  assert_eq!(log.ints(), vec![1, 4]);
}

#[test]
fn next_if_value_tests_the_current_value() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(step(|_ctx, _value| done(false)))
    .next_if_value()
    .next(log.will_call(1))
    .end()
    .next(step(|_ctx, _value| done(true)))
    .next_if_value()
    .next(log.will_call(2))
    .end();

  assert_eq!(log.ints(), vec![2]);
}

#[test]
fn conditional_blocks_nest() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(log.will_call(1))
    .next_if(true)
    .next(log.will_call(2))
    .next_if(false)
    .next(log.will_call(3))
    .end()
    .next(log.will_call(4))
    .or_next_if(true)
    .next_if(true)
    .next(log.will_call(5))
    .end()
    .end();

  assert_eq!(log.ints(), vec![1, 2, 4]);
}

#[test]
fn or_next_behaves_like_else() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(log.will_call(1))
    .next_if(false)
    .next(log.will_call(2))
    .or_next()
    .next(log.will_call(3))
    .end()
    .next(log.will_call(4));

  assert_eq!(log.ints(), vec![1, 3, 4]);
}

#[test]
fn or_next_if_behaves_like_else_if_chains() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(log.will_call(1))
    .next_if(false)
    .next(log.will_call(2))
    .or_next_if(false)
    .next(log.will_call(3))
    .or_next_if(true)
    .next(log.will_call(4))
    .or_next()
    .next(log.will_call(5))
    .end()
    .next(log.will_call(6));

  assert_eq!(log.ints(), vec![1, 4, 6]);
}

#[test]
fn next_unless_enters_when_the_condition_is_false() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(log.will_call(1))
    .next_unless(step(|_ctx, value| done(value != Value::Int(1))))
    .next(log.will_call(2))
    .end();

  assert_eq!(log.ints(), vec![1, 2]);
}

#[test]
fn or_next_unless_enters_when_the_condition_is_false() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(log.will_call(1))
    .next_if(false)
    .next(log.will_call(2))
    .or_next_unless(step(|_ctx, value| done(value != Value::Int(1))))
    .next(log.will_call(3))
    .end();

  assert_eq!(log.ints(), vec![1, 3]);
}

#[test]
fn next_case_compares_against_the_current_value() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(log.will_call(1))
    .next_case(2i64)
    .next(log.will_call(2))
    .or_next_case(1i64)
    .next(log.will_call(3))
    .end()
    .next(log.will_call(4));

  assert_eq!(log.ints(), vec![1, 3, 4]);
}

#[test]
fn exit_stops_every_later_step_on_the_chain() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  skein
    .next(log.will_call(1))
    .next_if(true)
    .exit()
    .next(log.will_call(2))
    .next_if(true)
    .next(log.will_call(3))
    .end()
    .next(log.will_call(4))
    .or_next_if(true)
    .next_if(true)
    .next(log.will_call(5))
    .end()
    .end();

  assert_eq!(log.ints(), vec![1]);
}

#[test]
fn exit_leaves_forked_siblings_alone() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  let sk_fork = skein.clone();
  let log_fork = log.clone();
  skein
    .next(step(move |_ctx, _value| {
      sk_fork.seed(9i64).wait(5).next(log_fork.will_call("fork"));
      pass()
    }))
    .next_if(true)
    .exit()
    .next(log.will_call("after exit"))
    .end();

  assert!(log.is_empty());
  skein.advance(5);
  assert_eq!(log.strs(), vec!["fork"]);
}

#[test]
fn asynchronous_conditions_restore_the_chain_value() {
  setup_tracing();
  let skein = Skein::new();
  let log = CallLog::new();

  let verdict = skein.pending();
  skein
    .seed("keep")
    .next_if(verdict.clone())
    .next(log.capture())
    .end();

  assert!(log.is_empty());
  verdict.resolve(true);
  skein.run_until_idle();
  assert_eq!(log.strs(), vec!["keep"]);
}

#[test]
fn failed_conditions_open_the_block_closed_and_reraise() {
  setup_tracing();
  let skein = Skein::new();
  let inside = CallLog::new();
  let errors = CallLog::new();
  let after = CallLog::new();

  skein
    .next(step(|_ctx, _value| done("start")))
    .next_if(step(|_ctx, _value| Err("cond blew up".into())))
    .next(inside.capture())
    .end()
    .handle(errors.capture())
    .next(after.capture());

  assert!(inside.is_empty());
  assert_eq!(errors.strs(), vec!["cond blew up"]);
  // The capturing handler recovered with the reason, so the chain continues.
  assert_eq!(after.strs(), vec!["cond blew up"]);
}

#[test]
#[should_panic(expected = "chain misuse")]
fn unbalanced_end_panics() {
  let skein = Skein::new();
  skein.next(step(|_ctx, _value| pass())).end();
}

#[test]
#[should_panic(expected = "chain misuse")]
fn dangling_or_next_if_panics() {
  let skein = Skein::new();
  skein.next(step(|_ctx, _value| pass())).or_next();
}
