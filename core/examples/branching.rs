// skein_core/examples/branching.rs

use skein::{done, step, Skein, Value};
use tracing::info;

fn grade(skein: &Skein, score: i64) -> Option<skein::Outcome> {
  skein
    .seed(score)
    .next_if(step(|_ctx, value| done(matches!(value, Value::Int(n) if n >= 90))))
    .next("excellent")
    .or_next_if(step(|_ctx, value| done(matches!(value, Value::Int(n) if n >= 60))))
    .next("passed")
    .or_next()
    .next("failed")
    .end()
    .outcome()
}

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .init();

  info!("--- Branching Example ---");

  let skein = Skein::new();

  for score in [95i64, 72, 40] {
    let outcome = grade(&skein, score);
    info!("score {} => {:?}", score, outcome);
  }

  assert_eq!(
    grade(&skein, 95),
    Some(skein::Outcome::Success(Value::from("excellent")))
  );
  assert_eq!(
    grade(&skein, 72),
    Some(skein::Outcome::Success(Value::from("passed")))
  );
  assert_eq!(
    grade(&skein, 40),
    Some(skein::Outcome::Success(Value::from("failed")))
  );
}
