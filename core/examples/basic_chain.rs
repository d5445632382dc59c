// skein_core/examples/basic_chain.rs

use skein::{done, Skein, Value};
use tracing::info;

fn main() {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .init();

  info!("--- Basic Chain Example ---");

  // 1. Create the engine. One Skein owns one scheduler and frame stack.
  let skein = Skein::new();

  // 2. Build a chain. Every operation derives the chain's completion; with
  //    only synchronous steps the whole pipeline runs right here, in
  //    attachment order, with no pumping.
  let chain = skein
    .seed(5i64)
    .next(skein::step(|_ctx, value| match value {
      Value::Int(n) => {
        info!("alpha: {} + 1", n);
        done(n + 1)
      }
      other => done(other),
    }))
    .next(skein::step(|_ctx, value| match value {
      Value::Int(n) => {
        info!("beta: {} * 2", n);
        done(n * 2)
      }
      other => done(other),
    }))
    .next(skein::step(|_ctx, value| match value {
      Value::Int(n) => {
        info!("gamma: {} - 1", n);
        done(n - 1)
      }
      other => done(other),
    }));

  // 3. Inspect the result. Expected: (5 + 1) * 2 - 1 = 11.
  info!("final outcome: {:?}", chain.outcome());
  assert_eq!(
    chain.outcome(),
    Some(skein::Outcome::Success(Value::Int(11)))
  );
}
