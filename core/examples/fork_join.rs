// skein_core/examples/fork_join.rs

use skein::{done, step, Outcome, Skein, Value};
use tracing::info;

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .init();

  info!("--- Fork/Join Example ---");

  let skein = Skein::new();

  // Fan out over a list: one chain per element, each delayed by its own
  // timer. The step that spawned them folds every fork into its result, so
  // the continuation is a strict barrier.
  let sk_fork = skein.clone();
  let chain = skein
    .seed(Value::List(vec![
      Value::Int(30),
      Value::Int(10),
      Value::Int(20),
    ]))
    .fork_each(step(move |_ctx, value| match value {
      Value::Int(delay) => {
        let sk_leaf = sk_fork.clone();
        sk_leaf
          .seed(delay)
          .wait(delay as u64)
          .next(step(|_ctx, value| {
            info!("fork finished after {:?}", value);
            done(value)
          }));
        skein::pass()
      }
      other => done(other),
    }))
    .next(step(|_ctx, value| {
      info!("all forks joined: {:?}", value);
      done(value)
    }));

  // Nothing has fired yet; the forks are parked on virtual timers.
  assert_eq!(chain.outcome(), None);

  skein.advance(30);

  // The join preserves spawn order, not completion order.
  assert_eq!(
    chain.outcome(),
    Some(Outcome::Success(Value::List(vec![
      Value::Int(30),
      Value::Int(10),
      Value::Int(20),
    ])))
  );
  info!("final outcome at t={}: {:?}", skein.now(), chain.outcome());
}
