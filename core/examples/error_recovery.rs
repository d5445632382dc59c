// skein_core/examples/error_recovery.rs

use skein::{done, pass, step, Fault, Outcome, Skein, Value};
use tracing::{info, warn};

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .init();

  info!("--- Error Recovery Example ---");

  let skein = Skein::new();

  // A step failure skips every following success step until a handler.
  let chain = skein
    .seed("order-42")
    .next(step(|_ctx, value| {
      info!("validating {:?}", value);
      done(value)
    }))
    .next(step(|_ctx, value| {
      Err(Fault::wrap(
        format!("payment declined for {value:?}"),
        anyhow::anyhow!("gateway returned 402"),
      ))
    }))
    .next(step(|_ctx, _value| {
      info!("shipping (never reached)");
      pass()
    }))
    .always(step(|_ctx, value| {
      // Runs on both paths; on the failure path it cannot mask the fault.
      warn!("cleanup after {:?}", value);
      pass()
    }))
    .handle(step(|_ctx, reason| {
      warn!("recovering from {:?}", reason);
      done("queued for retry")
    }))
    .next(step(|_ctx, value| {
      info!("continuing with {:?}", value);
      done(value)
    }));

  assert_eq!(
    chain.outcome(),
    Some(Outcome::Success(Value::from("queued for retry")))
  );
  info!("final outcome: {:?}", chain.outcome());
}
