pub mod completion;
pub mod context;
pub mod step;
pub mod value;

// Re-export key types for easier access from other modules (and lib.rs)
pub use completion::{Completion, Outcome, Resolution};
pub use context::Context;
pub use step::{Step, StepFn, StepOutput, StepResult};
pub use value::{Receiver, Value};
