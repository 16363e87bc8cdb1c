// Application Layer - Use Cases

pub mod cancel;
pub mod constants;
pub mod extraction;
pub mod intake;
pub mod lifecycle;
pub mod retry;

// Re-exports
pub use cancel::{cancel_channel, cancellable_sleep, CancelHandle, CancelToken, SleepOutcome};
pub use extraction::{ExtractionJobClient, PollOptions};
pub use intake::{AgreementIntake, IntakeReport};
pub use lifecycle::AgreementLifecycle;
pub use retry::TransportRetryPolicy;
