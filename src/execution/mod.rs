/// Execution module - Blocking and background verification runs
pub mod sync;
pub mod async_mode;

// Re-export for convenience
pub use sync::execute_sync;
pub use async_mode::{PendingVerification, spawn_verification};
