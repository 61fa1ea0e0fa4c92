/// Asynchronous execution mode
/// Verify the license on a background thread so the host stays responsive

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::error;

use crate::verification::{InvalidReason, VerificationResult, Verifier};

/// Verification running in the background
pub struct PendingVerification {
    handle: JoinHandle<VerificationResult>,
}

impl PendingVerification {
    /// True once the verdict is ready; `wait` will not block after that
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the verdict is available
    ///
    /// A panicked worker is reported as `Invalid(Aborted)`.
    pub fn wait(self) -> VerificationResult {
        self.handle.join().unwrap_or_else(|_| {
            error!("verification worker panicked");
            VerificationResult::Invalid {
                reason: InvalidReason::Aborted,
            }
        })
    }
}

/// Start verifying `license_path` on a background thread
///
/// Same checks, same order and same fallback as [`Verifier::verify_file`].
pub fn spawn_verification(verifier: Arc<Verifier>, license_path: PathBuf) -> PendingVerification {
    let handle = thread::spawn(move || verifier.verify_file(&license_path));
    PendingVerification { handle }
}
