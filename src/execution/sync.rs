/// Synchronous execution mode
/// Verify the license once, then exit with the verdict as status code

use std::path::Path;
use std::process::exit;

use crate::verification::{VerificationResult, Verifier};

/// Execute in synchronous mode
///
/// Flow:
/// 1. Verify the license file (blocking, including network time)
/// 2. Print the expiry date on stdout when one is echoed
/// 3. exit(0) valid, exit(1) invalid, exit(2) expired
pub fn execute_sync(verifier: &Verifier, license_path: &Path) -> ! {
    eprintln!("🔄 Verifying {}...", license_path.display());

    let result = verifier.verify_file(license_path);
    report(&result);
    exit(result.status_code());
}

fn report(result: &VerificationResult) {
    match result {
        VerificationResult::Valid { expire_date } => {
            eprintln!("✅ License valid until {}", expire_date);
        }
        VerificationResult::Expired { expire_date } => {
            eprintln!("⏰ License expired on {}", expire_date);
        }
        VerificationResult::Invalid { reason } => {
            eprintln!("❌ License invalid: {}", reason);
        }
    }

    if let Some(expire_date) = result.expire_date() {
        println!("{}", expire_date);
    }
}
