/// Platform hardware identifiers used for machine fingerprinting
use crate::error::FingerprintError;

/// Source of the two raw identifiers a fingerprint is built from
pub trait HardwareIdentitySource {
    /// Stable per-installation identifier of the operating system
    fn read_install_id(&self) -> Result<String, FingerprintError>;

    /// Processor vendor/model identifier
    fn read_cpu_id(&self) -> Result<String, FingerprintError>;
}

/// Identifiers read from the machine this process runs on
///
/// - Windows: `HKLM\SOFTWARE\Microsoft\Cryptography\MachineGuid`
/// - Linux: `/etc/machine-id` (falling back to the D-Bus copy)
/// - macOS: `IOPlatformUUID` from the I/O registry
///
/// The CPU identifier is CPUID leaf 0 rendered as four upper-case
/// 8-digit hex words (EAX, EBX, ECX, EDX).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformIdentity;

impl HardwareIdentitySource for PlatformIdentity {
    fn read_install_id(&self) -> Result<String, FingerprintError> {
        let id = read_install_id()?;
        if id.is_empty() {
            return Err(FingerprintError::Unavailable("install id is empty".to_string()));
        }
        Ok(id)
    }

    fn read_cpu_id(&self) -> Result<String, FingerprintError> {
        read_cpu_id()
    }
}

#[cfg(windows)]
fn read_install_id() -> Result<String, FingerprintError> {
    use std::ptr;
    use winapi::shared::minwindef::{DWORD, HKEY};
    use winapi::shared::winerror::ERROR_SUCCESS;
    use winapi::um::winnt::{KEY_READ, KEY_WOW64_64KEY};
    use winapi::um::winreg::{HKEY_LOCAL_MACHINE, RegCloseKey, RegOpenKeyExA, RegQueryValueExA};

    let subkey = c"SOFTWARE\\Microsoft\\Cryptography";
    let value_name = c"MachineGuid";

    let mut hkey: HKEY = ptr::null_mut();
    let mut buf = [0u8; 256];
    let mut len = buf.len() as DWORD;

    // SAFETY: all pointers reference live locals; the key handle is closed
    // before leaving the block.
    let status = unsafe {
        let opened = RegOpenKeyExA(
            HKEY_LOCAL_MACHINE,
            subkey.as_ptr(),
            0,
            KEY_READ | KEY_WOW64_64KEY,
            &mut hkey,
        );
        if opened != ERROR_SUCCESS as i32 {
            return Err(FingerprintError::Unavailable(format!(
                "cannot open Cryptography registry key (error {})",
                opened
            )));
        }

        let queried = RegQueryValueExA(
            hkey,
            value_name.as_ptr(),
            ptr::null_mut(),
            ptr::null_mut(),
            buf.as_mut_ptr(),
            &mut len,
        );
        RegCloseKey(hkey);
        queried
    };

    if status != ERROR_SUCCESS as i32 {
        return Err(FingerprintError::Unavailable(format!(
            "cannot read MachineGuid (error {})",
            status
        )));
    }

    let data = &buf[..(len as usize).min(buf.len())];
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8(data[..end].to_vec())
        .map_err(|_| FingerprintError::Unavailable("MachineGuid is not UTF-8".to_string()))
}

#[cfg(target_os = "linux")]
fn read_install_id() -> Result<String, FingerprintError> {
    std::fs::read_to_string("/etc/machine-id")
        .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
        .map(|id| id.trim().to_string())
        .map_err(|e| FingerprintError::Unavailable(format!("cannot read machine-id: {}", e)))
}

#[cfg(target_os = "macos")]
fn read_install_id() -> Result<String, FingerprintError> {
    let output = std::process::Command::new("ioreg")
        .args(["-rd1", "-c", "IOPlatformExpertDevice"])
        .output()
        .map_err(|e| FingerprintError::Unavailable(format!("cannot run ioreg: {}", e)))?;

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|l| l.contains("IOPlatformUUID"))
        .and_then(|l| l.split('"').nth(3))
        .map(String::from)
        .ok_or_else(|| FingerprintError::Unavailable("IOPlatformUUID not found".to_string()))
}

#[cfg(not(any(windows, target_os = "linux", target_os = "macos")))]
fn read_install_id() -> Result<String, FingerprintError> {
    Err(FingerprintError::Unavailable(
        "no install identifier on this platform".to_string(),
    ))
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn read_cpu_id() -> Result<String, FingerprintError> {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::__cpuid;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::__cpuid;

    // SAFETY: CPUID is available on every x86_64 CPU and every x86 CPU this
    // crate targets.
    #[allow(unused_unsafe)]
    let leaf = unsafe { __cpuid(0) };

    Ok(format!(
        "{:08X}{:08X}{:08X}{:08X}",
        leaf.eax, leaf.ebx, leaf.ecx, leaf.edx
    ))
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn read_cpu_id() -> Result<String, FingerprintError> {
    Err(FingerprintError::Unavailable(
        "CPUID instruction not supported on this architecture".to_string(),
    ))
}
