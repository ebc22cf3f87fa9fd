//! Zombie detection through `ps` on macOS, which has no procfs.

use std::io;
use std::process::{Command, Stdio};

/// Run `ps` for a single PID and return its listing line.
///
/// `Ok(None)` means `ps` printed nothing: the process no longer exists.
pub fn ps_listing(pid: u32) -> io::Result<Option<String>> {
    let output = Command::new("ps")
        .args(["-o", "stat=,command=", "-p"])
        .arg(pid.to_string())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(text))
}

/// True when a `ps` line describes a zombie: a `Z` state column or the
/// `<defunct>` marker in place of the command.
pub fn listing_is_defunct(line: &str) -> bool {
    if line.contains("<defunct>") {
        return true;
    }
    line.split_whitespace()
        .next()
        .is_some_and(|stat| stat.starts_with('Z'))
}
