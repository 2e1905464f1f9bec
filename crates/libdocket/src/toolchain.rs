use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{DocketError, Result};

const INSTALL_HINT: &str = "run 'rustup toolchain install nightly'";

/// Ensure the nightly toolchain needed for rustdoc JSON is installed.
///
/// Returns the nightly `rustc --version` line.
pub fn ensure_nightly() -> Result<String> {
    let output = Command::new("rustup")
        .args(["run", "nightly", "rustc", "--version"])
        .stderr(Stdio::null())
        .output()
        .map_err(|e| DocketError::Toolchain(format!("failed to run rustup: {e}")))?;

    if !output.status.success() {
        return Err(DocketError::Toolchain(format!(
            "rustdoc JSON requires the nightly toolchain; {INSTALL_HINT}"
        )));
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!(%version, "found nightly toolchain");
    Ok(version)
}
