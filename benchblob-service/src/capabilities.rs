//! Probes for what the host environment can do.

use std::process::Stdio;

use tokio::process::Command;

/// What was found on the host, used to pick a generation strategy.
#[derive(Clone, Copy, Debug)]
pub struct Capabilities {
    /// Whether an `openssl` binary is on `PATH` and runs.
    pub openssl: bool,
    /// Whether `/dev/zero` exists, which the openssl strategy reads from.
    pub dev_zero: bool,
}

impl Capabilities {
    /// Whether the openssl strategy can run on this host.
    pub fn supports_openssl(&self) -> bool {
        self.openssl && self.dev_zero
    }
}

/// Detects host capabilities.
pub async fn detect() -> Capabilities {
    let openssl = Command::new("openssl")
        .arg("version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false);

    let dev_zero = tokio::fs::metadata("/dev/zero").await.is_ok();

    Capabilities { openssl, dev_zero }
}
