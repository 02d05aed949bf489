use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use companion_domain::{CapturedImage, ScreenCapture};

const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs an external screenshot tool that writes a PNG to stdout.
pub struct CommandCapture {
    argv: Vec<String>,
}

impl CommandCapture {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.first().map(|program| program.trim().is_empty()).unwrap_or(true) {
            return Err(anyhow!("capture_command must name a program"));
        }
        Ok(Self { argv })
    }
}

#[async_trait]
impl ScreenCapture for CommandCapture {
    async fn capture(&self) -> Result<CapturedImage> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| anyhow!("capture_command is empty"))?;
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| anyhow!("failed to start {}: {}", program, err))?;
        let output = timeout(CAPTURE_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| anyhow!("{} timed out", program))??;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} exited with {}: {}", program, output.status, stderr.trim()));
        }
        debug!(bytes = output.stdout.len(), "screen captured");
        CapturedImage::from_png(output.stdout)
    }
}

/// Used when no capture command is configured; every capture fails.
#[derive(Default)]
pub struct DisabledCapture;

#[async_trait]
impl ScreenCapture for DisabledCapture {
    async fn capture(&self) -> Result<CapturedImage> {
        Err(anyhow!("screen capture is not configured"))
    }
}
