use std::path::PathBuf;

use async_trait::async_trait;

/// PNG-encoded still of the game display.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub png: Vec<u8>,
}

impl CapturedImage {
    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    pub fn from_png(png: Vec<u8>) -> anyhow::Result<Self> {
        if !png.starts_with(&Self::PNG_SIGNATURE) {
            anyhow::bail!("captured image is not a png ({} bytes)", png.len());
        }
        Ok(Self { png })
    }
}

/// Naming inputs for a locally saved screenshot.
#[derive(Debug, Clone)]
pub struct EvidenceName<'a> {
    pub event_id: &'a str,
    pub item: &'a str,
    pub user: &'a str,
    pub taken_at_millis: i64,
}

#[async_trait]
pub trait ScreenCapture: Send + Sync {
    async fn capture(&self) -> anyhow::Result<CapturedImage>;
}

#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn save(&self, name: &EvidenceName<'_>, image: &CapturedImage) -> anyhow::Result<PathBuf>;
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads the image and returns its public URL.
    async fn upload(&self, token: &str, image: &CapturedImage) -> anyhow::Result<String>;
}
