use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;

use companion_domain::{CapturedImage, ImageHost};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: Option<String>,
}

/// Anonymous Imgur-style upload authorized with a client id.
pub struct ImgurHost {
    client: Client,
    upload_url: String,
}

impl ImgurHost {
    pub fn new(upload_url: impl Into<String>, request_timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            upload_url: upload_url.into(),
        })
    }
}

#[async_trait]
impl ImageHost for ImgurHost {
    async fn upload(&self, token: &str, image: &CapturedImage) -> Result<String> {
        let encoded = STANDARD.encode(&image.png);
        let response = self
            .client
            .post(&self.upload_url)
            .header(AUTHORIZATION, format!("Client-ID {}", token))
            .form(&[("image", encoded.as_str()), ("type", "base64")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("image host returned {}", status));
        }
        let body: UploadResponse = response.json().await?;
        if !body.success {
            return Err(anyhow!("image host reported failure"));
        }
        body.data
            .and_then(|data| data.link)
            .filter(|link| !link.trim().is_empty())
            .ok_or_else(|| anyhow!("image host response has no link"))
    }
}
