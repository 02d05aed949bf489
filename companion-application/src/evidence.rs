use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use companion_domain::ports::{EvidenceName, EvidenceStore, ImageHost, ScreenCapture, SyncApi};
use companion_domain::{current_millis, ActivityRecord};

/// Who and where a piece of evidence belongs to.
#[derive(Debug, Clone)]
pub struct EvidenceContext {
    pub event_id: String,
    pub rsn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenState {
    Unfetched,
    Available(String),
    Unavailable,
}

/// Capture → local save → optional upload for one drop record.
///
/// Each step fails on its own: a record always comes back, with a
/// screenshot url only when the upload succeeded.
pub struct EvidencePipeline {
    capture: Arc<dyn ScreenCapture>,
    store: Arc<dyn EvidenceStore>,
    host: Arc<dyn ImageHost>,
    token: Mutex<TokenState>,
}

impl EvidencePipeline {
    pub fn new(
        capture: Arc<dyn ScreenCapture>,
        store: Arc<dyn EvidenceStore>,
        host: Arc<dyn ImageHost>,
    ) -> Self {
        Self {
            capture,
            store,
            host,
            token: Mutex::new(TokenState::Unfetched),
        }
    }

    /// Fetches the image host token once; later calls are no-ops until
    /// `reset_token`.
    pub async fn prime_token(&self, sync: &dyn SyncApi) {
        let mut token = self.token.lock().await;
        if *token != TokenState::Unfetched {
            return;
        }
        *token = match sync.get_image_host_token().await {
            Some(value) if !value.trim().is_empty() => {
                info!("image host token available");
                TokenState::Available(value.trim().to_string())
            }
            _ => {
                warn!("image host token unavailable, screenshots stay local");
                TokenState::Unavailable
            }
        };
    }

    pub async fn reset_token(&self) {
        *self.token.lock().await = TokenState::Unfetched;
    }

    pub async fn uploads_enabled(&self) -> bool {
        matches!(*self.token.lock().await, TokenState::Available(_))
    }

    pub async fn attach_evidence(&self, record: ActivityRecord, ctx: &EvidenceContext) -> ActivityRecord {
        let image = match self.capture.capture().await {
            Ok(image) => image,
            Err(err) => {
                warn!(subject = %record.subject_name(), ?err, "screen capture failed, submitting without evidence");
                return record;
            }
        };

        let item = record.drop_name().unwrap_or(record.subject_name()).to_string();
        let name = EvidenceName {
            event_id: &ctx.event_id,
            item: &item,
            user: &ctx.rsn,
            taken_at_millis: current_millis(),
        };
        match self.store.save(&name, &image).await {
            Ok(path) => debug!(path = %path.display(), "evidence saved locally"),
            Err(err) => warn!(?err, item = %item, "failed to save evidence locally"),
        }

        let token = match &*self.token.lock().await {
            TokenState::Available(token) => Some(token.clone()),
            _ => None,
        };
        let Some(token) = token else {
            debug!("no image host token, skipping upload");
            return record.with_screenshot_url(None);
        };

        match self.host.upload(&token, &image).await {
            Ok(url) => {
                info!(item = %item, url = %url, "evidence uploaded");
                record.with_screenshot_url(Some(url))
            }
            Err(err) => {
                warn!(?err, item = %item, "evidence upload failed");
                record.with_screenshot_url(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use companion_domain::ActivityType;

    use super::*;
    use crate::testing::{FakeCapture, FakeHost, FakeStore, FakeSync};

    fn drop_record() -> ActivityRecord {
        ActivityRecord::new(
            ActivityType::Drop,
            "Vorkath",
            Some("Draconic visage".to_string()),
            1_700_000_000,
            "7",
        )
    }

    fn ctx() -> EvidenceContext {
        EvidenceContext {
            event_id: "evt-1".to_string(),
            rsn: "Zezima".to_string(),
        }
    }

    #[tokio::test]
    async fn unavailable_token_keeps_local_copy_without_url() {
        let store = Arc::new(FakeStore::default());
        let host = Arc::new(FakeHost::default());
        let pipeline = EvidencePipeline::new(Arc::new(FakeCapture::default()), store.clone(), host.clone());
        let sync = FakeSync::default();
        pipeline.prime_token(&sync).await;

        let record = pipeline.attach_evidence(drop_record(), &ctx()).await;

        assert_eq!(record.screenshot_url(), None);
        assert_eq!(record.drop_name(), Some("Draconic visage"));
        assert_eq!(store.saved.lock().await.len(), 1);
        assert_eq!(host.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn uploads_when_token_available() {
        let store = Arc::new(FakeStore::default());
        let host = Arc::new(FakeHost::default());
        let pipeline = EvidencePipeline::new(Arc::new(FakeCapture::default()), store.clone(), host.clone());
        let sync = FakeSync::with_token("client-id");
        pipeline.prime_token(&sync).await;

        let record = pipeline.attach_evidence(drop_record(), &ctx()).await;

        assert_eq!(record.screenshot_url(), Some(FakeHost::URL));
        let saved = store.saved.lock().await;
        assert_eq!(saved[0].0, "evt-1");
        assert_eq!(saved[0].1, "Draconic visage");
    }

    #[tokio::test]
    async fn token_is_fetched_once_until_reset() {
        let pipeline = EvidencePipeline::new(
            Arc::new(FakeCapture::default()),
            Arc::new(FakeStore::default()),
            Arc::new(FakeHost::default()),
        );
        let sync = FakeSync::with_token("client-id");
        pipeline.prime_token(&sync).await;
        pipeline.prime_token(&sync).await;
        assert_eq!(sync.token_calls.load(Ordering::SeqCst), 1);

        pipeline.reset_token().await;
        assert!(!pipeline.uploads_enabled().await);
        pipeline.prime_token(&sync).await;
        assert_eq!(sync.token_calls.load(Ordering::SeqCst), 2);
        assert!(pipeline.uploads_enabled().await);
    }

    #[tokio::test]
    async fn capture_failure_returns_record_unchanged() {
        let store = Arc::new(FakeStore::default());
        let pipeline = EvidencePipeline::new(
            Arc::new(FakeCapture::failing()),
            store.clone(),
            Arc::new(FakeHost::default()),
        );
        let record = pipeline.attach_evidence(drop_record(), &ctx()).await;
        assert_eq!(record, drop_record());
        assert!(store.saved.lock().await.is_empty());
    }

    #[tokio::test]
    async fn save_and_upload_failures_are_independent() {
        let host = Arc::new(FakeHost::default());
        let pipeline = EvidencePipeline::new(
            Arc::new(FakeCapture::default()),
            Arc::new(FakeStore::failing()),
            host.clone(),
        );
        pipeline.prime_token(&FakeSync::with_token("client-id")).await;
        let record = pipeline.attach_evidence(drop_record(), &ctx()).await;
        assert_eq!(record.screenshot_url(), Some(FakeHost::URL));

        let failing_host = EvidencePipeline::new(
            Arc::new(FakeCapture::default()),
            Arc::new(FakeStore::default()),
            Arc::new(FakeHost::failing()),
        );
        failing_host.prime_token(&FakeSync::with_token("client-id")).await;
        let record = failing_host.attach_evidence(drop_record(), &ctx()).await;
        assert_eq!(record.screenshot_url(), None);
    }
}
