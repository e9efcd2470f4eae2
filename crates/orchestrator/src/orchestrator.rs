//! Request dispatch.

use std::time::Duration;

use {
    chromiumoxide::Page,
    skein_common::{Chain, SerializedAction},
    skein_config::SkeinConfig,
    skein_enhance::{EnhanceError, SuggestionClient, apply_suggestions},
    skein_session::{BrowserHost, ChainExecutor, HiddenSession, SessionError},
    tokio::sync::Mutex,
    tracing::{info, warn},
};

use crate::{
    cache::EnhancementCache,
    debounce::ToggleDebouncer,
    keystore::KeyStore,
    protocol::{Request, Response},
};

/// Owns everything a request can touch: the browser host, the enhancement
/// cache, the key store, the toggle debouncer, and (once attached) the
/// visible tab.
pub struct Orchestrator {
    config: SkeinConfig,
    host: BrowserHost,
    cache: Mutex<EnhancementCache>,
    debouncer: Mutex<ToggleDebouncer>,
    keystore: KeyStore,
    client: SuggestionClient,
    visible: Mutex<Option<Page>>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(config: SkeinConfig, keystore: KeyStore) -> Self {
        let cache =
            EnhancementCache::new(Duration::from_secs(config.enhance.cache_ttl_secs));
        let debouncer =
            ToggleDebouncer::new(Duration::from_millis(config.palette.toggle_debounce_ms));
        let client = SuggestionClient::new(config.enhance.model.clone());
        Self {
            host: BrowserHost::new(config.clone()),
            config,
            cache: Mutex::new(cache),
            debouncer: Mutex::new(debouncer),
            keystore,
            client,
            visible: Mutex::new(None),
        }
    }

    /// Hand the orchestrator the user-facing page. Chain execution redirects
    /// it; screenshots capture it.
    pub async fn attach_visible_tab(&self, page: Page) {
        *self.visible.lock().await = Some(page);
    }

    /// Handle one request. Never panics and never returns a transport-level
    /// error; every failure becomes a `success: false` response.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::ScanFutureActions { url, action } => {
                self.scan_future(&url, action).await.unwrap_or_else(failure)
            },
            Request::ExecuteChain { chain } => self.execute_chain(chain).await,
            Request::CaptureScreenshot => {
                self.capture_screenshot().await.unwrap_or_else(failure)
            },
            Request::EnhanceActions { actions, url } => {
                self.enhance_actions(actions, &url).await
            },
            Request::TogglePalette => {
                if self.debouncer.lock().await.accept() {
                    Response::ok()
                } else {
                    Response::failure("toggle suppressed by debounce")
                }
            },
            Request::GetApiKey => Response::ok().with_api_key(self.keystore.load_exposed()),
            Request::SetApiKey { api_key } => match self.keystore.save(&api_key) {
                Ok(()) => Response::ok(),
                Err(e) => Response::failure(format!("failed to store API key: {e}")),
            },
        }
    }

    /// Open a hidden session, optionally drill through one non-navigational
    /// action, and scan what is there.
    async fn scan_future(
        &self,
        url: &str,
        action: Option<SerializedAction>,
    ) -> Result<Response, SessionError> {
        let session = HiddenSession::open(&self.host, url).await?;

        let result = async {
            if let Some(action) = &action {
                session.perform(action).await?;
                // Only wait out a navigation the action can actually cause;
                // perform already slept the settle delay.
                if action.is_navigational() {
                    session.settle_navigation().await;
                }
            }
            session.scan().await
        }
        .await;

        match result {
            Ok(outcome) => {
                session.close().await;
                Ok(Response::ok()
                    .with_actions(outcome.serialized())
                    .with_page(outcome.title, outcome.url))
            },
            Err(e) => {
                session.close().await;
                Err(e)
            },
        }
    }

    /// Validate and replay a chain, then point the visible tab at the final
    /// URL.
    async fn execute_chain(&self, actions: Vec<SerializedAction>) -> Response {
        let chain = match Chain::new(actions) {
            Ok(chain) => chain,
            Err(e) => return Response::failure(e.to_string()),
        };

        let final_url = match ChainExecutor::new(&self.host).execute(&chain).await {
            Ok(url) => url,
            Err(e) => return Response::failure(e.to_string()),
        };

        if let Some(page) = self.visible.lock().await.as_ref() {
            if let Err(e) = page.goto(final_url.as_str()).await {
                warn!(error = %e, final_url, "failed to redirect visible tab");
            } else {
                info!(final_url, "redirected visible tab");
            }
        }

        Response::ok().with_final_url(final_url)
    }

    /// Scan the visible tab and screenshot it with numbered overlays.
    async fn capture_screenshot(&self) -> Result<Response, SessionError> {
        let page = self
            .visible
            .lock()
            .await
            .clone()
            .ok_or_else(|| SessionError::ScreenshotFailed("no visible tab attached".into()))?;

        // Borrowed wrapper: dropping it leaves the visible tab open.
        let session = HiddenSession::attach(&self.host, page);
        let outcome = session.scan().await?;
        let image = session.screenshot_annotated(&outcome.serialized()).await?;
        Ok(Response::ok()
            .with_image(image)
            .with_actions(outcome.serialized())
            .with_page(outcome.title, outcome.url))
    }

    /// Serve enhancement from the cache when fresh, otherwise ask the
    /// suggestion service and cache what comes back.
    async fn enhance_actions(&self, actions: Vec<SerializedAction>, url: &str) -> Response {
        if !self.config.enhance.enabled {
            return Response::failure("enhancement is disabled");
        }

        if let Some(cached) = self.cache.lock().await.get(url) {
            info!(url, "serving enhancement from cache");
            return Response::ok().with_enhanced(cached, true);
        }

        let Some(api_key) = self.keystore.load() else {
            return Response::failure(EnhanceError::MissingApiKey.to_string());
        };

        let screenshot = self.capture_for_enhancement(url, &actions).await;
        let suggestions = match self
            .client
            .suggest(&api_key, &actions, url, screenshot.as_deref())
            .await
        {
            Ok(suggestions) => suggestions,
            // Enhancement is decorative: a failed service call degrades to
            // the unenhanced list, and the degraded result is not cached so
            // the next request retries the service.
            Err(e) => {
                warn!(url, error = %e, "suggestion service failed, returning unenhanced actions");
                let unenhanced = actions.into_iter().map(Into::into).collect();
                return Response::ok().with_enhanced(unenhanced, false);
            },
        };

        let enhanced = apply_suggestions(actions, &suggestions);
        {
            let mut cache = self.cache.lock().await;
            cache.evict_expired();
            cache.put(url, enhanced.clone());
        }
        Response::ok().with_enhanced(enhanced, false)
    }

    /// Screenshot the page with numbered overlays matching the prompt's
    /// indices, for the suggestion request. Best effort: enhancement still
    /// works text-only when the page cannot be captured.
    async fn capture_for_enhancement(
        &self,
        url: &str,
        actions: &[SerializedAction],
    ) -> Option<String> {
        let session = match HiddenSession::open(&self.host, url).await {
            Ok(session) => session,
            Err(e) => {
                warn!(url, error = %e, "could not open page for enhancement screenshot");
                return None;
            },
        };
        let result = session.screenshot_annotated(actions).await;
        session.close().await;
        match result {
            Ok(data_uri) => {
                let b64 = data_uri.strip_prefix("data:image/jpeg;base64,").unwrap_or(&data_uri);
                Some(b64.to_string())
            },
            Err(e) => {
                warn!(url, error = %e, "enhancement screenshot failed, going text-only");
                None
            },
        }
    }

    pub async fn shutdown(&self) {
        self.host.shutdown().await;
    }
}

fn failure(e: SessionError) -> Response {
    Response::failure(e.to_string())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, skein_common::ActionKind};

    fn orchestrator() -> Orchestrator {
        let dir = tempfile::tempdir().unwrap();
        let keystore = KeyStore::new(dir.path());
        // Leak the tempdir so the keystore path outlives the guard.
        std::mem::forget(dir);
        Orchestrator::new(SkeinConfig::default(), keystore)
    }

    fn button(label: &str) -> SerializedAction {
        SerializedAction {
            id: format!("action-{label}"),
            label: label.into(),
            raw_label: label.into(),
            kind: ActionKind::Button,
            target_href: None,
            locator: format!("#{label}"),
            bounds: None,
        }
    }

    #[tokio::test]
    async fn chain_validation_errors_surface_as_protocol_failures() {
        let orch = orchestrator();

        let resp = orch.handle(Request::ExecuteChain { chain: vec![] }).await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Chain must not be empty"));

        let resp = orch
            .handle(Request::ExecuteChain { chain: vec![button("save")] })
            .await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Chain must start with a link action"));
    }

    #[tokio::test]
    async fn screenshot_without_visible_tab_fails_cleanly() {
        let orch = orchestrator();
        let resp = orch.handle(Request::CaptureScreenshot).await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("no visible tab"));
    }

    #[tokio::test]
    async fn enhancement_without_key_reports_missing_key() {
        let orch = orchestrator();
        let resp = orch
            .handle(Request::EnhanceActions {
                actions: vec![button("save")],
                url: "https://example.com/".into(),
            })
            .await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("no API key configured"));
    }

    #[tokio::test]
    async fn service_failure_degrades_to_unenhanced_actions() {
        let orch = orchestrator();
        orch.handle(Request::SetApiKey { api_key: "k-unusable".into() }).await;

        // No reachable page and no usable key, so both the screenshot and
        // the service call fail; the response must still succeed with the
        // original actions unenhanced.
        let url = "https://skein.invalid/";
        let resp = orch
            .handle(Request::EnhanceActions {
                actions: vec![button("save")],
                url: url.into(),
            })
            .await;

        assert!(resp.success, "service failure must not fail the request");
        assert_eq!(resp.from_cache, Some(false));
        let enhanced = resp.enhanced_actions.unwrap();
        assert_eq!(enhanced.len(), 1);
        assert_eq!(enhanced[0].action.label, "save");
        assert!(enhanced[0].enhanced_label.is_none());
        assert!(enhanced[0].category.is_none());

        // Degraded results are not cached; the next request retries.
        assert!(orch.cache.lock().await.get(url).is_none());
    }

    #[tokio::test]
    async fn api_key_round_trips_through_protocol() {
        let orch = orchestrator();

        let resp = orch.handle(Request::GetApiKey).await;
        assert!(resp.success);
        assert!(resp.api_key.is_none());

        let resp = orch.handle(Request::SetApiKey { api_key: "k-123".into() }).await;
        assert!(resp.success);

        let resp = orch.handle(Request::GetApiKey).await;
        assert_eq!(resp.api_key.as_deref(), Some("k-123"));
    }

    #[tokio::test]
    async fn toggle_debounce_suppresses_rapid_toggles() {
        let orch = orchestrator();
        assert!(orch.handle(Request::TogglePalette).await.success);
        assert!(!orch.handle(Request::TogglePalette).await.success);
    }
}
