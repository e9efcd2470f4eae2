//! A hidden page used for preview scans and chain replay.

use std::time::Duration;

use {
    base64::{Engine as _, engine::general_purpose::STANDARD as BASE64},
    chromiumoxide::{
        Page, cdp::browser_protocol::page::CaptureScreenshotFormat, page::ScreenshotParams,
    },
    serde_json::Value,
    skein_common::SerializedAction,
    skein_config::{PaletteConfig, SessionConfig},
    tokio::time::{sleep, timeout},
    tracing::{debug, info, warn},
};

use {
    crate::{error::SessionError, host::BrowserHost},
    skein_scanner::{ScanOutcome, build_actions, harvest_script, parse_harvest},
};

/// Click an element by locator. Selects get focused first so their options
/// render.
const PERFORM_JS: &str = r#"(locator) => {
    const el = document.querySelector(locator);
    if (!el) return false;
    el.scrollIntoView({ block: 'center' });
    if (el.tagName === 'SELECT') el.focus();
    el.click();
    return true;
}"#;

/// Draw numbered boxes over the given actions' bounds.
const ANNOTATE_JS: &str = r#"(actions) => {
    const root = document.createElement('div');
    root.id = 'skein-annotations';
    root.style.cssText =
        'position:absolute;top:0;left:0;pointer-events:none;z-index:2147483647;';
    actions.forEach((action, i) => {
        if (!action.bounds) return;
        const b = action.bounds;
        const box = document.createElement('div');
        box.style.cssText =
            'position:absolute;left:' + b.x + 'px;top:' + b.y + 'px;' +
            'width:' + b.width + 'px;height:' + b.height + 'px;' +
            'border:2px solid #e11;box-sizing:border-box;';
        const tag = document.createElement('span');
        tag.textContent = String(i + 1);
        tag.style.cssText =
            'position:absolute;top:-10px;left:-10px;background:#e11;color:#fff;' +
            'font:bold 11px sans-serif;padding:1px 4px;border-radius:3px;';
        box.appendChild(tag);
        root.appendChild(box);
    });
    document.body.appendChild(root);
    return true;
}"#;

const REMOVE_ANNOTATIONS_JS: &str = r#"() => {
    const root = document.getElementById('skein-annotations');
    if (root) root.remove();
    return true;
}"#;

/// One hidden page, opened on a URL and closed after a single request. Never
/// shown to the user and never reused across requests.
pub struct HiddenSession {
    page: Page,
    timing: SessionConfig,
    palette: PaletteConfig,
}

impl HiddenSession {
    /// Open a fresh page and load `url`, bounded by the load timeout. The
    /// page is closed before returning an error, so callers never hold a
    /// half-loaded session.
    pub async fn open(host: &BrowserHost, url: &str) -> Result<Self, SessionError> {
        let page = host.new_page().await?;
        let session = Self {
            page,
            timing: host.config().session.clone(),
            palette: host.config().palette.clone(),
        };

        if let Err(e) = session.load(url).await {
            warn!(url, error = %e, "hidden session failed to load, closing");
            session.close().await;
            return Err(e);
        }
        debug!(url, "hidden session ready");
        Ok(session)
    }

    /// Wrap an existing page without navigating it. Used for the visible
    /// tab; the caller keeps ownership of the page's lifetime, so dropping
    /// the wrapper (instead of calling [`Self::close`]) leaves it open.
    #[must_use]
    pub fn attach(host: &BrowserHost, page: Page) -> Self {
        Self {
            page,
            timing: host.config().session.clone(),
            palette: host.config().palette.clone(),
        }
    }

    async fn load(&self, url: &str) -> Result<(), SessionError> {
        let deadline = Duration::from_millis(self.timing.load_timeout_ms);
        let load = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| SessionError::NavigationFailed(e.to_string()))?;
            let _ = self.page.wait_for_navigation().await;
            Ok(())
        };
        match timeout(deadline, load).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::LoadTimeout(self.timing.load_timeout_ms / 1000)),
        }
    }

    /// Harvest the current document and build the action list.
    pub async fn scan(&self) -> Result<ScanOutcome, SessionError> {
        let script = harvest_script(Some(&self.palette.exclude_selector));
        let value: Value = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| SessionError::JsEvalFailed(e.to_string()))?
            .into_value()
            .map_err(|e| SessionError::JsEvalFailed(format!("{e:?}")))?;
        let outcome = build_actions(parse_harvest(value)?);
        info!(url = %outcome.url, actions = outcome.actions.len(), "scanned hidden page");
        Ok(outcome)
    }

    /// Re-find an action by its locator and click it, then wait the settle
    /// delay so reactive pages can re-render before the next scan.
    pub async fn perform(&self, action: &SerializedAction) -> Result<(), SessionError> {
        let locator = Value::from(action.locator.as_str()).to_string();
        let found: bool = self
            .page
            .evaluate(format!("({PERFORM_JS})({locator})"))
            .await
            .map_err(|e| SessionError::JsEvalFailed(e.to_string()))?
            .into_value()
            .map_err(|e| SessionError::JsEvalFailed(format!("{e:?}")))?;
        if !found {
            return Err(SessionError::ElementNotFound(action.label.clone()));
        }
        debug!(label = %action.label, locator = %action.locator, "performed action");
        sleep(Duration::from_millis(self.timing.settle_delay_ms)).await;
        Ok(())
    }

    /// Wait for a navigation the last action may have triggered. Degrades to
    /// the current URL when none arrives within the deadline; a click that
    /// turned out not to navigate is not an error.
    pub async fn settle_navigation(&self) -> String {
        let deadline = Duration::from_millis(self.timing.navigation_timeout_ms);
        if timeout(deadline, self.page.wait_for_navigation()).await.is_err() {
            debug!("no navigation observed before deadline, keeping current URL");
        }
        self.current_url().await
    }

    pub async fn current_url(&self) -> String {
        self.page.url().await.ok().flatten().unwrap_or_default()
    }

    pub async fn title(&self) -> String {
        self.page.get_title().await.ok().flatten().unwrap_or_default()
    }

    /// Screenshot the viewport as a JPEG data URI, with numbered overlays on
    /// the given actions. Overlays are removed afterwards so a later scan of
    /// the same page does not see them.
    pub async fn screenshot_annotated(
        &self,
        actions: &[SerializedAction],
    ) -> Result<String, SessionError> {
        if !actions.is_empty() {
            let payload = serde_json::to_string(actions)
                .map_err(|e| SessionError::JsEvalFailed(e.to_string()))?;
            let result = self.page.evaluate(format!("({ANNOTATE_JS})({payload})")).await;
            if let Err(e) = result {
                warn!(error = %e, "failed to draw annotations, screenshotting anyway");
            }
            sleep(Duration::from_millis(self.timing.annotate_delay_ms)).await;
        }

        let shot = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Jpeg)
                    .quality(70)
                    .full_page(false)
                    .build(),
            )
            .await
            .map_err(|e| SessionError::ScreenshotFailed(e.to_string()));

        if !actions.is_empty() {
            let _ = self.page.evaluate(REMOVE_ANNOTATIONS_JS).await;
        }

        let bytes = shot?;
        info!(bytes = bytes.len(), "captured screenshot");
        Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&bytes)))
    }

    /// Close the page. Best effort: a page that is already gone is fine.
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!(error = %e, "hidden page close failed (already gone?)");
        }
    }
}
