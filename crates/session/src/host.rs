//! The shared headless browser instance.

use std::time::Duration;

use {
    chromiumoxide::{
        Browser, BrowserConfig as CdpBrowserConfig, Page,
        cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams,
    },
    futures::StreamExt,
    skein_config::SkeinConfig,
    tokio::sync::Mutex,
    tracing::{debug, info, warn},
};

use crate::error::SessionError;

/// Owns at most one headless browser, launched on first use. Hands out a
/// fresh page per request; pages belong to their [`crate::HiddenSession`] and
/// are never reused.
pub struct BrowserHost {
    config: SkeinConfig,
    browser: Mutex<Option<Browser>>,
}

impl BrowserHost {
    #[must_use]
    pub fn new(config: SkeinConfig) -> Self {
        Self { config, browser: Mutex::new(None) }
    }

    #[must_use]
    pub fn config(&self) -> &SkeinConfig {
        &self.config
    }

    /// Open a fresh blank page, launching the browser if needed. A dead
    /// connection from an earlier crash is replaced with one relaunch.
    pub async fn new_page(&self) -> Result<Page, SessionError> {
        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }

        let browser = guard.as_ref().ok_or_else(|| {
            SessionError::LaunchFailed("browser unavailable after launch".into())
        })?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let err_str = e.to_string();
                if !err_str.contains("AlreadyClosed") && !err_str.contains("ConnectionClosed") {
                    return Err(SessionError::LaunchFailed(err_str));
                }
                warn!("browser connection dead, relaunching");
                let browser = self.launch().await?;
                let page = browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| SessionError::LaunchFailed(e.to_string()))?;
                *guard = Some(browser);
                page
            },
        };

        // Browser-level viewport may not apply to new pages; set it
        // explicitly.
        let viewport_cmd = SetDeviceMetricsOverrideParams::builder()
            .width(self.config.browser.viewport_width)
            .height(self.config.browser.viewport_height)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(SessionError::Cdp)?;
        if let Err(e) = page.execute(viewport_cmd).await {
            warn!(error = %e, "failed to set page viewport");
        }

        debug!(
            viewport_width = self.config.browser.viewport_width,
            viewport_height = self.config.browser.viewport_height,
            "opened fresh page"
        );
        Ok(page)
    }

    async fn launch(&self) -> Result<Browser, SessionError> {
        let browser_cfg = &self.config.browser;
        let mut builder = CdpBrowserConfig::builder();

        // chromiumoxide is headless by default; only opt out.
        if !browser_cfg.headless {
            builder = builder.with_head();
        }

        builder = builder
            .viewport(chromiumoxide::handler::viewport::Viewport {
                width: browser_cfg.viewport_width,
                height: browser_cfg.viewport_height,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            })
            .request_timeout(Duration::from_millis(self.config.session.navigation_timeout_ms));

        if let Some(ref ua) = browser_cfg.user_agent {
            builder = builder.arg(format!("--user-agent={ua}"));
        }
        if let Some(ref path) = browser_cfg.chrome_path {
            builder = builder.chrome_executable(path);
        }
        for arg in &browser_cfg.chrome_args {
            builder = builder.arg(arg);
        }

        builder = builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox");

        let config = builder.build().map_err(|e| {
            SessionError::LaunchFailed(format!("failed to build browser config: {e}"))
        })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::LaunchFailed(format!("browser launch failed: {e}")))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!(?event, "browser event");
            }
            debug!("browser event handler exited");
        });

        info!(
            headless = browser_cfg.headless,
            viewport_width = browser_cfg.viewport_width,
            viewport_height = browser_cfg.viewport_height,
            "launched browser"
        );
        Ok(browser)
    }

    /// Drop the browser, closing every remaining page with it.
    pub async fn shutdown(&self) {
        let browser = self.browser.lock().await.take();
        if browser.is_some() {
            info!("browser host shut down");
        }
    }
}
