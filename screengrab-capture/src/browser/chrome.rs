use super::BrowserSession;
use crate::config::{BrowserSettings, Viewport};
use crate::error::{Error, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Flags that keep headless Chrome lean and the capture free of chrome UI.
const DEFAULT_ARGS: &[&str] = &[
    "--disable-extensions",
    "--disable-plugins",
    "--disable-gpu",
    "--disable-software-rasterizer",
    "--hide-scrollbars",
    "--mute-audio",
];

/// Headless Chrome with a single tab parked on the target URL.
pub struct ChromeSession {
    tab: Arc<Tab>,
    browser: Option<Browser>,
}

impl ChromeSession {
    /// Launch Chrome and navigate to `url`.
    ///
    /// `idle_timeout` must exceed the longest gap between browser calls, or the
    /// driver drops its connection while the loop sleeps.
    ///
    /// Chrome stays in the terminal's foreground process group: `LaunchOptions`
    /// has no way to give it its own. A terminal Ctrl+C therefore reaches Chrome
    /// directly, and a capture in flight at that moment fails. The loop counts it
    /// as a failed capture and shutdown proceeds as for any other stop.
    pub fn launch(
        url: &str,
        viewport: Viewport,
        settings: &BrowserSettings,
        idle_timeout: Duration,
    ) -> Result<Self> {
        let args = launch_args(settings);
        let os_args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();
        debug!(
            "Launching Chrome ({}x{}) with args {:?}",
            viewport.width, viewport.height, args
        );

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(settings.sandbox)
            .window_size(Some((viewport.width, viewport.height)))
            .path(settings.chrome_path.clone())
            .args(os_args)
            .idle_browser_timeout(idle_timeout)
            .build()
            .map_err(|e| Error::BrowserFailed(format!("Invalid launch options: {}", e)))?;

        let browser = Browser::new(options)
            .map_err(|e| Error::BrowserFailed(format!("Failed to launch Chrome: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::BrowserFailed(format!("Failed to open tab: {}", e)))?;

        debug!("Navigating to {}", url);
        tab.navigate_to(url)
            .map_err(|e| Error::BrowserFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        // The page may keep loading (dev servers compile lazily); the settle
        // delay covers the rest.
        if let Err(e) = tab.wait_until_navigated() {
            warn!("Navigation to {} did not complete: {}", url, e);
        }

        Ok(Self {
            tab,
            browser: Some(browser),
        })
    }
}

fn launch_args(settings: &BrowserSettings) -> Vec<String> {
    DEFAULT_ARGS
        .iter()
        .map(|arg| arg.to_string())
        .chain(settings.extra_args.iter().cloned())
        .collect()
}

impl BrowserSession for ChromeSession {
    fn capture(&mut self) -> Result<Vec<u8>> {
        if self.browser.is_none() {
            return Err(Error::ScreenshotFailed("Browser already closed".to_string()));
        }

        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::ScreenshotFailed(format!("Chrome capture failed: {}", e)))
    }

    fn close(&mut self) -> Result<()> {
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };

        if let Err(e) = self.tab.close(false) {
            debug!("Tab close failed: {}", e);
        }
        // Dropping the handle kills the Chrome process.
        drop(browser);
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
