use crate::browser::{BrowserSession, ChromeSession};
use crate::config::{GrabberConfig, Settings, Target, Viewport};
use crate::dev_server::{DevServer, DevServerProcess};
use crate::error::Result;
use crate::grabber_ops::{run_capture_loop, sleep_while_running, GrabSummary};
use crate::output::ensure_output_dir;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Headroom added to the browser idle timeout on top of the longest sleep.
const IDLE_MARGIN: Duration = Duration::from_secs(60);

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// "Keep capturing" flag shared between the loop and a signal handler.
#[derive(Clone, Debug)]
pub struct RunFlag {
    running: Arc<AtomicBool>,
}

impl RunFlag {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the external resources a run owns.
pub trait Launcher {
    fn start_dev_server(&mut self, project: &Path, port: u16)
        -> Result<Box<dyn DevServerProcess>>;
    fn launch_browser(&mut self, url: &str, viewport: Viewport) -> Result<Box<dyn BrowserSession>>;
}

/// Real processes: the configured dev server command and headless Chrome.
pub struct SystemLauncher {
    settings: Settings,
    idle_timeout: Duration,
}

impl SystemLauncher {
    pub fn new(config: &GrabberConfig) -> Self {
        Self {
            settings: config.settings.clone(),
            idle_timeout: config.delay + config.interval + IDLE_MARGIN,
        }
    }
}

impl Launcher for SystemLauncher {
    fn start_dev_server(
        &mut self,
        project: &Path,
        port: u16,
    ) -> Result<Box<dyn DevServerProcess>> {
        Ok(Box::new(DevServer::spawn(
            project,
            port,
            &self.settings.dev_server,
        )?))
    }

    fn launch_browser(&mut self, url: &str, viewport: Viewport) -> Result<Box<dyn BrowserSession>> {
        Ok(Box::new(ChromeSession::launch(
            url,
            viewport,
            &self.settings.browser,
            self.idle_timeout,
        )?))
    }
}

/// Owns whatever the run has acquired so far and releases it exactly once,
/// either through `shutdown` or on drop.
#[derive(Default)]
struct Teardown {
    dev_server: Option<Box<dyn DevServerProcess>>,
    session: Option<Box<dyn BrowserSession>>,
}

impl Teardown {
    fn shutdown(&mut self) {
        if let Some(mut server) = self.dev_server.take() {
            info!("Stopping dev server");
            if let Err(e) = server.terminate() {
                warn!("Failed to stop dev server: {}", e);
            }
        }
        if let Some(mut session) = self.session.take() {
            info!("Stopping browser");
            if let Err(e) = session.close() {
                warn!("Failed to close browser: {}", e);
            }
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run against real processes and the wall clock until `running` clears.
pub fn run_grabber(config: &GrabberConfig, running: &RunFlag) -> Result<GrabSummary> {
    let mut launcher = SystemLauncher::new(config);
    let summary = run_grabber_with_sources(config, &mut launcher, &SystemClock, running)?;

    info!(
        "Captured {} screenshot(s), {} failed",
        summary.saved, summary.failed
    );
    Ok(summary)
}

/// Full lifecycle: validate, start resources, capture loop, shutdown.
///
/// Shutdown runs on every path out of this function, including startup
/// failures and fatal loop errors.
pub fn run_grabber_with_sources(
    config: &GrabberConfig,
    launcher: &mut dyn Launcher,
    clock: &dyn Clock,
    running: &RunFlag,
) -> Result<GrabSummary> {
    config.validate()?;
    ensure_output_dir(&config.output_dir)?;

    let mut teardown = Teardown::default();
    let result = start_and_capture(config, launcher, clock, running, &mut teardown);
    teardown.shutdown();
    result
}

fn start_and_capture(
    config: &GrabberConfig,
    launcher: &mut dyn Launcher,
    clock: &dyn Clock,
    running: &RunFlag,
    teardown: &mut Teardown,
) -> Result<GrabSummary> {
    let started_at = clock.now();

    if let Target::DevServer { project, port } = &config.target {
        teardown.dev_server = Some(launcher.start_dev_server(project, *port)?);
    }

    info!("Waiting {:?} before starting the browser", config.delay);
    if !sleep_while_running(clock, config.delay, running) {
        info!("Stop requested during startup");
        return Ok(GrabSummary::default());
    }

    let url = config.target.url();
    info!("Opening {}", url);
    let session = teardown
        .session
        .insert(launcher.launch_browser(&url, config.viewport)?);

    info!("Waiting {:?} for the page to settle", config.delay);
    if !sleep_while_running(clock, config.delay, running) {
        info!("Stop requested during startup");
        return Ok(GrabSummary::default());
    }

    run_capture_loop(config, &mut **session, clock, running, started_at)
}
