use crate::browser::BrowserSession;
use crate::config::GrabberConfig;
use crate::error::Result;
use crate::grabber::{Clock, RunFlag};
use crate::output::{save_screenshot, OutputFormat};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Longest uninterrupted sleep; bounds how late a stop request is noticed.
pub const SLEEP_SLICE: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrabSummary {
    pub attempts: u64,
    pub saved: u64,
    pub failed: u64,
    pub last_path: Option<PathBuf>,
}

/// Sleep for `duration` in slices, returning early once `running` is cleared.
///
/// Returns `true` if the full duration elapsed with the flag still set.
pub fn sleep_while_running(clock: &dyn Clock, duration: Duration, running: &RunFlag) -> bool {
    let deadline = clock.now() + duration;
    loop {
        if !running.is_running() {
            return false;
        }
        let now = clock.now();
        if now >= deadline {
            return true;
        }
        clock.sleep((deadline - now).min(SLEEP_SLICE));
    }
}

/// One capture cycle minus the sleep: grab PNG bytes and write them out.
pub fn capture_and_save(
    session: &mut dyn BrowserSession,
    dir: &Path,
    format: OutputFormat,
) -> Result<PathBuf> {
    let png = session.capture()?;
    save_screenshot(&png, dir, format)
}

/// Capture until the flag clears or `config.max_duration` (counted from
/// `started_at`) is exceeded.
///
/// Capture and save failures are logged and counted; only fatal errors end
/// the loop early. The interval is measured from the end of each cycle.
pub fn run_capture_loop(
    config: &GrabberConfig,
    session: &mut dyn BrowserSession,
    clock: &dyn Clock,
    running: &RunFlag,
    started_at: Instant,
) -> Result<GrabSummary> {
    let mut summary = GrabSummary::default();

    loop {
        if !running.is_running() {
            info!("Stop requested");
            break;
        }
        if let Some(limit) = config.max_duration {
            if clock.now().duration_since(started_at) > limit {
                info!("Time limit of {:?} reached", limit);
                break;
            }
        }

        summary.attempts += 1;
        debug!("Capturing screenshot #{}", summary.attempts);

        match capture_and_save(session, &config.output_dir, config.format) {
            Ok(path) => {
                summary.saved += 1;
                info!("Saved screenshot under {}", path.display());
                println!("{}", path.display());
                summary.last_path = Some(path);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                summary.failed += 1;
                error!("Cannot save screenshot: {}", e);
            }
        }

        debug!("Waiting {:?}", config.interval);
        sleep_while_running(clock, config.interval, running);
    }

    Ok(summary)
}
