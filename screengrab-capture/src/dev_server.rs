//! Local dev server subprocess (`ng serve` by default).

use crate::config::DevServerSettings;
use crate::error::{Error, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const EXIT_POLL: Duration = Duration::from_millis(50);

/// A spawned server that must be stopped when the run ends.
pub trait DevServerProcess {
    /// Stop the server. Calling it again is a no-op.
    fn terminate(&mut self) -> Result<()>;
}

pub struct DevServer {
    child: Option<Child>,
    grace: Duration,
}

impl DevServer {
    /// Spawn the configured command inside `project`.
    ///
    /// The child leads its own process group so that the whole tree (`ng`
    /// forks node workers) can be signalled at once, and so a terminal Ctrl+C
    /// reaches only this process.
    pub fn spawn(project: &Path, port: u16, settings: &DevServerSettings) -> Result<Self> {
        let args = settings.args_for_port(port);
        info!(
            "Starting dev server: {} {} (in {})",
            settings.command,
            args.join(" "),
            project.display()
        );

        let child = Command::new(&settings.command)
            .args(&args)
            .current_dir(project)
            .stdin(Stdio::null())
            // stdout carries saved paths only
            .stdout(io::stderr())
            .process_group(0)
            .spawn()
            .map_err(|e| {
                Error::DevServerFailed(format!("Failed to start {}: {}", settings.command, e))
            })?;

        debug!("Dev server pid {}", child.id());
        Ok(Self {
            child: Some(child),
            grace: settings.shutdown_timeout(),
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }
}

impl DevServerProcess for DevServer {
    /// SIGTERM the whole group, then wait until every member is gone. Members
    /// can outlive the leader, so reaping the leader alone is not enough.
    /// Anything still in the group at the grace deadline gets SIGKILL.
    fn terminate(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let group = Pid::from_raw(child.id() as i32);
        if let Err(e) = killpg(group, Signal::SIGTERM) {
            // ESRCH: the whole group is already gone
            debug!("Failed to signal dev server group {}: {}", group, e);
        }

        let mut leader_status = None;
        let deadline = Instant::now() + self.grace;
        loop {
            if leader_status.is_none() {
                leader_status = reap(&mut child);
            }
            if let Some(status) = leader_status {
                if !group_alive(group) {
                    info!("Dev server stopped: {}", status);
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(EXIT_POLL);
        }

        warn!(
            "Dev server did not exit within {:?}, killing it",
            self.grace
        );
        if let Err(e) = killpg(group, Signal::SIGKILL) {
            debug!("Failed to kill dev server group {}: {}", group, e);
        }
        if leader_status.is_none() {
            if let Err(e) = child.kill() {
                debug!("Failed to kill dev server: {}", e);
            }
            if let Err(e) = child.wait() {
                warn!("Failed to reap dev server: {}", e);
            }
        }
        Ok(())
    }
}

/// Non-blocking reap of the group leader. Errors are logged and treated as
/// still running so the kill path gets a chance.
fn reap(child: &mut Child) -> Option<ExitStatus> {
    match child.try_wait() {
        Ok(status) => status,
        Err(e) => {
            warn!("Failed to poll dev server: {}", e);
            None
        }
    }
}

/// Signal 0 to the group: succeeds while any member still exists.
fn group_alive(group: Pid) -> bool {
    killpg(group, None).is_ok()
}

impl Drop for DevServer {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            warn!("Failed to stop dev server: {}", e);
        }
    }
}
