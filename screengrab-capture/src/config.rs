use crate::error::{Error, Result};
use crate::output::OutputFormat;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default port for `ng serve`.
pub const DEFAULT_PORT: u16 = 4200;

/// Requested browser viewport. Chrome treats this as a window size hint, so
/// captured images are not guaranteed to match it exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 480)
    }
}

/// What to capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A page that is already reachable.
    Url(String),
    /// A project whose dev server must be started before the page exists.
    DevServer { project: PathBuf, port: u16 },
}

impl Target {
    /// URL the browser navigates to.
    pub fn url(&self) -> String {
        match self {
            Target::Url(url) => url.clone(),
            Target::DevServer { port, .. } => format!("http://localhost:{}", port),
        }
    }
}

/// Everything a run needs, fixed at startup.
#[derive(Clone, Debug)]
pub struct GrabberConfig {
    pub target: Target,
    /// Directory that receives `screenshot.<ext>`
    pub output_dir: PathBuf,
    pub viewport: Viewport,
    /// Settle time before the browser starts and again before the first capture
    pub delay: Duration,
    /// Sleep between the end of one capture cycle and the next
    pub interval: Duration,
    pub format: OutputFormat,
    /// Stop after this much wall time. `None` runs until interrupted.
    pub max_duration: Option<Duration>,
    pub settings: Settings,
}

impl GrabberConfig {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            output_dir: PathBuf::from("./out"),
            viewport: Viewport::default(),
            delay: Duration::from_secs(5),
            interval: Duration::from_secs(10),
            format: OutputFormat::default(),
            max_duration: None,
            settings: Settings::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "interval must be greater than zero".to_string(),
            ));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "viewport {}x{} has a zero dimension",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("output path is empty".to_string()));
        }

        match &self.target {
            Target::Url(url) => {
                if url.trim().is_empty() {
                    return Err(Error::InvalidConfig("target URL is empty".to_string()));
                }
            }
            Target::DevServer { project, port } => {
                if *port == 0 {
                    return Err(Error::InvalidConfig("port must be non-zero".to_string()));
                }
                if !project.is_dir() {
                    return Err(Error::InvalidConfig(format!(
                        "project path {} is not a directory",
                        project.display()
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Settings file contents: knobs that rarely change between runs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub dev_server: DevServerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrowserSettings {
    /// Chrome/Chromium binary. Autodetected when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,
    #[serde(default = "default_sandbox")]
    pub sandbox: bool,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_sandbox() -> bool {
    true
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            sandbox: default_sandbox(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DevServerSettings {
    #[serde(default = "default_command")]
    pub command: String,
    /// `{port}` is replaced with the configured port.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_command() -> String {
    "ng".to_string()
}

fn default_args() -> Vec<String> {
    vec!["serve".to_string(), "--port".to_string(), "{port}".to_string()]
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

impl Default for DevServerSettings {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl DevServerSettings {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Arguments with `{port}` substituted.
    pub fn args_for_port(&self, port: u16) -> Vec<String> {
        let port = port.to_string();
        self.args
            .iter()
            .map(|arg| arg.replace("{port}", &port))
            .collect()
    }
}

impl Settings {
    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/screengrab/config.toml")
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load an explicitly named settings file. Any failure is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!(
                "cannot read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&contents)
    }

    /// Load `path` if given, otherwise the default file when it exists,
    /// otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let path = Self::default_path();
        if path.exists() {
            tracing::debug!("Loading settings from {}", path.display());
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }
}
