//! screengrab-capture: periodic screenshots of a web page through headless Chrome
//!
//! This crate provides the capture lifecycle:
//! - Optional local dev server (`ng serve`) started before the page is opened
//! - A headless browser session parked on the target URL
//! - A capture loop that overwrites a single image file at a fixed interval
//! - Guaranteed teardown of both processes on every exit path

pub mod browser;
pub mod config;
pub mod dev_server;
pub mod error;
pub mod grabber;
pub mod grabber_ops;
pub mod output;

// Re-export common types at crate root
pub use browser::{BrowserSession, ChromeSession};
pub use config::{GrabberConfig, Settings, Target, Viewport, DEFAULT_PORT};
pub use dev_server::{DevServer, DevServerProcess};
pub use error::{Error, Result};
pub use grabber::{run_grabber, run_grabber_with_sources, Clock, Launcher, RunFlag, SystemClock};
pub use grabber_ops::GrabSummary;
pub use output::{save_screenshot, OutputFormat};
