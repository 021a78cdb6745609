use clap::{ArgGroup, Parser};
use screengrab_capture::{
    GrabberConfig, OutputFormat, Settings, Target, Viewport, DEFAULT_PORT,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "screengrab")]
#[command(about = "Capture screenshots of a webpage or a local Angular application")]
#[command(version)]
#[command(group(ArgGroup::new("target").required(true).args(["url", "angular_project_path"])))]
pub struct Cli {
    /// URL of the page to capture
    pub url: Option<String>,

    /// Angular project to serve locally with `ng serve` and capture
    #[arg(short, long, value_name = "DIR")]
    pub angular_project_path: Option<PathBuf>,

    /// Dev server port, default 4200 (only with --angular-project-path)
    #[arg(short, long, requires = "angular_project_path")]
    pub port: Option<u16>,

    /// Directory that receives the screenshot
    #[arg(short, long, default_value = "./out")]
    pub output_path: PathBuf,

    /// Requested viewport size in pixels
    #[arg(short, long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [800, 480])]
    pub size: Vec<u32>,

    /// Seconds to let the page load before capturing
    #[arg(short, long, default_value_t = 5)]
    pub delay: u64,

    /// Seconds between captures
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Output image format (bmp, png, jpeg)
    #[arg(short, long, default_value = "bmp")]
    pub format: OutputFormat,

    /// Stop after this many seconds (0 runs until interrupted)
    #[arg(short, long, default_value_t = 0)]
    pub timeout: u64,

    /// Settings file (default: ~/.config/screengrab/config.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log progress (info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Log everything (debug level)
    #[arg(short = 'e', long)]
    pub debug: bool,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }

    pub fn target(&self) -> Target {
        match (&self.angular_project_path, &self.url) {
            (Some(project), _) => Target::DevServer {
                project: project.clone(),
                port: self.port.unwrap_or(DEFAULT_PORT),
            },
            (None, Some(url)) => Target::Url(url.clone()),
            // clap's required group guarantees one of the two
            (None, None) => Target::Url(String::new()),
        }
    }

    pub fn into_config(self, settings: Settings) -> GrabberConfig {
        let viewport = match self.size.as_slice() {
            [width, height] => Viewport::new(*width, *height),
            _ => Viewport::default(),
        };

        GrabberConfig {
            target: self.target(),
            output_dir: self.output_path,
            viewport,
            delay: Duration::from_secs(self.delay),
            interval: Duration::from_secs(self.interval),
            format: self.format,
            max_duration: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
            settings,
        }
    }
}
